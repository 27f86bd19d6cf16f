#![forbid(unsafe_code)]

//! Waypoint public facade crate.
//!
//! Re-exports the geometry and signal types from `waypoint-core` and the
//! tour engine from `waypoint-tour`, plus a prelude for hosts that only
//! need to implement [`Page`] and [`Presenter`] and mount a tour.
//!
//! ```ignore
//! use waypoint::prelude::*;
//!
//! let mut tour = TourEngine::mount(page, presenter, steps, TourCallbacks::noop(), TourConfig::default());
//! tour.next();
//! ```

// --- Core re-exports -------------------------------------------------------

pub use waypoint_core::{
    Listener, ListenerId, ListenerRegistry, PageRect, PageSignal, Sides, SignalKind, SignalOrigin,
    Viewport,
};

// --- Tour re-exports -------------------------------------------------------

pub use waypoint_tour::{
    BACK_LABEL, CLOSE_LABEL, CardAction, CardMetrics, CardOrigin, CardPlacement, CardSide,
    CardView, Layers, ListenerGuard, MaskPanes, OverlayFrame, Page, Position, Presenter,
    PrimaryAction, ProgressDots, RefreshCause, Resolution, ScrollAlign, ScrollBehavior,
    ScrollIntoView, Sequencer, Step, TargetState, TourCallbacks, TourConfig, TourConfigError,
    TourEngine, TourStatus, Transition, locate, outline, place_card,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CardAction, OverlayFrame, Page, PageRect, PageSignal, Presenter, ScrollIntoView,
        SignalKind, Step, TourCallbacks, TourConfig, TourEngine, Transition, Viewport,
    };

    pub use crate::{core, tour};
}

pub use waypoint_core as core;
pub use waypoint_tour as tour;
