#![forbid(unsafe_code)]

//! Waypoint Tour
//!
//! A step-by-step guided tour that spotlights page elements with a dimming
//! mask, a highlight outline, and an explanatory card.
//!
//! # Key Components
//!
//! - [`Sequencer`] - Step cursor with terminal `Finished`/`Closed` states
//! - [`locate`] - Resolves a step's target and requests scroll-into-view
//! - [`MaskPanes`] - Four-pane spotlight mask around the target
//! - [`place_card`] - Rule-based card placement with a vertical flip
//! - [`OverlayFrame`] - Everything a presenter needs to paint one step
//! - [`TourEngine`] - Mount/refresh/unmount lifecycle over a [`Page`]
//!
//! # How it fits
//! The engine never touches a real document. Hosts implement [`Page`] for
//! geometry and signals and [`Presenter`] for painting. `waypoint-web`
//! provides both for the browser; `waypoint-harness` provides a virtual
//! page for tests and previews.

pub mod config;
pub mod engine;
pub mod locator;
pub mod mask;
pub mod overlay;
pub mod page;
pub mod placement;
pub mod sequencer;
pub mod step;

pub use config::{TourConfig, TourConfigError};
pub use engine::{RefreshCause, TourCallbacks, TourEngine};
pub use locator::{Resolution, TargetState, locate};
pub use mask::{MaskPanes, outline};
pub use overlay::{
    BACK_LABEL, CLOSE_LABEL, CardAction, CardView, Layers, OverlayFrame, Presenter,
    PrimaryAction, ProgressDots,
};
pub use page::{ListenerGuard, Page, ScrollAlign, ScrollBehavior, ScrollIntoView};
pub use placement::{CardMetrics, CardOrigin, CardPlacement, CardSide, place_card};
pub use sequencer::{Sequencer, TourStatus, Transition};
pub use step::{Position, Step};

pub use waypoint_core::{
    Listener, ListenerId, ListenerRegistry, PageRect, PageSignal, Sides, SignalKind, SignalOrigin,
    Viewport,
};
