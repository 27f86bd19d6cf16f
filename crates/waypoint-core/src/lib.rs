#![forbid(unsafe_code)]

//! Core: page geometry, page signals, and listener bookkeeping.
//!
//! # Role in Waypoint
//! `waypoint-core` is the vocabulary shared between the tour engine and the
//! page backends that host it. It has no opinion about tours.
//!
//! # Primary responsibilities
//! - **PageRect / Viewport**: viewport-space geometry in CSS pixels. Edges may
//!   be negative or exceed the viewport; nothing here clamps.
//! - **PageSignal / SignalKind**: the page events the engine reacts to.
//! - **ListenerRegistry**: id-keyed listener storage with capture-phase
//!   dispatch, for backends that do not have a native event system.
//!
//! # How it fits in the system
//! `waypoint-tour` consumes these types through its `Page` trait.
//! `waypoint-harness` builds an in-memory page on the registry and
//! `waypoint-web` maps the same signals onto DOM events.

pub mod geometry;
pub mod signal;

pub use geometry::{PageRect, Sides, Viewport};
pub use signal::{Listener, ListenerId, ListenerRegistry, PageSignal, SignalKind, SignalOrigin};
