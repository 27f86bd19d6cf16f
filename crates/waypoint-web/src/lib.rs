#![forbid(unsafe_code)]

//! Browser bindings for the Waypoint guided tour.
//!
//! [`WebTour`] mounts a tour on the live document: it measures targets with
//! `getBoundingClientRect`, listens for `resize` and capture-phase `scroll`
//! on `window`, and portals the mask, outline and card into
//! `document.body`. The card's buttons drive the same operations exposed to
//! JavaScript.
//!
//! The styling rules in [`layout`] and the step decoding in [`steps`] are
//! plain Rust and tested natively; only the `wasm` module touches `web-sys`.

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{DomPage, DomPresenter, WebTour};

pub mod layout;
pub mod steps;

pub use layout::{ACTION_ATTR, DomLayout, Style, action_name, hidden_root, parse_action};
pub use steps::{StepsError, parse_steps};
