#![forbid(unsafe_code)]

//! Card placement.
//!
//! A single rule-based pass, no search:
//!
//! 1. Below the target, left-aligned with it.
//! 2. If the card would cross the right edge, pull it back to leave the edge
//!    margin; then never let it start before the left margin.
//! 3. If the card would cross the bottom edge, put it above the target.
//!
//! The card height is an assumed constant rather than a measurement, so an
//! unusually long body can still be misplaced. A target near a corner can
//! also leave the card partly off-screen after the flip. Both are accepted.

use waypoint_core::{PageRect, Viewport};

/// Card dimensions and spacing used by the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CardMetrics {
    pub width: f64,
    /// Assumed, not measured.
    pub height: f64,
    /// Distance between target and card.
    pub gap: f64,
    /// Minimum distance from the left and right viewport edges.
    pub edge_margin: f64,
}

impl Default for CardMetrics {
    fn default() -> Self {
        Self {
            width: 320.0,
            height: 200.0,
            gap: 16.0,
            edge_margin: 20.0,
        }
    }
}

/// Which side of the target the card ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CardSide {
    Below,
    Above,
}

/// Absolute screen position of the card's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CardOrigin {
    pub top: f64,
    pub left: f64,
}

/// Solver output.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CardPlacement {
    pub origin: CardOrigin,
    pub side: CardSide,
}

/// Place the card for `target` in `viewport`.
#[must_use]
pub fn place_card(target: PageRect, viewport: Viewport, metrics: &CardMetrics) -> CardPlacement {
    let mut top = target.bottom() + metrics.gap;
    let mut left = target.left();
    let mut side = CardSide::Below;

    if left + metrics.width > viewport.width {
        left = viewport.width - metrics.width - metrics.edge_margin;
    }
    if left < metrics.edge_margin {
        left = metrics.edge_margin;
    }

    if top + metrics.height > viewport.height {
        top = target.top() - metrics.gap - metrics.height;
        side = CardSide::Above;
    }

    CardPlacement {
        origin: CardOrigin { top, left },
        side,
    }
}
