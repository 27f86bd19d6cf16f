#![forbid(unsafe_code)]

//! Target resolution.
//!
//! Resolves a step's identifier to live geometry and asks the page to
//! scroll the target into view when any edge is outside the viewport. The
//! scroll is a side effect only: the returned rectangle is the geometry as
//! it was before scrolling, and fresh geometry arrives with the next
//! signal.

use waypoint_core::PageRect;

use crate::page::{Page, ScrollIntoView};

/// Last observed geometry of the current step's target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TargetState {
    /// The element exists; its bounding rectangle in viewport coordinates.
    Resolved(PageRect),
    /// No element with the identifier is mounted.
    #[default]
    Unresolved,
}

impl TargetState {
    /// The rectangle, if resolved.
    #[must_use]
    pub const fn rect(&self) -> Option<PageRect> {
        match self {
            Self::Resolved(rect) => Some(*rect),
            Self::Unresolved => None,
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

impl From<Option<PageRect>> for TargetState {
    fn from(rect: Option<PageRect>) -> Self {
        rect.map_or(Self::Unresolved, Self::Resolved)
    }
}

/// Result of one locator pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub target: TargetState,
    /// Whether a scroll-into-view was requested this pass.
    pub scroll_requested: bool,
}

/// Resolve `target_id` on `page`, requesting a scroll if it is not fully
/// visible.
pub fn locate<P: Page + ?Sized>(page: &P, target_id: &str, scroll: ScrollIntoView) -> Resolution {
    let Some(rect) = page.bounding_rect(target_id) else {
        return Resolution {
            target: TargetState::Unresolved,
            scroll_requested: false,
        };
    };

    let viewport = page.viewport();
    let scroll_requested = !rect.fits_within(viewport);
    if scroll_requested {
        tracing::trace!(
            target_id,
            top = rect.top(),
            left = rect.left(),
            bottom = rect.bottom(),
            right = rect.right(),
            "target outside viewport; requesting scroll"
        );
        page.scroll_into_view(target_id, scroll);
    }

    Resolution {
        target: TargetState::Resolved(rect),
        scroll_requested,
    }
}
