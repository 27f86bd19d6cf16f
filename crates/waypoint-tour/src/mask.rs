#![forbid(unsafe_code)]

//! Spotlight mask geometry.
//!
//! # Invariants
//!
//! 1. The four panes never overlap the hole.
//! 2. The panes and the hole tile the viewport: no gaps, and no pixel is
//!    darkened twice at the hole's edges.
//! 3. Top and bottom span the full width; left and right span exactly the
//!    hole's vertical extent.
//!
//! Targets that are partly or fully outside the viewport are not clamped.
//! The formulas are applied as-is, so panes can come out with zero or
//! negative extents; those are [`PageRect::is_empty`] and presenters skip
//! them.

use waypoint_core::{PageRect, Sides, Viewport};

/// The four opaque rectangles around the hole.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MaskPanes {
    pub top: PageRect,
    pub bottom: PageRect,
    pub left: PageRect,
    pub right: PageRect,
}

impl MaskPanes {
    /// Solve the panes for a hole at `target` in `viewport`.
    #[must_use]
    pub fn solve(target: PageRect, viewport: Viewport) -> Self {
        let (w, h) = (viewport.width, viewport.height);
        Self {
            top: PageRect::new(0.0, 0.0, w, target.top()),
            bottom: PageRect::new(0.0, target.bottom(), w, h - target.bottom()),
            left: PageRect::new(0.0, target.top(), target.left(), target.height),
            right: PageRect::new(
                target.right(),
                target.top(),
                w - target.right(),
                target.height,
            ),
        }
    }

    /// Panes in paint order: top, bottom, left, right.
    pub fn iter(&self) -> impl Iterator<Item = PageRect> {
        [self.top, self.bottom, self.left, self.right].into_iter()
    }

    /// Panes with positive area, in paint order.
    pub fn visible(&self) -> impl Iterator<Item = PageRect> {
        self.iter().filter(|pane| !pane.is_empty())
    }

    /// Number of panes that contain `(x, y)`. At most one for a target
    /// inside the viewport.
    #[must_use]
    pub fn coverage(&self, x: f64, y: f64) -> usize {
        self.visible().filter(|pane| pane.contains(x, y)).count()
    }

    /// Whether `(x, y)` is darkened.
    #[must_use]
    pub fn covers(&self, x: f64, y: f64) -> bool {
        self.coverage(x, y) > 0
    }

    /// Total darkened area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.iter().map(|pane| pane.area()).sum()
    }
}

/// Highlight outline: the target grown by `inset` on every side.
///
/// Purely decorative; nothing depends on its geometry.
#[must_use]
pub fn outline(target: PageRect, inset: f64) -> PageRect {
    target.outset(Sides::all(inset))
}
