#![forbid(unsafe_code)]

//! Geometric primitives.

/// An axis-aligned rectangle in viewport coordinates.
///
/// Uses CSS pixel coordinates (origin at the viewport's top-left). Extents
/// are signed: a rectangle derived from a target that has scrolled out of
/// view can have negative edges, and solver outputs can have zero or
/// negative width/height. Such rectangles are [`is_empty`](Self::is_empty).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl PageRect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from its four edges.
    #[inline]
    pub fn from_edges(top: f64, left: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Left edge (alias for x).
    #[inline]
    pub const fn left(&self) -> f64 {
        self.x
    }

    /// Top edge (alias for y).
    #[inline]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Area in square pixels. Zero for empty rectangles.
    #[inline]
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width * self.height
        }
    }

    /// Check if the rectangle has no positive area.
    ///
    /// NaN extents count as empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Check if a point is inside the rectangle (right/bottom exclusive).
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Grow the rectangle outward by `sides`.
    pub fn outset(&self, sides: Sides) -> PageRect {
        PageRect {
            x: self.x - sides.left,
            y: self.y - sides.top,
            width: self.width + sides.horizontal_sum(),
            height: self.height + sides.vertical_sum(),
        }
    }

    /// Compute the intersection with another rectangle, returning `None` if
    /// there is no overlap with positive area.
    pub fn intersection_opt(&self, other: &PageRect) -> Option<PageRect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(PageRect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Whether every edge lies within `viewport`.
    ///
    /// `top >= 0`, `left >= 0`, `bottom <= height`, `right <= width`.
    pub fn fits_within(&self, viewport: Viewport) -> bool {
        self.top() >= 0.0
            && self.left() >= 0.0
            && self.bottom() <= viewport.height
            && self.right() <= viewport.width
    }

    /// Translate by `(dx, dy)`.
    #[inline]
    pub fn offset(&self, dx: f64, dy: f64) -> PageRect {
        PageRect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Create a new viewport.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The viewport as a rectangle anchored at the origin.
    #[inline]
    pub const fn bounds(&self) -> PageRect {
        PageRect::new(0.0, 0.0, self.width, self.height)
    }

    /// Area in square pixels.
    #[inline]
    pub fn area(&self) -> f64 {
        self.bounds().area()
    }
}

/// Sides for insets and outsets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sides {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Sides {
    /// Create new sides with equal values.
    pub const fn all(val: f64) -> Self {
        Self {
            top: val,
            right: val,
            bottom: val,
            left: val,
        }
    }

    /// Sum of left and right.
    #[inline]
    pub fn horizontal_sum(&self) -> f64 {
        self.left + self.right
    }

    /// Sum of top and bottom.
    #[inline]
    pub fn vertical_sum(&self) -> f64 {
        self.top + self.bottom
    }
}
