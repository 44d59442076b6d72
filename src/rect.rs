use core::fmt;

/// An axis-aligned rectangle in canvas space
///
/// `x`/`y` locate the top-left corner; `y` grows downwards. Edges are inclusive, so
/// rectangles that merely touch are considered to intersect.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// The rectangle covering nothing at all. Contains and intersects nothing.
    pub const EMPTY: Self = Self {
        x: f64::INFINITY,
        y: f64::INFINITY,
        width: f64::NEG_INFINITY,
        height: f64::NEG_INFINITY,
    };

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether this rectangle covers no area to search, e.g. [`Rect::EMPTY`]
    ///
    /// Zero-sized rectangles are *not* empty: they still describe a point or a line.
    pub fn is_empty(&self) -> bool {
        !(self.width >= 0.0 && self.height >= 0.0)
    }

    /// Whether this rectangle lacks a positive extent on either axis, and so cannot be
    /// spatially partitioned
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Whether `other` lies entirely inside this rectangle
    pub fn contains(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    /// Whether this rectangle and `other` overlap at all
    pub fn intersects(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        other.left() <= self.right()
            && other.right() >= self.left()
            && other.top() <= self.bottom()
            && other.bottom() >= self.top()
    }

    /// Split into top-left, top-right, bottom-left and bottom-right quarters
    ///
    /// Quarters are never narrower or shorter than `min_extent`, so below that size they
    /// overhang the right and bottom edges rather than shrinking further.
    pub(crate) fn quarters(&self, min_extent: f64) -> [Self; 4] {
        let w = (self.width / 2.0).max(min_extent);
        let h = (self.height / 2.0).max(min_extent);
        [
            Self::new(self.x, self.y, w, h),
            Self::new(self.x + w, self.y, w, h),
            Self::new(self.x, self.y + h, w, h),
            Self::new(self.x + w, self.y + h, w, h),
        ]
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Empty");
        }
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}
