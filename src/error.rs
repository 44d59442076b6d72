use thiserror::Error;

use crate::Rect;

/// Reasons a [`QuadTree`](crate::QuadTree) refuses to index an item
#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum Error {
    /// An item's bounding rectangle has no positive width or height
    #[error("bounds must be non-zero, got {0}")]
    DegenerateBounds(Rect),

    /// The tree's own bounds have no positive width or height
    #[error("tree bounds must be non-zero, got {0}")]
    DegenerateTreeBounds(Rect),
}
