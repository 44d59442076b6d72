//! A quad-tree spatial index for hit-testing and visibility queries over a 2D canvas
//!
//! Items are stored in the smallest quadrant that fully contains their bounding rectangle, and
//! found again by any query rectangle they intersect.

#![no_std]

extern crate alloc;

mod error;
mod quadrant;
mod rect;
mod traversal;

use alloc::vec::Vec;

use log::{debug, trace};
use slab::Slab;

pub use error::Error;
use quadrant::{find_owner, link, unlink, Quadrant, QuadrantId};
pub use rect::Rect;
pub use traversal::NodesInside;

/// A 2D spatial index over caller-supplied bounding rectangles
///
/// Quadrants are created lazily as items are inserted, and are only discarded by [`clear`] or when
/// the tree's bounds change.
///
/// [`clear`]: QuadTree::clear
#[derive(Debug)]
pub struct QuadTree<T> {
    bounds: Rect,
    /// Quadrants never shrink below this extent on either axis
    min_extent: f64,
    /// Arena of quadrants; the root, if any, is at `ROOT`
    quadrants: Vec<Quadrant>,
    elements: Slab<Element<T>>,
    /// Generation assigned to the most recently inserted element
    generation: u64,
}

impl<T> QuadTree<T> {
    /// Create an empty tree indexing `bounds`
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// Create an empty tree with a custom minimum subdivision size
    ///
    /// Quadrants smaller than `min_extent` on either axis are not subdivided further, so items
    /// much smaller than this share a quadrant list instead of descending indefinitely. Should
    /// be positive. The default is 1.0, i.e. one pixel for a canvas in device-independent units.
    pub fn with_min_extent(bounds: Rect, min_extent: f64) -> Self {
        Self {
            bounds,
            min_extent,
            ..Self::default()
        }
    }

    /// The area this tree is partitioned over
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Change the area this tree is partitioned over, rebuilding it from scratch
    ///
    /// Every stored item keeps its [`ItemId`]. Fails without modifying the tree if `bounds` is
    /// degenerate while items are stored.
    pub fn set_bounds(&mut self, bounds: Rect) -> Result<(), Error> {
        if bounds.is_degenerate() && !self.elements.is_empty() {
            debug!("refusing to reindex {} items into {}", self.elements.len(), bounds);
            return Err(Error::DegenerateTreeBounds(bounds));
        }
        self.bounds = bounds;
        self.reindex();
        Ok(())
    }

    /// Insert `value` with the given bounding rectangle, returning an ID that can be used to
    /// access or remove it
    pub fn insert(&mut self, bounds: Rect, value: T) -> Result<ItemId, Error> {
        if self.bounds.is_degenerate() {
            debug!("cannot insert into tree with bounds {}", self.bounds);
            return Err(Error::DegenerateTreeBounds(self.bounds));
        }
        if bounds.is_degenerate() {
            debug!("rejected insert with bounds {}", bounds);
            return Err(Error::DegenerateBounds(bounds));
        }
        if self.quadrants.is_empty() {
            self.quadrants.push(Quadrant::new(self.bounds));
        }

        let quadrant = find_owner(&mut self.quadrants, self.min_extent, &bounds);
        self.generation = self.generation.wrapping_add(1);
        let index = self.elements.insert(Element {
            value,
            bounds,
            quadrant,
            generation: self.generation,
            next: None,
        });
        link(&mut self.elements, &mut self.quadrants[quadrant], index);
        trace!("inserted {} into quadrant {}", bounds, quadrant);

        Ok(ItemId {
            index,
            generation: self.generation,
        })
    }

    /// Remove the item associated with `id`, returning whether it was present
    pub fn remove(&mut self, id: ItemId) -> bool {
        self.take(id).is_some()
    }

    /// Remove and return the item associated with `id`
    pub fn take(&mut self, id: ItemId) -> Option<T> {
        let quadrant = self.lookup(id)?.quadrant;
        unlink(&mut self.elements, &mut self.quadrants[quadrant], id.index);
        trace!("removed item {} from quadrant {}", id.index, quadrant);
        Some(self.elements.remove(id.index).value)
    }

    /// Move the item associated with `id` to `bounds`, keeping its ID
    ///
    /// Returns `Ok(false)` if there is no such item.
    pub fn update_bounds(&mut self, id: ItemId, bounds: Rect) -> Result<bool, Error> {
        if bounds.is_degenerate() {
            debug!("rejected move to bounds {}", bounds);
            return Err(Error::DegenerateBounds(bounds));
        }
        let Some(old) = self.lookup(id).map(|elt| elt.quadrant) else {
            return Ok(false);
        };
        // Insertion succeeded once, so the tree has a root with usable bounds
        unlink(&mut self.elements, &mut self.quadrants[old], id.index);
        let quadrant = find_owner(&mut self.quadrants, self.min_extent, &bounds);
        let elt = &mut self.elements[id.index];
        elt.bounds = bounds;
        elt.quadrant = quadrant;
        link(&mut self.elements, &mut self.quadrants[quadrant], id.index);
        trace!("moved item {} from quadrant {} to {}", id.index, old, quadrant);
        Ok(true)
    }

    /// Borrow the item associated with `id`
    pub fn get(&self, id: ItemId) -> Option<&T> {
        self.lookup(id).map(|elt| &elt.value)
    }

    /// Uniquely borrow the item associated with `id`
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut T> {
        match self.elements.get_mut(id.index) {
            Some(elt) if elt.generation == id.generation => Some(&mut elt.value),
            _ => None,
        }
    }

    /// The bounding rectangle the item associated with `id` was indexed with
    pub fn item_bounds(&self, id: ItemId) -> Option<Rect> {
        self.lookup(id).map(|elt| elt.bounds)
    }

    /// Traverse all items whose bounds intersect `bounds`, in no particular order
    pub fn nodes_inside(&self, bounds: Rect) -> NodesInside<'_, T> {
        NodesInside::new(bounds, &self.quadrants, &self.elements)
    }

    /// Whether any item's bounds intersect `bounds`
    pub fn has_nodes_inside(&self, bounds: Rect) -> bool {
        if self.elements.is_empty() {
            return false;
        }
        self.nodes_inside(bounds).next().is_some()
    }

    /// Traverse every stored item, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &T)> + '_ {
        self.elements.iter().map(|(index, elt)| {
            let id = ItemId {
                index,
                generation: elt.generation,
            };
            (id, &elt.value)
        })
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Remove every item and quadrant, keeping the tree's bounds
    pub fn clear(&mut self) {
        self.quadrants.clear();
        self.elements.clear();
    }

    fn lookup(&self, id: ItemId) -> Option<&Element<T>> {
        self.elements
            .get(id.index)
            .filter(|elt| elt.generation == id.generation)
    }

    /// Discard every quadrant and relink all elements into a fresh tree over `self.bounds`
    fn reindex(&mut self) {
        self.quadrants.clear();
        if self.elements.is_empty() {
            return;
        }
        debug!("reindexing {} items into {}", self.elements.len(), self.bounds);
        self.quadrants.push(Quadrant::new(self.bounds));
        for (index, elt) in self.elements.iter_mut() {
            let quadrant = find_owner(&mut self.quadrants, self.min_extent, &elt.bounds);
            elt.quadrant = quadrant;
            elt.next = self.quadrants[quadrant].push(index);
        }
    }
}

impl<T> Default for QuadTree<T> {
    fn default() -> Self {
        Self {
            bounds: Rect::EMPTY,
            min_extent: 1.0,
            quadrants: Vec::new(),
            elements: Slab::new(),
            generation: 0,
        }
    }
}

/// Identifies an item stored in a [`QuadTree`]
///
/// IDs are never reused: once an item is removed, its ID matches nothing, even if a later item
/// takes over the same storage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ItemId {
    index: usize,
    generation: u64,
}

#[derive(Debug)]
struct Element<T> {
    value: T,
    bounds: Rect,
    /// Quadrant whose list this element is linked into
    quadrant: QuadrantId,
    generation: u64,
    next: Option<usize>,
}

/// Depth beyond which quadrants are never subdivided, bounding both insertion and the
/// traversal stack
const MAX_DEPTH: usize = 64;
