use arrayvec::ArrayVec;
use slab::Slab;

use crate::{
    quadrant::{Quadrant, QuadrantId, ROOT},
    Element, ItemId, Rect, MAX_DEPTH,
};

/// Iterator over items whose bounds intersect a [`Rect`]
///
/// Returned by [`QuadTree::nodes_inside`](crate::QuadTree::nodes_inside).
pub struct NodesInside<'a, T> {
    bounds: Rect,
    quadrants: &'a [Quadrant],
    elements: &'a Slab<Element<T>>,
    // One entry per level, holding the next child slot to visit, so the stack never grows past
    // the depth of the tree.
    stack: ArrayVec<(QuadrantId, usize), MAX_DEPTH>,
    next_element: ElementIter,
}

impl<'a, T> NodesInside<'a, T> {
    pub(crate) fn new(
        bounds: Rect,
        quadrants: &'a [Quadrant],
        elements: &'a Slab<Element<T>>,
    ) -> Self {
        let mut out = Self {
            bounds,
            quadrants,
            elements,
            stack: ArrayVec::new(),
            next_element: ElementIter::default(),
        };

        // Skip traversal if there's no area to search
        if bounds.is_empty() {
            return out;
        }

        // The root is visited unconditionally, since it also holds items lying outside the
        // tree's bounds
        if let Some(root) = quadrants.get(ROOT) {
            out.stack.push((ROOT, 0));
            out.next_element = ElementIter::new(root.first_element);
        }
        out
    }
}

impl<'a, T> Iterator for NodesInside<'a, T> {
    type Item = (ItemId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // Scan the current quadrant's own elements
            while let Some(index) = self.next_element.next(self.elements) {
                let elt = &self.elements[index];
                if elt.bounds.intersects(&self.bounds) {
                    let id = ItemId {
                        index,
                        generation: elt.generation,
                    };
                    return Some((id, &elt.value));
                }
            }
            // Move on to the next overlapping child of the innermost unfinished quadrant
            let (parent, slot) = self.stack.last_mut()?;
            let Some(&child) = self.quadrants[*parent].children.get(*slot) else {
                self.stack.pop();
                continue;
            };
            *slot += 1;
            let Some(child) = child else {
                continue;
            };
            let quadrant = &self.quadrants[child];
            if !quadrant.bounds.intersects(&self.bounds) {
                continue;
            }
            self.stack.push((child, 0));
            self.next_element = ElementIter::new(quadrant.first_element);
        }
    }
}

/// Cursor over one quadrant's element list
#[derive(Default)]
struct ElementIter {
    next: Option<usize>,
}

impl ElementIter {
    fn new(next: Option<usize>) -> Self {
        Self { next }
    }

    fn next<T>(&mut self, elements: &Slab<Element<T>>) -> Option<usize> {
        let i = self.next?;
        self.next = elements[i].next;
        Some(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QuadTree;

    #[test]
    fn visits_only_overlapping_quadrants() {
        let mut t = QuadTree::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        for (i, (x, y)) in [(1.0, 1.0), (60.0, 1.0), (1.0, 60.0), (60.0, 60.0)]
            .into_iter()
            .enumerate()
        {
            t.insert(Rect::new(x, y, 5.0, 5.0), i).unwrap();
        }
        let found: alloc::vec::Vec<usize> = t
            .nodes_inside(Rect::new(55.0, 55.0, 40.0, 40.0))
            .map(|(_, &i)| i)
            .collect();
        assert_eq!(found, [3]);
    }

    #[test]
    fn empty_tree_yields_nothing() {
        let t = QuadTree::<()>::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(t.nodes_inside(Rect::new(0.0, 0.0, 100.0, 100.0)).count(), 0);
    }

    #[test]
    fn empty_query_yields_nothing() {
        let mut t = QuadTree::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        t.insert(Rect::new(0.0, 0.0, 100.0, 100.0), ()).unwrap();
        assert_eq!(t.nodes_inside(Rect::EMPTY).count(), 0);
        assert_eq!(t.nodes_inside(Rect::new(0.0, 0.0, 10.0, 10.0)).count(), 1);
    }

    #[test]
    fn deep_stack_does_not_overflow() {
        let mut t = QuadTree::with_min_extent(Rect::new(0.0, 0.0, 1.0, 1.0), 0.0);
        let b = Rect::new(0.0, 0.0, 1e-300, 1e-300);
        t.insert(b, ()).unwrap();
        assert_eq!(t.nodes_inside(b).count(), 1);
    }
}
