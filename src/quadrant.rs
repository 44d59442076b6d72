use alloc::vec::Vec;

use slab::Slab;

use crate::{Element, Rect, MAX_DEPTH};

/// Index of a [`Quadrant`] in its tree's arena
pub(crate) type QuadrantId = usize;

/// Arena index of the root quadrant
pub(crate) const ROOT: QuadrantId = 0;

/// A node of the spatial partition, covering a quarter of its parent
#[derive(Debug)]
pub(crate) struct Quadrant {
    pub bounds: Rect,
    /// Top left, top right, bottom left, bottom right
    pub children: [Option<QuadrantId>; 4],
    /// Head of the list of elements that no single child fully contains
    pub first_element: Option<usize>,
}

impl Quadrant {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            children: [None; 4],
            first_element: None,
        }
    }

    /// Make `element` the head of this quadrant's list, returning the previous head
    pub fn push(&mut self, element: usize) -> Option<usize> {
        self.first_element.replace(element)
    }
}

/// Find the smallest quadrant that fully contains `bounds`, creating quadrants along the way
///
/// `quadrants` must already hold a root. Descent stops where no quarter fully contains
/// `bounds`, where a quarter can't shrink any further, or at `MAX_DEPTH`.
pub(crate) fn find_owner(
    quadrants: &mut Vec<Quadrant>,
    min_extent: f64,
    bounds: &Rect,
) -> QuadrantId {
    let mut current = ROOT;
    for _ in 1..MAX_DEPTH {
        let parent = &quadrants[current];
        let quarters = parent.bounds.quarters(min_extent);
        let Some(index) = quarters.iter().position(|q| q.contains(bounds)) else {
            break;
        };
        if quarters[index] == parent.bounds {
            // Clamped to `min_extent`
            break;
        }
        let existing = parent.children[index];
        current = match existing {
            Some(child) => child,
            None => {
                let child = quadrants.len();
                quadrants.push(Quadrant::new(quarters[index]));
                quadrants[current].children[index] = Some(child);
                child
            }
        };
    }
    current
}

/// Add `element` to `quadrant`
pub(crate) fn link<T>(elements: &mut Slab<Element<T>>, quadrant: &mut Quadrant, element: usize) {
    elements[element].next = quadrant.push(element);
}

/// Remove `element` from `quadrant`, returning whether it was found there
pub(crate) fn unlink<T>(
    elements: &mut Slab<Element<T>>,
    quadrant: &mut Quadrant,
    element: usize,
) -> bool {
    let successor = elements[element].next;
    let mut link = &mut quadrant.first_element;
    loop {
        let Some(i) = *link else {
            return false;
        };
        if i == element {
            *link = successor;
            break;
        }
        link = &mut elements[i].next;
    }
    elements[element].next = None;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn element(bounds: Rect) -> Element<()> {
        Element {
            value: (),
            bounds,
            quadrant: ROOT,
            generation: 0,
            next: None,
        }
    }

    #[test]
    fn children_created_lazily() {
        let mut quadrants = vec![Quadrant::new(Rect::new(0.0, 0.0, 100.0, 100.0))];
        let owner = find_owner(&mut quadrants, 1.0, &Rect::new(0.0, 0.0, 10.0, 10.0));
        // 100 -> 50 -> 25 -> 12.5; a 10x10 square at the origin fits in all of them
        assert_eq!(quadrants.len(), 4);
        assert_eq!(owner, 3);
        assert_eq!(quadrants[owner].bounds, Rect::new(0.0, 0.0, 12.5, 12.5));
        assert_eq!(quadrants[ROOT].children, [Some(1), None, None, None]);

        // Reuses the existing path
        let again = find_owner(&mut quadrants, 1.0, &Rect::new(1.0, 1.0, 2.0, 2.0));
        assert!(again > owner);
        assert_eq!(quadrants[1].children[0], Some(2));
        assert_eq!(quadrants[2].children[0], Some(3));
    }

    #[test]
    fn straddling_stays_in_parent() {
        let mut quadrants = vec![Quadrant::new(Rect::new(0.0, 0.0, 100.0, 100.0))];
        let owner = find_owner(&mut quadrants, 1.0, &Rect::new(45.0, 45.0, 10.0, 10.0));
        assert_eq!(owner, ROOT);
        assert_eq!(quadrants.len(), 1);
    }

    #[test]
    fn bottom_right_descent() {
        let mut quadrants = vec![Quadrant::new(Rect::new(0.0, 0.0, 100.0, 100.0))];
        let owner = find_owner(&mut quadrants, 1.0, &Rect::new(50.0, 50.0, 50.0, 50.0));
        assert_eq!(quadrants[owner].bounds, Rect::new(50.0, 50.0, 50.0, 50.0));
        assert_eq!(quadrants[ROOT].children[3], Some(owner));
    }

    #[test]
    fn tiny_bounds_terminate() {
        let mut quadrants = vec![Quadrant::new(Rect::new(0.0, 0.0, 4.0, 4.0))];
        let owner = find_owner(&mut quadrants, 1.0, &Rect::new(0.1, 0.1, 0.01, 0.01));
        assert_eq!(quadrants[owner].bounds, Rect::new(0.0, 0.0, 1.0, 1.0));

        let mut quadrants = vec![Quadrant::new(Rect::new(0.0, 0.0, 1.0, 1.0))];
        let owner = find_owner(&mut quadrants, 0.0, &Rect::new(0.0, 0.0, 1e-300, 1e-300));
        assert!(quadrants.len() <= MAX_DEPTH);
        assert!(quadrants[owner].bounds.contains(&Rect::new(0.0, 0.0, 1e-300, 1e-300)));
    }

    #[test]
    fn unlink_head_and_interior() {
        let mut elements = Slab::new();
        let mut quadrant = Quadrant::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let ids: Vec<usize> = (0..3)
            .map(|_| elements.insert(element(Rect::new(0.0, 0.0, 1.0, 1.0))))
            .collect();
        for &id in &ids {
            link(&mut elements, &mut quadrant, id);
        }
        assert_eq!(quadrant.first_element, Some(ids[2]));

        // Interior
        assert!(unlink(&mut elements, &mut quadrant, ids[1]));
        assert!(!unlink(&mut elements, &mut quadrant, ids[1]));
        // Head
        assert!(unlink(&mut elements, &mut quadrant, ids[2]));
        assert_eq!(quadrant.first_element, Some(ids[0]));
        // Last one
        assert!(unlink(&mut elements, &mut quadrant, ids[0]));
        assert_eq!(quadrant.first_element, None);
    }
}
