// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adaptive quadtree over AABBs with caller payloads.

use alloc::boxed::Box;
use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::types::{Aabb2D, Scalar};

/// An AABB together with the payload that identifies its owner.
pub type Entry<T, P> = (Aabb2D<T>, P);

/// Mutable, adaptively splitting quadtree.
///
/// Each node holds the entries that do not fit entirely within one of its
/// quadrants. A node splits into four equal quadrants the first time it holds
/// more than `max_objects` entries while its level is below `max_levels`;
/// entries are never moved back up and nodes are never merged.
///
/// Quadrants are numbered `0` (max x, min y), `1` (min x, min y),
/// `2` (min x, max y) and `3` (max x, max y). A box belongs to a quadrant only
/// when it lies strictly on one side of both midlines; a box touching or
/// straddling a midline stays at the node.
///
/// Boxes outside the root bounds are accepted and are routed by the same
/// midline rule, so queries remain conservative for them too.
///
/// ## Example
///
/// ```rust
/// use sprawl_index::{Aabb2D, Quadtree};
///
/// let mut tree = Quadtree::new(Aabb2D::new(0.0, 0.0, 100.0, 100.0), 1, 4);
/// tree.insert(Aabb2D::new(10.0, 10.0, 20.0, 20.0), 'a');
/// tree.insert(Aabb2D::new(60.0, 60.0, 70.0, 70.0), 'b');
///
/// // The query only reaches the bottom-right quadrant.
/// let found: Vec<char> = tree
///     .retrieve(&Aabb2D::new(65.0, 65.0, 66.0, 66.0))
///     .into_iter()
///     .map(|(_, payload)| payload)
///     .collect();
/// assert_eq!(found, vec!['b']);
/// ```
#[derive(Clone, Debug)]
pub struct Quadtree<T: Scalar, P: Copy> {
    bounds: Aabb2D<T>,
    max_objects: usize,
    max_levels: u32,
    level: u32,
    entries: SmallVec<[Entry<T, P>; 8]>,
    children: Option<Box<[Self; 4]>>,
}

impl<T: Scalar, P: Copy> Quadtree<T, P> {
    /// Create an empty root node covering `bounds`.
    pub fn new(bounds: Aabb2D<T>, max_objects: usize, max_levels: u32) -> Self {
        Self::with_level(bounds, max_objects, max_levels, 0)
    }

    fn with_level(bounds: Aabb2D<T>, max_objects: usize, max_levels: u32, level: u32) -> Self {
        Self {
            bounds,
            max_objects,
            max_levels,
            level,
            entries: SmallVec::new(),
            children: None,
        }
    }

    /// The region covered by this node.
    pub fn bounds(&self) -> Aabb2D<T> {
        self.bounds
    }

    /// Depth of this node below the root.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Whether this node has been split into quadrants.
    pub fn is_split(&self) -> bool {
        self.children.is_some()
    }

    /// Number of entries held directly by this node.
    pub fn direct_len(&self) -> usize {
        self.entries.len()
    }

    /// Total number of entries in this node and all descendants.
    pub fn len(&self) -> usize {
        self.entries.len()
            + self
                .children
                .as_ref()
                .map_or(0, |children| children.iter().map(Self::len).sum())
    }

    /// Whether no entry is stored anywhere in this subtree.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deepest split level reached below this node, relative to the root.
    pub fn depth(&self) -> u32 {
        self.children.as_ref().map_or(self.level, |children| {
            children.iter().map(Self::depth).max().unwrap_or(self.level)
        })
    }

    /// Index of the quadrant that fully holds `aabb`, if any.
    pub fn quadrant(&self, aabb: &Aabb2D<T>) -> Option<usize> {
        let (vertical, horizontal) = self.bounds.midpoint();
        let top = aabb.min_y < horizontal && aabb.max_y < horizontal;
        let bottom = aabb.min_y > horizontal;
        if aabb.min_x < vertical && aabb.max_x < vertical {
            if top {
                Some(1)
            } else if bottom {
                Some(2)
            } else {
                None
            }
        } else if aabb.min_x > vertical {
            if top {
                Some(0)
            } else if bottom {
                Some(3)
            } else {
                None
            }
        } else {
            None
        }
    }

    fn split(&mut self) {
        let (vx, hy) = self.bounds.midpoint();
        let b = self.bounds;
        let next = self.level + 1;
        let child = |bounds| Self::with_level(bounds, self.max_objects, self.max_levels, next);
        self.children = Some(Box::new([
            child(Aabb2D::new(vx, b.min_y, b.max_x, hy)),
            child(Aabb2D::new(b.min_x, b.min_y, vx, hy)),
            child(Aabb2D::new(b.min_x, hy, vx, b.max_y)),
            child(Aabb2D::new(vx, hy, b.max_x, b.max_y)),
        ]));
    }

    /// Insert an AABB with its owner payload.
    pub fn insert(&mut self, aabb: Aabb2D<T>, payload: P) {
        let quadrant = self.quadrant(&aabb);
        if let (Some(children), Some(q)) = (self.children.as_mut(), quadrant) {
            children[q].insert(aabb, payload);
            return;
        }

        self.entries.push((aabb, payload));

        if self.entries.len() > self.max_objects && self.level < self.max_levels {
            if self.children.is_none() {
                self.split();
            }
            let mut i = 0;
            while i < self.entries.len() {
                match self.quadrant(&self.entries[i].0) {
                    Some(q) => {
                        let (aabb, payload) = self.entries.remove(i);
                        if let Some(children) = self.children.as_mut() {
                            children[q].insert(aabb, payload);
                        }
                    }
                    None => i += 1,
                }
            }
        }
    }

    /// Visit every entry whose node could overlap `query`.
    ///
    /// This is a broad-phase query: it may report entries that do not overlap
    /// `query` at all, but never omits one that does.
    pub fn visit<F: FnMut(&Aabb2D<T>, P)>(&self, query: &Aabb2D<T>, mut f: F) {
        self.visit_inner(query, &mut f);
    }

    fn visit_inner<F: FnMut(&Aabb2D<T>, P)>(&self, query: &Aabb2D<T>, f: &mut F) {
        for (aabb, payload) in &self.entries {
            f(aabb, *payload);
        }
        let Some(children) = self.children.as_ref() else {
            return;
        };
        match self.quadrant(query) {
            Some(q) => children[q].visit_inner(query, f),
            None => {
                for child in children.iter() {
                    child.visit_inner(query, f);
                }
            }
        }
    }

    /// Collect the candidate entries for `query`; see [`Quadtree::visit`].
    pub fn retrieve(&self, query: &Aabb2D<T>) -> Vec<Entry<T, P>> {
        let mut out = Vec::new();
        self.visit(query, |aabb, payload| out.push((*aabb, payload)));
        out
    }

    /// Remove every entry and collapse back to a single empty node.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                child.clear();
            }
        }
        self.children = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn world() -> Quadtree<f64, u32> {
        Quadtree::new(Aabb2D::new(0.0, 0.0, 100.0, 100.0), 2, 4)
    }

    #[test]
    fn quadrant_indexing_and_midline_tie_break() {
        let tree = world();
        assert_eq!(tree.quadrant(&Aabb2D::new(60.0, 10.0, 70.0, 20.0)), Some(0));
        assert_eq!(tree.quadrant(&Aabb2D::new(10.0, 10.0, 20.0, 20.0)), Some(1));
        assert_eq!(tree.quadrant(&Aabb2D::new(10.0, 60.0, 20.0, 70.0)), Some(2));
        assert_eq!(tree.quadrant(&Aabb2D::new(60.0, 60.0, 70.0, 70.0)), Some(3));
        // Straddling or touching a midline fits no quadrant.
        assert_eq!(tree.quadrant(&Aabb2D::new(40.0, 10.0, 60.0, 20.0)), None);
        assert_eq!(tree.quadrant(&Aabb2D::new(10.0, 40.0, 20.0, 60.0)), None);
        assert_eq!(tree.quadrant(&Aabb2D::new(50.0, 10.0, 60.0, 20.0)), None);
    }

    #[test]
    fn splits_on_overflow_and_keeps_straddlers() {
        let mut tree = world();
        tree.insert(Aabb2D::new(10.0, 10.0, 20.0, 20.0), 0);
        tree.insert(Aabb2D::new(60.0, 60.0, 70.0, 70.0), 1);
        assert!(!tree.is_split(), "no split before exceeding max_objects");
        tree.insert(Aabb2D::new(45.0, 45.0, 55.0, 55.0), 2);
        assert!(tree.is_split(), "third entry must trigger a split");
        assert_eq!(tree.direct_len(), 1, "only the straddling box stays at the root");
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn respects_max_levels() {
        let mut tree: Quadtree<f64, u32> =
            Quadtree::new(Aabb2D::new(0.0, 0.0, 100.0, 100.0), 1, 0);
        for i in 0..5 {
            let x = f64::from(i);
            tree.insert(Aabb2D::new(x, x, x + 1.0, x + 1.0), i);
        }
        assert!(!tree.is_split());
        assert_eq!(tree.direct_len(), 5);
    }

    #[test]
    fn retrieve_descends_single_quadrant() {
        let mut tree = world();
        tree.insert(Aabb2D::new(10.0, 10.0, 20.0, 20.0), 0);
        tree.insert(Aabb2D::new(60.0, 60.0, 70.0, 70.0), 1);
        tree.insert(Aabb2D::new(60.0, 10.0, 70.0, 20.0), 2);

        let hits: Vec<u32> = tree
            .retrieve(&Aabb2D::new(12.0, 12.0, 14.0, 14.0))
            .into_iter()
            .map(|(_, p)| p)
            .collect();
        assert_eq!(hits, vec![0]);

        // A straddling query checks every child.
        let mut all: Vec<u32> = tree
            .retrieve(&Aabb2D::new(40.0, 40.0, 60.0, 60.0))
            .into_iter()
            .map(|(_, p)| p)
            .collect();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2]);
    }

    #[test]
    fn retrieve_never_omits_true_overlaps() {
        let mut tree: Quadtree<f64, usize> =
            Quadtree::new(Aabb2D::new(-64.0, -64.0, 64.0, 64.0), 3, 6);
        let mut boxes = Vec::new();
        // Deterministic scatter including boxes outside the root bounds.
        let mut seed = 17_u64;
        let mut next = move || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            #[allow(clippy::cast_precision_loss, reason = "test coordinates only")]
            let v = (seed >> 33) as f64 / f64::from(1_u32 << 31);
            v * 160.0 - 80.0
        };
        for i in 0..200 {
            let (x, y) = (next(), next());
            let (w, h) = (next().abs() * 0.1, next().abs() * 0.1);
            let aabb = Aabb2D::new(x, y, x + w, y + h);
            boxes.push(aabb);
            tree.insert(aabb, i);
        }
        assert_eq!(tree.len(), boxes.len());

        for _ in 0..100 {
            let (x, y) = (next(), next());
            let (w, h) = (next().abs() * 0.2, next().abs() * 0.2);
            let query = Aabb2D::new(x, y, x + w, y + h);
            let found: Vec<usize> = tree.retrieve(&query).into_iter().map(|(_, p)| p).collect();
            for (i, aabb) in boxes.iter().enumerate() {
                if aabb.overlaps(&query) {
                    assert!(found.contains(&i), "entry {i} overlaps {query:?} but was omitted");
                }
            }
        }
    }

    #[test]
    fn clear_resets_to_empty_leaf() {
        let mut tree = world();
        for i in 0..10 {
            let x = f64::from(i) * 9.0;
            tree.insert(Aabb2D::new(x, x, x + 1.0, x + 1.0), i);
        }
        assert!(tree.is_split());
        tree.clear();
        assert!(!tree.is_split());
        assert!(tree.is_empty());
        assert_eq!(tree.level(), 0);
        assert_eq!(tree.bounds(), Aabb2D::new(0.0, 0.0, 100.0, 100.0));
    }
}
