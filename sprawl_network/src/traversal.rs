// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Depth-first walks over the growth tree.
//!
//! All walks follow `destinations` in pre-order, skip segments whose class is
//! not in the mask (without descending below them), and record every visited
//! segment in a caller-owned set. Sharing that set across several calls walks
//! a forest without repeating a segment.

use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::network::RoadNetwork;
use crate::segment::Segment;
use crate::types::{ClassMask, SegmentId};

/// Fetch `id` if it passes `mask` and has not been visited, marking it visited.
fn enter<'a>(
    network: &'a RoadNetwork,
    id: SegmentId,
    mask: ClassMask,
    visited: &mut HashSet<SegmentId>,
) -> Option<&'a Segment> {
    let segment = network.get(id)?;
    if !mask.admits(segment.class()) || !visited.insert(id) {
        return None;
    }
    Some(segment)
}

/// Visit `root` and its descendants in pre-order.
///
/// A visitor returning `false` prunes the subtree below the segment it was
/// called with.
pub fn pre_order<F>(
    network: &RoadNetwork,
    root: SegmentId,
    mask: ClassMask,
    visited: &mut HashSet<SegmentId>,
    mut visitor: F,
) where
    F: FnMut(&Segment) -> bool,
{
    let mut stack: Vec<SegmentId> = Vec::new();
    stack.push(root);
    while let Some(id) = stack.pop() {
        let Some(segment) = enter(network, id, mask, visited) else {
            continue;
        };
        if visitor(segment) {
            stack.extend(segment.destinations().iter().rev().copied());
        }
    }
}

/// Visit the growth edges below `root` in pre-order.
///
/// An inner segment is reported as `(parent, Some(segment))`, where the
/// parent is `None` for `root`. A segment without destinations is reported
/// as `(Some(leaf), None)`. Returning `false` prunes below the reported
/// segment.
pub fn pre_order_edges<F>(
    network: &RoadNetwork,
    root: SegmentId,
    mask: ClassMask,
    visited: &mut HashSet<SegmentId>,
    mut visitor: F,
) where
    F: FnMut(Option<&Segment>, Option<&Segment>) -> bool,
{
    let mut stack: Vec<(Option<SegmentId>, SegmentId)> = Vec::new();
    stack.push((None, root));
    while let Some((parent, id)) = stack.pop() {
        let Some(segment) = enter(network, id, mask, visited) else {
            continue;
        };
        if segment.destinations().is_empty() {
            visitor(Some(segment), None);
            continue;
        }
        let parent = parent.and_then(|p| network.get(p));
        if visitor(parent, Some(segment)) {
            stack.extend(segment.destinations().iter().rev().map(|&d| (Some(id), d)));
        }
    }
}

/// Visit `root` and its descendants in pre-order, threading a payload down
/// each growth edge.
///
/// The visitor receives the payload produced by the segment's parent (or
/// `seed` for `root`) and returns the payload handed to its children, or
/// `None` to prune below it.
pub fn pre_order_with<T, F>(
    network: &RoadNetwork,
    root: SegmentId,
    mask: ClassMask,
    visited: &mut HashSet<SegmentId>,
    seed: T,
    mut visitor: F,
) where
    T: Clone,
    F: FnMut(&Segment, &T) -> Option<T>,
{
    let mut stack: Vec<(SegmentId, T)> = Vec::new();
    stack.push((root, seed));
    while let Some((id, data)) = stack.pop() {
        let Some(segment) = enter(network, id, mask, visited) else {
            continue;
        };
        let Some(out) = visitor(segment, &data) else {
            continue;
        };
        stack.extend(
            segment
                .destinations()
                .iter()
                .rev()
                .map(|&d| (d, out.clone())),
        );
    }
}

/// [`pre_order_edges`] with a payload threaded down each growth edge.
///
/// Edges are reported as in [`pre_order_edges`], together with the payload
/// produced for the reported segment's parent (or `seed` for `root`). The
/// visitor returns the payload handed to the children, or `None` to prune.
/// The result of a leaf report is ignored.
pub fn pre_order_edges_with<T, F>(
    network: &RoadNetwork,
    root: SegmentId,
    mask: ClassMask,
    visited: &mut HashSet<SegmentId>,
    seed: T,
    mut visitor: F,
) where
    T: Clone,
    F: FnMut(Option<&Segment>, Option<&Segment>, &T) -> Option<T>,
{
    let mut stack: Vec<(Option<SegmentId>, SegmentId, T)> = Vec::new();
    stack.push((None, root, seed));
    while let Some((parent, id, data)) = stack.pop() {
        let Some(segment) = enter(network, id, mask, visited) else {
            continue;
        };
        if segment.destinations().is_empty() {
            visitor(Some(segment), None, &data);
            continue;
        }
        let parent = parent.and_then(|p| network.get(p));
        let Some(out) = visitor(parent, Some(segment), &data) else {
            continue;
        };
        stack.extend(
            segment
                .destinations()
                .iter()
                .rev()
                .map(|&d| (Some(id), d, out.clone())),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GrowthConfig;
    use crate::types::RoadClass;
    use kurbo::Point;

    /// 0 -> {1, 2}, 1 -> {3}; 2 is a street.
    fn tree() -> RoadNetwork {
        let mut net = RoadNetwork::from_config(&GrowthConfig::default());
        let at = |x: f64| Point::new(x, 0.0);
        for (i, class) in [
            RoadClass::Highway,
            RoadClass::Highway,
            RoadClass::Street,
            RoadClass::Highway,
        ]
        .into_iter()
        .enumerate()
        {
            let x = i as f64 * 100.0;
            net.insert(Segment::new(at(x), at(x + 100.0), class, 6.0));
        }
        for (parent, child) in [(0, 1), (0, 2), (1, 3)] {
            let (p, c) = (SegmentId::new(parent), SegmentId::new(child));
            if let Some(s) = net.get_mut(p) {
                s.destinations.push(c);
            }
            if let Some(s) = net.get_mut(c) {
                s.sources.push(p);
            }
        }
        net
    }

    fn ids(v: &[SegmentId]) -> Vec<usize> {
        v.iter().map(|id| id.index()).collect()
    }

    fn id_of(segment: &Segment) -> usize {
        segment.id().map_or(usize::MAX, SegmentId::index)
    }

    #[test]
    fn visits_in_pre_order() {
        let net = tree();
        let mut seen = Vec::new();
        pre_order(
            &net,
            SegmentId::new(0),
            ClassMask::all(),
            &mut HashSet::new(),
            |s| {
                seen.extend(s.id());
                true
            },
        );
        assert_eq!(ids(&seen), [0, 1, 3, 2]);
    }

    #[test]
    fn mask_and_pruning_stop_descent() {
        let net = tree();
        let mut seen = Vec::new();
        pre_order(
            &net,
            SegmentId::new(0),
            ClassMask::HIGHWAYS,
            &mut HashSet::new(),
            |s| {
                seen.extend(s.id());
                s.id() != Some(SegmentId::new(1))
            },
        );
        assert_eq!(ids(&seen), [0, 1], "street masked out, 3 pruned");

        let mut streets = Vec::new();
        pre_order(
            &net,
            SegmentId::new(0),
            ClassMask::STREETS,
            &mut HashSet::new(),
            |s| {
                streets.extend(s.id());
                true
            },
        );
        assert!(streets.is_empty(), "a masked-out root hides its subtree");
    }

    #[test]
    fn shared_visited_set_skips_repeats() {
        let net = tree();
        let mut visited = HashSet::new();
        let mut count = 0;
        for root in [1, 0] {
            pre_order(
                &net,
                SegmentId::new(root),
                ClassMask::all(),
                &mut visited,
                |_| {
                    count += 1;
                    true
                },
            );
        }
        assert_eq!(count, 4);
        assert_eq!(visited.len(), 4);
    }

    #[test]
    fn edges_report_leaves_alone() {
        let net = tree();
        let mut edges = Vec::new();
        pre_order_edges(
            &net,
            SegmentId::new(0),
            ClassMask::all(),
            &mut HashSet::new(),
            |a, b| {
                edges.push((a.map(id_of), b.map(id_of)));
                true
            },
        );
        assert_eq!(
            edges,
            [
                (None, Some(0)),
                (Some(0), Some(1)),
                (Some(3), None),
                (Some(2), None),
            ]
        );
    }

    #[test]
    fn payload_threads_along_edges() {
        let net = tree();
        let mut depths = Vec::new();
        pre_order_with(
            &net,
            SegmentId::new(0),
            ClassMask::all(),
            &mut HashSet::new(),
            0_u32,
            |s, depth| {
                depths.push((id_of(s), *depth));
                (s.class() == RoadClass::Highway).then_some(depth + 1)
            },
        );
        assert_eq!(depths, [(0, 0), (1, 1), (3, 2), (2, 1)]);

        let mut seen = 0;
        pre_order_with(
            &net,
            SegmentId::new(0),
            ClassMask::all(),
            &mut HashSet::new(),
            (),
            |_, _| {
                seen += 1;
                None
            },
        );
        assert_eq!(seen, 1, "None prunes below the root");
    }

    #[test]
    fn edges_carry_payload() {
        let net = tree();
        let mut edges = Vec::new();
        pre_order_edges_with(
            &net,
            SegmentId::new(0),
            ClassMask::all(),
            &mut HashSet::new(),
            0_u32,
            |a, b, depth| {
                edges.push((a.map(id_of), b.map(id_of), *depth));
                Some(depth + 1)
            },
        );
        assert_eq!(
            edges,
            [
                (None, Some(0), 0),
                (Some(0), Some(1), 1),
                (Some(3), None, 2),
                (Some(2), None, 1),
            ]
        );

        let mut reports = 0;
        pre_order_edges_with(
            &net,
            SegmentId::new(0),
            ClassMask::all(),
            &mut HashSet::new(),
            (),
            |_, _, _| {
                reports += 1;
                None
            },
        );
        assert_eq!(reports, 1, "None prunes below the root");
    }
}
