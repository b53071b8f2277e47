// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local constraints: reconcile a candidate with the roads already built.
//!
//! Every neighbour found in the quadtree is tested for three interactions,
//! ranked from strongest to weakest:
//!
//! 1. the candidate crosses the neighbour (the closest crossing along the
//!    candidate wins),
//! 2. the candidate's end lies within the snap distance of the neighbour's end,
//! 3. the candidate's end lies within the snap distance of the neighbour's
//!    centerline.
//!
//! A weaker interaction is only considered while no stronger one has been
//! kept. Only the single kept interaction is applied.

use alloc::vec::Vec;

use hashbrown::HashSet;
use kurbo::Point;
use sprawl_collide::project;

use crate::config::GrowthConfig;
use crate::network::RoadNetwork;
use crate::segment::{LinkEnd, Links, Segment};
use crate::types::{Occupant, SegmentId};

/// Points where local constraints changed the network, in application order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GrowthTrace {
    /// Crossings spliced into an existing road.
    pub crossings: Vec<Point>,
    /// Road ends a candidate was snapped onto.
    pub snaps: Vec<Point>,
    /// Points on a road's centerline a candidate was extended or cut to.
    pub line_snaps: Vec<Point>,
}

impl GrowthTrace {
    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.crossings.is_empty() && self.snaps.is_empty() && self.line_snaps.is_empty()
    }
}

#[derive(Copy, Clone, Debug)]
enum Interaction {
    Crossing { other: SegmentId, point: Point },
    EndSnap { other: SegmentId },
    LineSnap { other: SegmentId, point: Point },
}

impl Interaction {
    fn rank(self) -> u8 {
        match self {
            Self::Crossing { .. } => 4,
            Self::EndSnap { .. } => 3,
            Self::LineSnap { .. } => 2,
        }
    }
}

/// Decide whether `candidate` may be built and adjust it and its neighbours.
///
/// Returns `false` when the candidate must be dropped. A rejected candidate
/// leaves the network untouched. An accepted candidate may have been
/// shortened, severed and pre-linked to the roads it meets; it is expected to
/// be inserted next, since links to it use [`RoadNetwork::next_id`].
pub fn apply_local_constraints(
    network: &mut RoadNetwork,
    candidate: &mut Segment,
    config: &GrowthConfig,
    trace: &mut GrowthTrace,
) -> bool {
    let Some(kept) = strongest_interaction(network, candidate, config) else {
        return true;
    };
    match kept {
        Interaction::Crossing { other, point } => {
            if !deviates_enough(network, other, candidate, config) {
                log::debug!("rejected crossing with {other:?} at {point:?}: angle too shallow");
                return false;
            }
            splice_crossing(network, point, other, candidate);
            log::debug!("spliced crossing with {other:?} at {point:?}");
            trace.crossings.push(point);
            true
        }
        Interaction::LineSnap { other, point } => {
            if !deviates_enough(network, other, candidate, config) {
                log::debug!("rejected line snap onto {other:?} at {point:?}: angle too shallow");
                return false;
            }
            splice_crossing(network, point, other, candidate);
            log::debug!("snapped onto {other:?} at {point:?}");
            trace.line_snaps.push(point);
            true
        }
        Interaction::EndSnap { other } => snap_to_end(network, other, candidate, trace),
    }
}

fn strongest_interaction(
    network: &RoadNetwork,
    candidate: &Segment,
    config: &GrowthConfig,
) -> Option<Interaction> {
    let mut kept: Option<Interaction> = None;
    let mut closest_t: Option<f64> = None;
    let mut seen = HashSet::new();
    let snap2 = config.snap_distance * config.snap_distance;

    for occupant in network.candidates(candidate) {
        let Occupant::Segment(id) = occupant else {
            continue;
        };
        if candidate.id() == Some(id) || !seen.insert(id) {
            continue;
        }
        let Some(other) = network.get(id) else {
            continue;
        };
        let rank = kept.map_or(0, Interaction::rank);

        // Crossings always outrank snaps; among them the earliest along the candidate wins.
        if let Some(hit) = candidate.intersect(other) {
            if closest_t.is_none_or(|t| hit.t < t) {
                closest_t = Some(hit.t);
                kept = Some(Interaction::Crossing {
                    other: id,
                    point: hit.point,
                });
                continue;
            }
        }
        if rank <= 3 && (candidate.end() - other.end()).hypot() <= config.snap_distance {
            kept = Some(Interaction::EndSnap { other: id });
            continue;
        }
        if rank <= 2 {
            let e0 = candidate.end() - other.start();
            let e1 = other.end() - other.start();
            let proj = project(e0, e1);
            let foot = other.start() + proj;
            let along = e0.dot(e1).signum() * proj.hypot2();
            if (candidate.end() - foot).hypot2() < snap2 && along >= 0.0 && along <= e1.hypot2() {
                kept = Some(Interaction::LineSnap {
                    other: id,
                    point: foot,
                });
            }
        }
    }
    kept
}

/// Whether the two roads meet at an angle of at least the configured minimum.
fn deviates_enough(
    network: &RoadNetwork,
    other: SegmentId,
    candidate: &Segment,
    config: &GrowthConfig,
) -> bool {
    let Some(other) = network.get(other) else {
        return false;
    };
    let diff = (other.direction() - candidate.direction()).abs() % 180.0;
    diff.min((diff - 180.0).abs()) >= config.min_intersection_deviation
}

fn snap_to_end(
    network: &mut RoadNetwork,
    other: SegmentId,
    candidate: &mut Segment,
    trace: &mut GrowthTrace,
) -> bool {
    let Some(neighbour) = network.get(other) else {
        return false;
    };
    let target = neighbour.end();
    let end = if neighbour.start_is_backwards(network) {
        LinkEnd::Forwards
    } else {
        LinkEnd::Branches
    };
    let links: Links = neighbour.links(end).into();
    let start = candidate.start();
    let duplicate = links.iter().filter_map(|&l| network.get(l)).any(|l| {
        (l.start() == target && l.end() == start) || (l.start() == start && l.end() == target)
    });
    if duplicate {
        log::debug!("rejected snap onto {other:?}: the junction already has this road");
        return false;
    }

    let id = network.next_id();
    candidate.set_end(target);
    candidate.set_severed(true);
    for &link in &links {
        if let Some(segment) = network.get_mut(link) {
            if let Some(which) = segment.links_for_end_containing(other) {
                segment.links_mut(which).push(id);
            }
        }
        candidate.forwards.push(link);
    }
    if let Some(neighbour) = network.get_mut(other) {
        neighbour.links_mut(end).push(id);
    }
    candidate.forwards.push(other);
    log::debug!("snapped to the end of {other:?} at {target:?}");
    trace.snaps.push(target);
    true
}

fn replace(list: &mut Links, from: SegmentId, to: SegmentId) -> bool {
    match list.iter_mut().find(|id| **id == from) {
        Some(slot) => {
            *slot = to;
            true
        }
        None => false,
    }
}

/// Split `other` at `point` and end `candidate` there.
///
/// The part of `other` before `point` becomes a new segment, inserted at
/// once, which takes over the upstream growth links; `other` keeps the part
/// after `point`. The two halves and the candidate are linked as a
/// three-way junction. The candidate is cut at `point`, loses its
/// destinations and is severed. Links to the candidate use the id it will
/// receive when inserted right after this call.
pub fn splice_crossing(
    network: &mut RoadNetwork,
    point: Point,
    other: SegmentId,
    candidate: &mut Segment,
) {
    let Some(original) = network.get(other) else {
        return;
    };
    let backwards = original.start_is_backwards(network);
    let sources = original.sources.clone();
    let mut split = original.split_copy();
    split.destinations.push(other);
    split.set_end(point);
    split.sources = sources.clone();
    split.branches = original.branches.clone();
    split.forwards = original.forwards.clone();
    let to_fix = if backwards {
        split.branches.clone()
    } else {
        split.forwards.clone()
    };
    let split_id = network.insert(split);
    let candidate_id = network.next_id();

    for source in sources {
        if let Some(source) = network.get_mut(source) {
            replace(&mut source.destinations, other, split_id);
        }
    }
    if let Some(rest) = network.get_mut(other) {
        rest.set_start(point);
        rest.sources = Links::from_slice(&[split_id, candidate_id]);
    }

    let (first, second) = if backwards {
        (split_id, other)
    } else {
        (other, split_id)
    };
    for link in to_fix {
        if let Some(link) = network.get_mut(link) {
            if !replace(&mut link.branches, other, split_id) {
                replace(&mut link.forwards, other, split_id);
            }
        }
    }
    if let Some(first) = network.get_mut(first) {
        first.forwards = Links::from_slice(&[candidate_id, second]);
    }
    if let Some(second) = network.get_mut(second) {
        second.branches = Links::from_slice(&[candidate_id, first]);
    }

    candidate.forwards.push(first);
    candidate.forwards.push(second);
    candidate.set_end(point);
    candidate.destinations.clear();
    candidate.set_severed(true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RoadClass;

    fn config() -> GrowthConfig {
        GrowthConfig::default()
    }

    fn street(start: (f64, f64), end: (f64, f64)) -> Segment {
        Segment::new(start.into(), end.into(), RoadClass::Street, 6.0)
    }

    fn network_with(roads: &[((f64, f64), (f64, f64))]) -> RoadNetwork {
        let mut net = RoadNetwork::from_config(&config());
        for &(a, b) in roads {
            net.insert(street(a, b));
        }
        net
    }

    fn seg(net: &RoadNetwork, i: u32) -> &Segment {
        net.get(SegmentId::new(i)).expect("segment exists")
    }

    fn ids(list: &[SegmentId]) -> Vec<u32> {
        list.iter().map(|id| id.0).collect()
    }

    #[test]
    fn free_candidate_is_accepted_unchanged() {
        let mut net = network_with(&[((0.0, 0.0), (300.0, 0.0))]);
        let mut cand = street((0.0, 1000.0), (0.0, 1300.0));
        let mut trace = GrowthTrace::default();
        assert!(apply_local_constraints(&mut net, &mut cand, &config(), &mut trace));
        assert_eq!(cand.end(), Point::new(0.0, 1300.0));
        assert!(!cand.is_severed());
        assert!(trace.is_empty());
        assert_eq!(net.len(), 1);
    }

    #[test]
    fn perpendicular_crossing_splits_the_road() {
        let mut net = network_with(&[((0.0, 0.0), (300.0, 0.0))]);
        let mut cand = street((100.0, -150.0), (100.0, 150.0));
        let mut trace = GrowthTrace::default();
        assert!(apply_local_constraints(&mut net, &mut cand, &config(), &mut trace));

        let cross = Point::new(100.0, 0.0);
        assert_eq!(trace.crossings, [cross]);
        assert_eq!(cand.end(), cross);
        assert!(cand.is_severed());
        assert_eq!(net.len(), 2);

        // The old road keeps the far half, the split holds the near half.
        assert_eq!(seg(&net, 0).start(), cross);
        assert_eq!(seg(&net, 0).end(), Point::new(300.0, 0.0));
        assert_eq!(seg(&net, 1).start(), Point::ORIGIN);
        assert_eq!(seg(&net, 1).end(), cross);
        assert_eq!(ids(seg(&net, 1).destinations()), [0]);
        assert_eq!(ids(seg(&net, 0).sources()), [1, 2]);

        // Not backwards: the old road is the first half of the junction.
        assert_eq!(ids(seg(&net, 0).forwards()), [2, 1]);
        assert_eq!(ids(seg(&net, 1).branches()), [2, 0]);
        assert_eq!(ids(cand.forwards()), [0, 1]);
    }

    #[test]
    fn closest_crossing_wins() {
        let mut net = network_with(&[
            ((-100.0, 200.0), (100.0, 200.0)),
            ((-100.0, 100.0), (100.0, 100.0)),
        ]);
        let mut cand = street((0.0, 0.0), (0.0, 300.0));
        let mut trace = GrowthTrace::default();
        assert!(apply_local_constraints(&mut net, &mut cand, &config(), &mut trace));
        assert_eq!(trace.crossings, [Point::new(0.0, 100.0)]);
        assert_eq!(seg(&net, 1).start(), Point::new(0.0, 100.0));
        assert_eq!(seg(&net, 0).start(), Point::new(-100.0, 200.0));
    }

    #[test]
    fn shallow_crossing_is_rejected_without_side_effects() {
        let mut net = network_with(&[((0.0, 0.0), (300.0, 0.0))]);
        // About 11 degrees off the existing road.
        let mut cand = street((0.0, -20.0), (300.0, 40.0));
        let mut trace = GrowthTrace::default();
        assert!(!apply_local_constraints(&mut net, &mut cand, &config(), &mut trace));
        assert!(trace.is_empty());
        assert_eq!(net.len(), 1);
        assert_eq!(seg(&net, 0).start(), Point::ORIGIN);
        assert_eq!(cand.end(), Point::new(300.0, 40.0));
    }

    #[test]
    fn nearby_end_snaps() {
        let mut net = network_with(&[((0.0, 0.0), (300.0, 0.0))]);
        let mut cand = street((330.0, 300.0), (330.0, 20.0));
        let mut trace = GrowthTrace::default();
        assert!(apply_local_constraints(&mut net, &mut cand, &config(), &mut trace));
        let corner = Point::new(300.0, 0.0);
        assert_eq!(trace.snaps, [corner]);
        assert_eq!(cand.end(), corner);
        assert!(cand.is_severed());
        // No links yet: the neighbour is not backwards, so its branches gain the candidate.
        assert_eq!(ids(seg(&net, 0).branches()), [1]);
        assert_eq!(ids(cand.forwards()), [0]);
    }

    #[test]
    fn duplicate_snap_is_rejected() {
        let mut net = network_with(&[
            ((0.0, 0.0), (300.0, 0.0)),
            ((300.0, 0.0), (300.0, 300.0)),
        ]);
        if let Some(s) = net.get_mut(SegmentId::new(0)) {
            s.branches.push(SegmentId::new(1));
        }
        // Segment 1 again, drawn the other way.
        let mut cand = street((300.0, 300.0), (310.0, 20.0));
        let mut trace = GrowthTrace::default();
        assert!(!apply_local_constraints(&mut net, &mut cand, &config(), &mut trace));
        assert!(trace.is_empty());
        assert_eq!(ids(seg(&net, 0).branches()), [1]);
    }

    #[test]
    fn end_near_centerline_snaps_onto_it() {
        let mut net = network_with(&[((0.0, 0.0), (300.0, 0.0))]);
        let mut cand = street((150.0, 300.0), (150.0, 30.0));
        let mut trace = GrowthTrace::default();
        assert!(apply_local_constraints(&mut net, &mut cand, &config(), &mut trace));
        let foot = Point::new(150.0, 0.0);
        assert_eq!(trace.line_snaps, [foot]);
        assert_eq!(cand.end(), foot);
        assert_eq!(seg(&net, 1).end(), foot);
        assert_eq!(seg(&net, 0).start(), foot);
    }

    #[test]
    fn line_snap_needs_the_foot_on_the_road() {
        let mut net = network_with(&[((0.0, 0.0), (300.0, 0.0))]);
        let mut cand = street((-120.0, 300.0), (-120.0, 30.0));
        let mut trace = GrowthTrace::default();
        assert!(apply_local_constraints(&mut net, &mut cand, &config(), &mut trace));
        assert!(trace.is_empty(), "foot lies before the road's start");
    }
}
