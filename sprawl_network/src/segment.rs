// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Road segments and their adjacency lists.

use core::cell::Cell;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Vec2};
use smallvec::SmallVec;
use sprawl_collide::{Collidable, Collider, SegmentCrossing, line_segment_intersection};

use crate::network::RoadNetwork;
use crate::types::{RoadClass, SegmentId};

/// Adjacency list of a segment.
pub type Links = SmallVec<[SegmentId; 4]>;

/// Which end-neighbour list of a segment.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LinkEnd {
    /// Segments attached at the start end.
    Branches,
    /// Segments attached at the end end.
    Forwards,
}

/// A straight road piece with its graph links.
///
/// `sources` and `destinations` form the growth tree used for traversal.
/// `branches` and `forwards` list every segment touching the start and the
/// end, respectively, and are what mesh builders walk to find junctions.
#[derive(Clone, Debug)]
pub struct Segment {
    id: Option<SegmentId>,
    collider: Collider,
    road_revision: u64,
    direction: Cell<Option<(u64, f64)>>,
    length: Cell<Option<(u64, f64)>>,
    class: RoadClass,
    severed: bool,
    pub(crate) sources: Links,
    pub(crate) destinations: Links,
    pub(crate) branches: Links,
    pub(crate) forwards: Links,
}

impl Segment {
    /// A detached segment from `start` to `end`.
    pub fn new(start: Point, end: Point, class: RoadClass, width: f64) -> Self {
        Self {
            id: None,
            collider: Collider::line(start, end, width),
            road_revision: 0,
            direction: Cell::new(None),
            length: Cell::new(None),
            class,
            severed: false,
            sources: Links::new(),
            destinations: Links::new(),
            branches: Links::new(),
            forwards: Links::new(),
        }
    }

    /// A detached segment of `length` heading `direction` degrees clockwise from +y.
    pub fn from_direction(
        start: Point,
        direction: f64,
        length: f64,
        class: RoadClass,
        width: f64,
    ) -> Self {
        let radians = direction.to_radians();
        let end = start + length * Vec2::new(radians.sin(), radians.cos());
        Self::new(start, end, class, width)
    }

    /// A copy of the geometry, class and severed flag, without id or links.
    pub fn split_copy(&self) -> Self {
        let mut copy = Self::new(self.start(), self.end(), self.class, self.width());
        copy.severed = self.severed;
        copy
    }

    /// Id assigned when the segment was accepted into a network.
    pub fn id(&self) -> Option<SegmentId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: SegmentId) {
        self.id = Some(id);
    }

    fn line(&self) -> (Point, Point, f64) {
        self.collider
            .as_line()
            .map_or((Point::ORIGIN, Point::ORIGIN, 0.0), |l| {
                (l.start, l.end, l.width)
            })
    }

    /// First endpoint.
    pub fn start(&self) -> Point {
        self.line().0
    }

    /// Second endpoint.
    pub fn end(&self) -> Point {
        self.line().1
    }

    /// Road width.
    pub fn width(&self) -> f64 {
        self.line().2
    }

    /// Move the first endpoint.
    pub fn set_start(&mut self, start: Point) {
        self.collider.set_start(start);
        self.road_revision += 1;
    }

    /// Move the second endpoint.
    pub fn set_end(&mut self, end: Point) {
        self.collider.set_end(end);
        self.road_revision += 1;
    }

    /// Change the road width.
    pub fn set_width(&mut self, width: f64) {
        self.collider.set_width(width);
        self.road_revision += 1;
    }

    /// Number of geometric changes since construction.
    pub fn road_revision(&self) -> u64 {
        self.road_revision
    }

    /// Road class.
    pub fn class(&self) -> RoadClass {
        self.class
    }

    /// Whether growth stops at this segment's end.
    pub fn is_severed(&self) -> bool {
        self.severed
    }

    /// Mark the segment as a dead end for growth, or clear the mark.
    pub fn set_severed(&mut self, severed: bool) {
        self.severed = severed;
    }

    /// Heading in degrees, clockwise from +y, in `[-180, 180]`.
    ///
    /// Zero-length segments have heading 0.
    pub fn direction(&self) -> f64 {
        cached(&self.direction, self.road_revision, || {
            let length = self.length();
            if length == 0.0 {
                return 0.0;
            }
            let d = self.end() - self.start();
            let degrees = d.x.atan2(d.y).to_degrees();
            // Straight down reads as +180 whatever the sign of a zero x.
            if degrees == -180.0 { 180.0 } else { degrees }
        })
    }

    /// Distance between the endpoints.
    pub fn length(&self) -> f64 {
        cached(&self.length, self.road_revision, || {
            (self.end() - self.start()).hypot()
        })
    }

    /// Segments this one grew from.
    pub fn sources(&self) -> &[SegmentId] {
        &self.sources
    }

    /// Segments that grew from this one.
    pub fn destinations(&self) -> &[SegmentId] {
        &self.destinations
    }

    /// Segments attached at the start.
    pub fn branches(&self) -> &[SegmentId] {
        &self.branches
    }

    /// Segments attached at the end.
    pub fn forwards(&self) -> &[SegmentId] {
        &self.forwards
    }

    /// The end list that holds `id`, checking branches first.
    pub fn links_for_end_containing(&self, id: SegmentId) -> Option<LinkEnd> {
        if self.branches.contains(&id) {
            Some(LinkEnd::Branches)
        } else if self.forwards.contains(&id) {
            Some(LinkEnd::Forwards)
        } else {
            None
        }
    }

    /// One of the end lists.
    pub fn links(&self, end: LinkEnd) -> &[SegmentId] {
        match end {
            LinkEnd::Branches => &self.branches,
            LinkEnd::Forwards => &self.forwards,
        }
    }

    pub(crate) fn links_mut(&mut self, end: LinkEnd) -> &mut Links {
        match end {
            LinkEnd::Branches => &mut self.branches,
            LinkEnd::Forwards => &mut self.forwards,
        }
    }

    /// Whether the segment's start lies where its end-neighbours assume its
    /// end to be, i.e. it was drawn against the flow of its junctions.
    ///
    /// Looks at the first branch, or failing that the first forward link.
    /// Links missing from `network` count as "not backwards".
    pub fn start_is_backwards(&self, network: &RoadNetwork) -> bool {
        if let Some(&first) = self.branches.first() {
            network
                .get(first)
                .is_some_and(|b| b.start() == self.start() || b.start() == self.end())
        } else if let Some(&first) = self.forwards.first() {
            network
                .get(first)
                .is_some_and(|f| f.start() == self.end() || f.end() == self.end())
        } else {
            false
        }
    }

    /// Proper crossing of the two centerlines; `t` runs along `self`.
    pub fn intersect(&self, other: &Self) -> Option<SegmentCrossing> {
        line_segment_intersection(self.start(), self.end(), other.start(), other.end())
    }
}

fn cached(cell: &Cell<Option<(u64, f64)>>, revision: u64, compute: impl FnOnce() -> f64) -> f64 {
    match cell.get() {
        Some((at, value)) if at == revision => value,
        _ => {
            let value = compute();
            cell.set(Some((revision, value)));
            value
        }
    }
}

impl Collidable for Segment {
    fn collider(&self) -> &Collider {
        &self.collider
    }
}
