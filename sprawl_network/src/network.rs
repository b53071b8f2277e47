// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena of accepted segments plus the shared spatial index.

use alloc::vec::Vec;

use hashbrown::HashSet;
use kurbo::{Rect, Vec2};
use sprawl_collide::Collidable;
use sprawl_index::{Aabb2D, Quadtree};

use crate::config::GrowthConfig;
use crate::segment::Segment;
use crate::traversal::pre_order;
use crate::types::{ClassMask, Occupant, SegmentId};

/// The produced road graph.
///
/// Segments live in an arena in acceptance order, so a [`SegmentId`] is also
/// the position in [`RoadNetwork::segments`]. Every accepted segment is
/// indexed in the quadtree; callers may register their own collidables in the
/// same index with [`RoadNetwork::register`].
///
/// Segments shortened after insertion keep their original, larger box in the
/// index. Queries stay conservative.
#[derive(Clone, Debug)]
pub struct RoadNetwork {
    segments: Vec<Segment>,
    quadtree: Quadtree<f64, Occupant>,
}

fn to_aabb(rect: Rect) -> Aabb2D<f64> {
    Aabb2D::new(rect.x0, rect.y0, rect.x1, rect.y1)
}

impl RoadNetwork {
    /// An empty network whose quadtree root covers `world_bounds`.
    pub fn new(world_bounds: Rect, max_objects: usize, max_levels: u32) -> Self {
        Self {
            segments: Vec::new(),
            quadtree: Quadtree::new(to_aabb(world_bounds.abs()), max_objects, max_levels),
        }
    }

    /// An empty network with the quadtree settings of `config`.
    pub fn from_config(config: &GrowthConfig) -> Self {
        Self::new(
            config.world_bounds,
            config.quadtree_max_objects,
            config.quadtree_max_levels,
        )
    }

    /// The id the next inserted segment will receive.
    pub fn next_id(&self) -> SegmentId {
        SegmentId::new(u32::try_from(self.segments.len()).unwrap_or(u32::MAX))
    }

    /// Accept `segment`: assign the next id, store it and index its bounds.
    pub fn insert(&mut self, mut segment: Segment) -> SegmentId {
        let id = self.next_id();
        segment.set_id(id);
        self.quadtree.insert(segment.aabb(), Occupant::Segment(id));
        self.segments.push(segment);
        id
    }

    /// The segment with `id`, if it was accepted into this network.
    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.index())
    }

    /// Mutable access to an accepted segment.
    ///
    /// Geometry changes made through this are not reindexed.
    pub fn get_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.segments.get_mut(id.index())
    }

    /// All accepted segments in acceptance order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of accepted segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether no segment has been accepted yet.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The spatial index over segments and registered collidables.
    pub fn quadtree(&self) -> &Quadtree<f64, Occupant> {
        &self.quadtree
    }

    /// Index a caller-owned collidable under `key`.
    ///
    /// Growth ignores these entries; they are returned by
    /// [`RoadNetwork::candidates`] as [`Occupant::Foreign`].
    pub fn register<C: Collidable + ?Sized>(&mut self, collidable: &C, key: u64) {
        self.quadtree.insert(collidable.aabb(), Occupant::Foreign(key));
    }

    /// Broad-phase neighbours of `collidable`, segments and foreign entries alike.
    pub fn candidates<C: Collidable + ?Sized>(&self, collidable: &C) -> Vec<Occupant> {
        let mut out = Vec::new();
        self.quadtree
            .visit(&collidable.aabb(), |_, occupant| out.push(occupant));
        out
    }

    /// Accepted segments that collide with `collidable`, with the offset that
    /// moves `collidable` out of each.
    pub fn segment_collisions<C: Collidable + ?Sized>(
        &self,
        collidable: &C,
    ) -> Vec<(SegmentId, Vec2)> {
        self.candidates(collidable)
            .into_iter()
            .filter_map(|occupant| match occupant {
                Occupant::Segment(id) => self.get(id).map(|segment| (id, segment)),
                Occupant::Foreign(_) => None,
            })
            .filter_map(|(id, segment)| collidable.collide(segment).map(|offset| (id, offset)))
            .collect()
    }

    /// Bounding box of every segment of the classes in `mask`.
    ///
    /// Walks the growth tree from every segment with one shared visited set,
    /// so subtrees below a masked-out segment are still reached from their own
    /// roots. Returns `None` when nothing matches.
    pub fn bounds(&self, mask: ClassMask) -> Option<Rect> {
        let mut visited = HashSet::new();
        let mut bounds: Option<Rect> = None;
        for segment in &self.segments {
            let Some(id) = segment.id() else { continue };
            pre_order(self, id, mask, &mut visited, |s| {
                let r = Rect::from_points(s.start(), s.end());
                bounds = Some(bounds.map_or(r, |b| b.union(r)));
                true
            });
        }
        bounds
    }
}
