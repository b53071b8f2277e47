// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the road network: segment identifiers, classes and index payloads.

/// Identifier of an accepted segment: its position in acceptance order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SegmentId(pub(crate) u32);

impl SegmentId {
    pub(crate) const fn new(idx: u32) -> Self {
        Self(idx)
    }

    /// Position of the segment in [`RoadNetwork::segments`](crate::RoadNetwork::segments).
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Class of a road segment. Fixed at construction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RoadClass {
    /// Long, wide arterial roads that follow population density.
    Highway,
    /// Local roads branching off highways and other streets.
    Street,
}

impl RoadClass {
    /// Whether this is [`RoadClass::Highway`].
    pub const fn is_highway(self) -> bool {
        matches!(self, Self::Highway)
    }

    /// The single-class mask matching this class.
    pub const fn mask(self) -> ClassMask {
        match self {
            Self::Highway => ClassMask::HIGHWAYS,
            Self::Street => ClassMask::STREETS,
        }
    }
}

bitflags::bitflags! {
    /// Segment class filter for traversal and bounds queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ClassMask: u8 {
        /// Include highways.
        const HIGHWAYS = 0b01;
        /// Include streets.
        const STREETS  = 0b10;
    }
}

impl Default for ClassMask {
    fn default() -> Self {
        Self::all()
    }
}

impl ClassMask {
    /// Whether segments of `class` pass this filter.
    pub fn admits(self, class: RoadClass) -> bool {
        self.contains(class.mask())
    }
}

/// Payload stored in the network's quadtree.
///
/// Segments are indexed by id; other collidables registered by the caller
/// (buildings, props) carry an opaque key the caller maps back itself.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Occupant {
    /// An accepted road segment.
    Segment(SegmentId),
    /// A caller-owned entity.
    Foreign(u64),
}
