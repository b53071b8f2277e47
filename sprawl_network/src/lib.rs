// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sprawl Network: grow a road network over a population density field.
//!
//! Growth starts from one or more seed segments and proceeds through a
//! priority queue of candidates:
//!
//! - **Local constraints** reconcile each dequeued candidate with the roads
//!   around it. A crossing splits the crossed road into a junction, an end
//!   close to another road's end snaps onto it, and an end close to another
//!   road's centerline is pulled onto it. Candidates that would meet a road at
//!   too shallow an angle, or duplicate an existing junction road, are dropped.
//! - **Global goals** propose the successors of every accepted segment:
//!   highways follow density, streets fill dense areas, and both branch at
//!   random.
//!
//! The result is a [`RoadNetwork`]: an arena of [`Segment`]s addressed by
//! [`SegmentId`], each carrying its growth links (`sources`/`destinations`)
//! and junction links (`branches` at the start, `forwards` at the end), plus a
//! quadtree over all segments that callers can share with their own
//! collidables.
//!
//! # Example
//!
//! ```rust
//! use sprawl_network::{ClassMask, Generator, GrowthConfig, Termination};
//!
//! let config = GrowthConfig {
//!     segment_count_limit: 40,
//!     ..GrowthConfig::default()
//! };
//! let density = |x: f64, y: f64| if x.abs() + y.abs() < 3000.0 { 0.8 } else { 0.2 };
//! let mut generator = Generator::with_opposing_roots(config, density, 7);
//!
//! // Grow a little at a time, e.g. once per frame.
//! while generator.step(8) {}
//!
//! assert_eq!(generator.termination(), Some(Termination::SegmentLimit));
//! // A splice may add two segments in the last step.
//! assert!(generator.network().len() >= 40);
//! let bounds = generator.network().bounds(ClassMask::HIGHWAYS);
//! assert!(bounds.is_some());
//! ```
//!
//! Runs are deterministic: the same configuration, density field and seed
//! grow the same network.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod constraints;
mod generator;
mod goals;
mod network;
mod segment;
mod traversal;
mod types;

pub use config::{ConfigError, GrowthConfig};
pub use constraints::{GrowthTrace, apply_local_constraints, splice_crossing};
pub use generator::{Generation, GenerationReport, Generator, Termination, generate};
pub use goals::{DensityField, Proposal, propose_successors, random_angle, road_density};
pub use network::RoadNetwork;
pub use segment::{LinkEnd, Links, Segment};
pub use traversal::{pre_order, pre_order_edges, pre_order_edges_with, pre_order_with};
pub use types::{ClassMask, Occupant, RoadClass, SegmentId};
