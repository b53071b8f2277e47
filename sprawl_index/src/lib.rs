// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sprawl Index: generic 2D AABBs and an adaptive quadtree.
//!
//! Sprawl Index is the broad phase of the Sprawl road generator.
//!
//! - Insert axis-aligned bounding boxes (AABBs) with small `Copy` payloads that
//!   refer back to their owners.
//! - Retrieve every entry that could overlap a query box. Results are
//!   conservative: they may include entries that do not overlap, but never miss
//!   one that does. Narrow-phase tests are the caller's job.
//! - Nodes split lazily into four quadrants when they overflow; boxes that
//!   straddle a midline stay in the node that holds them.
//!
//! It is generic over the scalar type `T` and does not depend on any geometry crate.
//!
//! # Example
//!
//! ```rust
//! use sprawl_index::{Aabb2D, Quadtree};
//!
//! let mut tree: Quadtree<f64, u32> =
//!     Quadtree::new(Aabb2D::new(-1000.0, -1000.0, 1000.0, 1000.0), 10, 10);
//! tree.insert(Aabb2D::new(0.0, -8.0, 400.0, 8.0), 0);
//! tree.insert(Aabb2D::new(-400.0, -8.0, 0.0, 8.0), 1);
//!
//! let near_origin = tree.retrieve(&Aabb2D::new(-5.0, -5.0, 5.0, 5.0));
//! assert_eq!(near_origin.len(), 2);
//! ```
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates.

#![no_std]

extern crate alloc;

mod quadtree;
mod types;

pub use quadtree::{Entry, Quadtree};
pub use types::{Aabb2D, Scalar};
