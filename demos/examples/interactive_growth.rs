// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grow a network a few candidates at a time, then inspect it.
//!
//! This example shows how to:
//! - drive a [`Generator`] in chunks, as a renderer would once per frame,
//! - share the network's quadtree with caller-owned collidables,
//! - walk the growth tree with the traversal helpers.
//!
//! Run:
//! - `cargo run -p sprawl_demos --example interactive_growth`

use std::collections::HashMap;

use kurbo::{Circle, Point};
use log::LevelFilter;
use sprawl_collide::{Collider, Shape};
use sprawl_demos::{PopulationDensity, StderrLogger};
use sprawl_network::{
    ClassMask, Generator, GrowthConfig, Occupant, RoadNetwork, pre_order_edges, pre_order_with,
};

fn main() {
    StderrLogger::install(LevelFilter::Debug);

    let config = GrowthConfig {
        segment_count_limit: 300,
        ..GrowthConfig::default()
    };
    let density = PopulationDensity::new(config.world_bounds, 7);
    let mut generator = Generator::new(config, density, 7);

    let mut frame = 0;
    while generator.step(16) {
        frame += 1;
        if frame % 5 == 0 {
            println!(
                "frame {frame}: {} segments, {} pending",
                generator.network().len(),
                generator.pending()
            );
        }
    }
    println!(
        "stopped after {} steps: {:?}",
        generator.steps(),
        generator.termination()
    );

    let (mut network, _trace) = generator.into_parts();

    // A building next to the first road, sharing the road index.
    let building = Collider::new(Shape::Circle(Circle::new((200.0, 30.0), 20.0)));
    network.register(&building, 1);
    let probe = Collider::line(Point::new(200.0, -60.0), Point::new(200.0, 60.0), 6.0);
    let buildings = network
        .candidates(&probe)
        .into_iter()
        .filter(|o| matches!(o, Occupant::Foreign(_)))
        .count();
    let roads = network.segment_collisions(&probe).len();
    println!("probe overlaps {roads} roads; {buildings} building candidates nearby");

    let mut leaves = 0;
    let mut edges = 0;
    let mut visited = Default::default();
    for root in network.segments().iter().filter(|s| s.sources().is_empty()) {
        let Some(id) = root.id() else { continue };
        pre_order_edges(&network, id, ClassMask::all(), &mut visited, |_, segment| {
            match segment {
                Some(_) => edges += 1,
                None => leaves += 1,
            }
            true
        });
    }
    println!("{edges} inner segments, {leaves} leaves");

    for (depth, count) in depth_histogram(&network) {
        println!("depth {depth:>3}: {count}");
    }
}

/// Segments per growth depth, counted from every root.
fn depth_histogram(network: &RoadNetwork) -> Vec<(u32, usize)> {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    let mut visited = Default::default();
    for root in network.segments().iter().filter(|s| s.sources().is_empty()) {
        let Some(id) = root.id() else { continue };
        pre_order_with(network, id, ClassMask::all(), &mut visited, 0_u32, |_, depth| {
            *counts.entry(*depth).or_default() += 1;
            Some(depth + 1)
        });
    }
    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_unstable();
    sorted
}
