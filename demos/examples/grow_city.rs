// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grow a full road network and render it as SVG.
//!
//! Highways are drawn thick and dark, streets thin and grey; crossings,
//! snaps and line snaps found by the local constraints are marked.
//!
//! Run:
//! - `cargo run -p sprawl_demos --example grow_city -- [seed] [out.svg]`

use std::fmt::Write as _;

use kurbo::{Point, Rect};
use log::LevelFilter;
use sprawl_demos::{PopulationDensity, StderrLogger};
use sprawl_network::{ClassMask, GrowthConfig, generate};

fn main() {
    StderrLogger::install(LevelFilter::Info);

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let out = args.next().unwrap_or_else(|| "sprawl.svg".into());

    let config = GrowthConfig::default();
    if let Err(err) = config.validate() {
        eprintln!("invalid configuration: {err}");
        return;
    }
    let density = PopulationDensity::new(config.world_bounds, seed as i32);
    let run = generate(config, density, seed);

    let highways = run.network.bounds(ClassMask::HIGHWAYS);
    let Some(bounds) = run.network.bounds(ClassMask::all()) else {
        eprintln!("nothing grew");
        return;
    };
    println!(
        "{} segments in {} steps ({:?}); highways span {:?}",
        run.report.accepted, run.report.steps, run.report.termination, highways
    );
    println!(
        "{} crossings, {} snaps, {} line snaps",
        run.trace.crossings.len(),
        run.trace.snaps.len(),
        run.trace.line_snaps.len()
    );

    let view = bounds.inflate(100.0, 100.0);
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
        view.x0,
        view.y0,
        view.width(),
        view.height()
    );
    for segment in run.network.segments() {
        let stroke = if segment.class().is_highway() {
            "#333"
        } else {
            "#999"
        };
        let width = segment.width();
        let (a, b) = (segment.start(), segment.end());
        let _ = writeln!(
            svg,
            r#"  <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{stroke}" stroke-width="{width}" stroke-linecap="round"/>"#,
            a.x, a.y, b.x, b.y
        );
    }
    mark(&mut svg, &run.trace.crossings, "#d33");
    mark(&mut svg, &run.trace.snaps, "#3a3");
    mark(&mut svg, &run.trace.line_snaps, "#33d");
    svg.push_str("</svg>\n");

    match std::fs::write(&out, svg) {
        Ok(()) => println!("wrote {out} covering {}", describe(view)),
        Err(err) => eprintln!("could not write {out}: {err}"),
    }
}

fn mark(svg: &mut String, points: &[Point], color: &str) {
    for p in points {
        let _ = writeln!(
            svg,
            r#"  <circle cx="{:.1}" cy="{:.1}" r="12" fill="{color}"/>"#,
            p.x, p.y
        );
    }
}

fn describe(rect: Rect) -> String {
    format!("{:.0} x {:.0}", rect.width(), rect.height())
}
