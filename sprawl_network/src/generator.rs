// Copyright 2025 the Sprawl Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The growth loop.
//!
//! Pending candidates wait in a priority queue. Each step dequeues the
//! candidate with the largest priority, runs the local constraints on it and,
//! when it is accepted, inserts it, links it to its parent and enqueues the
//! successors proposed by the global goals one priority level higher (plus
//! their delay). Candidates with equal priority leave the queue in the order
//! they entered it.

use alloc::collections::BinaryHeap;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::ops::ControlFlow;

use kurbo::Point;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::GrowthConfig;
use crate::constraints::{GrowthTrace, apply_local_constraints};
use crate::goals::{DensityField, propose_successors};
use crate::network::RoadNetwork;
use crate::segment::Segment;
use crate::types::{RoadClass, SegmentId};

/// Why a growth run stopped.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Termination {
    /// No candidates were left.
    Exhausted,
    /// [`GrowthConfig::segment_count_limit`] segments were accepted.
    SegmentLimit,
    /// [`GrowthConfig::derivation_step_limit`] candidates were dequeued.
    StepLimit,
}

/// Summary of a finished run.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GenerationReport {
    /// Segments in the network, including split parts.
    pub accepted: usize,
    /// Candidates dequeued.
    pub steps: usize,
    /// Why the run stopped.
    pub termination: Termination,
}

/// Everything a finished run produced.
#[derive(Clone, Debug)]
pub struct Generation {
    /// The road graph.
    pub network: RoadNetwork,
    /// Run summary.
    pub report: GenerationReport,
    /// Where local constraints changed the network.
    pub trace: GrowthTrace,
}

#[derive(Debug)]
struct QueueEntry {
    priority: u32,
    seq: u64,
    segment: Segment,
    parent: Option<SegmentId>,
    seed: Option<usize>,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: larger priority first, then earlier insertion.
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

/// A resumable growth run.
///
/// Drive it in chunks with [`Generator::step`] to watch the network grow, or
/// run it to the end with [`Generator::finish`]. The same configuration,
/// density field, seed and roots always grow the same network.
#[derive(Debug)]
pub struct Generator<D> {
    config: GrowthConfig,
    density: D,
    rng: ChaCha8Rng,
    network: RoadNetwork,
    queue: BinaryHeap<QueueEntry>,
    next_seq: u64,
    steps: usize,
    termination: Option<Termination>,
    trace: GrowthTrace,
    seed_ids: Vec<Option<SegmentId>>,
    seed_starts: Vec<Point>,
    seed_links: Vec<(usize, usize)>,
}

impl<D: DensityField> Generator<D> {
    /// A run grown from a single eastbound highway at the origin.
    pub fn new(config: GrowthConfig, density: D, seed: u64) -> Self {
        let root = highway_root(&config, 1.0);
        Self::seeded(config, density, seed, [root], &[])
    }

    /// A run grown from two highways leaving the origin east and west.
    ///
    /// Once both are accepted they list each other as branches.
    pub fn with_opposing_roots(config: GrowthConfig, density: D, seed: u64) -> Self {
        let east = highway_root(&config, 1.0);
        let west = highway_root(&config, -1.0);
        Self::seeded(config, density, seed, [east, west], &[(0, 1)])
    }

    /// A run grown from caller-supplied roots, enqueued in the given order.
    pub fn with_roots<I>(config: GrowthConfig, density: D, seed: u64, roots: I) -> Self
    where
        I: IntoIterator<Item = Segment>,
    {
        Self::seeded(config, density, seed, roots, &[])
    }

    fn seeded<I>(
        config: GrowthConfig,
        density: D,
        seed: u64,
        roots: I,
        links: &[(usize, usize)],
    ) -> Self
    where
        I: IntoIterator<Item = Segment>,
    {
        let mut generator = Self {
            network: RoadNetwork::from_config(&config),
            config,
            density,
            rng: ChaCha8Rng::seed_from_u64(seed),
            queue: BinaryHeap::new(),
            next_seq: 0,
            steps: 0,
            termination: None,
            trace: GrowthTrace::default(),
            seed_ids: Vec::new(),
            seed_starts: Vec::new(),
            seed_links: links.to_vec(),
        };
        for (ordinal, root) in roots.into_iter().enumerate() {
            generator.seed_ids.push(None);
            generator.seed_starts.push(root.start());
            generator.enqueue(0, root, None, Some(ordinal));
        }
        generator
    }

    fn enqueue(
        &mut self,
        priority: u32,
        segment: Segment,
        parent: Option<SegmentId>,
        seed: Option<usize>,
    ) {
        self.queue.push(QueueEntry {
            priority,
            seq: self.next_seq,
            segment,
            parent,
            seed,
        });
        self.next_seq += 1;
    }

    fn end_condition(&self) -> Option<Termination> {
        if self.queue.is_empty() {
            Some(Termination::Exhausted)
        } else if self.network.len() >= self.config.segment_count_limit {
            Some(Termination::SegmentLimit)
        } else if self.steps >= self.config.derivation_step_limit {
            Some(Termination::StepLimit)
        } else {
            None
        }
    }

    fn end(&mut self, reason: Termination) {
        if self.termination.is_some() {
            return;
        }
        self.termination = Some(reason);
        if reason == Termination::StepLimit {
            log::warn!(
                "growth interrupted after {} steps with {} candidates pending",
                self.steps,
                self.queue.len()
            );
        }
    }

    /// Dequeue and process one candidate.
    fn advance(&mut self) -> ControlFlow<Termination> {
        if let Some(reason) = self.end_condition() {
            self.end(reason);
            return ControlFlow::Break(reason);
        }
        let Some(entry) = self.queue.pop() else {
            self.end(Termination::Exhausted);
            return ControlFlow::Break(Termination::Exhausted);
        };
        self.steps += 1;
        let QueueEntry {
            priority,
            mut segment,
            parent,
            seed,
            ..
        } = entry;

        if !apply_local_constraints(
            &mut self.network,
            &mut segment,
            &self.config,
            &mut self.trace,
        ) {
            return ControlFlow::Continue(());
        }
        if let Some(parent) = parent {
            commit_links(&mut self.network, parent, &mut segment);
        }
        let id = self.network.insert(segment);
        if let Some(ordinal) = seed {
            self.link_seed(ordinal, id);
        }

        let Some(accepted) = self.network.get(id) else {
            return ControlFlow::Continue(());
        };
        let proposals = propose_successors(accepted, &self.config, &self.density, &mut self.rng);
        let base = priority.saturating_add(1);
        for proposal in proposals {
            self.enqueue(
                base.saturating_add(proposal.delay),
                proposal.segment,
                Some(id),
                None,
            );
        }
        ControlFlow::Continue(())
    }

    fn link_seed(&mut self, ordinal: usize, id: SegmentId) {
        if let Some(slot) = self.seed_ids.get_mut(ordinal) {
            *slot = Some(id);
        }
        for &(a, b) in &self.seed_links {
            let partner = match ordinal {
                o if o == a => b,
                o if o == b => a,
                _ => continue,
            };
            let (Some(Some(accepted)), Some(&start)) =
                (self.seed_ids.get(partner).copied(), self.seed_starts.get(partner))
            else {
                continue;
            };
            // A crossing may have split the partner since it was accepted.
            let partner = start_owner(&self.network, accepted, start);
            if let Some(segment) = self.network.get_mut(id) {
                segment.branches.insert(0, partner);
            }
            if let Some(segment) = self.network.get_mut(partner) {
                segment.branches.insert(0, id);
            }
        }
    }

    /// Process up to `speed` candidates.
    ///
    /// Returns `false`, without doing anything, once the run is over.
    pub fn step(&mut self, speed: usize) -> bool {
        if let Some(reason) = self.end_condition() {
            self.end(reason);
            return false;
        }
        for _ in 0..speed {
            if self.advance().is_break() {
                break;
            }
        }
        true
    }

    /// Run to the end under the configured limits.
    pub fn finish(&mut self) -> GenerationReport {
        let termination = loop {
            if let ControlFlow::Break(reason) = self.advance() {
                break reason;
            }
        };
        let report = GenerationReport {
            accepted: self.network.len(),
            steps: self.steps,
            termination,
        };
        log::info!(
            "grew {} segments in {} steps ({:?})",
            report.accepted,
            report.steps,
            report.termination
        );
        report
    }

    /// The network grown so far.
    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    /// Where local constraints changed the network so far.
    pub fn trace(&self) -> &GrowthTrace {
        &self.trace
    }

    /// The configuration of this run.
    pub fn config(&self) -> &GrowthConfig {
        &self.config
    }

    /// Candidates dequeued so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Candidates waiting in the queue.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Why the run stopped, once it has.
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Give up the run, keeping the network and trace.
    pub fn into_parts(self) -> (RoadNetwork, GrowthTrace) {
        (self.network, self.trace)
    }
}

/// Follow split parts back from `id` to the segment that starts at `start`.
///
/// Splicing hands the start of a road, with its sources, to the new split
/// part, which becomes the first source of the remaining part.
fn start_owner(network: &RoadNetwork, id: SegmentId, start: Point) -> SegmentId {
    let mut current = id;
    for _ in 0..network.len() {
        let Some(segment) = network.get(current) else {
            break;
        };
        if segment.start() == start {
            break;
        }
        match segment.sources().first() {
            Some(&source) => current = source,
            None => break,
        }
    }
    current
}

fn highway_root(config: &GrowthConfig, sign: f64) -> Segment {
    Segment::new(
        Point::ORIGIN,
        Point::new(sign * config.highway_segment_length, 0.0),
        RoadClass::Highway,
        config.highway_segment_width,
    )
}

/// Attach `child`, about to be inserted, to the end of `parent`.
///
/// Roads already leaving the parent's end become the child's branches and
/// list the child at the end where they meet the parent.
fn commit_links(network: &mut RoadNetwork, parent: SegmentId, child: &mut Segment) {
    let id = network.next_id();
    let Some(forwards) = network.get(parent).map(|p| p.forwards.clone()) else {
        return;
    };
    for link in forwards {
        child.branches.push(link);
        if let Some(segment) = network.get_mut(link) {
            if let Some(end) = segment.links_for_end_containing(parent) {
                segment.links_mut(end).push(id);
            }
        }
    }
    if let Some(segment) = network.get_mut(parent) {
        segment.forwards.push(id);
        segment.destinations.push(id);
    }
    child.branches.push(parent);
    child.sources.push(parent);
}

/// Grow a network from two opposing highways and run it to the end.
///
/// ```
/// use sprawl_network::{GrowthConfig, generate};
///
/// let config = GrowthConfig {
///     segment_count_limit: 50,
///     ..GrowthConfig::default()
/// };
/// let run = generate(config, |_x: f64, _y: f64| 0.5, 42);
/// assert_eq!(run.network.len(), run.report.accepted);
/// assert!(run.report.accepted >= 50);
/// ```
pub fn generate<D: DensityField>(config: GrowthConfig, density: D, seed: u64) -> Generation {
    let mut generator = Generator::with_opposing_roots(config, density, seed);
    let report = generator.finish();
    let (network, trace) = generator.into_parts();
    Generation {
        network,
        report,
        trace,
    }
}
