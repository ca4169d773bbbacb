// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Frontier tracker - shared state of a bounded, level-synchronous BFS
//!
//! Workers cooperate on one traversal generation at a time:
//! 1. **Scan**: a worker claims a slice of the current frontier, reads the
//!    neighbours of every offset in it and calls [`FrontierTracker::visit`]
//!    for each, then reports back with [`FrontierTracker::finish_scan`].
//! 2. **Level advance**: the last scanner of a level promotes the nodes
//!    discovered in it into the next frontier.
//! 3. **Destination write**: once the traversal is complete the destination
//!    records are handed out in ranges for output.
//!
//! Visit states are held in an atomic byte array so visits never take the
//! level mutex; the mutex only guards morsel hand-out and level transitions.

use crate::exec::context::Interrupt;
use crate::storage::{NodeOffset, INVALID_OFFSET};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU16, AtomicU64, AtomicU8, Ordering};

pub const NOT_VISITED_DST: u8 = 0;
pub const VISITED_DST: u8 = 1;
pub const NOT_VISITED: u8 = 2;
pub const VISITED: u8 = 3;
pub const VISITED_NEW: u8 = 4;
pub const VISITED_DST_NEW: u8 = 5;

/// Path length of a node that was never reached
const UNREACHED: u16 = u16::MAX;

fn is_destination(state: u8) -> bool {
    matches!(state, NOT_VISITED_DST | VISITED_DST | VISITED_DST_NEW)
}

fn is_new(state: u8) -> bool {
    matches!(state, VISITED_NEW | VISITED_DST_NEW)
}

fn saturating_add(cell: &AtomicU64, value: u64) {
    let _ = cell.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_add(value))
    });
}

fn atomic_array<T>(len: usize, init: impl Fn() -> T) -> Box<[T]> {
    (0..len).map(|_| init()).collect()
}

/// What a traversal counts per destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalMode {
    /// First-discovery length only
    Shortest,
    /// First-discovery length and the number of shortest paths
    AllShortest,
    /// Every length in bounds with the number of walks of that length
    VariableLength,
}

/// One destination reached within the path-length bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DstRecord {
    pub offset: NodeOffset,
    pub length: u16,
    pub multiplicity: u64,
}

/// Worker-owned buffers that claims copy their slice into
#[derive(Debug, Default)]
pub struct FrontierScratch {
    pub frontier: Vec<NodeOffset>,
    pub records: Vec<DstRecord>,
}

/// Outcome of [`FrontierTracker::claim`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontierClaim {
    /// `scratch.frontier` holds offsets of `level` to expand
    Scan { level: u16, count: usize },
    /// `scratch.records` holds destination records of `generation` to emit
    Write { generation: u64, count: usize },
    /// Other workers are still scanning this level; yield and retry
    Wait,
    /// Generation `generation` has no more work
    Done { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Unseeded,
    Scanning,
    Writing,
    Done,
}

#[derive(Debug)]
struct LevelState {
    generation: u64,
    phase: Phase,
    current_level: u16,
    frontier: Vec<NodeOffset>,
    next_scan: usize,
    active_scanners: usize,
    dst_records: Vec<DstRecord>,
    next_dst_write: usize,
}

#[derive(Debug)]
pub struct FrontierTracker {
    mode: TraversalMode,
    lower_bound: u16,
    upper_bound: u16,
    visited: Box<[AtomicU8]>,
    path_length: Box<[AtomicU16]>,
    /// First-discovery parent per node; empty unless parent tracking is on
    parent: Box<[AtomicU64]>,
    multiplicity: Box<[AtomicU64]>,
    next_multiplicity: Box<[AtomicU64]>,
    num_dst_to_visit: AtomicU64,
    num_dst_visited: AtomicU64,
    state: Mutex<LevelState>,
    interrupt: Interrupt,
}

impl FrontierTracker {
    /// Allocate a tracker over `universe` node offsets
    ///
    /// Arrays are sized once; every generation reuses them.
    pub fn new(
        mode: TraversalMode,
        universe: u64,
        lower_bound: u16,
        upper_bound: u16,
        interrupt: Interrupt,
    ) -> Self {
        let n = universe as usize;
        let multiplicity_len = if mode == TraversalMode::Shortest { 0 } else { n };
        let next_len = if mode == TraversalMode::VariableLength { n } else { 0 };

        Self {
            mode,
            lower_bound,
            upper_bound,
            visited: atomic_array(n, || AtomicU8::new(NOT_VISITED)),
            path_length: atomic_array(n, || AtomicU16::new(UNREACHED)),
            parent: Box::new([]),
            multiplicity: atomic_array(multiplicity_len, || AtomicU64::new(0)),
            next_multiplicity: atomic_array(next_len, || AtomicU64::new(0)),
            num_dst_to_visit: AtomicU64::new(0),
            num_dst_visited: AtomicU64::new(0),
            state: Mutex::new(LevelState {
                generation: 0,
                phase: Phase::Unseeded,
                current_level: 0,
                frontier: Vec::new(),
                next_scan: 0,
                active_scanners: 0,
                dst_records: Vec::new(),
                next_dst_write: 0,
            }),
            interrupt,
        }
    }

    /// Record the first-discovery parent of every reached node
    ///
    /// Only meaningful for the first-discovery modes; walks revisit nodes.
    pub fn with_parent_tracking(mut self) -> Self {
        self.parent = atomic_array(self.visited.len(), || AtomicU64::new(INVALID_OFFSET));
        self
    }

    pub fn tracks_parents(&self) -> bool {
        !self.parent.is_empty()
    }

    pub fn mode(&self) -> TraversalMode {
        self.mode
    }

    pub fn universe(&self) -> u64 {
        self.visited.len() as u64
    }

    /// Start a new generation from `sources`
    ///
    /// `destinations` of `None` makes every node a destination. Offsets
    /// outside the universe are ignored. Must not be called while workers
    /// are scanning. Returns the new generation number, starting at 1.
    pub fn seed(&self, sources: &[NodeOffset], destinations: Option<&[NodeOffset]>) -> u64 {
        let mut st = self.state.lock();
        let universe = self.universe();

        let base = if destinations.is_some() {
            NOT_VISITED
        } else {
            NOT_VISITED_DST
        };
        for state in self.visited.iter() {
            state.store(base, Ordering::Relaxed);
        }
        for length in self.path_length.iter() {
            length.store(UNREACHED, Ordering::Relaxed);
        }
        for parent in self.parent.iter() {
            parent.store(INVALID_OFFSET, Ordering::Relaxed);
        }
        for count in self.multiplicity.iter().chain(self.next_multiplicity.iter()) {
            count.store(0, Ordering::Relaxed);
        }

        let mut num_dst = if destinations.is_some() { 0 } else { universe };
        if let Some(dsts) = destinations {
            for &dst in dsts.iter().filter(|d| **d < universe) {
                let state = &self.visited[dst as usize];
                if state.load(Ordering::Relaxed) == NOT_VISITED {
                    state.store(NOT_VISITED_DST, Ordering::Relaxed);
                    num_dst += 1;
                }
            }
        }
        self.num_dst_to_visit.store(num_dst, Ordering::Relaxed);
        self.num_dst_visited.store(0, Ordering::Relaxed);

        st.generation += 1;
        st.phase = Phase::Scanning;
        st.current_level = 0;
        st.frontier.clear();
        st.next_scan = 0;
        st.active_scanners = 0;
        st.dst_records.clear();
        st.next_dst_write = 0;

        for &src in sources.iter().filter(|s| **s < universe) {
            let idx = src as usize;
            if self.path_length[idx].load(Ordering::Relaxed) == 0 {
                continue;
            }
            self.path_length[idx].store(0, Ordering::Relaxed);
            let dst = is_destination(self.visited[idx].load(Ordering::Relaxed));
            match self.mode {
                // Sources stay revisitable: walks may return to them
                TraversalMode::VariableLength => {
                    self.multiplicity[idx].store(1, Ordering::Relaxed);
                    if dst && self.lower_bound == 0 {
                        st.dst_records.push(DstRecord {
                            offset: src,
                            length: 0,
                            multiplicity: 1,
                        });
                    }
                }
                TraversalMode::Shortest | TraversalMode::AllShortest => {
                    if let Some(count) = self.multiplicity.get(idx) {
                        count.store(1, Ordering::Relaxed);
                    }
                    if dst {
                        self.visited[idx].store(VISITED_DST, Ordering::Relaxed);
                        self.num_dst_visited.fetch_add(1, Ordering::Relaxed);
                    } else {
                        self.visited[idx].store(VISITED, Ordering::Relaxed);
                    }
                }
            }
            st.frontier.push(src);
        }

        log::debug!(
            "Frontier generation {}: {} sources, {} destinations, bounds [{}, {}]",
            st.generation,
            st.frontier.len(),
            num_dst,
            self.lower_bound,
            self.upper_bound
        );

        if self.level_complete(&st) {
            self.materialize(&mut st);
        }
        st.generation
    }

    /// Claim the next unit of work
    ///
    /// Scan slices hold at most `scan_batch` frontier offsets, write slices
    /// at most `write_batch` records. Returns `Done` once interrupted.
    pub fn claim(
        &self,
        scan_batch: usize,
        write_batch: usize,
        scratch: &mut FrontierScratch,
    ) -> FrontierClaim {
        let mut st = self.state.lock();
        if self.interrupt.is_raised() {
            return FrontierClaim::Done {
                generation: st.generation,
            };
        }

        loop {
            match st.phase {
                Phase::Unseeded | Phase::Done => {
                    return FrontierClaim::Done {
                        generation: st.generation,
                    }
                }
                Phase::Scanning => {
                    if !self.level_drained(&st) {
                        let start = st.next_scan;
                        let end = (start + scan_batch.max(1)).min(st.frontier.len());
                        scratch.frontier.clear();
                        scratch.frontier.extend_from_slice(&st.frontier[start..end]);
                        st.next_scan = end;
                        st.active_scanners += 1;
                        return FrontierClaim::Scan {
                            level: st.current_level,
                            count: end - start,
                        };
                    }
                    if st.active_scanners > 0 {
                        return FrontierClaim::Wait;
                    }
                    self.settle(&mut st);
                }
                Phase::Writing => {
                    if st.next_dst_write < st.dst_records.len() {
                        let start = st.next_dst_write;
                        let end = (start + write_batch.max(1)).min(st.dst_records.len());
                        scratch.records.clear();
                        scratch.records.extend_from_slice(&st.dst_records[start..end]);
                        st.next_dst_write = end;
                        return FrontierClaim::Write {
                            generation: st.generation,
                            count: end - start,
                        };
                    }
                    st.phase = Phase::Done;
                }
            }
        }
    }

    /// Record the edge `parent -> nbr` discovered while scanning `level`
    ///
    /// Returns true when this call discovered a destination for the first time.
    pub fn visit(&self, level: u16, parent: NodeOffset, nbr: NodeOffset) -> bool {
        let Some(state) = self.visited.get(nbr as usize) else {
            return false;
        };
        let nbr_idx = nbr as usize;
        let mut current = state.load(Ordering::Acquire);
        let mut discovered_dst = false;

        while current == NOT_VISITED || current == NOT_VISITED_DST {
            let target = if current == NOT_VISITED {
                VISITED_NEW
            } else {
                VISITED_DST_NEW
            };
            match state.compare_exchange(current, target, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => {
                    let first = self.path_length[nbr_idx].compare_exchange(
                        UNREACHED,
                        level + 1,
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    );
                    if first.is_ok() {
                        if let Some(slot) = self.parent.get(nbr_idx) {
                            slot.store(parent, Ordering::Relaxed);
                        }
                    }
                    if target == VISITED_DST_NEW && self.mode != TraversalMode::VariableLength {
                        self.num_dst_visited.fetch_add(1, Ordering::Relaxed);
                        discovered_dst = true;
                    }
                    current = target;
                }
                Err(actual) => current = actual,
            }
        }

        if is_new(current) {
            match self.mode {
                TraversalMode::Shortest => {}
                TraversalMode::AllShortest => {
                    let paths = self.multiplicity[parent as usize].load(Ordering::Relaxed);
                    saturating_add(&self.multiplicity[nbr_idx], paths);
                }
                TraversalMode::VariableLength => {
                    let walks = self.multiplicity[parent as usize].load(Ordering::Relaxed);
                    saturating_add(&self.next_multiplicity[nbr_idx], walks);
                }
            }
        }
        discovered_dst
    }

    /// Report a finished scan slice; the last scanner of a level advances it
    pub fn finish_scan(&self, dst_found: bool) {
        let mut st = self.state.lock();
        st.active_scanners = st.active_scanners.saturating_sub(1);
        if dst_found {
            log::trace!(
                "Frontier level {}: destinations found, {}/{} visited",
                st.current_level,
                self.num_dst_visited.load(Ordering::Relaxed),
                self.num_dst_to_visit.load(Ordering::Relaxed)
            );
        }
        self.settle(&mut st);
    }

    /// Whether the traversal of the current generation has finished
    pub fn is_complete(&self) -> bool {
        matches!(self.state.lock().phase, Phase::Writing | Phase::Done)
    }

    pub fn current_level(&self) -> u16 {
        self.state.lock().current_level
    }

    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    pub fn num_dst_visited(&self) -> u64 {
        self.num_dst_visited.load(Ordering::Relaxed)
    }

    pub fn visit_state(&self, offset: NodeOffset) -> Option<u8> {
        self.visited
            .get(offset as usize)
            .map(|s| s.load(Ordering::Acquire))
    }

    /// Level at which `offset` was first reached
    pub fn path_length(&self, offset: NodeOffset) -> Option<u16> {
        self.path_length
            .get(offset as usize)
            .map(|l| l.load(Ordering::Relaxed))
            .filter(|l| *l != UNREACHED)
    }

    /// Node that first discovered `offset`; `None` for sources and unreached nodes
    pub fn parent(&self, offset: NodeOffset) -> Option<NodeOffset> {
        self.parent
            .get(offset as usize)
            .map(|p| p.load(Ordering::Relaxed))
            .filter(|p| *p != INVALID_OFFSET)
    }

    /// Source-to-`dst` path along first-discovery parents
    ///
    /// `None` without parent tracking or when `dst` was never reached. Only
    /// valid once the generation is complete.
    pub fn path_to(&self, dst: NodeOffset) -> Option<Vec<NodeOffset>> {
        if self.parent.is_empty() {
            return None;
        }
        let length = self.path_length(dst)?;
        let mut path = Vec::with_capacity(length as usize + 1);
        let mut node = dst;
        path.push(node);
        for _ in 0..length {
            node = self.parent(node)?;
            path.push(node);
        }
        path.reverse();
        Some(path)
    }

    /// Fraction of the level budget consumed by the current generation
    pub fn progress(&self) -> f64 {
        let st = self.state.lock();
        match st.phase {
            Phase::Writing | Phase::Done => 1.0,
            Phase::Unseeded => 0.0,
            Phase::Scanning if self.upper_bound == 0 => 1.0,
            Phase::Scanning => st.current_level as f64 / self.upper_bound as f64,
        }
    }

    fn all_dst_visited(&self) -> bool {
        self.num_dst_visited.load(Ordering::Relaxed)
            >= self.num_dst_to_visit.load(Ordering::Relaxed)
    }

    // Shortest stops mid-level once every destination is found; all-shortest
    // has to drain the level to collect every path of that length.
    fn level_drained(&self, st: &LevelState) -> bool {
        st.next_scan >= st.frontier.len()
            || (self.mode == TraversalMode::Shortest && self.all_dst_visited())
    }

    fn level_complete(&self, st: &LevelState) -> bool {
        let dst_done = self.mode != TraversalMode::VariableLength && self.all_dst_visited();
        dst_done || st.current_level >= self.upper_bound || st.frontier.is_empty()
    }

    fn settle(&self, st: &mut LevelState) {
        if st.phase != Phase::Scanning || st.active_scanners > 0 || !self.level_drained(st) {
            return;
        }
        self.advance_level(st);
        if self.level_complete(st) {
            self.materialize(st);
        }
    }

    fn advance_level(&self, st: &mut LevelState) {
        let next_level = st.current_level + 1;
        st.frontier.clear();

        for (offset, state) in self.visited.iter().enumerate() {
            let current = state.load(Ordering::Acquire);
            match self.mode {
                TraversalMode::Shortest | TraversalMode::AllShortest => match current {
                    VISITED_NEW => {
                        state.store(VISITED, Ordering::Relaxed);
                        st.frontier.push(offset as NodeOffset);
                    }
                    VISITED_DST_NEW => {
                        state.store(VISITED_DST, Ordering::Relaxed);
                        st.frontier.push(offset as NodeOffset);
                    }
                    _ => {}
                },
                TraversalMode::VariableLength => {
                    let dst = is_destination(current);
                    if is_new(current) {
                        let walks = self.next_multiplicity[offset].swap(0, Ordering::Relaxed);
                        self.multiplicity[offset].store(walks, Ordering::Relaxed);
                        st.frontier.push(offset as NodeOffset);
                        if dst && next_level >= self.lower_bound {
                            st.dst_records.push(DstRecord {
                                offset: offset as NodeOffset,
                                length: next_level,
                                multiplicity: walks,
                            });
                        }
                    }
                    let base = if dst { NOT_VISITED_DST } else { NOT_VISITED };
                    state.store(base, Ordering::Relaxed);
                }
            }
        }

        log::debug!(
            "Frontier generation {}: level {} -> {}, {} nodes in frontier",
            st.generation,
            st.current_level,
            next_level,
            st.frontier.len()
        );
        st.current_level = next_level;
        st.next_scan = 0;
    }

    fn materialize(&self, st: &mut LevelState) {
        if self.mode != TraversalMode::VariableLength {
            for (offset, state) in self.visited.iter().enumerate() {
                if !matches!(state.load(Ordering::Acquire), VISITED_DST | VISITED_DST_NEW) {
                    continue;
                }
                let length = self.path_length[offset].load(Ordering::Relaxed);
                if length == UNREACHED || length < self.lower_bound || length > self.upper_bound {
                    continue;
                }
                let multiplicity = match self.mode {
                    TraversalMode::AllShortest => {
                        self.multiplicity[offset].load(Ordering::Relaxed)
                    }
                    _ => 1,
                };
                st.dst_records.push(DstRecord {
                    offset: offset as NodeOffset,
                    length,
                    multiplicity,
                });
            }
        }
        log::debug!(
            "Frontier generation {}: complete at level {}, {} destination records",
            st.generation,
            st.current_level,
            st.dst_records.len()
        );
        st.next_dst_write = 0;
        st.phase = Phase::Writing;
    }
}
