// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Bounded traversal call functions backed by frontier trackers
//!
//! - CALL shortest_path(sources, lower, upper) YIELD src, dst, length [, path]
//! - CALL all_shortest_paths(sources, lower, upper) YIELD src, dst, length, num_paths
//! - CALL var_len_path(sources, lower, upper) YIELD src, dst, length, num_paths
//!
//! Options: `table`, `destinations`, `direction`, `track_path`
//! (`shortest_path` only).
//!
//! Up to one traversal per worker thread is active at a time. Sources are
//! claimed from a range morsel coordinator; a worker whose traversal has no
//! claimable work starts the next source or helps another active traversal.

use super::function_trait::{type_name, BindInput, ColumnDef, WorkContract, WorkDescriptor};
use crate::catalog::TableType;
use crate::coordinator::{
    DstRecord, FrontierClaim, FrontierScratch, FrontierTracker, RangeMorselCoordinator,
    SharedCoordinator, SharedCoordinatorKind, TraversalMode,
};
use crate::exec::chunk::OutputChunk;
use crate::exec::config::MAX_PATH_LENGTH;
use crate::exec::context::{ExecutionContext, Interrupt};
use crate::exec::error::{BindError, ExecutionError};
use crate::storage::{Direction, LogicalType, NodeOffset, StorageError, Value};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const OPTIONS: [&str; 4] = ["table", "destinations", "direction", "track_path"];

/// Validated arguments of a traversal call
#[derive(Debug, Clone, PartialEq)]
pub struct PathBindData {
    pub table: String,
    /// Distinct sources in call order
    pub sources: Vec<NodeOffset>,
    /// `None` when every node is a destination
    pub destinations: Option<Vec<NodeOffset>>,
    pub direction: Direction,
    pub lower_bound: u16,
    pub upper_bound: u16,
    /// Emit the node offsets of each path
    pub track_path: bool,
}

/// Traversal of a single source
#[derive(Debug)]
pub struct SourceTraversal {
    source: NodeOffset,
    tracker: FrontierTracker,
}

impl SourceTraversal {
    pub fn source(&self) -> NodeOffset {
        self.source
    }

    pub fn tracker(&self) -> &FrontierTracker {
        &self.tracker
    }
}

#[derive(Debug, Default)]
struct ActiveSet {
    traversals: Vec<Arc<SourceTraversal>>,
    /// Sources claimed whose tracker is still being built
    starting: usize,
    sources_drained: bool,
}

/// Shared state of one traversal call across all sources
#[derive(Debug)]
pub struct PathSharedState {
    mode: TraversalMode,
    universe: u64,
    bind_data: PathBindData,
    source_morsels: RangeMorselCoordinator,
    max_active: usize,
    active: Mutex<ActiveSet>,
    completed: AtomicUsize,
    interrupt: Interrupt,
}

impl PathSharedState {
    /// Scheduler running at most `max_active` sources at once
    pub fn new(
        mode: TraversalMode,
        universe: u64,
        bind_data: &PathBindData,
        max_active: usize,
        interrupt: Interrupt,
    ) -> Self {
        let num_sources = bind_data.sources.len() as u64;
        Self {
            mode,
            universe,
            bind_data: bind_data.clone(),
            source_morsels: RangeMorselCoordinator::with_interrupt(num_sources, interrupt.clone()),
            max_active: max_active.max(1),
            active: Mutex::new(ActiveSet::default()),
            completed: AtomicUsize::new(0),
            interrupt,
        }
    }

    pub fn max_active(&self) -> usize {
        self.max_active
    }

    pub fn num_active(&self) -> usize {
        self.active.lock().traversals.len()
    }

    pub fn num_completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Claim the next source and seed a tracker for it
    ///
    /// Returns `None` when `max_active` traversals are already running or
    /// every source has been claimed.
    pub fn start_next(&self) -> Option<Arc<SourceTraversal>> {
        let idx = {
            let mut active = self.active.lock();
            let running = active.traversals.len() + active.starting;
            if active.sources_drained || running >= self.max_active {
                return None;
            }
            let morsel = self.source_morsels.get_morsel(1);
            if morsel.is_exhausted() {
                active.sources_drained = true;
                return None;
            }
            active.starting += 1;
            morsel.start as usize
        };

        let source = self.bind_data.sources[idx];
        let mut tracker = FrontierTracker::new(
            self.mode,
            self.universe,
            self.bind_data.lower_bound,
            self.bind_data.upper_bound,
            self.interrupt.clone(),
        );
        if self.bind_data.track_path {
            tracker = tracker.with_parent_tracking();
        }
        tracker.seed(&[source], self.bind_data.destinations.as_deref());
        let traversal = Arc::new(SourceTraversal { source, tracker });

        let mut active = self.active.lock();
        active.starting -= 1;
        active.traversals.push(traversal.clone());
        log::debug!(
            "Source {} started, {} traversals active",
            source,
            active.traversals.len()
        );
        Some(traversal)
    }

    /// Active traversals, oldest first
    pub fn active(&self) -> Vec<Arc<SourceTraversal>> {
        self.active.lock().traversals.clone()
    }

    /// Drop a traversal that reported `Done`; later calls are no-ops
    pub fn retire(&self, traversal: &Arc<SourceTraversal>) {
        let mut active = self.active.lock();
        if let Some(pos) = active
            .traversals
            .iter()
            .position(|t| Arc::ptr_eq(t, traversal))
        {
            active.traversals.remove(pos);
            let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
            log::debug!(
                "Source {} done, {}/{} sources completed",
                traversal.source,
                completed,
                self.bind_data.sources.len()
            );
        }
    }

    /// No traversal is active and none can be started
    pub fn is_finished(&self) -> bool {
        let active = self.active.lock();
        active.sources_drained && active.starting == 0 && active.traversals.is_empty()
    }

    /// Completed sources plus the partial progress of active ones
    pub fn progress(&self) -> f64 {
        let total = self.bind_data.sources.len();
        if total == 0 {
            return 1.0;
        }
        let partial: f64 = self.active().iter().map(|t| t.tracker.progress()).sum();
        ((self.num_completed() as f64 + partial) / total as f64).min(1.0)
    }
}

impl SharedCoordinator for PathSharedState {
    fn kind(&self) -> SharedCoordinatorKind {
        SharedCoordinatorKind::Frontier
    }
}

/// Worker-local state of a traversal call
#[derive(Debug, Default)]
pub struct PathLocalState {
    scratch: FrontierScratch,
    current: Option<Arc<SourceTraversal>>,
}

enum PathWork {
    Scan {
        traversal: Arc<SourceTraversal>,
        level: u16,
    },
    Write {
        traversal: Arc<SourceTraversal>,
        count: usize,
    },
}

/// Traversal contract; one instance per traversal call name
pub struct PathContract {
    name: &'static str,
    mode: TraversalMode,
}

impl PathContract {
    pub fn shortest() -> Self {
        Self {
            name: "shortest_path",
            mode: TraversalMode::Shortest,
        }
    }

    pub fn all_shortest() -> Self {
        Self {
            name: "all_shortest_paths",
            mode: TraversalMode::AllShortest,
        }
    }

    pub fn variable_length() -> Self {
        Self {
            name: "var_len_path",
            mode: TraversalMode::VariableLength,
        }
    }

    pub fn mode(&self) -> TraversalMode {
        self.mode
    }

    fn columns(&self, track_path: bool) -> Vec<ColumnDef> {
        let mut columns = vec![
            ColumnDef::new("src", LogicalType::Node),
            ColumnDef::new("dst", LogicalType::Node),
            ColumnDef::new("length", LogicalType::Int64),
        ];
        if self.mode != TraversalMode::Shortest {
            columns.push(ColumnDef::new("num_paths", LogicalType::Int64));
        }
        if track_path {
            columns.push(ColumnDef::new("path", LogicalType::List));
        }
        columns
    }

    fn emit(
        &self,
        out: &mut OutputChunk,
        traversal: &SourceTraversal,
        record: &DstRecord,
        track_path: bool,
    ) -> Result<(), ExecutionError> {
        let mut row = vec![
            Value::Node(traversal.source),
            Value::Node(record.offset),
            Value::Int64(record.length as i64),
        ];
        if self.mode != TraversalMode::Shortest {
            row.push(Value::Int64(record.multiplicity.min(i64::MAX as u64) as i64));
        }
        if track_path {
            let path = traversal.tracker.path_to(record.offset).ok_or_else(|| {
                ExecutionError::RuntimeError(format!(
                    "no path recorded from {} to {}",
                    traversal.source, record.offset
                ))
            })?;
            row.push(Value::List(path.into_iter().map(Value::Node).collect()));
        }
        out.append_row(row);
        Ok(())
    }

    /// Next scan or write claim for this worker
    ///
    /// Tries the worker's own traversal, then a new source, then any other
    /// active traversal. `None` once every source is done or the execution
    /// was interrupted.
    fn next_work(
        &self,
        ctx: &ExecutionContext,
        shared: &PathSharedState,
        local: &mut PathLocalState,
        write_batch: usize,
    ) -> Option<PathWork> {
        let scan_batch = ctx.config.frontier_morsel_size;
        loop {
            if ctx.is_interrupted() {
                return None;
            }

            if let Some(traversal) = local.current.clone() {
                match traversal
                    .tracker
                    .claim(scan_batch, write_batch, &mut local.scratch)
                {
                    FrontierClaim::Scan { level, .. } => {
                        return Some(PathWork::Scan { traversal, level })
                    }
                    FrontierClaim::Write { count, .. } => {
                        return Some(PathWork::Write { traversal, count })
                    }
                    FrontierClaim::Wait => {}
                    FrontierClaim::Done { .. } => {
                        shared.retire(&traversal);
                        local.current = None;
                    }
                }
            }

            if let Some(traversal) = shared.start_next() {
                local.current = Some(traversal);
                continue;
            }

            for traversal in shared.active() {
                if local
                    .current
                    .as_ref()
                    .is_some_and(|c| Arc::ptr_eq(c, &traversal))
                {
                    continue;
                }
                match traversal
                    .tracker
                    .claim(scan_batch, write_batch, &mut local.scratch)
                {
                    FrontierClaim::Scan { level, .. } => {
                        local.current = Some(traversal.clone());
                        return Some(PathWork::Scan { traversal, level });
                    }
                    FrontierClaim::Write { count, .. } => {
                        local.current = Some(traversal.clone());
                        return Some(PathWork::Write { traversal, count });
                    }
                    FrontierClaim::Wait => {}
                    FrontierClaim::Done { .. } => shared.retire(&traversal),
                }
            }

            if shared.is_finished() {
                return None;
            }
            std::thread::yield_now();
        }
    }

    fn parse_offsets(value: &Value) -> Option<Vec<NodeOffset>> {
        match value {
            Value::List(items) => items.iter().map(Value::as_node_offset).collect(),
            other => other.as_node_offset().map(|o| vec![o]),
        }
    }

    fn bind_sources(&self, input: &BindInput) -> Result<Vec<NodeOffset>, BindError> {
        let value = &input.args[0];
        let offsets = Self::parse_offsets(value).ok_or_else(|| BindError::InvalidArgumentType {
            function: self.name.to_string(),
            message: format!(
                "sources must be a node offset or a list of node offsets, got {}",
                type_name(value)
            ),
        })?;
        let mut distinct = Vec::with_capacity(offsets.len());
        for offset in offsets {
            if !distinct.contains(&offset) {
                distinct.push(offset);
            }
        }
        Ok(distinct)
    }

    fn bind_bounds(
        &self,
        ctx: &ExecutionContext,
        input: &BindInput,
    ) -> Result<(u16, u16), BindError> {
        let lower = input.int_arg(self.name, 1)?;
        let upper = input.int_arg(self.name, 2)?;
        let max = ctx.config.max_path_length.min(MAX_PATH_LENGTH) as i64;

        let message = if lower < 0 {
            Some("lower bound must be non-negative".to_string())
        } else if lower > upper {
            Some("lower bound must not exceed upper bound".to_string())
        } else if upper > max {
            Some(format!("upper bound must not exceed {}", max))
        } else {
            None
        };
        match message {
            Some(message) => Err(BindError::InvalidPathBounds {
                lower,
                upper,
                message,
            }),
            None => Ok((lower as u16, upper as u16)),
        }
    }

    fn bind_table(&self, ctx: &ExecutionContext, input: &BindInput) -> Result<String, BindError> {
        let entry = match input.option("table") {
            Some(Value::String(name)) => ctx
                .catalog
                .table(name)
                .ok_or_else(|| BindError::TableNotFound(name.clone()))?,
            Some(other) => {
                return Err(BindError::InvalidOptionValue {
                    option: "table".to_string(),
                    message: format!("expected STRING, got {}", type_name(other)),
                })
            }
            None => ctx
                .catalog
                .table_entries()
                .into_iter()
                .find(|e| e.table_type == TableType::Node)
                .ok_or_else(|| BindError::TableNotFound("<any node table>".to_string()))?,
        };
        if entry.table_type != TableType::Node {
            return Err(BindError::InvalidTableType {
                table: entry.name,
                expected: TableType::Node.to_string(),
                actual: entry.table_type.to_string(),
            });
        }
        Ok(entry.name)
    }

    fn bind_destinations(&self, input: &BindInput) -> Result<Option<Vec<NodeOffset>>, BindError> {
        match input.option("destinations") {
            None => Ok(None),
            Some(value) => Self::parse_offsets(value).map(Some).ok_or_else(|| {
                BindError::InvalidOptionValue {
                    option: "destinations".to_string(),
                    message: format!(
                        "expected a node offset or a list of node offsets, got {}",
                        type_name(value)
                    ),
                }
            }),
        }
    }

    fn bind_direction(&self, input: &BindInput) -> Result<Direction, BindError> {
        match input.option("direction") {
            None => Ok(Direction::default()),
            Some(Value::String(s)) => s.parse().map_err(|message| BindError::InvalidOptionValue {
                option: "direction".to_string(),
                message,
            }),
            Some(other) => Err(BindError::InvalidOptionValue {
                option: "direction".to_string(),
                message: format!("expected STRING, got {}", type_name(other)),
            }),
        }
    }

    // Counting modes aggregate many paths per row, so there is no single path to emit.
    fn bind_track_path(&self, input: &BindInput) -> Result<bool, BindError> {
        let track_path = match input.option("track_path") {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(BindError::InvalidOptionValue {
                    option: "track_path".to_string(),
                    message: format!("expected BOOL, got {}", type_name(other)),
                })
            }
        };
        if track_path && self.mode != TraversalMode::Shortest {
            return Err(BindError::InvalidOptionValue {
                option: "track_path".to_string(),
                message: format!("{} does not support path tracking", self.name),
            });
        }
        Ok(track_path)
    }
}

fn check_in_range(
    table: &str,
    offsets: &[NodeOffset],
    num_nodes: u64,
) -> Result<(), StorageError> {
    match offsets.iter().find(|o| **o >= num_nodes) {
        Some(offset) => Err(StorageError::OffsetOutOfRange {
            table: table.to_string(),
            offset: *offset,
            num_nodes,
        }),
        None => Ok(()),
    }
}

impl WorkContract for PathContract {
    type BindData = PathBindData;
    type Shared = PathSharedState;
    type Local = PathLocalState;

    fn name(&self) -> &'static str {
        self.name
    }

    fn bind(
        &self,
        ctx: &ExecutionContext,
        input: &BindInput,
    ) -> Result<WorkDescriptor<PathBindData>, BindError> {
        input.expect_args(self.name, 3)?;
        input.check_options(self.name, &OPTIONS)?;

        let sources = self.bind_sources(input)?;
        let (lower_bound, upper_bound) = self.bind_bounds(ctx, input)?;
        let bind_data = PathBindData {
            table: self.bind_table(ctx, input)?,
            sources,
            destinations: self.bind_destinations(input)?,
            direction: self.bind_direction(input)?,
            lower_bound,
            upper_bound,
            track_path: self.bind_track_path(input)?,
        };
        log::debug!(
            "{}: {} sources on {} ({}), bounds [{}, {}]",
            self.name,
            bind_data.sources.len(),
            bind_data.table,
            bind_data.direction,
            lower_bound,
            upper_bound
        );
        Ok(WorkDescriptor::new(
            self.columns(bind_data.track_path),
            bind_data,
        ))
    }

    fn init_shared(
        &self,
        ctx: &ExecutionContext,
        descriptor: &WorkDescriptor<PathBindData>,
    ) -> Result<PathSharedState, ExecutionError> {
        let bind_data = &descriptor.bind_data;
        let universe = ctx.storage.node_count(&bind_data.table)?;
        check_in_range(&bind_data.table, &bind_data.sources, universe)?;
        if let Some(dsts) = &bind_data.destinations {
            check_in_range(&bind_data.table, dsts, universe)?;
        }
        let max_active = ctx.config.num_threads.min(bind_data.sources.len());
        Ok(PathSharedState::new(
            self.mode,
            universe,
            bind_data,
            max_active,
            ctx.interrupt_handle(),
        ))
    }

    fn init_local(
        &self,
        _ctx: &ExecutionContext,
        _descriptor: &WorkDescriptor<PathBindData>,
        _shared: &PathSharedState,
    ) -> PathLocalState {
        PathLocalState::default()
    }

    fn step(
        &self,
        ctx: &ExecutionContext,
        descriptor: &WorkDescriptor<PathBindData>,
        shared: &PathSharedState,
        local: &mut PathLocalState,
        out: &mut OutputChunk,
    ) -> Result<usize, ExecutionError> {
        let bind_data = &descriptor.bind_data;
        let table = bind_data.table.as_str();
        let direction = bind_data.direction;

        loop {
            match self.next_work(ctx, shared, local, out.remaining()) {
                None => return Ok(0),
                Some(PathWork::Scan { traversal, level }) => {
                    let tracker = &traversal.tracker;
                    let mut dst_found = false;
                    for &parent in &local.scratch.frontier {
                        let neighbors = match ctx.storage.neighbors(table, parent, direction) {
                            Ok(neighbors) => neighbors,
                            Err(e) => {
                                tracker.finish_scan(dst_found);
                                return Err(e.into());
                            }
                        };
                        for nbr in neighbors {
                            dst_found |= tracker.visit(level, parent, nbr);
                        }
                    }
                    tracker.finish_scan(dst_found);
                }
                Some(PathWork::Write { traversal, count }) => {
                    for record in &local.scratch.records {
                        self.emit(out, &traversal, record, bind_data.track_path)?;
                    }
                    return Ok(count);
                }
            }
        }
    }

    fn progress(&self, shared: &PathSharedState) -> f64 {
        shared.progress()
    }
}
