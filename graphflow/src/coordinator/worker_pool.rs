// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Worker pool coordinator
//!
//! Runs one driver clone per worker thread. Each worker accumulates rows in
//! a private table without locking and merges it into the shared table
//! exactly once, under the merge mutex, when its driver is exhausted.

use super::{SharedCoordinator, SharedCoordinatorKind};
use crate::exec::context::Interrupt;
use crate::exec::driver::PullOperator;
use crate::exec::error::ExecutionError;
use crate::exec::result::ResultTable;
use crate::functions::ColumnDef;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub type WorkerId = usize;

#[derive(Debug)]
pub struct WorkerPoolCoordinator {
    /// Shared result table; its mutex is the merge lock
    result: Mutex<ResultTable>,
    next_worker_id: AtomicUsize,
    terminated: AtomicBool,
    interrupt: Interrupt,
    first_error: Mutex<Option<ExecutionError>>,
}

impl WorkerPoolCoordinator {
    pub fn new(columns: Vec<ColumnDef>, interrupt: Interrupt) -> Self {
        Self {
            result: Mutex::new(ResultTable::new(columns)),
            next_worker_id: AtomicUsize::new(0),
            terminated: AtomicBool::new(false),
            interrupt,
            first_error: Mutex::new(None),
        }
    }

    pub fn register_worker(&self) -> WorkerId {
        self.next_worker_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn num_workers(&self) -> usize {
        self.next_worker_id.load(Ordering::Relaxed)
    }

    /// Stop all workers at their next pull
    pub fn terminate(&self) {
        if !self.terminated.swap(true, Ordering::AcqRel) {
            log::warn!("Worker pool terminated");
        }
        self.interrupt.raise();
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// Pull `driver` until exhausted and merge its rows
    ///
    /// Returns the number of rows this worker merged.
    pub fn run(
        &self,
        worker: WorkerId,
        driver: &mut dyn PullOperator,
    ) -> Result<usize, ExecutionError> {
        let mut local = ResultTable::new(driver.columns().to_vec());
        let mut chunk = driver.new_chunk();

        loop {
            if self.is_terminated() {
                return Err(ExecutionError::Interrupted);
            }
            if !driver.get_next(&mut chunk)? {
                break;
            }
            local.append_chunk(&chunk);
        }

        let merged = local.len();
        let mut shared = self.result.lock();
        shared.merge(&mut local);
        log::debug!(
            "Worker {} merged {} rows, {} total",
            worker,
            merged,
            shared.len()
        );
        Ok(merged)
    }

    /// Record a worker failure; only the first one is kept
    pub fn fail(&self, worker: WorkerId, error: ExecutionError) {
        {
            let mut first = self.first_error.lock();
            if first.is_none() {
                log::warn!("Worker {} failed: {}", worker, error);
                *first = Some(error);
            }
        }
        self.terminate();
    }

    /// Rows merged so far
    pub fn merged_rows(&self) -> usize {
        self.result.lock().len()
    }

    /// Final table, or the first error any worker hit
    pub fn into_result(self) -> Result<ResultTable, ExecutionError> {
        match self.first_error.into_inner() {
            Some(error) => Err(error),
            None => Ok(self.result.into_inner()),
        }
    }

    /// Run `driver` on `num_threads` workers and collect every row
    pub fn execute(
        driver: Box<dyn PullOperator>,
        num_threads: usize,
    ) -> Result<ResultTable, ExecutionError> {
        let num_threads = num_threads.max(1);
        let ctx = driver.context().clone();
        let coordinator = Self::new(driver.columns().to_vec(), ctx.interrupt_handle());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("graphflow-worker-{}", i))
            .build()
            .map_err(|e| {
                ExecutionError::RuntimeError(format!("Failed to build worker pool: {}", e))
            })?;

        let mut drivers: Vec<Box<dyn PullOperator>> = Vec::with_capacity(num_threads);
        for _ in 1..num_threads {
            drivers.push(driver.clone_operator());
        }
        drivers.push(driver);

        log::info!(
            "Query {}: executing on {} workers",
            ctx.query_id,
            num_threads
        );

        pool.scope(|scope| {
            for mut worker_driver in drivers {
                let coordinator = &coordinator;
                scope.spawn(move |_| {
                    let worker = coordinator.register_worker();
                    let outcome = catch_unwind(AssertUnwindSafe(|| {
                        coordinator.run(worker, worker_driver.as_mut())
                    }));
                    match outcome {
                        Ok(Ok(_)) => {}
                        Ok(Err(error)) => coordinator.fail(worker, error),
                        Err(payload) => coordinator.fail(
                            worker,
                            ExecutionError::WorkerPanicked {
                                worker,
                                message: panic_message(payload.as_ref()),
                            },
                        ),
                    }
                });
            }
        });

        let result = coordinator.into_result();
        match &result {
            Ok(table) => log::info!("Query {}: finished with {} rows", ctx.query_id, table.len()),
            Err(e) => log::warn!("Query {}: failed: {}", ctx.query_id, e),
        }
        result
    }
}

impl SharedCoordinator for WorkerPoolCoordinator {
    fn kind(&self) -> SharedCoordinatorKind {
        SharedCoordinatorKind::WorkerPool
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::chunk::OutputChunk;
    use crate::exec::context::ExecutionContext;
    use crate::storage::{LogicalType, Value};
    use std::sync::atomic::AtomicU64;
    use std::sync::Arc;

    /// Emits the integers `[0, total)`, `per_pull` at a time, shared across clones
    struct Counter {
        ctx: Arc<ExecutionContext>,
        next: Arc<AtomicU64>,
        total: u64,
        per_pull: u64,
        fail_at: Option<u64>,
        columns: Vec<ColumnDef>,
    }

    impl PullOperator for Counter {
        fn get_next(&mut self, out: &mut OutputChunk) -> Result<bool, ExecutionError> {
            out.reset();
            let start = self.next.fetch_add(self.per_pull, Ordering::Relaxed);
            if start >= self.total {
                return Ok(false);
            }
            if let Some(at) = self.fail_at {
                if start >= at {
                    return Err(ExecutionError::RuntimeError("boom".to_string()));
                }
            }
            for v in start..(start + self.per_pull).min(self.total) {
                out.append_row([Value::Int64(v as i64)]);
            }
            Ok(true)
        }

        fn clone_operator(&self) -> Box<dyn PullOperator> {
            Box::new(Counter {
                ctx: self.ctx.clone(),
                next: self.next.clone(),
                total: self.total,
                per_pull: self.per_pull,
                fail_at: self.fail_at,
                columns: self.columns.clone(),
            })
        }

        fn progress(&self) -> f64 {
            0.0
        }

        fn columns(&self) -> &[ColumnDef] {
            &self.columns
        }

        fn new_chunk(&self) -> OutputChunk {
            OutputChunk::new(1, self.per_pull as usize)
        }

        fn context(&self) -> &Arc<ExecutionContext> {
            &self.ctx
        }
    }

    fn counter(total: u64, fail_at: Option<u64>) -> Box<dyn PullOperator> {
        Box::new(Counter {
            ctx: Arc::new(ExecutionContext::empty()),
            next: Arc::new(AtomicU64::new(0)),
            total,
            per_pull: 7,
            fail_at,
            columns: vec![ColumnDef::new("v", LogicalType::Int64)],
        })
    }

    #[test]
    fn test_merge_is_complete() {
        let table = WorkerPoolCoordinator::execute(counter(10_000, None), 8).unwrap();
        let mut values: Vec<i64> = table
            .rows
            .iter()
            .map(|r| r.values[0].as_i64().unwrap())
            .collect();
        values.sort_unstable();
        assert_eq!(values, (0..10_000).collect::<Vec<_>>());
    }

    #[test]
    fn test_run_merges_once_per_worker() {
        let coordinator = WorkerPoolCoordinator::new(
            vec![ColumnDef::new("v", LogicalType::Int64)],
            Interrupt::new(),
        );
        let mut driver = counter(20, None);
        let worker = coordinator.register_worker();
        assert_eq!(coordinator.run(worker, driver.as_mut()).unwrap(), 20);
        assert_eq!(coordinator.merged_rows(), 20);
        assert_eq!(coordinator.num_workers(), 1);
    }

    #[test]
    fn test_first_error_is_returned() {
        let err = WorkerPoolCoordinator::execute(counter(100_000, Some(500)), 4).unwrap_err();
        assert_eq!(err, ExecutionError::RuntimeError("boom".to_string()));
    }

    #[test]
    fn test_terminate_raises_interrupt() {
        let interrupt = Interrupt::new();
        let coordinator = WorkerPoolCoordinator::new(Vec::new(), interrupt.clone());
        coordinator.terminate();
        assert!(coordinator.is_terminated());
        assert!(interrupt.is_raised());

        let mut driver = counter(10, None);
        assert_eq!(
            coordinator.run(0, driver.as_mut()),
            Err(ExecutionError::Interrupted)
        );
    }
}
