// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Driver operator - the pull loop over a work contract
//!
//! A driver owns one local state and pulls `step` until the contract reports
//! exhaustion. Clones share the contract, descriptor, shared coordinator and
//! row-offset counter, so running clones on several threads partitions the
//! work through the shared coordinator.

use crate::exec::chunk::OutputChunk;
use crate::exec::context::ExecutionContext;
use crate::exec::error::ExecutionError;
use crate::functions::{ColumnDef, WorkContract, WorkDescriptor};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Pull-based operator consumed by the physical plan
pub trait PullOperator: Send {
    /// Fill `out` with the next rows; `Ok(false)` once exhausted
    fn get_next(&mut self, out: &mut OutputChunk) -> Result<bool, ExecutionError>;

    /// Same execution, fresh local state
    fn clone_operator(&self) -> Box<dyn PullOperator>;

    fn progress(&self) -> f64;

    fn columns(&self) -> &[ColumnDef];

    /// Chunk sized for this operator's output
    fn new_chunk(&self) -> OutputChunk;

    fn context(&self) -> &Arc<ExecutionContext>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Pulling,
    Exhausted,
}

pub struct DriverOperator<C: WorkContract> {
    contract: Arc<C>,
    ctx: Arc<ExecutionContext>,
    descriptor: Arc<WorkDescriptor<C::BindData>>,
    shared: Arc<C::Shared>,
    next_row_offset: Arc<AtomicU64>,
    local: Option<C::Local>,
    state: DriverState,
}

impl<C: WorkContract> DriverOperator<C> {
    pub fn new(
        contract: Arc<C>,
        ctx: Arc<ExecutionContext>,
        descriptor: Arc<WorkDescriptor<C::BindData>>,
        shared: Arc<C::Shared>,
    ) -> Self {
        Self {
            contract,
            ctx,
            descriptor,
            shared,
            next_row_offset: Arc::new(AtomicU64::new(0)),
            local: None,
            state: DriverState::Idle,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn descriptor(&self) -> &WorkDescriptor<C::BindData> {
        &self.descriptor
    }

    pub fn shared(&self) -> &C::Shared {
        &self.shared
    }

    // Exhausted for good; the local state is finalized here and only here.
    fn retire(&mut self) {
        self.state = DriverState::Exhausted;
        if let Some(mut local) = self.local.take() {
            self.contract.finalize(&self.shared, &mut local);
        }
    }
}

impl<C: WorkContract> PullOperator for DriverOperator<C> {
    fn get_next(&mut self, out: &mut OutputChunk) -> Result<bool, ExecutionError> {
        match self.state {
            DriverState::Exhausted => return Ok(false),
            DriverState::Idle => {
                let local = self
                    .contract
                    .init_local(&self.ctx, &self.descriptor, &self.shared);
                self.local = Some(local);
                self.state = DriverState::Pulling;
            }
            DriverState::Pulling => {}
        }

        let Some(local) = self.local.as_mut() else {
            self.state = DriverState::Exhausted;
            return Ok(false);
        };

        out.reset();
        let produced = self
            .contract
            .step(&self.ctx, &self.descriptor, &self.shared, local, out);

        let count = match produced {
            Ok(count) => count,
            Err(e) => {
                self.retire();
                return Err(e);
            }
        };

        if count == 0 {
            self.retire();
            self.ctx.check_interrupted()?;
            return Ok(false);
        }

        debug_assert_eq!(count, out.len());
        if self.descriptor.emits_row_offsets {
            let start = self
                .next_row_offset
                .fetch_add(count as u64, Ordering::AcqRel);
            out.assign_row_offsets(start);
        }
        Ok(true)
    }

    fn clone_operator(&self) -> Box<dyn PullOperator> {
        Box::new(Self {
            contract: self.contract.clone(),
            ctx: self.ctx.clone(),
            descriptor: self.descriptor.clone(),
            shared: self.shared.clone(),
            next_row_offset: self.next_row_offset.clone(),
            local: None,
            state: DriverState::Idle,
        })
    }

    fn progress(&self) -> f64 {
        self.contract.progress(&self.shared).clamp(0.0, 1.0)
    }

    fn columns(&self) -> &[ColumnDef] {
        &self.descriptor.columns
    }

    fn new_chunk(&self) -> OutputChunk {
        OutputChunk::new(self.descriptor.columns.len(), self.ctx.config.vector_capacity)
    }

    fn context(&self) -> &Arc<ExecutionContext> {
        &self.ctx
    }
}
