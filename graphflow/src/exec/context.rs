// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution context shared by every driver clone of one query

use crate::catalog::{Catalog, CatalogManager};
use crate::exec::config::{ExecConfig, Settings};
use crate::exec::error::ExecutionError;
use crate::storage::{GraphStorage, InMemoryGraph};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Shared cancellation flag, checked at every morsel-claim point
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request all workers to stop claiming work
    pub fn raise(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

pub struct ExecutionContext {
    /// Query id used to correlate log lines
    pub query_id: Uuid,
    pub config: ExecConfig,
    pub settings: Settings,
    pub catalog: Arc<dyn Catalog>,
    pub storage: Arc<dyn GraphStorage>,
    interrupt: Interrupt,
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("query_id", &self.query_id)
            .field("config", &self.config)
            .field("interrupted", &self.interrupt.is_raised())
            .finish()
    }
}

impl ExecutionContext {
    /// Create a new execution context over a catalog and storage view
    pub fn new(catalog: Arc<dyn Catalog>, storage: Arc<dyn GraphStorage>) -> Self {
        Self {
            query_id: Uuid::new_v4(),
            config: ExecConfig::default(),
            settings: Settings::new(),
            catalog,
            storage,
            interrupt: Interrupt::new(),
        }
    }

    /// Context over an empty catalog and empty graph
    pub fn empty() -> Self {
        Self::new(
            Arc::new(CatalogManager::new()),
            Arc::new(InMemoryGraph::new()),
        )
    }

    pub fn with_config(mut self, config: ExecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Handle to this execution's cancellation flag
    pub fn interrupt_handle(&self) -> Interrupt {
        self.interrupt.clone()
    }

    /// Stop the execution at the next morsel claim
    pub fn interrupt(&self) {
        log::warn!("Query {}: interrupt requested", self.query_id);
        self.interrupt.raise();
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupt.is_raised()
    }

    /// Fail with `Interrupted` once the execution was cancelled
    pub fn check_interrupted(&self) -> Result<(), ExecutionError> {
        if self.is_interrupted() {
            Err(ExecutionError::Interrupted)
        } else {
            Ok(())
        }
    }
}
