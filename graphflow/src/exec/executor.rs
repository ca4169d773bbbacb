// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Call executor - binds a call against the registry and runs it on the worker pool

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::coordinator::WorkerPoolCoordinator;
use crate::functions::{default_registry, BindInput, ColumnDef, FunctionRegistry};
use crate::storage::GraphStorage;

use super::config::{ExecConfig, Settings};
use super::context::{ExecutionContext, Interrupt};
use super::driver::PullOperator;
use super::error::ExecutionError;
use super::result::ResultTable;

/// Entry point for executing table function calls
pub struct CallExecutor {
    registry: Arc<FunctionRegistry>,
    catalog: Arc<dyn Catalog>,
    storage: Arc<dyn GraphStorage>,
    config: ExecConfig,
    settings: Settings,
}

impl CallExecutor {
    /// Create an executor with the built-in functions and default config
    pub fn new(catalog: Arc<dyn Catalog>, storage: Arc<dyn GraphStorage>) -> Self {
        Self {
            registry: default_registry(),
            catalog,
            storage,
            config: ExecConfig::default(),
            settings: Settings::new(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<FunctionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: ExecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExecConfig {
        &self.config
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Bind `name` and build its driver without running it
    ///
    /// Every bind error surfaces here, before any worker starts.
    pub fn prepare(&self, name: &str, input: &BindInput) -> Result<PreparedCall, ExecutionError> {
        self.config.validate()?;
        let ctx = Arc::new(
            ExecutionContext::new(self.catalog.clone(), self.storage.clone())
                .with_config(self.config.clone())
                .with_settings(self.settings.clone()),
        );
        let function = self.registry.lookup(name)?;
        log::debug!("Query {}: binding {}", ctx.query_id, name);
        let driver = function.bind_call(&ctx, input)?;

        Ok(PreparedCall {
            ctx,
            driver,
            num_threads: self.config.num_threads,
        })
    }

    /// Bind and run `name`, returning every produced row
    pub fn execute(&self, name: &str, input: &BindInput) -> Result<ResultTable, ExecutionError> {
        self.prepare(name, input)?.run()
    }
}

/// A bound call ready to run
pub struct PreparedCall {
    ctx: Arc<ExecutionContext>,
    driver: Box<dyn PullOperator>,
    num_threads: usize,
}

impl PreparedCall {
    pub fn context(&self) -> &Arc<ExecutionContext> {
        &self.ctx
    }

    pub fn columns(&self) -> &[ColumnDef] {
        self.driver.columns()
    }

    /// Handle that cancels this call from another thread
    pub fn interrupt_handle(&self) -> Interrupt {
        self.ctx.interrupt_handle()
    }

    pub fn progress(&self) -> f64 {
        self.driver.progress()
    }

    /// Take the driver for manual pulling
    pub fn into_driver(self) -> Box<dyn PullOperator> {
        self.driver
    }

    /// Run on the configured number of workers
    pub fn run(self) -> Result<ResultTable, ExecutionError> {
        WorkerPoolCoordinator::execute(self.driver, self.num_threads)
    }
}
