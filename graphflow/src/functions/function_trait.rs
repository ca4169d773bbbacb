// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Work contract trait for pull-based row producers
//!
//! Every table function, introspection call and traversal implements
//! [`WorkContract`]. A contract is bound once per call, builds one shared
//! coordinator, and then runs `step` from any number of driver clones, each
//! with its own local state.

use crate::coordinator::SharedCoordinator;
use crate::exec::chunk::OutputChunk;
use crate::exec::context::ExecutionContext;
use crate::exec::driver::{DriverOperator, PullOperator};
use crate::exec::error::{BindError, ExecutionError};
use crate::storage::{LogicalType, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// One output column of a work descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: LogicalType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Arguments and named options handed over by the binder
///
/// Option names are case-insensitive and stored lowercase.
#[derive(Debug, Clone, Default)]
pub struct BindInput {
    pub args: Vec<Value>,
    options: HashMap<String, Value>,
}

impl BindInput {
    pub fn new(args: Vec<Value>) -> Self {
        Self {
            args,
            options: HashMap::new(),
        }
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Check that exactly `expected` positional arguments were passed
    pub fn expect_args(&self, function: &str, expected: usize) -> Result<(), BindError> {
        if self.args.len() != expected {
            return Err(BindError::InvalidArgumentCount {
                function: function.to_string(),
                expected,
                actual: self.args.len(),
            });
        }
        Ok(())
    }

    /// Positional argument that must be a string
    pub fn string_arg(&self, function: &str, idx: usize) -> Result<&str, BindError> {
        match self.args.get(idx) {
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(BindError::InvalidArgumentType {
                function: function.to_string(),
                message: format!(
                    "argument {} must be STRING, got {}",
                    idx + 1,
                    type_name(other)
                ),
            }),
            None => Err(BindError::InvalidArgumentCount {
                function: function.to_string(),
                expected: idx + 1,
                actual: self.args.len(),
            }),
        }
    }

    /// Positional argument that must be an integer
    pub fn int_arg(&self, function: &str, idx: usize) -> Result<i64, BindError> {
        match self.args.get(idx) {
            Some(Value::Int64(v)) => Ok(*v),
            Some(other) => Err(BindError::InvalidArgumentType {
                function: function.to_string(),
                message: format!(
                    "argument {} must be INT64, got {}",
                    idx + 1,
                    type_name(other)
                ),
            }),
            None => Err(BindError::InvalidArgumentCount {
                function: function.to_string(),
                expected: idx + 1,
                actual: self.args.len(),
            }),
        }
    }

    /// Reject options that are not in `allowed`
    pub fn check_options(&self, function: &str, allowed: &[&str]) -> Result<(), BindError> {
        let mut names: Vec<&String> = self.options.keys().collect();
        names.sort();
        for name in names {
            if !allowed.contains(&name.as_str()) {
                return Err(BindError::UnknownOption {
                    function: function.to_string(),
                    option: name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(&name.to_ascii_lowercase())
    }
}

pub(crate) fn type_name(value: &Value) -> String {
    value
        .logical_type()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "NULL".to_string())
}

/// Immutable result of bind, shared by every driver clone
#[derive(Debug, Clone)]
pub struct WorkDescriptor<B> {
    /// Output columns in order
    pub columns: Vec<ColumnDef>,
    /// Upper bound on produced rows, `None` when unknown
    pub max_rows: Option<u64>,
    /// Whether the driver assigns global row offsets to produced rows
    pub emits_row_offsets: bool,
    /// Algorithm-specific bind data
    pub bind_data: B,
}

impl<B> WorkDescriptor<B> {
    pub fn new(columns: Vec<ColumnDef>, bind_data: B) -> Self {
        Self {
            columns,
            max_rows: None,
            emits_row_offsets: false,
            bind_data,
        }
    }

    pub fn with_max_rows(mut self, max_rows: u64) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn with_row_offsets(mut self) -> Self {
        self.emits_row_offsets = true;
        self
    }
}

/// Core trait for every pull-based row producer
pub trait WorkContract: Send + Sync + 'static {
    type BindData: Send + Sync + 'static;
    type Shared: SharedCoordinator + 'static;
    type Local: Send + 'static;

    /// Lowercase call name
    fn name(&self) -> &'static str;

    /// Validate arguments and options and derive the output schema
    fn bind(
        &self,
        ctx: &ExecutionContext,
        input: &BindInput,
    ) -> Result<WorkDescriptor<Self::BindData>, BindError>;

    /// Build the shared coordinator for one execution
    fn init_shared(
        &self,
        ctx: &ExecutionContext,
        descriptor: &WorkDescriptor<Self::BindData>,
    ) -> Result<Self::Shared, ExecutionError>;

    /// Build per-worker scratch state
    fn init_local(
        &self,
        ctx: &ExecutionContext,
        descriptor: &WorkDescriptor<Self::BindData>,
        shared: &Self::Shared,
    ) -> Self::Local;

    /// Produce up to `out.capacity()` rows; `Ok(0)` means this pairing is exhausted
    fn step(
        &self,
        ctx: &ExecutionContext,
        descriptor: &WorkDescriptor<Self::BindData>,
        shared: &Self::Shared,
        local: &mut Self::Local,
        out: &mut OutputChunk,
    ) -> Result<usize, ExecutionError>;

    /// Fraction of the total work claimed so far
    fn progress(&self, _shared: &Self::Shared) -> f64 {
        0.0
    }

    /// Called once per local state after it is exhausted
    fn finalize(&self, _shared: &Self::Shared, _local: &mut Self::Local) {}
}

/// Type-erased entry point stored in the function registry
pub trait TableFunction: Send + Sync {
    fn name(&self) -> &str;

    /// Bind the call and return a driver ready to be pulled or cloned
    fn bind_call(
        &self,
        ctx: &Arc<ExecutionContext>,
        input: &BindInput,
    ) -> Result<Box<dyn PullOperator>, ExecutionError>;
}

/// Adapter turning a [`WorkContract`] into a [`TableFunction`]
pub struct ContractFunction<C: WorkContract> {
    contract: Arc<C>,
}

impl<C: WorkContract> ContractFunction<C> {
    pub fn new(contract: C) -> Self {
        Self {
            contract: Arc::new(contract),
        }
    }
}

impl<C: WorkContract> TableFunction for ContractFunction<C> {
    fn name(&self) -> &str {
        self.contract.name()
    }

    fn bind_call(
        &self,
        ctx: &Arc<ExecutionContext>,
        input: &BindInput,
    ) -> Result<Box<dyn PullOperator>, ExecutionError> {
        let descriptor = self.contract.bind(ctx, input)?;
        log::debug!(
            "Query {}: bound {} with {} output columns",
            ctx.query_id,
            self.contract.name(),
            descriptor.columns.len()
        );
        let shared = self.contract.init_shared(ctx, &descriptor)?;
        log::debug!(
            "Query {}: {} runs on a {} coordinator",
            ctx.query_id,
            self.contract.name(),
            shared.kind()
        );
        Ok(Box::new(DriverOperator::new(
            self.contract.clone(),
            ctx.clone(),
            Arc::new(descriptor),
            Arc::new(shared),
        )))
    }
}
