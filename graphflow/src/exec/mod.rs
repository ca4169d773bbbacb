// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution engine
//!
//! Drivers pull rows from work contracts; the call executor binds a call
//! and runs its driver on the worker pool.

pub mod chunk;
pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod executor;
pub mod result;

// Re-export the main types for convenience
pub use chunk::OutputChunk;
pub use config::{ExecConfig, Settings};
pub use context::{ExecutionContext, Interrupt};
pub use driver::{DriverOperator, DriverState, PullOperator};
pub use error::{BindError, ExecutionError};
pub use executor::{CallExecutor, PreparedCall};
pub use result::{ResultTable, Row};
