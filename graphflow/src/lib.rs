// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! GraphFlow - Morsel-driven parallel execution engine for embedded graph queries
//!
//! Every pull-based operator (table scans, introspection calls, bounded
//! traversals) implements one work contract. Coordinators partition the work
//! across a fixed pool of worker threads and merge their results.
//!
//! # Features
//!
//! - **Range morsels**: lock-free hand-out of disjoint offset ranges
//! - **Frontier tracker**: level-synchronous parallel BFS over atomic state arrays
//! - **Worker pool**: one driver clone per thread, single merge per worker
//! - **Cancellation**: one interrupt flag checked at every morsel claim
//!
//! # Usage
//!
//! ```ignore
//! use graphflow::{BindInput, CallExecutor, CatalogManager, InMemoryGraph, Value};
//!
//! let executor = CallExecutor::new(catalog, graph);
//! let rows = executor.execute(
//!     "shortest_path",
//!     &BindInput::new(vec![Value::Int64(0), Value::Int64(1), Value::Int64(3)]),
//! )?;
//! ```

pub mod catalog;
pub mod coordinator;
pub mod exec;
pub mod functions;
pub mod storage;

pub use catalog::{Catalog, CatalogManager, TableEntry, TableType};
pub use coordinator::{
    FrontierTracker, RangeMorselCoordinator, SharedCoordinatorKind, TraversalMode,
    WorkerPoolCoordinator,
};
pub use exec::{
    BindError, CallExecutor, ExecConfig, ExecutionContext, ExecutionError, OutputChunk,
    PreparedCall, PullOperator, ResultTable, Row,
};
pub use functions::{BindInput, ColumnDef, FunctionRegistry, WorkContract, WorkDescriptor};
pub use storage::{
    Direction, GraphStorage, InMemoryGraph, LogicalType, NodeOffset, StorageError, Value,
};

/// GraphFlow version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GraphFlow crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
