// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage collaborator interface for the execution engine
//!
//! This module provides:
//! - Value type system for arguments and result rows
//! - The read-only `GraphStorage` trait traversals depend on
//! - An in-memory adjacency-list implementation for embedding and tests

pub mod graph_cache;
pub mod traits;
pub mod types;
pub mod value;

pub use graph_cache::InMemoryGraph;
pub use traits::{GraphStorage, Neighbors, StorageResult};
pub use types::{Direction, NodeOffset, StorageError, INVALID_OFFSET};
pub use value::{LogicalType, Value};
