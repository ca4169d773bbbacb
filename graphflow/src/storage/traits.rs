// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Read-only storage interface consumed by traversal work contracts

use super::types::{Direction, NodeOffset, StorageError};

/// Result type for storage reads
pub type StorageResult<T> = Result<T, StorageError>;

/// Iterator over neighbour offsets of a single node
pub type Neighbors<'a> = Box<dyn Iterator<Item = NodeOffset> + 'a>;

/// Transaction-scoped, read-only view of graph topology
///
/// Implementations must be safe to call from many worker threads at once.
pub trait GraphStorage: Send + Sync {
    /// Number of nodes in a node table; sizes the frontier arrays
    fn node_count(&self, table: &str) -> StorageResult<u64>;

    /// Neighbours of `offset` following `direction`
    fn neighbors(
        &self,
        table: &str,
        offset: NodeOffset,
        direction: Direction,
    ) -> StorageResult<Neighbors<'_>>;
}
