// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory graph cache implementation
//!
//! Provides adjacency lists per node table for efficient neighbour scans.
//! Node identity is the dense offset `0..num_nodes` inside each table.

use super::traits::{GraphStorage, Neighbors, StorageResult};
use super::types::{Direction, NodeOffset, StorageError};
use std::collections::HashMap;

/// Adjacency lists of one node table
#[derive(Debug, Clone, Default)]
struct AdjacencyTable {
    /// Adjacency list: node offset -> outgoing neighbours
    adjacency_out: Vec<Vec<NodeOffset>>,

    /// Adjacency list: node offset -> incoming neighbours
    adjacency_in: Vec<Vec<NodeOffset>>,
}

impl AdjacencyTable {
    fn with_nodes(num_nodes: u64) -> Self {
        let num_nodes = num_nodes as usize;
        Self {
            adjacency_out: vec![Vec::new(); num_nodes],
            adjacency_in: vec![Vec::new(); num_nodes],
        }
    }

    fn num_nodes(&self) -> u64 {
        self.adjacency_out.len() as u64
    }
}

/// In-memory graph with one adjacency table per node table
///
/// Edges always connect nodes of the same table. Built single-threaded,
/// then shared read-only (typically behind an `Arc`).
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraph {
    tables: HashMap<String, AdjacencyTable>,
}

impl InMemoryGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// Build a single-table graph from an edge list
    pub fn from_edges(
        table: &str,
        num_nodes: u64,
        edges: &[(NodeOffset, NodeOffset)],
    ) -> Result<Self, StorageError> {
        let mut graph = Self::new();
        graph.add_node_table(table, num_nodes);
        for &(src, dst) in edges {
            graph.add_edge(table, src, dst)?;
        }
        Ok(graph)
    }

    /// Add (or replace) a node table with `num_nodes` isolated nodes
    pub fn add_node_table(&mut self, table: &str, num_nodes: u64) {
        self.tables
            .insert(table.to_string(), AdjacencyTable::with_nodes(num_nodes));
    }

    /// Add a directed edge between two nodes of `table`
    pub fn add_edge(
        &mut self,
        table: &str,
        src: NodeOffset,
        dst: NodeOffset,
    ) -> Result<(), StorageError> {
        let adjacency = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))?;

        let num_nodes = adjacency.num_nodes();
        for offset in [src, dst] {
            if offset >= num_nodes {
                return Err(StorageError::OffsetOutOfRange {
                    table: table.to_string(),
                    offset,
                    num_nodes,
                });
            }
        }

        adjacency.adjacency_out[src as usize].push(dst);
        adjacency.adjacency_in[dst as usize].push(src);
        Ok(())
    }

    /// Number of edges stored in `table`
    pub fn edge_count(&self, table: &str) -> usize {
        self.tables
            .get(table)
            .map(|t| t.adjacency_out.iter().map(Vec::len).sum())
            .unwrap_or(0)
    }

    fn table(&self, table: &str) -> StorageResult<&AdjacencyTable> {
        self.tables
            .get(table)
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))
    }
}

impl GraphStorage for InMemoryGraph {
    fn node_count(&self, table: &str) -> StorageResult<u64> {
        Ok(self.table(table)?.num_nodes())
    }

    fn neighbors(
        &self,
        table: &str,
        offset: NodeOffset,
        direction: Direction,
    ) -> StorageResult<Neighbors<'_>> {
        let adjacency = self.table(table)?;
        let idx = offset as usize;
        if offset >= adjacency.num_nodes() {
            return Err(StorageError::OffsetOutOfRange {
                table: table.to_string(),
                offset,
                num_nodes: adjacency.num_nodes(),
            });
        }

        let out = adjacency.adjacency_out[idx].iter().copied();
        let inc = adjacency.adjacency_in[idx].iter().copied();
        Ok(match direction {
            Direction::Forward => Box::new(out),
            Direction::Backward => Box::new(inc),
            Direction::Both => Box::new(out.chain(inc)),
        })
    }
}
