// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Node offset space, traversal direction and storage error types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Position of a node inside its node table
pub type NodeOffset = u64;

/// Reserved offset meaning "no offset" / exhausted
pub const INVALID_OFFSET: NodeOffset = u64::MAX;

/// Error types for storage reads issued by the execution engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Node offset {offset} out of range for table {table} ({num_nodes} nodes)")]
    OffsetOutOfRange {
        table: String,
        offset: NodeOffset,
        num_nodes: u64,
    },

    #[error("Read failure: {0}")]
    ReadFailure(String),
}

/// Which adjacency list a neighbour scan follows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Outgoing edges (src -> dst)
    #[default]
    Forward,
    /// Incoming edges (dst -> src)
    Backward,
    /// Both adjacency lists
    Both,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "fwd"),
            Direction::Backward => write!(f, "bwd"),
            Direction::Both => write!(f, "both"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fwd" | "forward" | "out" => Ok(Direction::Forward),
            "bwd" | "backward" | "in" => Ok(Direction::Backward),
            "both" | "any" => Ok(Direction::Both),
            other => Err(format!(
                "unknown direction '{}', expected one of fwd, bwd, both",
                other
            )),
        }
    }
}
