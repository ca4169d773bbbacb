// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Shared coordinators - how work is partitioned across worker threads
//!
//! - [`RangeMorselCoordinator`]: disjoint offset ranges from a bounded domain
//! - [`FrontierTracker`]: level-synchronous bounded BFS state
//! - [`WorkerPoolCoordinator`]: runs driver clones and merges their rows

pub mod frontier;
pub mod morsel;
pub mod worker_pool;

pub use frontier::{DstRecord, FrontierClaim, FrontierScratch, FrontierTracker, TraversalMode};
pub use morsel::{Morsel, RangeMorselCoordinator};
pub use worker_pool::{WorkerId, WorkerPoolCoordinator};

use std::fmt;

/// The closed set of shared coordinator variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SharedCoordinatorKind {
    RangeMorsel,
    Frontier,
    WorkerPool,
}

impl fmt::Display for SharedCoordinatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SharedCoordinatorKind::RangeMorsel => "range-morsel",
            SharedCoordinatorKind::Frontier => "frontier",
            SharedCoordinatorKind::WorkerPool => "worker-pool",
        };
        f.write_str(name)
    }
}

/// State shared by every driver clone of one execution
pub trait SharedCoordinator: Send + Sync {
    fn kind(&self) -> SharedCoordinatorKind;
}

impl SharedCoordinator for RangeMorselCoordinator {
    fn kind(&self) -> SharedCoordinatorKind {
        SharedCoordinatorKind::RangeMorsel
    }
}

impl SharedCoordinator for FrontierTracker {
    fn kind(&self) -> SharedCoordinatorKind {
        SharedCoordinatorKind::Frontier
    }
}
