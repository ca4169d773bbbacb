// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the in-memory catalog

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Invalid table definition: {0}")]
    InvalidDefinition(String),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
