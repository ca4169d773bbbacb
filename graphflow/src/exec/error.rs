// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution error types

use crate::storage::StorageError;
use thiserror::Error;

/// Errors raised while binding a call, before any step runs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindError {
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Invalid argument count for {function}: expected {expected}, got {actual}")]
    InvalidArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid argument type for {function}: {message}")]
    InvalidArgumentType { function: String, message: String },

    #[error("Unknown option for {function}: {option}")]
    UnknownOption { function: String, option: String },

    #[error("Invalid value for option {option}: {message}")]
    InvalidOptionValue { option: String, message: String },

    #[error("Invalid path bounds [{lower}, {upper}]: {message}")]
    InvalidPathBounds {
        lower: i64,
        upper: i64,
        message: String,
    },

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table {table} has type {actual}, expected {expected}")]
    InvalidTableType {
        table: String,
        expected: String,
        actual: String,
    },

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),
}

/// Execution errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Bind error: {0}")]
    Bind(#[from] BindError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Runtime error: {0}")]
    RuntimeError(String),

    #[error("Execution interrupted")]
    Interrupted,

    #[error("Worker {worker} panicked: {message}")]
    WorkerPanicked { worker: usize, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ExecutionError {
    /// Whether this error was raised during bind
    pub fn is_bind_error(&self) -> bool {
        matches!(self, ExecutionError::Bind(_))
    }
}
