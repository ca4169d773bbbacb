// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Execution engine configuration

use crate::exec::error::ExecutionError;
use crate::storage::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rows per output chunk
pub const DEFAULT_VECTOR_CAPACITY: usize = 2048;

/// Frontier offsets handed to a worker per scan morsel
pub const DEFAULT_FRONTIER_MORSEL_SIZE: usize = 2048;

/// Path lengths are recorded as levels; 255 is the deepest level supported
pub const MAX_PATH_LENGTH: u16 = 255;

/// Configuration for parallel execution behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    /// Worker threads used by the worker pool
    pub num_threads: usize,

    /// Maximum rows a single step may produce
    pub vector_capacity: usize,

    /// Frontier offsets per scan morsel
    pub frontier_morsel_size: usize,

    /// Largest upper bound accepted by traversal calls
    pub max_path_length: u16,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            num_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            vector_capacity: DEFAULT_VECTOR_CAPACITY,
            frontier_morsel_size: DEFAULT_FRONTIER_MORSEL_SIZE,
            max_path_length: MAX_PATH_LENGTH,
        }
    }
}

impl ExecConfig {
    /// Create a single-threaded configuration
    pub fn single_threaded() -> Self {
        Self {
            num_threads: 1,
            ..Self::default()
        }
    }

    /// Create a configuration with a fixed thread count
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ExecutionError> {
        let config: ExecConfig = serde_json::from_str(json)
            .map_err(|e| ExecutionError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every knob is usable
    pub fn validate(&self) -> Result<(), ExecutionError> {
        if self.num_threads == 0 {
            return Err(ExecutionError::InvalidConfig(
                "num_threads must be at least 1".to_string(),
            ));
        }
        if self.vector_capacity == 0 {
            return Err(ExecutionError::InvalidConfig(
                "vector_capacity must be at least 1".to_string(),
            ));
        }
        if self.frontier_morsel_size == 0 {
            return Err(ExecutionError::InvalidConfig(
                "frontier_morsel_size must be at least 1".to_string(),
            ));
        }
        if self.max_path_length > MAX_PATH_LENGTH {
            return Err(ExecutionError::InvalidConfig(format!(
                "max_path_length must not exceed {}",
                MAX_PATH_LENGTH
            )));
        }
        Ok(())
    }
}

/// Settings visible to `current_setting`
///
/// Built-in entries mirror the execution config; user entries are layered
/// on top and may not shadow them.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    user: BTreeMap<String, Value>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a user option
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), ExecutionError> {
        let key = name.to_ascii_lowercase();
        if Self::BUILTIN.contains(&key.as_str()) {
            return Err(ExecutionError::InvalidConfig(format!(
                "setting '{}' is derived from the execution config",
                name
            )));
        }
        self.user.insert(key, value);
        Ok(())
    }

    const BUILTIN: [&'static str; 4] = [
        "threads",
        "vector_capacity",
        "frontier_morsel_size",
        "max_path_length",
    ];

    /// Resolve a setting against the config and user options
    pub fn get(&self, name: &str, config: &ExecConfig) -> Option<Value> {
        let key = name.to_ascii_lowercase();
        match key.as_str() {
            "threads" => Some(Value::Int64(config.num_threads as i64)),
            "vector_capacity" => Some(Value::Int64(config.vector_capacity as i64)),
            "frontier_morsel_size" => Some(Value::Int64(config.frontier_morsel_size as i64)),
            "max_path_length" => Some(Value::Int64(config.max_path_length as i64)),
            _ => self.user.get(&key).cloned(),
        }
    }
}
