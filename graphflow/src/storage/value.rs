// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Value type system for call arguments and result rows
//!
//! Supports the types produced by table functions and traversals:
//! - Basic types: String, Int64, Double, Boolean, Null
//! - Graph types: Node (internal node offset)
//! - Collections: List

use crate::storage::types::NodeOffset;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical column types of a work descriptor's output schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalType {
    Bool,
    Int64,
    Double,
    String,
    Node,
    List,
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogicalType::Bool => "BOOL",
            LogicalType::Int64 => "INT64",
            LogicalType::Double => "DOUBLE",
            LogicalType::String => "STRING",
            LogicalType::Node => "NODE",
            LogicalType::List => "LIST",
        };
        write!(f, "{}", name)
    }
}

/// Values flowing through output chunks and result tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int64(i64),
    Double(f64),
    String(String),
    /// Internal offset of a node within its table
    Node(NodeOffset),
    List(Vec<Value>),
}

impl Value {
    /// Get the logical type of this value, `None` for NULL
    pub fn logical_type(&self) -> Option<LogicalType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(LogicalType::Bool),
            Value::Int64(_) => Some(LogicalType::Int64),
            Value::Double(_) => Some(LogicalType::Double),
            Value::String(_) => Some(LogicalType::String),
            Value::Node(_) => Some(LogicalType::Node),
            Value::List(_) => Some(LogicalType::List),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Interpret this value as a node offset
    ///
    /// Accepts both `Node` values and non-negative integers, since binders
    /// commonly pass raw offsets as integer literals.
    pub fn as_node_offset(&self) -> Option<NodeOffset> {
        match self {
            Value::Node(offset) => Some(*offset),
            Value::Int64(v) if *v >= 0 => Some(*v as NodeOffset),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::Node(offset) => write!(f, "#{}", offset),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
