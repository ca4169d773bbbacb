// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog interface consumed by introspection call functions
//!
//! The engine only reads table metadata; creation and persistence belong to
//! the surrounding database.

use crate::storage::LogicalType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a catalog table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableType {
    Node,
    Rel,
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableType::Node => write!(f, "NODE"),
            TableType::Rel => write!(f, "REL"),
        }
    }
}

/// A property (column) of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub property_id: u32,
    pub name: String,
    pub data_type: LogicalType,
}

/// Catalog entry describing one node or rel table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    pub name: String,
    pub table_type: TableType,
    pub comment: String,
    pub properties: Vec<PropertyDef>,
    /// Primary key property name (node tables)
    pub primary_key: Option<String>,
    /// Source and destination node tables (rel tables)
    pub connection: Option<(String, String)>,
}

impl TableEntry {
    /// Create a node table entry with a primary key
    pub fn node(name: &str, primary_key: &str) -> Self {
        Self {
            name: name.to_string(),
            table_type: TableType::Node,
            comment: String::new(),
            properties: Vec::new(),
            primary_key: Some(primary_key.to_string()),
            connection: None,
        }
    }

    /// Create a rel table entry connecting two node tables
    pub fn rel(name: &str, src_table: &str, dst_table: &str) -> Self {
        Self {
            name: name.to_string(),
            table_type: TableType::Rel,
            comment: String::new(),
            properties: Vec::new(),
            primary_key: None,
            connection: Some((src_table.to_string(), dst_table.to_string())),
        }
    }

    /// Append a property; property ids follow declaration order
    pub fn with_property(mut self, name: &str, data_type: LogicalType) -> Self {
        let property_id = self.properties.len() as u32;
        self.properties.push(PropertyDef {
            property_id,
            name: name.to_string(),
            data_type,
        });
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = comment.to_string();
        self
    }

    pub fn is_primary_key(&self, property: &str) -> bool {
        self.primary_key.as_deref() == Some(property)
    }
}

/// Read-only catalog view
pub trait Catalog: Send + Sync {
    /// All table entries in creation order
    fn table_entries(&self) -> Vec<TableEntry>;

    /// Look up a table by name (case-insensitive)
    fn table(&self, name: &str) -> Option<TableEntry>;
}
