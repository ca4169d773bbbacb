// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory catalog manager
//!
//! Holds table entries behind a `parking_lot::RwLock`. Readers (call
//! functions during bind) never block each other.

use super::error::{CatalogError, CatalogResult};
use super::traits::{Catalog, TableEntry, TableType};
use parking_lot::RwLock;

/// In-memory catalog of node and rel tables
#[derive(Debug, Default)]
pub struct CatalogManager {
    tables: RwLock<Vec<TableEntry>>,
}

impl CatalogManager {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Vec::new()),
        }
    }

    /// Register a table entry
    ///
    /// Rel tables must reference node tables that already exist.
    pub fn create_table(&self, entry: TableEntry) -> CatalogResult<()> {
        let mut tables = self.tables.write();

        if tables
            .iter()
            .any(|t| t.name.eq_ignore_ascii_case(&entry.name))
        {
            return Err(CatalogError::TableAlreadyExists(entry.name));
        }

        if let Some(pk) = &entry.primary_key {
            if !entry.properties.iter().any(|p| &p.name == pk) {
                return Err(CatalogError::InvalidDefinition(format!(
                    "primary key '{}' is not a property of table '{}'",
                    pk, entry.name
                )));
            }
        }

        if let Some((src, dst)) = &entry.connection {
            for node_table in [src, dst] {
                let exists = tables.iter().any(|t| {
                    t.table_type == TableType::Node && t.name.eq_ignore_ascii_case(node_table)
                });
                if !exists {
                    return Err(CatalogError::TableNotFound(node_table.clone()));
                }
            }
        }

        log::debug!("Catalog: created {} table '{}'", entry.table_type, entry.name);
        tables.push(entry);
        Ok(())
    }

    /// Remove a table entry
    pub fn drop_table(&self, name: &str) -> CatalogResult<()> {
        let mut tables = self.tables.write();
        let idx = tables
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| CatalogError::TableNotFound(name.to_string()))?;
        tables.remove(idx);
        Ok(())
    }

    pub fn table_count(&self) -> usize {
        self.tables.read().len()
    }
}

impl Catalog for CatalogManager {
    fn table_entries(&self) -> Vec<TableEntry> {
        self.tables.read().clone()
    }

    fn table(&self, name: &str) -> Option<TableEntry> {
        self.tables
            .read()
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .cloned()
    }
}
