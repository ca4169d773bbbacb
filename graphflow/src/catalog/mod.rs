// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog collaborator
//!
//! Table metadata read by the introspection call functions
//! (`show_tables`, `table_info`, `show_connection`).

pub mod error;
pub mod manager;
pub mod traits;

pub use error::{CatalogError, CatalogResult};
pub use manager::CatalogManager;
pub use traits::{Catalog, PropertyDef, TableEntry, TableType};
