// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Table function system
//!
//! Every call function is a [`WorkContract`]. Add a new one by implementing
//! the trait and registering it in [`FunctionRegistry::with_builtins`].

mod call_functions;
mod function_trait;
mod path_functions;

pub use call_functions::{
    BoundRows, CurrentSetting, DbVersion, RowsContract, RowsFunction, ScanBindData, ScanNodes,
    ShowConnection, ShowTables, TableInfo,
};
pub use function_trait::{
    BindInput, ColumnDef, ContractFunction, TableFunction, WorkContract, WorkDescriptor,
};
pub use path_functions::{PathBindData, PathContract, PathSharedState, SourceTraversal};

use crate::exec::error::BindError;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// Process-wide registry holding the built-in functions
static DEFAULT_REGISTRY: Lazy<Arc<FunctionRegistry>> =
    Lazy::new(|| Arc::new(FunctionRegistry::with_builtins()));

/// Shared handle to the built-in registry
pub fn default_registry() -> Arc<FunctionRegistry> {
    DEFAULT_REGISTRY.clone()
}

/// Registry of all available table functions
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn TableFunction>>,
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Create a registry with every built-in function
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        // Introspection
        registry.register_contract(RowsContract(DbVersion));
        registry.register_contract(RowsContract(CurrentSetting));
        registry.register_contract(RowsContract(ShowTables));
        registry.register_contract(RowsContract(TableInfo));
        registry.register_contract(RowsContract(ShowConnection));

        // Scans
        registry.register_contract(ScanNodes);

        // Traversals
        registry.register_contract(PathContract::shortest());
        registry.register_contract(PathContract::all_shortest());
        registry.register_contract(PathContract::variable_length());

        registry
    }

    /// Register a function under its own name, replacing any previous one
    pub fn register(&mut self, function: Arc<dyn TableFunction>) {
        let name = function.name().to_ascii_lowercase();
        self.functions.insert(name, function);
    }

    pub fn register_contract<C: WorkContract>(&mut self, contract: C) {
        self.register(Arc::new(ContractFunction::new(contract)));
    }

    /// Get a function by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<Arc<dyn TableFunction>> {
        self.functions.get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<dyn TableFunction>, BindError> {
        self.get(name)
            .ok_or_else(|| BindError::UnknownFunction(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_ascii_lowercase())
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = FunctionRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec![
                "all_shortest_paths",
                "current_setting",
                "db_version",
                "scan_nodes",
                "shortest_path",
                "show_connection",
                "show_tables",
                "table_info",
                "var_len_path",
            ]
        );
        assert!(registry.contains("SHORTEST_PATH"));
    }

    #[test]
    fn test_unknown_function() {
        let registry = default_registry();
        assert_eq!(
            registry.lookup("louvain").err(),
            Some(BindError::UnknownFunction("louvain".to_string()))
        );
    }
}
