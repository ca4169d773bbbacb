//! Test fixture for GraphFlow integration tests
//!
//! Builds a catalog with one node table and one rel table over an
//! in-memory graph, and runs calls through the public `CallExecutor` API.

use graphflow::{
    BindInput, CallExecutor, CatalogManager, ExecConfig, ExecutionError, GraphStorage,
    InMemoryGraph, LogicalType, PreparedCall, ResultTable, TableEntry, Value,
};
use std::sync::Arc;

pub const NODE_TABLE: &str = "person";
pub const REL_TABLE: &str = "knows";

pub struct TestFixture {
    pub catalog: Arc<CatalogManager>,
    storage: Arc<dyn GraphStorage>,
    config: ExecConfig,
}

impl TestFixture {
    /// Catalog and graph without any table
    pub fn empty() -> Self {
        Self {
            catalog: Arc::new(CatalogManager::new()),
            storage: Arc::new(InMemoryGraph::new()),
            config: Self::test_config(1),
        }
    }

    /// `person` node table with `num_nodes` nodes connected by `edges`
    pub fn with_graph(num_nodes: u64, edges: &[(u64, u64)]) -> Self {
        let graph = InMemoryGraph::from_edges(NODE_TABLE, num_nodes, edges)
            .expect("edges must reference existing nodes");
        Self::with_storage(Arc::new(graph))
    }

    /// Same catalog over a caller-provided storage
    pub fn with_storage(storage: Arc<dyn GraphStorage>) -> Self {
        let catalog = CatalogManager::new();
        catalog
            .create_table(
                TableEntry::node(NODE_TABLE, "id")
                    .with_property("id", LogicalType::Int64)
                    .with_property("name", LogicalType::String)
                    .with_comment("people in the network"),
            )
            .expect("create node table");
        catalog
            .create_table(
                TableEntry::rel(REL_TABLE, NODE_TABLE, NODE_TABLE)
                    .with_property("since", LogicalType::Int64),
            )
            .expect("create rel table");

        Self {
            catalog: Arc::new(catalog),
            storage,
            config: Self::test_config(1),
        }
    }

    /// Small chunks and scan morsels so every test exercises many claims
    fn test_config(num_threads: usize) -> ExecConfig {
        ExecConfig {
            num_threads,
            vector_capacity: 16,
            frontier_morsel_size: 8,
            ..ExecConfig::default()
        }
    }

    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.config.num_threads = num_threads;
        self
    }

    pub fn with_config(mut self, config: ExecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn executor(&self) -> CallExecutor {
        CallExecutor::new(self.catalog.clone(), self.storage.clone())
            .with_config(self.config.clone())
    }

    pub fn call(&self, name: &str, input: &BindInput) -> Result<ResultTable, ExecutionError> {
        self.executor().execute(name, input)
    }

    pub fn prepare(&self, name: &str, input: &BindInput) -> Result<PreparedCall, ExecutionError> {
        self.executor().prepare(name, input)
    }

    /// Run a traversal call with the standard positional arguments
    pub fn traverse(
        &self,
        name: &str,
        sources: Value,
        lower: i64,
        upper: i64,
    ) -> Result<ResultTable, ExecutionError> {
        self.call(name, &path_input(sources, lower, upper))
    }
}

pub fn path_input(sources: Value, lower: i64, upper: i64) -> BindInput {
    BindInput::new(vec![sources, Value::Int64(lower), Value::Int64(upper)])
}

/// (src, dst, length) of every traversal row, sorted
pub fn path_rows(table: &ResultTable) -> Vec<(u64, u64, i64)> {
    let mut rows: Vec<(u64, u64, i64)> = table
        .rows
        .iter()
        .map(|r| {
            (
                r.values[0].as_node_offset().expect("src"),
                r.values[1].as_node_offset().expect("dst"),
                r.values[2].as_i64().expect("length"),
            )
        })
        .collect();
    rows.sort_unstable();
    rows
}

/// (src, dst, length, num_paths) of every traversal row, sorted
pub fn counted_path_rows(table: &ResultTable) -> Vec<(u64, u64, i64, i64)> {
    let mut rows: Vec<(u64, u64, i64, i64)> = table
        .rows
        .iter()
        .map(|r| {
            (
                r.values[0].as_node_offset().expect("src"),
                r.values[1].as_node_offset().expect("dst"),
                r.values[2].as_i64().expect("length"),
                r.values[3].as_i64().expect("num_paths"),
            )
        })
        .collect();
    rows.sort_unstable();
    rows
}

/// (src, dst, length, path) of every row of a `track_path` traversal, sorted
pub fn tracked_path_rows(table: &ResultTable) -> Vec<(u64, u64, i64, Vec<u64>)> {
    let mut rows: Vec<(u64, u64, i64, Vec<u64>)> = table
        .rows
        .iter()
        .map(|r| {
            let path = r.values[3].as_list().expect("path");
            (
                r.values[0].as_node_offset().expect("src"),
                r.values[1].as_node_offset().expect("dst"),
                r.values[2].as_i64().expect("length"),
                path.iter().map(|v| v.as_node_offset().expect("path node")).collect(),
            )
        })
        .collect();
    rows.sort_unstable();
    rows
}
