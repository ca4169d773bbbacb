// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Built-in call functions backed by the range morsel coordinator
//!
//! Introspection calls (display only):
//! - CALL db_version() YIELD version
//! - CALL current_setting(name) YIELD <name>
//! - CALL show_tables() YIELD name, type, comment
//! - CALL table_info(table) YIELD `property id`, name, type, `primary key`
//! - CALL show_connection(rel_table) YIELD `source table name`, `destination table name`
//!
//! Scans:
//! - CALL scan_nodes(table) YIELD offset

use super::function_trait::{BindInput, ColumnDef, WorkContract, WorkDescriptor};
use crate::catalog::{TableEntry, TableType};
use crate::coordinator::RangeMorselCoordinator;
use crate::exec::chunk::OutputChunk;
use crate::exec::context::ExecutionContext;
use crate::exec::error::{BindError, ExecutionError};
use crate::storage::{LogicalType, Value};

/// Call function whose rows are fully known at bind time
///
/// Rows are snapshotted during bind; steps copy one chunk-sized morsel of
/// them per call.
pub trait RowsFunction: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn bind_rows(&self, ctx: &ExecutionContext, input: &BindInput) -> Result<BoundRows, BindError>;
}

/// Output schema and rows produced by [`RowsFunction::bind_rows`]
#[derive(Debug, Clone)]
pub struct BoundRows {
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Vec<Value>>,
}

/// Adapter running a [`RowsFunction`] as a work contract
pub struct RowsContract<F: RowsFunction>(pub F);

impl<F: RowsFunction> WorkContract for RowsContract<F> {
    type BindData = Vec<Vec<Value>>;
    type Shared = RangeMorselCoordinator;
    type Local = ();

    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn bind(
        &self,
        ctx: &ExecutionContext,
        input: &BindInput,
    ) -> Result<WorkDescriptor<Self::BindData>, BindError> {
        let bound = self.0.bind_rows(ctx, input)?;
        let num_rows = bound.rows.len() as u64;
        Ok(WorkDescriptor::new(bound.columns, bound.rows).with_max_rows(num_rows))
    }

    fn init_shared(
        &self,
        ctx: &ExecutionContext,
        descriptor: &WorkDescriptor<Self::BindData>,
    ) -> Result<Self::Shared, ExecutionError> {
        Ok(RangeMorselCoordinator::with_interrupt(
            descriptor.bind_data.len() as u64,
            ctx.interrupt_handle(),
        ))
    }

    fn init_local(
        &self,
        _: &ExecutionContext,
        _: &WorkDescriptor<Self::BindData>,
        _: &Self::Shared,
    ) {
    }

    fn step(
        &self,
        _ctx: &ExecutionContext,
        descriptor: &WorkDescriptor<Self::BindData>,
        shared: &Self::Shared,
        _local: &mut Self::Local,
        out: &mut OutputChunk,
    ) -> Result<usize, ExecutionError> {
        let morsel = shared.get_morsel(out.remaining() as u64);
        if morsel.is_exhausted() {
            return Ok(0);
        }
        for row in &descriptor.bind_data[morsel.start as usize..morsel.end as usize] {
            out.append_row(row.iter().cloned());
        }
        Ok(morsel.len() as usize)
    }

    fn progress(&self, shared: &Self::Shared) -> f64 {
        shared.progress()
    }
}

fn lookup_table(ctx: &ExecutionContext, name: &str) -> Result<TableEntry, BindError> {
    ctx.catalog
        .table(name)
        .ok_or_else(|| BindError::TableNotFound(name.to_string()))
}

fn expect_table_type(entry: &TableEntry, expected: TableType) -> Result<(), BindError> {
    if entry.table_type != expected {
        return Err(BindError::InvalidTableType {
            table: entry.name.clone(),
            expected: expected.to_string(),
            actual: entry.table_type.to_string(),
        });
    }
    Ok(())
}

/// CALL db_version() YIELD version
pub struct DbVersion;

impl RowsFunction for DbVersion {
    fn name(&self) -> &'static str {
        "db_version"
    }

    fn bind_rows(
        &self,
        _ctx: &ExecutionContext,
        input: &BindInput,
    ) -> Result<BoundRows, BindError> {
        input.expect_args(self.name(), 0)?;
        input.check_options(self.name(), &[])?;
        Ok(BoundRows {
            columns: vec![ColumnDef::new("version", LogicalType::String)],
            rows: vec![vec![Value::String(crate::VERSION.to_string())]],
        })
    }
}

/// CALL current_setting(name) YIELD <name>
pub struct CurrentSetting;

impl RowsFunction for CurrentSetting {
    fn name(&self) -> &'static str {
        "current_setting"
    }

    fn bind_rows(&self, ctx: &ExecutionContext, input: &BindInput) -> Result<BoundRows, BindError> {
        input.expect_args(self.name(), 1)?;
        input.check_options(self.name(), &[])?;
        let option = input.string_arg(self.name(), 0)?;
        let value = ctx
            .settings
            .get(option, &ctx.config)
            .ok_or_else(|| BindError::UnknownSetting(option.to_string()))?;
        let data_type = value.logical_type().unwrap_or(LogicalType::String);

        Ok(BoundRows {
            columns: vec![ColumnDef::new(option, data_type)],
            rows: vec![vec![value]],
        })
    }
}

/// CALL show_tables() YIELD name, type, comment
pub struct ShowTables;

impl RowsFunction for ShowTables {
    fn name(&self) -> &'static str {
        "show_tables"
    }

    fn bind_rows(&self, ctx: &ExecutionContext, input: &BindInput) -> Result<BoundRows, BindError> {
        input.expect_args(self.name(), 0)?;
        input.check_options(self.name(), &[])?;
        let rows = ctx
            .catalog
            .table_entries()
            .into_iter()
            .map(|entry| {
                vec![
                    Value::String(entry.name),
                    Value::String(entry.table_type.to_string()),
                    Value::String(entry.comment),
                ]
            })
            .collect();

        Ok(BoundRows {
            columns: vec![
                ColumnDef::new("name", LogicalType::String),
                ColumnDef::new("type", LogicalType::String),
                ColumnDef::new("comment", LogicalType::String),
            ],
            rows,
        })
    }
}

/// CALL table_info(table) YIELD `property id`, name, type[, `primary key`]
///
/// The primary key column is only present for node tables.
pub struct TableInfo;

impl RowsFunction for TableInfo {
    fn name(&self) -> &'static str {
        "table_info"
    }

    fn bind_rows(&self, ctx: &ExecutionContext, input: &BindInput) -> Result<BoundRows, BindError> {
        input.expect_args(self.name(), 1)?;
        input.check_options(self.name(), &[])?;
        let entry = lookup_table(ctx, input.string_arg(self.name(), 0)?)?;
        let is_node = entry.table_type == TableType::Node;

        let mut columns = vec![
            ColumnDef::new("property id", LogicalType::Int64),
            ColumnDef::new("name", LogicalType::String),
            ColumnDef::new("type", LogicalType::String),
        ];
        if is_node {
            columns.push(ColumnDef::new("primary key", LogicalType::Bool));
        }

        let rows = entry
            .properties
            .iter()
            .map(|property| {
                let mut row = vec![
                    Value::Int64(property.property_id as i64),
                    Value::String(property.name.clone()),
                    Value::String(property.data_type.to_string()),
                ];
                if is_node {
                    row.push(Value::Bool(entry.is_primary_key(&property.name)));
                }
                row
            })
            .collect();

        Ok(BoundRows { columns, rows })
    }
}

/// CALL show_connection(rel_table) YIELD `source table name`, `destination table name`
pub struct ShowConnection;

impl RowsFunction for ShowConnection {
    fn name(&self) -> &'static str {
        "show_connection"
    }

    fn bind_rows(&self, ctx: &ExecutionContext, input: &BindInput) -> Result<BoundRows, BindError> {
        input.expect_args(self.name(), 1)?;
        input.check_options(self.name(), &[])?;
        let entry = lookup_table(ctx, input.string_arg(self.name(), 0)?)?;
        expect_table_type(&entry, TableType::Rel)?;

        let rows = entry
            .connection
            .iter()
            .map(|(src, dst)| vec![Value::String(src.clone()), Value::String(dst.clone())])
            .collect();

        Ok(BoundRows {
            columns: vec![
                ColumnDef::new("source table name", LogicalType::String),
                ColumnDef::new("destination table name", LogicalType::String),
            ],
            rows,
        })
    }
}

/// CALL scan_nodes(table) YIELD offset
///
/// Emits every node offset of a node table with a global row offset.
pub struct ScanNodes;

#[derive(Debug, Clone)]
pub struct ScanBindData {
    pub table: String,
}

impl WorkContract for ScanNodes {
    type BindData = ScanBindData;
    type Shared = RangeMorselCoordinator;
    type Local = ();

    fn name(&self) -> &'static str {
        "scan_nodes"
    }

    fn bind(
        &self,
        ctx: &ExecutionContext,
        input: &BindInput,
    ) -> Result<WorkDescriptor<ScanBindData>, BindError> {
        input.expect_args(self.name(), 1)?;
        input.check_options(self.name(), &[])?;
        let entry = lookup_table(ctx, input.string_arg(self.name(), 0)?)?;
        expect_table_type(&entry, TableType::Node)?;

        Ok(WorkDescriptor::new(
            vec![ColumnDef::new("offset", LogicalType::Node)],
            ScanBindData { table: entry.name },
        )
        .with_row_offsets())
    }

    fn init_shared(
        &self,
        ctx: &ExecutionContext,
        descriptor: &WorkDescriptor<ScanBindData>,
    ) -> Result<RangeMorselCoordinator, ExecutionError> {
        let num_nodes = ctx.storage.node_count(&descriptor.bind_data.table)?;
        Ok(RangeMorselCoordinator::with_interrupt(num_nodes, ctx.interrupt_handle()))
    }

    fn init_local(
        &self,
        _: &ExecutionContext,
        _: &WorkDescriptor<ScanBindData>,
        _: &RangeMorselCoordinator,
    ) {
    }

    fn step(
        &self,
        _ctx: &ExecutionContext,
        _descriptor: &WorkDescriptor<ScanBindData>,
        shared: &RangeMorselCoordinator,
        _local: &mut (),
        out: &mut OutputChunk,
    ) -> Result<usize, ExecutionError> {
        let morsel = shared.get_morsel(out.remaining() as u64);
        if morsel.is_exhausted() {
            return Ok(0);
        }
        for offset in morsel.start..morsel.end {
            out.append_row([Value::Node(offset)]);
        }
        Ok(morsel.len() as usize)
    }

    fn progress(&self, shared: &RangeMorselCoordinator) -> f64 {
        shared.progress()
    }
}
