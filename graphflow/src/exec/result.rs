// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query result types

use crate::exec::chunk::OutputChunk;
use crate::functions::ColumnDef;
use crate::storage::Value;
use serde::{Deserialize, Serialize};

/// A single result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Values in output column order
    pub values: Vec<Value>,
    /// Global row offset, present for row-offset-bearing producers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_offset: Option<u64>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values,
            row_offset: None,
        }
    }

    pub fn with_row_offset(mut self, offset: u64) -> Self {
        self.row_offset = Some(offset);
        self
    }

    /// Get a value by position
    pub fn get(&self, position: usize) -> Option<&Value> {
        self.values.get(position)
    }
}

/// Append-only table of rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Row>,
}

impl ResultTable {
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column with the given name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Append every row of `chunk`, carrying its row offsets if assigned
    pub fn append_chunk(&mut self, chunk: &OutputChunk) {
        let offsets = chunk.row_offsets();
        self.rows.reserve(chunk.len());
        for idx in 0..chunk.len() {
            let row = Row {
                values: chunk.row(idx),
                row_offset: offsets.get(idx).copied(),
            };
            self.rows.push(row);
        }
    }

    /// Move all rows of `other` into this table
    pub fn merge(&mut self, other: &mut ResultTable) {
        self.rows.append(&mut other.rows);
    }

    /// Values of one column, in row order
    pub fn column_values(&self, name: &str) -> Vec<Value> {
        match self.column_index(name) {
            Some(idx) => self
                .rows
                .iter()
                .filter_map(|r| r.values.get(idx).cloned())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Serialize the table as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LogicalType;

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("id", LogicalType::Int64),
            ColumnDef::new("name", LogicalType::String),
        ]
    }

    #[test]
    fn test_append_chunk_keeps_offsets() {
        let mut chunk = OutputChunk::new(2, 8);
        chunk.append_row([Value::Int64(1), Value::from("a")]);
        chunk.append_row([Value::Int64(2), Value::from("b")]);
        chunk.assign_row_offsets(5);

        let mut table = ResultTable::new(columns());
        table.append_chunk(&chunk);

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].row_offset, Some(6));
        assert_eq!(table.column_values("name"), vec![Value::from("a"), Value::from("b")]);
    }

    #[test]
    fn test_merge_drains_other() {
        let mut left = ResultTable::new(columns());
        left.rows.push(Row::new(vec![Value::Int64(1), Value::from("x")]));
        let mut right = ResultTable::new(columns());
        right.rows.push(Row::new(vec![Value::Int64(2), Value::from("y")]));

        left.merge(&mut right);
        assert_eq!(left.len(), 2);
        assert!(right.is_empty());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut table = ResultTable::new(columns());
        table
            .rows
            .push(Row::new(vec![Value::Int64(7), Value::Null]).with_row_offset(0));

        let json = table.to_json().unwrap();
        let back: ResultTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
