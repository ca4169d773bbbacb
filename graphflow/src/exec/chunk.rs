// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Output chunk - the columnar buffer a step writes into

use crate::storage::Value;

/// Columnar output buffer bound to one driver clone
///
/// A step appends at most `capacity()` rows; the driver resets the chunk
/// before every step and fills the row-offset column afterwards for
/// row-offset-bearing contracts.
#[derive(Debug, Clone)]
pub struct OutputChunk {
    columns: Vec<Vec<Value>>,
    row_offsets: Vec<u64>,
    size: usize,
    capacity: usize,
}

impl OutputChunk {
    pub fn new(num_columns: usize, capacity: usize) -> Self {
        Self {
            columns: (0..num_columns)
                .map(|_| Vec::with_capacity(capacity))
                .collect(),
            row_offsets: Vec::new(),
            size: 0,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Rows currently held
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Rows that may still be appended before the chunk is full
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.size)
    }

    pub fn is_full(&self) -> bool {
        self.size >= self.capacity
    }

    /// Drop all rows, keeping allocations
    pub fn reset(&mut self) {
        for column in &mut self.columns {
            column.clear();
        }
        self.row_offsets.clear();
        self.size = 0;
    }

    /// Append one row; values are given in column order
    pub fn append_row<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = Value>,
    {
        debug_assert!(!self.is_full(), "output chunk overflow");
        let mut appended = 0;
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.push(value);
            appended += 1;
        }
        debug_assert_eq!(appended, self.columns.len(), "row width mismatch");
        self.size += 1;
    }

    pub fn column(&self, idx: usize) -> &[Value] {
        &self.columns[idx]
    }

    pub fn value(&self, row: usize, column: usize) -> &Value {
        &self.columns[column][row]
    }

    /// Materialize row `idx` in column order
    pub fn row(&self, idx: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c[idx].clone()).collect()
    }

    /// Row offsets assigned by the driver, empty if the contract has none
    pub fn row_offsets(&self) -> &[u64] {
        &self.row_offsets
    }

    pub(crate) fn assign_row_offsets(&mut self, start: u64) {
        self.row_offsets.clear();
        self.row_offsets
            .extend((0..self.size as u64).map(|i| start + i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_reset() {
        let mut chunk = OutputChunk::new(2, 4);
        chunk.append_row([Value::Int64(1), Value::from("a")]);
        chunk.append_row([Value::Int64(2), Value::from("b")]);

        assert_eq!(chunk.len(), 2);
        assert_eq!(chunk.remaining(), 2);
        assert_eq!(chunk.value(1, 1), &Value::from("b"));
        assert_eq!(chunk.row(0), vec![Value::Int64(1), Value::from("a")]);

        chunk.assign_row_offsets(10);
        assert_eq!(chunk.row_offsets(), &[10, 11]);

        chunk.reset();
        assert!(chunk.is_empty());
        assert!(chunk.row_offsets().is_empty());
        assert_eq!(chunk.capacity(), 4);
    }
}
