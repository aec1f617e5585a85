//! This module defines `SparseTape`, the storage behind every tape of the machine.
//!
//! A tape is bi-infinite: any `i64` index can be read or written. Cells are only stored
//! once they are touched ("materialized"); an untouched index reads as the symbol of the
//! initial input at that index, or as the blank symbol outside of it.

use crate::types::{Symbol, DEFAULT_BLANK_SYMBOL};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    value: Symbol,
    /// Whether the cell has ever been explicitly written.
    modified: bool,
}

/// A lazily materialized, bi-infinite tape of symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseTape {
    cells: BTreeMap<i64, Cell>,
    blank: Symbol,
    input: Vec<Symbol>,
}

impl Default for SparseTape {
    fn default() -> Self {
        Self::new(DEFAULT_BLANK_SYMBOL)
    }
}

impl SparseTape {
    /// Creates an empty tape with the given blank symbol.
    pub fn new(blank: Symbol) -> Self {
        Self {
            cells: BTreeMap::new(),
            blank,
            input: Vec::new(),
        }
    }

    /// Returns the blank symbol of this tape.
    pub fn blank(&self) -> Symbol {
        self.blank
    }

    /// Returns the symbol at `index`, materializing the cell on first access.
    pub fn get(&mut self, index: i64) -> Symbol {
        let value = self.lazy_value(index);
        self.cells
            .entry(index)
            .or_insert(Cell {
                value,
                modified: false,
            })
            .value
    }

    /// Returns the symbol at `index` without materializing it.
    pub fn peek(&self, index: i64) -> Symbol {
        self.cells
            .get(&index)
            .map(|cell| cell.value)
            .unwrap_or_else(|| self.lazy_value(index))
    }

    /// Writes `value` at `index` and marks the cell as modified.
    pub fn set(&mut self, index: i64, value: Symbol) {
        self.cells.insert(
            index,
            Cell {
                value,
                modified: true,
            },
        );
    }

    /// Replaces the tape content with `input`, starting at index 0.
    ///
    /// Every cell covered by the input is materialized as unmodified.
    pub fn initialize(&mut self, input: &str) {
        self.input = input.chars().collect();
        self.cells = self
            .input
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                (
                    i as i64,
                    Cell {
                        value,
                        modified: false,
                    },
                )
            })
            .collect();
    }

    /// Drops every materialized cell. The initial input is kept, so untouched
    /// indices keep reading from it until the tape is initialized again.
    pub fn clear_materialized(&mut self) {
        self.cells.clear();
    }

    /// Returns the symbols in `[from, to]` (inclusive), materializing every visited cell.
    /// Returns an empty string when `from > to`.
    pub fn content(&mut self, from: i64, to: i64) -> String {
        if from > to {
            return String::new();
        }
        (from..=to).map(|i| self.get(i)).collect()
    }

    pub fn materialized_count(&self) -> usize {
        self.cells.len()
    }

    pub fn modified_count(&self) -> usize {
        self.cells.values().filter(|cell| cell.modified).count()
    }

    /// Smallest materialized index, or 0 for a tape with no materialized cells.
    pub fn min_index(&self) -> i64 {
        self.cells.keys().next().copied().unwrap_or(0)
    }

    /// Largest materialized index, or 0 for a tape with no materialized cells.
    pub fn max_index(&self) -> i64 {
        self.cells.keys().next_back().copied().unwrap_or(0)
    }

    /// Materialized indices in ascending order.
    pub fn sorted_indices(&self) -> Vec<i64> {
        self.cells.keys().copied().collect()
    }

    /// Whether the cell at `index` has been materialized.
    pub fn is_materialized(&self, index: i64) -> bool {
        self.cells.contains_key(&index)
    }

    /// Whether the cell at `index` has been explicitly written.
    pub fn is_modified(&self, index: i64) -> bool {
        self.cells.get(&index).is_some_and(|cell| cell.modified)
    }

    fn lazy_value(&self, index: i64) -> Symbol {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.input.get(i).copied())
            .unwrap_or(self.blank)
    }
}
