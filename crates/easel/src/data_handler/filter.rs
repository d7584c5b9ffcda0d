// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::data_handler::table::{Column, Table};
use crate::error::{DataError, DataResult};
use serde::{Deserialize, Serialize};

/// One row-level predicate against a named column. A row survives
/// [`filter_rows`] only if every filter matches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RowFilter {
    Equals { column: String, value: String },
    Contains { column: String, value: String },
    Range {
        column: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    In { column: String, values: Vec<String> },
    IsNull { column: String },
    NotNull { column: String },
}
impl RowFilter {
    pub fn column(&self) -> &str {
        match self {
            RowFilter::Equals { column, .. }
            | RowFilter::Contains { column, .. }
            | RowFilter::Range { column, .. }
            | RowFilter::In { column, .. }
            | RowFilter::IsNull { column }
            | RowFilter::NotNull { column } => column,
        }
    }
    fn matches(&self, column: &Column, row: usize) -> bool {
        match self {
            RowFilter::Equals { value, .. } => column.value(row) == Some(value.as_str()),
            RowFilter::Contains { value, .. } => column
                .value(row)
                .is_some_and(|cell| cell.contains(value.as_str())),
            // Bounds are inclusive; a cell that does not parse as a
            // number never falls in a range.
            RowFilter::Range { min, max, .. } => column.to_f64(row).is_some_and(|v| {
                min.is_none_or(|m| v >= m) && max.is_none_or(|m| v <= m)
            }),
            RowFilter::In { values, .. } => column
                .value(row)
                .is_some_and(|cell| values.iter().any(|v| v == cell)),
            RowFilter::IsNull { .. } => column.value(row).is_none(),
            RowFilter::NotNull { .. } => column.value(row).is_some(),
        }
    }
}
/// Produce a new table holding only the rows that match every filter.
/// Column order and inferred types carry over unchanged; the source
/// table is untouched.
pub fn filter_rows(table: &Table, filters: &[RowFilter]) -> DataResult<Table> {
    let mut bound = Vec::with_capacity(filters.len());
    for filter in filters {
        let column = table
            .column(filter.column())
            .ok_or_else(|| DataError::ColumnNotFound(filter.column().to_string()))?;
        bound.push((filter, column));
    }
    let keep: Vec<bool> = (0..table.row_count())
        .map(|row| bound.iter().all(|(filter, column)| filter.matches(column, row)))
        .collect();
    let columns = table
        .columns()
        .iter()
        .map(|column| {
            let values = column
                .values()
                .enumerate()
                .filter(|(row, _)| keep[*row])
                .map(|(_, value)| value.map(str::to_string))
                .collect();
            Column::new(column.name(), column.field_type(), values)
        })
        .collect();
    let filtered = Table::new(table.name(), columns)?;
    Ok(match table.metadata().source_path.clone() {
        Some(path) => filtered.with_source_path(path),
        None => filtered,
    })
}
