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

use crate::error::{DataError, DataResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Numeric,
    Categorical,
    Datetime,
}
impl FieldType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Numeric)
    }
    pub fn is_categorical(&self) -> bool {
        matches!(self, FieldType::Categorical)
    }
    pub fn is_datetime(&self) -> bool {
        matches!(self, FieldType::Datetime)
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Numeric => "numeric",
            FieldType::Categorical => "categorical",
            FieldType::Datetime => "datetime",
        }
    }
}
impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableId(String);
impl TableId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}
impl Default for TableId {
    fn default() -> Self {
        Self::new()
    }
}
impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
#[derive(Debug, Clone)]
pub struct TableMetadata {
    pub id: TableId,
    pub name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub loaded_at: DateTime<Utc>,
    pub source_path: Option<PathBuf>,
}
/// A single named column of raw cell text. An empty or missing cell is
/// stored as `None`; typed interpretation happens at profiling time.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    field_type: FieldType,
    values: Vec<Option<String>>,
}
impl Column {
    pub fn new(name: impl Into<String>, field_type: FieldType, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            field_type,
            values,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }
    pub fn values(&self) -> impl Iterator<Item = Option<&str>> {
        self.values.iter().map(|v| v.as_deref())
    }
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
    pub fn distinct_count(&self) -> usize {
        self.values
            .iter()
            .filter_map(|v| v.as_deref())
            .collect::<HashSet<_>>()
            .len()
    }
    /// All non-null cells that parse as f64, in row order.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values
            .iter()
            .filter_map(|v| v.as_deref().and_then(|s| s.trim().parse::<f64>().ok()))
            .collect()
    }
    pub fn to_f64(&self, index: usize) -> Option<f64> {
        self.value(index).and_then(|s| s.trim().parse::<f64>().ok())
    }
}
/// In-memory columnar dataset loaded from an uploaded file. Columns keep
/// their file order; names are unique. Replaced wholesale on a new load.
#[derive(Debug, Clone)]
pub struct Table {
    metadata: TableMetadata,
    columns: Vec<Column>,
}
impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> DataResult<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name().to_string()) {
                return Err(DataError::DuplicateColumn(column.name().to_string()));
            }
        }
        let row_count = columns.first().map_or(0, Column::len);
        for column in &columns {
            if column.len() != row_count {
                return Err(DataError::ColumnLengthMismatch {
                    expected: row_count,
                    got: column.len(),
                });
            }
        }
        let column_count = columns.len();
        Ok(Self {
            metadata: TableMetadata {
                id: TableId::new(),
                name: name.into(),
                row_count,
                column_count,
                loaded_at: Utc::now(),
                source_path: None,
            },
            columns,
        })
    }
    pub fn with_source_path(mut self, path: PathBuf) -> Self {
        self.metadata.source_path = Some(path);
        self
    }
    pub fn metadata(&self) -> &TableMetadata {
        &self.metadata
    }
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
    pub fn row_count(&self) -> usize {
        self.metadata.row_count
    }
    pub fn column_count(&self) -> usize {
        self.metadata.column_count
    }
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.column(name).map(Column::field_type)
    }
    /// Per-column inferred types in column order.
    pub fn column_types(&self) -> Vec<(&str, FieldType)> {
        self.columns
            .iter()
            .map(|c| (c.name(), c.field_type()))
            .collect()
    }
    /// Export the full table as CSV text, nulls as empty fields.
    pub fn export_csv(&self) -> DataResult<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(self.column_names())
            .map_err(|e| DataError::Parse {
                path: self.metadata.name.clone(),
                reason: e.to_string(),
            })?;
        for row in 0..self.row_count() {
            let record: Vec<&str> = self
                .columns
                .iter()
                .map(|c| c.value(row).unwrap_or(""))
                .collect();
            writer.write_record(record).map_err(|e| DataError::Parse {
                path: self.metadata.name.clone(),
                reason: e.to_string(),
            })?;
        }
        let bytes = writer.into_inner().map_err(|e| DataError::Parse {
            path: self.metadata.name.clone(),
            reason: e.to_string(),
        })?;
        String::from_utf8(bytes).map_err(|e| DataError::Parse {
            path: self.metadata.name.clone(),
            reason: e.to_string(),
        })
    }
}
