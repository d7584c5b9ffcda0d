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

use thiserror::Error;
#[derive(Error, Debug)]
pub enum EaselError {
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("chart error: {0}")]
    Chart(#[from] ChartError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("report error: {0}")]
    Report(#[from] ReportError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
#[derive(Error, Debug)]
pub enum DataError {
    #[error("unsupported file format: '{format}' (expected csv, xls or xlsx)")]
    UnsupportedFormat { format: String },
    #[error("failed to parse '{path}': {reason}")]
    Parse { path: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("column '{0}' not found in table")]
    ColumnNotFound(String),
    #[error("duplicate column name: '{0}'")]
    DuplicateColumn(String),
    #[error("column length mismatch: expected {expected} rows, got {got}")]
    ColumnLengthMismatch { expected: usize, got: usize },
    #[error("no table loaded in session")]
    NoTableLoaded,
}
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("invalid field selection for {kind} chart: {reason}")]
    InvalidFieldSelection { kind: String, reason: String },
}
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("dashboard '{0}' not found")]
    NotFound(String),
    #[error("dashboard file for '{name}' is corrupt: {reason}")]
    CorruptConfig { name: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid dashboard name: '{name}': {reason}")]
    InvalidName { name: String, reason: String },
}
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("empty input: {0}")]
    EmptyInput(String),
    #[error(transparent)]
    Chart(#[from] ChartError),
}
pub type Result<T> = std::result::Result<T, EaselError>;
pub type DataResult<T> = std::result::Result<T, DataError>;
pub type ChartResult<T> = std::result::Result<T, ChartError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
pub type ReportResult<T> = std::result::Result<T, ReportError>;
impl EaselError {
    pub fn category(&self) -> &'static str {
        match self {
            EaselError::Data(_) => "Data",
            EaselError::Chart(_) => "Chart",
            EaselError::Store(_) => "Store",
            EaselError::Report(_) => "Report",
            EaselError::Io(_) => "I/O",
        }
    }
    pub fn user_message(&self) -> String {
        match self {
            EaselError::Data(DataError::UnsupportedFormat { format }) => {
                format!("Files with the '{format}' extension cannot be loaded. Upload a CSV or Excel file.")
            }
            EaselError::Store(StoreError::NotFound(name)) => {
                format!("No saved dashboard named '{name}' exists.")
            }
            EaselError::Store(StoreError::CorruptConfig { name, .. }) => {
                format!("The saved dashboard '{name}' could not be read. The file may have been edited or truncated.")
            }
            EaselError::Report(ReportError::EmptyInput(_)) => {
                "Nothing to report on. Load a non-empty table and add at least one chart.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_surface_their_category() {
        let err: EaselError = DataError::UnsupportedFormat {
            format: "pdf".to_string(),
        }
        .into();
        assert_eq!(err.category(), "Data");
        assert!(err.user_message().contains("pdf"));

        let err: EaselError = StoreError::NotFound("Q1".to_string()).into();
        assert_eq!(err.category(), "Store");
        assert!(err.to_string().contains("Q1"));
    }
}
