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

use crate::data_handler::profile::{ProfileConfig, Profiler};
use crate::data_handler::table::{Column, Table};
use crate::error::{DataError, DataResult};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::debug;
/// Loads a tabular file into a [`Table`], inferring one field type per
/// column on the way in. Supported extensions: csv, xls, xlsx.
pub struct Loader {
    profiler: Profiler,
}
impl Loader {
    pub fn new() -> Self {
        Self {
            profiler: Profiler::new(),
        }
    }
    pub fn with_config(config: ProfileConfig) -> Self {
        Self {
            profiler: Profiler::with_config(config),
        }
    }
    pub fn load(&self, path: &Path) -> DataResult<Table> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let table = match extension.as_str() {
            "csv" => self.load_csv(path)?,
            "xls" | "xlsx" => self.load_excel(path)?,
            _ => {
                return Err(DataError::UnsupportedFormat { format: extension });
            }
        };
        debug!(
            name = table.name(),
            rows = table.row_count(),
            columns = table.column_count(),
            "loaded table"
        );
        Ok(table.with_source_path(path.to_path_buf()))
    }
    fn load_csv(&self, path: &Path) -> DataResult<Table> {
        let parse_error = |reason: String| DataError::Parse {
            path: path.display().to_string(),
            reason,
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| {
                let message = e.to_string();
                match e.into_kind() {
                    csv::ErrorKind::Io(io) => DataError::Io(io),
                    _ => parse_error(message),
                }
            })?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| parse_error(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();
        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record.map_err(|e| parse_error(e.to_string()))?;
            for (i, field) in record.iter().enumerate() {
                let value = if field.is_empty() {
                    None
                } else {
                    Some(field.to_string())
                };
                cells[i].push(value);
            }
        }
        self.build_table(path, headers, cells)
    }
    fn load_excel(&self, path: &Path) -> DataResult<Table> {
        let parse_error = |reason: String| DataError::Parse {
            path: path.display().to_string(),
            reason,
        };
        let mut workbook =
            open_workbook_auto(path).map_err(|e| parse_error(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| parse_error("workbook has no worksheets".to_string()))?
            .map_err(|e| parse_error(e.to_string()))?;
        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .ok_or_else(|| parse_error("worksheet has no header row".to_string()))?
            .iter()
            .map(Self::cell_text)
            .map(|v| v.unwrap_or_default())
            .collect();
        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        for row in rows {
            for i in 0..headers.len() {
                cells[i].push(row.get(i).and_then(Self::cell_text));
            }
        }
        self.build_table(path, headers, cells)
    }
    fn cell_text(cell: &Data) -> Option<String> {
        match cell {
            Data::Empty => None,
            // Excel stores every number as a float; ints come back clean.
            Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
                Some(format!("{}", *f as i64))
            }
            Data::DateTime(dt) => dt
                .as_datetime()
                .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string()),
            other => {
                let text = other.to_string();
                if text.is_empty() {
                    None
                } else {
                    Some(text)
                }
            }
        }
    }
    fn build_table(
        &self,
        path: &Path,
        headers: Vec<String>,
        cells: Vec<Vec<Option<String>>>,
    ) -> DataResult<Table> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("table")
            .to_string();
        let columns: Vec<Column> = headers
            .into_iter()
            .zip(cells)
            .map(|(header, values)| {
                let field_type = self.profiler.infer_field_type(&values);
                Column::new(header, field_type, values)
            })
            .collect();
        Table::new(name, columns)
    }
}
impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handler::table::FieldType;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_csv_with_inferred_types() {
        let file = write_csv("date,region,sales\n2024-01-01,north,100\n2024-01-02,south,250\n");
        let table = Loader::new().load(file.path()).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_names(), vec!["date", "region", "sales"]);
        assert_eq!(table.field_type("date"), Some(FieldType::Datetime));
        assert_eq!(table.field_type("region"), Some(FieldType::Categorical));
        assert_eq!(table.field_type("sales"), Some(FieldType::Numeric));
    }

    #[test]
    fn rejects_unknown_extensions() {
        let result = Loader::new().load(Path::new("report.pdf"));
        assert!(matches!(
            result,
            Err(DataError::UnsupportedFormat { format }) if format == "pdf"
        ));
    }

    #[test]
    fn rejects_missing_extension() {
        let result = Loader::new().load(Path::new("data"));
        assert!(matches!(result, Err(DataError::UnsupportedFormat { .. })));
    }

    #[test]
    fn ragged_rows_are_a_parse_error() {
        let file = write_csv("a,b\n1,2\n3,4,5\n");
        let result = Loader::new().load(file.path());
        assert!(matches!(result, Err(DataError::Parse { .. })));
    }

    #[test]
    fn empty_cells_become_nulls() {
        let file = write_csv("a,b\n1,\n2,x\n");
        let table = Loader::new().load(file.path()).unwrap();
        assert_eq!(table.column("b").unwrap().null_count(), 1);
    }
}
