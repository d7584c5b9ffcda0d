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

pub mod filter;
pub mod ingest;
pub mod profile;
pub mod table;
pub use filter::{filter_rows, RowFilter};
pub use ingest::Loader;
pub use profile::{
    CategoricalSummary, ColumnProfile, DatetimeSummary, NumericSummary, ProfileConfig, Profiler,
};
pub use table::{Column, FieldType, Table, TableId, TableMetadata};
use crate::error::DataResult;
pub fn load_file<P: AsRef<std::path::Path>>(path: P) -> DataResult<Table> {
    Loader::new().load(path.as_ref())
}
pub fn summary_statistics(table: &Table) -> Vec<ColumnProfile> {
    Profiler::new().profile_table(table)
}
