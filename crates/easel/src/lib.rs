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

//! Easel is a self-hosted analytics workbench: load a tabular file,
//! profile its columns, describe charts over it, keep named dashboards
//! on disk, and render reports.
//!
//! The pieces compose freely, but [`AnalysisSession`] wires them
//! together for the common single-dataset flow:
//!
//! ```no_run
//! use easel::{AnalysisSession, ChartKind, FieldSelection};
//!
//! # fn main() -> easel::Result<()> {
//! let mut session = AnalysisSession::open("./dashboards")?;
//! session.load_file("sales.csv")?;
//! let spec = session.build_chart(
//!     ChartKind::Bar,
//!     &FieldSelection::new().with_x("region").with_y("sales"),
//! )?;
//! let mut dashboard = easel::Dashboard::new("weekly-sales");
//! dashboard.push_chart(spec);
//! session.save_dashboard(&dashboard)?;
//! let report = session.generate_report("Weekly sales", &dashboard)?;
//! println!("{}", report.to_html());
//! # Ok(())
//! # }
//! ```

pub mod chart_spec;
pub mod dashboard;
pub mod data_handler;
pub mod error;
pub mod report;

pub use chart_spec::{build, field_rules, Aggregation, ChartKind, ChartSpec, FieldSelection};
pub use dashboard::{Dashboard, DashboardInfo, DashboardStore, LayoutSlot};
pub use data_handler::filter::{filter_rows, RowFilter};
pub use data_handler::ingest::Loader;
pub use data_handler::profile::{ColumnProfile, ProfileConfig, Profiler};
pub use data_handler::table::{Column, FieldType, Table, TableMetadata};
pub use error::{
    ChartError, DataError, EaselError, ReportError, Result, StoreError,
};
pub use report::{chart_data, ChartData, Report, ReportGenerator, ReportSection};

use std::path::{Path, PathBuf};

/// One user working with one dataset: holds the loaded table, its
/// profiles, and a handle to the dashboard store.
pub struct AnalysisSession {
    loader: Loader,
    profiler: Profiler,
    store: DashboardStore,
    table: Option<Table>,
    profiles: Vec<ColumnProfile>,
}
impl AnalysisSession {
    /// Opens a session whose dashboards live under `store_root`.
    pub fn open(store_root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            loader: Loader::new(),
            profiler: Profiler::new(),
            store: DashboardStore::open(store_root)?,
            table: None,
            profiles: Vec::new(),
        })
    }
    pub fn with_profile_config(mut self, config: ProfileConfig) -> Self {
        self.loader = Loader::with_config(config.clone());
        self.profiler = Profiler::with_config(config);
        self
    }
    /// Load a CSV or Excel file, replacing any previously loaded table,
    /// and profile its columns.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<&Table> {
        let table = self.loader.load(path.as_ref()).map_err(EaselError::Data)?;
        self.profiles = self.profiler.profile_table(&table);
        tracing::info!(
            table = %table.name(),
            rows = table.row_count(),
            columns = table.column_count(),
            "table loaded into session"
        );
        Ok(&*self.table.insert(table))
    }
    pub fn table(&self) -> Result<&Table> {
        self.table
            .as_ref()
            .ok_or_else(|| EaselError::Data(DataError::NoTableLoaded))
    }
    pub fn profiles(&self) -> &[ColumnProfile] {
        &self.profiles
    }
    /// Replace the loaded table with the rows matching every filter and
    /// re-profile the result.
    pub fn apply_filters(&mut self, filters: &[RowFilter]) -> Result<&Table> {
        let table = self.table()?;
        let filtered = filter_rows(table, filters).map_err(EaselError::Data)?;
        self.profiles = self.profiler.profile_table(&filtered);
        Ok(&*self.table.insert(filtered))
    }
    pub fn store(&self) -> &DashboardStore {
        &self.store
    }
    /// Validate a field selection against the loaded table.
    pub fn build_chart(
        &self,
        kind: ChartKind,
        selection: &FieldSelection,
    ) -> Result<ChartSpec> {
        let table = self.table()?;
        Ok(build(kind, selection, table)?)
    }
    pub fn save_dashboard(&self, dashboard: &Dashboard) -> Result<()> {
        Ok(self.store.save(dashboard)?)
    }
    pub fn load_dashboard(&self, name: &str) -> Result<Dashboard> {
        Ok(self.store.load(name)?)
    }
    pub fn list_dashboards(&self) -> Result<Vec<String>> {
        Ok(self.store.list()?)
    }
    pub fn delete_dashboard(&self, name: &str) -> Result<()> {
        Ok(self.store.delete(name)?)
    }
    /// Render a report for the loaded table with one section per chart
    /// in the dashboard.
    pub fn generate_report(&self, title: &str, dashboard: &Dashboard) -> Result<Report> {
        let table = self.table()?;
        let generator = ReportGenerator::new();
        Ok(generator.generate(title, table, &self.profiles, &dashboard.charts)?)
    }
}
