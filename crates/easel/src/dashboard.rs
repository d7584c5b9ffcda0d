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

use crate::chart_spec::ChartSpec;
use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DASHBOARD_EXTENSION: &str = "json";

/// Position of one chart in the dashboard grid. Indexes into the
/// dashboard's chart list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSlot {
    pub chart_index: usize,
    pub row: usize,
    pub col: usize,
}
/// A named collection of chart specs with grid placement. The name is
/// also the persistence key used by [`DashboardStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub charts: Vec<ChartSpec>,
    pub layout: Vec<LayoutSlot>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}
impl Dashboard {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: None,
            charts: Vec::new(),
            layout: Vec::new(),
            created_at: now,
            modified_at: now,
        }
    }
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
    /// Append a chart and place it in the next grid row, single column.
    pub fn push_chart(&mut self, spec: ChartSpec) {
        let row = self.layout.iter().map(|s| s.row + 1).max().unwrap_or(0);
        self.layout.push(LayoutSlot {
            chart_index: self.charts.len(),
            row,
            col: 0,
        });
        self.charts.push(spec);
        self.touch();
    }
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
    pub fn chart_count(&self) -> usize {
        self.charts.len()
    }
    /// Every layout slot must point at an existing chart.
    fn check_layout(&self) -> Result<(), String> {
        for slot in &self.layout {
            if slot.chart_index >= self.charts.len() {
                return Err(format!(
                    "layout references chart {} but only {} charts exist",
                    slot.chart_index,
                    self.charts.len()
                ));
            }
        }
        Ok(())
    }
}
/// Lightweight listing entry, readable without deserializing chart specs
/// the caller may not need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardInfo {
    pub name: String,
    pub chart_count: usize,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}
/// File-backed dashboard storage: one JSON document per dashboard in a
/// single directory, named `<name>.json`. The filename is the key; a
/// loaded dashboard always reports the name it was requested under.
#[derive(Debug, Clone)]
pub struct DashboardStore {
    root: PathBuf,
}
impl DashboardStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }
    pub fn root(&self) -> &Path {
        &self.root
    }
    /// Persist a dashboard under its name, replacing any existing entry.
    /// The dashboard value itself is not mutated; callers that want a
    /// fresh `modified_at` call [`Dashboard::touch`] first.
    pub fn save(&self, dashboard: &Dashboard) -> StoreResult<()> {
        validate_name(&dashboard.name)?;
        let path = self.entry_path(&dashboard.name);
        let json = serde_json::to_string_pretty(dashboard).map_err(|e| {
            StoreError::CorruptConfig {
                name: dashboard.name.clone(),
                reason: e.to_string(),
            }
        })?;
        fs::write(&path, json)?;
        tracing::debug!(name = %dashboard.name, path = %path.display(), "dashboard saved");
        Ok(())
    }
    pub fn load(&self, name: &str) -> StoreResult<Dashboard> {
        validate_name(name)?;
        let path = self.entry_path(name);
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let raw = fs::read_to_string(&path)?;
        let dashboard: Dashboard =
            serde_json::from_str(&raw).map_err(|e| StoreError::CorruptConfig {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        dashboard
            .check_layout()
            .map_err(|reason| StoreError::CorruptConfig {
                name: name.to_string(),
                reason,
            })?;
        Ok(dashboard)
    }
    /// Names of all stored dashboards, lexicographically sorted.
    pub fn list(&self) -> StoreResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DASHBOARD_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
    /// Remove a stored dashboard. Deleting a name that does not exist is
    /// an error, so a second delete of the same name fails.
    pub fn delete(&self, name: &str) -> StoreResult<()> {
        validate_name(name)?;
        let path = self.entry_path(name);
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        fs::remove_file(&path)?;
        tracing::debug!(name = %name, "dashboard deleted");
        Ok(())
    }
    /// Summary of a stored dashboard without handing back its charts.
    pub fn info(&self, name: &str) -> StoreResult<DashboardInfo> {
        let dashboard = self.load(name)?;
        Ok(DashboardInfo {
            name: dashboard.name,
            chart_count: dashboard.charts.len(),
            created_at: dashboard.created_at,
            modified_at: dashboard.modified_at,
        })
    }
    /// Copy a stored dashboard under a new name. The copy gets a fresh
    /// `modified_at` but keeps the original `created_at`.
    pub fn duplicate(&self, name: &str, new_name: &str) -> StoreResult<Dashboard> {
        let mut dashboard = self.load(name)?;
        validate_name(new_name)?;
        dashboard.name = new_name.to_string();
        dashboard.touch();
        self.save(&dashboard)?;
        Ok(dashboard)
    }
    /// Write a stored dashboard's JSON document to an arbitrary path,
    /// for sharing outside the store.
    pub fn export_json(&self, name: &str, destination: &Path) -> StoreResult<()> {
        let dashboard = self.load(name)?;
        let json =
            serde_json::to_string_pretty(&dashboard).map_err(|e| StoreError::CorruptConfig {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        fs::write(destination, json)?;
        Ok(())
    }
    /// Read a dashboard JSON document from outside the store and persist
    /// it under the given name, regardless of the name embedded in the
    /// file.
    pub fn import_json(&self, source: &Path, name: &str) -> StoreResult<Dashboard> {
        validate_name(name)?;
        let raw = fs::read_to_string(source)?;
        let mut dashboard: Dashboard =
            serde_json::from_str(&raw).map_err(|e| StoreError::CorruptConfig {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        dashboard
            .check_layout()
            .map_err(|reason| StoreError::CorruptConfig {
                name: name.to_string(),
                reason,
            })?;
        dashboard.name = name.to_string();
        self.save(&dashboard)?;
        Ok(dashboard)
    }
    fn entry_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{DASHBOARD_EXTENSION}"))
    }
}
/// Dashboard names become filenames, so anything that could escape the
/// store directory or collide with the extension handling is rejected.
fn validate_name(name: &str) -> StoreResult<()> {
    let reject = |reason: &str| {
        Err(StoreError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };
    if name.is_empty() {
        return reject("name must not be empty");
    }
    if name == "." || name == ".." {
        return reject("name must not be a relative path component");
    }
    if name.contains('/') || name.contains('\\') {
        return reject("name must not contain path separators");
    }
    if name.contains('\0') {
        return reject("name must not contain NUL");
    }
    Ok(())
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart_spec::{Aggregation, ChartKind};

    fn bar_spec() -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Bar,
            x: Some("region".to_string()),
            y: Some("sales".to_string()),
            color: None,
            aggregation: Aggregation::Sum,
        }
    }

    #[test]
    fn push_chart_appends_layout_rows() {
        let mut dashboard = Dashboard::new("weekly");
        dashboard.push_chart(bar_spec());
        dashboard.push_chart(bar_spec());
        assert_eq!(dashboard.layout.len(), 2);
        assert_eq!(dashboard.layout[0].row, 0);
        assert_eq!(dashboard.layout[1].row, 1);
        assert_eq!(dashboard.layout[1].chart_index, 1);
    }

    #[test]
    fn names_with_separators_are_rejected() {
        assert!(validate_name("nested/name").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("").is_err());
        assert!(validate_name("weekly-sales").is_ok());
    }
}
