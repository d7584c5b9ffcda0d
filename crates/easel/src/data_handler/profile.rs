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

use crate::data_handler::table::{Column, FieldType, Table};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
#[derive(Debug, Clone)]
pub struct ProfileConfig {
    pub max_sample_values: usize,
    pub type_confidence_threshold: f64,
    pub max_categorical_cardinality: usize,
    pub datetime_formats: Vec<String>,
}
impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            max_sample_values: 100,
            type_confidence_threshold: 0.8,
            max_categorical_cardinality: 50,
            datetime_formats: vec![
                "%Y-%m-%d".to_string(),
                "%Y-%m-%d %H:%M:%S".to_string(),
                "%Y-%m-%dT%H:%M:%S".to_string(),
                "%Y-%m-%dT%H:%M:%SZ".to_string(),
                "%m/%d/%Y".to_string(),
                "%d/%m/%Y".to_string(),
                "%Y%m%d".to_string(),
            ],
        }
    }
}
impl ProfileConfig {
    pub fn for_fast_profiling() -> Self {
        Self {
            max_sample_values: 20,
            type_confidence_threshold: 0.7,
            datetime_formats: vec!["%Y-%m-%d".to_string(), "%Y-%m-%d %H:%M:%S".to_string()],
            ..Default::default()
        }
    }
    pub fn for_strict_typing() -> Self {
        Self {
            max_sample_values: 200,
            type_confidence_threshold: 0.95,
            ..Default::default()
        }
    }
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub outlier_count: usize,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub mode: Option<String>,
    pub mode_count: usize,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatetimeSummary {
    pub min: Option<String>,
    pub max: Option<String>,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub field_type: FieldType,
    pub count: usize,
    pub null_count: usize,
    pub null_percentage: f64,
    pub distinct_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categorical: Option<CategoricalSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<DatetimeSummary>,
    pub issues: Vec<String>,
}
pub struct Profiler {
    config: ProfileConfig,
}
impl Profiler {
    pub fn new() -> Self {
        Self {
            config: ProfileConfig::default(),
        }
    }
    pub fn with_config(config: ProfileConfig) -> Self {
        Self { config }
    }
    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }
    /// Classify a column from its raw cell text. Sampling is capped at
    /// `max_sample_values` non-null cells; a column whose sampled values
    /// clear the confidence threshold for numeric parsing is numeric,
    /// then datetime parsing is tried, and anything else falls back to
    /// categorical. Constancy is a quality signal, not a type change.
    pub fn infer_field_type(&self, values: &[Option<String>]) -> FieldType {
        let sample: Vec<&str> = values
            .iter()
            .filter_map(|v| v.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .take(self.config.max_sample_values)
            .collect();
        if sample.is_empty() {
            return FieldType::Categorical;
        }
        let total = sample.len() as f64;
        let numeric_hits = sample.iter().filter(|s| s.parse::<f64>().is_ok()).count();
        if numeric_hits as f64 / total >= self.config.type_confidence_threshold {
            return FieldType::Numeric;
        }
        let datetime_hits = sample
            .iter()
            .filter(|s| self.parse_datetime(s).is_some())
            .count();
        if datetime_hits as f64 / total >= self.config.type_confidence_threshold {
            return FieldType::Datetime;
        }
        FieldType::Categorical
    }
    pub fn parse_datetime(&self, value: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }
        for format in &self.config.datetime_formats {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
                return Some(dt.and_utc());
            }
            if let Ok(date) = NaiveDate::parse_from_str(value, format) {
                return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
            }
        }
        None
    }
    pub fn profile_table(&self, table: &Table) -> Vec<ColumnProfile> {
        table
            .columns()
            .par_iter()
            .map(|column| self.profile_column(column, table.row_count()))
            .collect()
    }
    fn profile_column(&self, column: &Column, total_rows: usize) -> ColumnProfile {
        let null_count = column.null_count();
        let null_percentage = if total_rows > 0 {
            null_count as f64 / total_rows as f64
        } else {
            0.0
        };
        let distinct_count = column.distinct_count();
        let mut numeric = None;
        let mut categorical = None;
        let mut datetime = None;
        match column.field_type() {
            FieldType::Numeric => {
                numeric = Some(self.numeric_summary(column));
            }
            FieldType::Categorical => {
                categorical = Some(Self::categorical_summary(column));
            }
            FieldType::Datetime => {
                datetime = Some(self.datetime_summary(column));
            }
        }
        let issues = self.detect_quality_issues(
            column.field_type(),
            null_percentage,
            distinct_count,
            &numeric,
            total_rows,
        );
        ColumnProfile {
            name: column.name().to_string(),
            field_type: column.field_type(),
            count: total_rows,
            null_count,
            null_percentage,
            distinct_count,
            numeric,
            categorical,
            datetime,
            issues,
        }
    }
    fn numeric_summary(&self, column: &Column) -> NumericSummary {
        let values = column.numeric_values();
        if values.is_empty() {
            return NumericSummary {
                mean: None,
                std: None,
                min: None,
                max: None,
                outlier_count: 0,
            };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if values.len() > 1 {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            Some(var.sqrt())
        } else {
            None
        };
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let outlier_count = Self::iqr_outlier_count(&values);
        NumericSummary {
            mean: Some(mean),
            std,
            min: Some(min),
            max: Some(max),
            outlier_count,
        }
    }
    fn iqr_outlier_count(values: &[f64]) -> usize {
        if values.len() < 4 {
            return 0;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let q25 = Self::quantile(&sorted, 0.25);
        let q75 = Self::quantile(&sorted, 0.75);
        let iqr = q75 - q25;
        if iqr <= 0.0 {
            return 0;
        }
        let lower = q25 - 1.5 * iqr;
        let upper = q75 + 1.5 * iqr;
        sorted.iter().filter(|&&v| v < lower || v > upper).count()
    }
    // Linear interpolation over a sorted slice.
    fn quantile(sorted: &[f64], p: f64) -> f64 {
        let idx = p * (sorted.len() - 1) as f64;
        let lo = idx.floor() as usize;
        let hi = idx.ceil() as usize;
        if lo == hi {
            return sorted[lo];
        }
        let frac = idx - lo as f64;
        sorted[lo] + frac * (sorted[hi] - sorted[lo])
    }
    fn categorical_summary(column: &Column) -> CategoricalSummary {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for value in column.values().flatten() {
            *counts.entry(value).or_insert(0) += 1;
        }
        // Ties resolve to the lexicographically smallest value so that
        // repeated runs over the same table agree.
        let mode = counts
            .iter()
            .max_by(|(a_val, a_count), (b_val, b_count)| {
                a_count.cmp(b_count).then_with(|| b_val.cmp(a_val))
            })
            .map(|(value, count)| ((*value).to_string(), *count));
        match mode {
            Some((value, count)) => CategoricalSummary {
                mode: Some(value),
                mode_count: count,
            },
            None => CategoricalSummary {
                mode: None,
                mode_count: 0,
            },
        }
    }
    fn datetime_summary(&self, column: &Column) -> DatetimeSummary {
        let mut parsed: Vec<DateTime<Utc>> = column
            .values()
            .flatten()
            .filter_map(|v| self.parse_datetime(v.trim()))
            .collect();
        parsed.sort();
        DatetimeSummary {
            min: parsed.first().map(DateTime::to_rfc3339),
            max: parsed.last().map(DateTime::to_rfc3339),
        }
    }
    fn detect_quality_issues(
        &self,
        field_type: FieldType,
        null_percentage: f64,
        distinct_count: usize,
        numeric: &Option<NumericSummary>,
        total_rows: usize,
    ) -> Vec<String> {
        let mut issues = Vec::new();
        if null_percentage > 0.3 {
            issues.push(format!(
                "High null percentage: {:.1}%",
                null_percentage * 100.0
            ));
        }
        if distinct_count == 1 && total_rows > 1 {
            issues.push("Single unique value (constant column)".to_string());
        }
        match field_type {
            FieldType::Categorical => {
                if distinct_count > self.config.max_categorical_cardinality {
                    issues.push(format!("High cardinality: {distinct_count} unique values"));
                }
                if distinct_count == total_rows && total_rows > 1 {
                    issues.push("All values unique (potential identifier)".to_string());
                }
            }
            FieldType::Numeric => {
                if let Some(summary) = numeric {
                    if let Some(std) = summary.std {
                        if std < 1e-9 && total_rows > 1 {
                            issues.push("Zero standard deviation (constant values)".to_string());
                        }
                    }
                    if summary.outlier_count > total_rows / 10 {
                        issues.push(format!("High outlier count: {}", summary.outlier_count));
                    }
                }
            }
            FieldType::Datetime => {
                if distinct_count < total_rows / 10 && total_rows > 20 {
                    issues.push("Sparse temporal data with many repeated timestamps".to_string());
                }
            }
        }
        issues
    }
    pub fn export_profiles_json(profiles: &[ColumnProfile]) -> serde_json::Result<String> {
        serde_json::to_string_pretty(profiles)
    }
}
impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}
#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| {
                if v.is_empty() {
                    None
                } else {
                    Some((*v).to_string())
                }
            })
            .collect()
    }

    #[test]
    fn infers_numeric_from_parseable_values() {
        let profiler = Profiler::new();
        let values = cells(&["1", "2.5", "-3", "4e2"]);
        assert_eq!(profiler.infer_field_type(&values), FieldType::Numeric);
    }

    #[test]
    fn infers_datetime_from_iso_dates() {
        let profiler = Profiler::new();
        let values = cells(&["2024-01-01", "2024-02-15", "2024-03-31"]);
        assert_eq!(profiler.infer_field_type(&values), FieldType::Datetime);
    }

    #[test]
    fn falls_back_to_categorical() {
        let profiler = Profiler::new();
        let values = cells(&["north", "south", "east", "12"]);
        assert_eq!(profiler.infer_field_type(&values), FieldType::Categorical);
    }

    #[test]
    fn constant_numeric_column_stays_numeric() {
        let profiler = Profiler::new();
        let values = cells(&["7", "7", "7", "7"]);
        assert_eq!(profiler.infer_field_type(&values), FieldType::Numeric);
        let column = Column::new("sevens", FieldType::Numeric, values);
        let profile = profiler.profile_column(&column, 4);
        assert!(profile
            .issues
            .iter()
            .any(|issue| issue.contains("constant")));
    }

    #[test]
    fn all_null_column_is_categorical() {
        let profiler = Profiler::new();
        let values = cells(&["", "", ""]);
        assert_eq!(profiler.infer_field_type(&values), FieldType::Categorical);
    }

    #[test]
    fn numeric_summary_matches_hand_computation() {
        let profiler = Profiler::new();
        let column = Column::new("sales", FieldType::Numeric, cells(&["1", "2", "3", "4"]));
        let summary = profiler.numeric_summary(&column);
        assert_eq!(summary.mean, Some(2.5));
        assert_eq!(summary.min, Some(1.0));
        assert_eq!(summary.max, Some(4.0));
        let std = summary.std.unwrap();
        assert!((std - 1.2909944487358056).abs() < 1e-12);
        assert_eq!(summary.outlier_count, 0);
    }

    #[test]
    fn mode_ties_resolve_deterministically() {
        let column = Column::new(
            "region",
            FieldType::Categorical,
            cells(&["south", "north", "south", "north"]),
        );
        let summary = Profiler::categorical_summary(&column);
        assert_eq!(summary.mode.as_deref(), Some("north"));
        assert_eq!(summary.mode_count, 2);
    }

    #[test]
    fn profile_assigns_exactly_one_type_per_column() {
        let profiler = Profiler::new();
        let table = crate::data_handler::table::Table::new(
            "sample",
            vec![
                Column::new("date", FieldType::Datetime, cells(&["2024-01-01", "2024-01-02"])),
                Column::new("region", FieldType::Categorical, cells(&["north", "south"])),
                Column::new("sales", FieldType::Numeric, cells(&["10", "20"])),
            ],
        )
        .unwrap();
        let profiles = profiler.profile_table(&table);
        assert_eq!(profiles.len(), 3);
        let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["date", "region", "sales"]);
        assert!(profiles[0].datetime.is_some());
        assert!(profiles[1].categorical.is_some());
        assert!(profiles[2].numeric.is_some());
    }

    #[test]
    fn datetime_summary_reports_range() {
        let profiler = Profiler::new();
        let column = Column::new(
            "date",
            FieldType::Datetime,
            cells(&["2024-03-01", "2024-01-01", "2024-02-01"]),
        );
        let summary = profiler.datetime_summary(&column);
        assert!(summary.min.unwrap().starts_with("2024-01-01"));
        assert!(summary.max.unwrap().starts_with("2024-03-01"));
    }

    #[test]
    fn identifier_columns_are_flagged() {
        let profiler = Profiler::new();
        let table = crate::data_handler::table::Table::new(
            "ids",
            vec![Column::new(
                "id",
                FieldType::Categorical,
                cells(&["a", "b", "c", "d"]),
            )],
        )
        .unwrap();
        let profiles = profiler.profile_table(&table);
        assert!(profiles[0]
            .issues
            .iter()
            .any(|i| i.contains("potential identifier")));
    }
}
