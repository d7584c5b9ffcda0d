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

use crate::chart_spec::{Aggregation, ChartKind, ChartSpec};
use crate::data_handler::profile::ColumnProfile;
use crate::data_handler::table::Table;
use crate::error::{ReportError, ReportResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}
/// A single data-quality observation surfaced in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub message: String,
}
/// Values materialized for one chart, already grouped and aggregated so
/// a renderer can plot them directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ChartData {
    /// Paired x/y series for bar, line, pie, scatter and area.
    Points { x: Vec<String>, y: Vec<f64> },
    /// A single numeric series for histogram and box charts.
    Values { values: Vec<f64> },
    /// Cross-tabulated cells for heatmaps: one row count per distinct
    /// (x, y) pair, in first appearance order.
    Pairs {
        x: Vec<String>,
        y: Vec<String>,
        values: Vec<f64>,
    },
}
impl ChartData {
    pub fn len(&self) -> usize {
        match self {
            ChartData::Points { x, .. } => x.len(),
            ChartData::Values { values } => values.len(),
            ChartData::Pairs { x, .. } => x.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportSection {
    Summary {
        table_name: String,
        row_count: usize,
        column_count: usize,
        source: Option<String>,
    },
    Statistics {
        profiles: Vec<ColumnProfile>,
    },
    Chart {
        spec: ChartSpec,
        data: ChartData,
    },
    Insights {
        insights: Vec<Insight>,
    },
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<ReportSection>,
}
impl Report {
    /// Render as a self-contained HTML document: tables for statistics
    /// and chart data, no scripting.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<h1>{}</h1>\n<p>Generated {}</p>\n",
            escape_html(&self.title),
            escape_html(&self.title),
            self.generated_at.to_rfc3339()
        );
        for section in &self.sections {
            match section {
                ReportSection::Summary {
                    table_name,
                    row_count,
                    column_count,
                    source,
                } => {
                    let _ = write!(
                        out,
                        "<h2>Summary</h2>\n<p>Dataset <strong>{}</strong>: {} rows, {} columns",
                        escape_html(table_name),
                        row_count,
                        column_count
                    );
                    if let Some(source) = source {
                        let _ = write!(out, " (from {})", escape_html(source));
                    }
                    out.push_str("</p>\n");
                }
                ReportSection::Statistics { profiles } => {
                    out.push_str("<h2>Column statistics</h2>\n<table border=\"1\">\n<tr><th>Column</th><th>Type</th><th>Nulls</th><th>Distinct</th><th>Mean</th><th>Min</th><th>Max</th></tr>\n");
                    for profile in profiles {
                        let numeric = profile.numeric.as_ref();
                        let fmt_opt = |v: Option<f64>| {
                            v.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".to_string())
                        };
                        let _ = write!(
                            out,
                            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                            escape_html(&profile.name),
                            profile.field_type,
                            profile.null_count,
                            profile.distinct_count,
                            fmt_opt(numeric.and_then(|n| n.mean)),
                            fmt_opt(numeric.and_then(|n| n.min)),
                            fmt_opt(numeric.and_then(|n| n.max)),
                        );
                    }
                    out.push_str("</table>\n");
                }
                ReportSection::Chart { spec, data } => {
                    let _ = write!(
                        out,
                        "<h2>{} chart: {}</h2>\n",
                        escape_html(spec.kind.as_str()),
                        escape_html(&chart_title(spec))
                    );
                    match data {
                        ChartData::Points { x, y } => {
                            out.push_str("<table border=\"1\">\n<tr><th>x</th><th>y</th></tr>\n");
                            for (x, y) in x.iter().zip(y) {
                                let _ = write!(
                                    out,
                                    "<tr><td>{}</td><td>{y}</td></tr>\n",
                                    escape_html(x)
                                );
                            }
                            out.push_str("</table>\n");
                        }
                        ChartData::Values { values } => {
                            let _ = write!(
                                out,
                                "<p>{} values in series</p>\n",
                                values.len()
                            );
                        }
                        ChartData::Pairs { x, y, values } => {
                            out.push_str(
                                "<table border=\"1\">\n<tr><th>x</th><th>y</th><th>count</th></tr>\n",
                            );
                            for ((x, y), count) in x.iter().zip(y).zip(values) {
                                let _ = write!(
                                    out,
                                    "<tr><td>{}</td><td>{}</td><td>{count}</td></tr>\n",
                                    escape_html(x),
                                    escape_html(y)
                                );
                            }
                            out.push_str("</table>\n");
                        }
                    }
                }
                ReportSection::Insights { insights } => {
                    out.push_str("<h2>Insights</h2>\n<ul>\n");
                    for insight in insights {
                        let marker = match insight.severity {
                            Severity::Info => "info",
                            Severity::Warning => "warning",
                        };
                        let _ = write!(
                            out,
                            "<li>[{marker}] {}</li>\n",
                            escape_html(&insight.message)
                        );
                    }
                    out.push_str("</ul>\n");
                }
            }
        }
        out.push_str("</body>\n</html>\n");
        out
    }
}
fn chart_title(spec: &ChartSpec) -> String {
    match (&spec.x, &spec.y) {
        (Some(x), Some(y)) => format!("{y} by {x}"),
        (Some(x), None) => x.clone(),
        (None, Some(y)) => y.clone(),
        (None, None) => String::new(),
    }
}
fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
/// Controls which optional sections [`ReportGenerator::generate`] emits.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub include_statistics: bool,
    pub include_insights: bool,
    pub high_null_threshold: f64,
    pub high_cardinality_ratio: f64,
}
impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_statistics: true,
            include_insights: true,
            high_null_threshold: 0.1,
            high_cardinality_ratio: 0.5,
        }
    }
}
#[derive(Debug, Clone, Default)]
pub struct ReportGenerator {
    config: ReportConfig,
}
impl ReportGenerator {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_config(config: ReportConfig) -> Self {
        Self { config }
    }
    /// Assemble a full report: summary, column statistics, one section
    /// per chart, and data-quality insights. An empty table or a chart
    /// that materializes to zero points is rejected rather than silently
    /// producing a hollow report.
    pub fn generate(
        &self,
        title: impl Into<String>,
        table: &Table,
        profiles: &[ColumnProfile],
        charts: &[ChartSpec],
    ) -> ReportResult<Report> {
        if table.row_count() == 0 {
            return Err(ReportError::EmptyInput(format!(
                "table '{}' has no rows",
                table.name()
            )));
        }
        if charts.is_empty() {
            return Err(ReportError::EmptyInput(
                "no charts selected for the report".to_string(),
            ));
        }
        let mut sections = vec![ReportSection::Summary {
            table_name: table.name().to_string(),
            row_count: table.row_count(),
            column_count: table.column_count(),
            source: table
                .metadata()
                .source_path
                .as_ref()
                .map(|p| p.display().to_string()),
        }];
        if self.config.include_statistics {
            sections.push(ReportSection::Statistics {
                profiles: profiles.to_vec(),
            });
        }
        for spec in charts {
            let data = chart_data(spec, table)?;
            if data.is_empty() {
                return Err(ReportError::EmptyInput(format!(
                    "chart '{}' over '{}' selects no data",
                    spec.kind,
                    spec.x.as_deref().unwrap_or("")
                )));
            }
            sections.push(ReportSection::Chart {
                spec: spec.clone(),
                data,
            });
        }
        if self.config.include_insights {
            let insights = self.insights(table, profiles);
            if !insights.is_empty() {
                sections.push(ReportSection::Insights { insights });
            }
        }
        tracing::debug!(
            table = %table.name(),
            sections = sections.len(),
            "report generated"
        );
        Ok(Report {
            title: title.into(),
            generated_at: Utc::now(),
            sections,
        })
    }
    fn insights(&self, table: &Table, profiles: &[ColumnProfile]) -> Vec<Insight> {
        let mut insights = Vec::new();
        let rows = table.row_count();
        for profile in profiles {
            if profile.null_percentage > self.config.high_null_threshold {
                insights.push(Insight {
                    severity: Severity::Warning,
                    column: Some(profile.name.clone()),
                    message: format!(
                        "column '{}' is {:.1}% null",
                        profile.name,
                        profile.null_percentage * 100.0
                    ),
                });
            }
            if profile.distinct_count == 1 && profile.null_count < profile.count {
                insights.push(Insight {
                    severity: Severity::Info,
                    column: Some(profile.name.clone()),
                    message: format!("column '{}' holds a single constant value", profile.name),
                });
            }
            if let Some(numeric) = &profile.numeric {
                if numeric.outlier_count > 0 {
                    insights.push(Insight {
                        severity: Severity::Info,
                        column: Some(profile.name.clone()),
                        message: format!(
                            "column '{}' has {} outlier values outside the interquartile fences",
                            profile.name, numeric.outlier_count
                        ),
                    });
                }
            }
            if rows > 1 && profile.distinct_count == rows {
                insights.push(Insight {
                    severity: Severity::Info,
                    column: Some(profile.name.clone()),
                    message: format!(
                        "column '{}' is unique per row and likely an identifier",
                        profile.name
                    ),
                });
            } else if profile.field_type.is_categorical()
                && rows > 0
                && profile.distinct_count as f64 / rows as f64 > self.config.high_cardinality_ratio
            {
                insights.push(Insight {
                    severity: Severity::Warning,
                    column: Some(profile.name.clone()),
                    message: format!(
                        "categorical column '{}' has high cardinality ({} distinct values)",
                        profile.name, profile.distinct_count
                    ),
                });
            }
        }
        insights
    }
}
/// Materialize the values a chart plots. Grouping preserves the first
/// appearance order of x values, so identical inputs always produce the
/// same series.
pub fn chart_data(spec: &ChartSpec, table: &Table) -> ReportResult<ChartData> {
    let missing = |name: &str| {
        ReportError::EmptyInput(format!(
            "chart references column '{name}' which is not in the table"
        ))
    };
    let bound = |field: Option<&str>, role: &str| {
        field.map(str::to_string).ok_or_else(|| {
            ReportError::EmptyInput(format!(
                "chart '{}' has no {role} field to materialize",
                spec.kind
            ))
        })
    };
    match spec.kind {
        ChartKind::Histogram => {
            let name = bound(spec.x.as_deref(), "x")?;
            let column = table.column(&name).ok_or_else(|| missing(&name))?;
            Ok(ChartData::Values {
                values: column.numeric_values(),
            })
        }
        ChartKind::Box => {
            let name = bound(spec.y.as_deref().or(spec.x.as_deref()), "y")?;
            let column = table.column(&name).ok_or_else(|| missing(&name))?;
            Ok(ChartData::Values {
                values: column.numeric_values(),
            })
        }
        // Heatmaps cross two axes of any type; each cell carries the
        // number of rows falling on that (x, y) pair.
        ChartKind::Heatmap => {
            let x_name = bound(spec.x.as_deref(), "x")?;
            let y_name = bound(spec.y.as_deref(), "y")?;
            let x_column = table.column(&x_name).ok_or_else(|| missing(&x_name))?;
            let y_column = table.column(&y_name).ok_or_else(|| missing(&y_name))?;
            let mut order: Vec<(String, String)> = Vec::new();
            let mut counts: std::collections::HashMap<(String, String), f64> =
                std::collections::HashMap::new();
            for i in 0..x_column.len() {
                if let (Some(x), Some(y)) = (x_column.value(i), y_column.value(i)) {
                    let key = (x.to_string(), y.to_string());
                    if !counts.contains_key(&key) {
                        order.push(key.clone());
                    }
                    *counts.entry(key).or_insert(0.0) += 1.0;
                }
            }
            let mut x = Vec::with_capacity(order.len());
            let mut y = Vec::with_capacity(order.len());
            let mut values = Vec::with_capacity(order.len());
            for key in order {
                values.push(counts[&key]);
                x.push(key.0);
                y.push(key.1);
            }
            Ok(ChartData::Pairs { x, y, values })
        }
        _ => {
            let x_name = bound(spec.x.as_deref(), "x")?;
            let x_column = table.column(&x_name).ok_or_else(|| missing(&x_name))?;
            let y_name = bound(spec.y.as_deref(), "y")?;
            let y_column = table.column(&y_name).ok_or_else(|| missing(&y_name))?;
            let mut pairs = Vec::new();
            for i in 0..x_column.len() {
                if let (Some(x), Some(y)) = (x_column.value(i), y_column.to_f64(i)) {
                    pairs.push((x.to_string(), y));
                }
            }
            if spec.aggregation == Aggregation::None {
                let (x, y) = pairs.into_iter().unzip();
                return Ok(ChartData::Points { x, y });
            }
            Ok(aggregate_pairs(pairs, spec.aggregation))
        }
    }
}
fn aggregate_pairs(pairs: Vec<(String, f64)>, aggregation: Aggregation) -> ChartData {
    let mut order: Vec<String> = Vec::new();
    let mut groups: std::collections::HashMap<String, Vec<f64>> = std::collections::HashMap::new();
    for (key, value) in pairs {
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(value);
    }
    let mut x = Vec::with_capacity(order.len());
    let mut y = Vec::with_capacity(order.len());
    for key in order {
        let values = &groups[&key];
        let folded = match aggregation {
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Aggregation::Count => values.len() as f64,
            Aggregation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::None => unreachable!("handled before grouping"),
        };
        x.push(key);
        y.push(folded);
    }
    ChartData::Points { x, y }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart_spec::{build, ChartKind, FieldSelection};
    use crate::data_handler::table::{Column, FieldType};

    fn sales_table() -> Table {
        let cells = |values: &[&str]| values.iter().map(|v| Some((*v).to_string())).collect();
        Table::new(
            "sales",
            vec![
                Column::new(
                    "region",
                    FieldType::Categorical,
                    cells(&["north", "south", "north", "west"]),
                ),
                Column::new(
                    "sales",
                    FieldType::Numeric,
                    cells(&["100", "250", "80", "40"]),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn sum_aggregation_groups_in_first_appearance_order() {
        let table = sales_table();
        let selection = FieldSelection::new().with_x("region").with_y("sales");
        let spec = build(ChartKind::Bar, &selection, &table).unwrap();
        let data = chart_data(&spec, &table).unwrap();
        assert_eq!(
            data,
            ChartData::Points {
                x: vec!["north".to_string(), "south".to_string(), "west".to_string()],
                y: vec![180.0, 250.0, 40.0],
            }
        );
    }

    #[test]
    fn count_aggregation_counts_rows_per_group() {
        let table = sales_table();
        let spec = ChartSpec {
            kind: ChartKind::Bar,
            x: Some("region".to_string()),
            y: Some("sales".to_string()),
            color: None,
            aggregation: Aggregation::Count,
        };
        let data = chart_data(&spec, &table).unwrap();
        assert_eq!(
            data,
            ChartData::Points {
                x: vec!["north".to_string(), "south".to_string(), "west".to_string()],
                y: vec![2.0, 1.0, 1.0],
            }
        );
    }

    #[test]
    fn no_aggregation_keeps_raw_pairs() {
        let table = sales_table();
        let spec = ChartSpec {
            kind: ChartKind::Line,
            x: Some("region".to_string()),
            y: Some("sales".to_string()),
            color: None,
            aggregation: Aggregation::None,
        };
        let data = chart_data(&spec, &table).unwrap();
        assert_eq!(data.len(), 4);
    }

    #[test]
    fn histogram_materializes_a_single_series() {
        let table = sales_table();
        let spec = ChartSpec {
            kind: ChartKind::Histogram,
            x: Some("sales".to_string()),
            y: None,
            color: None,
            aggregation: Aggregation::None,
        };
        let data = chart_data(&spec, &table).unwrap();
        assert_eq!(
            data,
            ChartData::Values {
                values: vec![100.0, 250.0, 80.0, 40.0]
            }
        );
    }

    #[test]
    fn heatmap_over_two_categorical_axes_counts_pairs() {
        let cells = |values: &[&str]| values.iter().map(|v| Some((*v).to_string())).collect();
        let table = Table::new(
            "orders",
            vec![
                Column::new(
                    "region",
                    FieldType::Categorical,
                    cells(&["north", "south", "north"]),
                ),
                Column::new(
                    "quarter",
                    FieldType::Categorical,
                    cells(&["q1", "q1", "q1"]),
                ),
            ],
        )
        .unwrap();
        let selection = FieldSelection::new().with_x("region").with_y("quarter");
        let spec = build(ChartKind::Heatmap, &selection, &table).unwrap();
        let data = chart_data(&spec, &table).unwrap();
        assert_eq!(
            data,
            ChartData::Pairs {
                x: vec!["north".to_string(), "south".to_string()],
                y: vec!["q1".to_string(), "q1".to_string()],
                values: vec![2.0, 1.0],
            }
        );

        let generator = ReportGenerator::new();
        let report = generator
            .generate("Orders", &table, &[], &[spec])
            .unwrap();
        assert!(report
            .sections
            .iter()
            .any(|s| matches!(s, ReportSection::Chart { .. })));
    }

    #[test]
    fn empty_table_is_rejected() {
        let table = Table::new(
            "empty",
            vec![Column::new("a", FieldType::Numeric, Vec::new())],
        )
        .unwrap();
        let generator = ReportGenerator::new();
        let result = generator.generate("Report", &table, &[], &[]);
        assert!(matches!(result, Err(ReportError::EmptyInput(_))));
    }

    #[test]
    fn empty_chart_list_is_rejected() {
        let table = sales_table();
        let generator = ReportGenerator::new();
        let result = generator.generate("Report", &table, &[], &[]);
        assert!(matches!(result, Err(ReportError::EmptyInput(_))));
    }

    #[test]
    fn chart_with_no_matching_data_is_rejected() {
        let cells: Vec<Option<String>> = vec![None, None];
        let table = Table::new(
            "nulls",
            vec![
                Column::new("region", FieldType::Categorical, cells.clone()),
                Column::new("sales", FieldType::Numeric, cells),
            ],
        )
        .unwrap();
        let spec = ChartSpec {
            kind: ChartKind::Bar,
            x: Some("region".to_string()),
            y: Some("sales".to_string()),
            color: None,
            aggregation: Aggregation::Sum,
        };
        let generator = ReportGenerator::new();
        let result = generator.generate("Report", &table, &[], &[spec]);
        assert!(matches!(result, Err(ReportError::EmptyInput(_))));
    }

    #[test]
    fn report_renders_to_html() {
        let table = sales_table();
        let generator = ReportGenerator::new();
        let profiles = crate::data_handler::summary_statistics(&table);
        let selection = FieldSelection::new().with_x("region").with_y("sales");
        let spec = build(ChartKind::Bar, &selection, &table).unwrap();
        let report = generator
            .generate("Sales report", &table, &profiles, &[spec])
            .unwrap();
        let html = report.to_html();
        assert!(html.contains("<h1>Sales report</h1>"));
        assert!(html.contains("north"));
        assert!(html.contains("Column statistics"));
    }

    #[test]
    fn high_null_columns_produce_a_warning() {
        let table = Table::new(
            "gaps",
            vec![Column::new(
                "score",
                FieldType::Numeric,
                vec![Some("1".to_string()), None, None, Some("2".to_string())],
            )],
        )
        .unwrap();
        let profiles = crate::data_handler::summary_statistics(&table);
        let generator = ReportGenerator::new();
        let insights = generator.insights(&table, &profiles);
        assert!(insights
            .iter()
            .any(|i| i.severity == Severity::Warning && i.message.contains("null")));
    }
}
