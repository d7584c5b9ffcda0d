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

use crate::data_handler::table::Table;
use crate::error::{ChartError, ChartResult};
use serde::{Deserialize, Serialize};
use std::fmt;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Scatter,
    Histogram,
    Box,
    Heatmap,
    Area,
}
impl ChartKind {
    pub const ALL: [ChartKind; 8] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Pie,
        ChartKind::Scatter,
        ChartKind::Histogram,
        ChartKind::Box,
        ChartKind::Heatmap,
        ChartKind::Area,
    ];
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Scatter => "scatter",
            ChartKind::Histogram => "histogram",
            ChartKind::Box => "box",
            ChartKind::Heatmap => "heatmap",
            ChartKind::Area => "area",
        }
    }
}
impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    None,
    Sum,
    Mean,
    Count,
    Min,
    Max,
}
impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::None => "none",
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
            Aggregation::Count => "count",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
        }
    }
}
impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
/// Declarative description of one chart: a kind plus field bindings.
/// Immutable once built; consumable by any charting backend without
/// further transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub aggregation: Aggregation,
}
/// Which bindings a chart kind needs and what it accepts, exposed so a
/// front end can drive its field pickers from the same source of truth
/// the builder validates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub x_required: bool,
    pub x_numeric: bool,
    pub y_accepted: bool,
    pub y_required: bool,
    pub y_numeric: bool,
    pub color_accepted: bool,
}
pub fn field_rules(kind: ChartKind) -> FieldRule {
    match kind {
        ChartKind::Bar | ChartKind::Line | ChartKind::Area => FieldRule {
            x_required: true,
            x_numeric: false,
            y_accepted: true,
            y_required: true,
            y_numeric: true,
            color_accepted: true,
        },
        ChartKind::Pie => FieldRule {
            x_required: true,
            x_numeric: false,
            y_accepted: true,
            y_required: true,
            y_numeric: true,
            color_accepted: false,
        },
        ChartKind::Scatter => FieldRule {
            x_required: true,
            x_numeric: true,
            y_accepted: true,
            y_required: true,
            y_numeric: true,
            color_accepted: true,
        },
        ChartKind::Histogram => FieldRule {
            x_required: true,
            x_numeric: true,
            y_accepted: false,
            y_required: false,
            y_numeric: false,
            color_accepted: false,
        },
        ChartKind::Box => FieldRule {
            x_required: false,
            x_numeric: false,
            y_accepted: true,
            y_required: true,
            y_numeric: true,
            color_accepted: false,
        },
        ChartKind::Heatmap => FieldRule {
            x_required: true,
            x_numeric: false,
            y_accepted: true,
            y_required: true,
            y_numeric: false,
            color_accepted: false,
        },
    }
}
/// Caller-supplied column bindings for [`build`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection {
    pub x: Option<String>,
    pub y: Option<String>,
    pub color: Option<String>,
    pub aggregation: Option<Aggregation>,
}
impl FieldSelection {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_x(mut self, x: impl Into<String>) -> Self {
        self.x = Some(x.into());
        self
    }
    pub fn with_y(mut self, y: impl Into<String>) -> Self {
        self.y = Some(y.into());
        self
    }
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = Some(aggregation);
        self
    }
}
/// Validate a field selection against a table and produce a [`ChartSpec`].
/// Aggregation defaults to `none`, except a categorical x bound against a
/// numeric y, which defaults to `sum` unless the caller overrides it.
/// Deterministic: identical inputs always yield an identical spec.
pub fn build(kind: ChartKind, selection: &FieldSelection, table: &Table) -> ChartResult<ChartSpec> {
    let rule = field_rules(kind);
    let invalid = |reason: String| ChartError::InvalidFieldSelection {
        kind: kind.to_string(),
        reason,
    };
    let x = match (&selection.x, rule.x_required) {
        (Some(x), _) => Some(x.clone()),
        (None, true) => {
            return Err(invalid("an x field is required".to_string()));
        }
        (None, false) => None,
    };
    if let Some(x) = &x {
        let field_type = table
            .field_type(x)
            .ok_or_else(|| invalid(format!("column '{x}' is not in the table")))?;
        if rule.x_numeric && !field_type.is_numeric() {
            return Err(invalid(format!(
                "x field '{x}' must be numeric, but it is {field_type}"
            )));
        }
    }
    let y = match (&selection.y, rule.y_required, rule.y_accepted) {
        (Some(_), _, false) => {
            return Err(invalid("a y field is not accepted".to_string()));
        }
        (Some(y), _, true) => Some(y.clone()),
        (None, true, _) => {
            return Err(invalid("a y field is required".to_string()));
        }
        (None, false, _) => None,
    };
    if let Some(y) = &y {
        let field_type = table
            .field_type(y)
            .ok_or_else(|| invalid(format!("column '{y}' is not in the table")))?;
        if rule.y_numeric && !field_type.is_numeric() {
            return Err(invalid(format!(
                "y field '{y}' must be numeric, but it is {field_type}"
            )));
        }
    }
    if let Some(color) = &selection.color {
        if !rule.color_accepted {
            return Err(invalid("a color field is not accepted".to_string()));
        }
        if !table.has_column(color) {
            return Err(invalid(format!("column '{color}' is not in the table")));
        }
    }
    let aggregation = selection.aggregation.unwrap_or_else(|| {
        let x_categorical = x
            .as_deref()
            .and_then(|x| table.field_type(x))
            .is_some_and(|t| t.is_categorical());
        let y_numeric = y
            .as_deref()
            .and_then(|y| table.field_type(y))
            .is_some_and(|t| t.is_numeric());
        if x_categorical && y_numeric {
            Aggregation::Sum
        } else {
            Aggregation::None
        }
    });
    Ok(ChartSpec {
        kind,
        x,
        y,
        color: selection.color.clone(),
        aggregation,
    })
}
