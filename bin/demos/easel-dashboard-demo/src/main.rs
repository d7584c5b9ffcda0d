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

use anyhow::{bail, Context, Result};
use easel::{AnalysisSession, ChartKind, Dashboard, FieldSelection};
use std::path::PathBuf;

/// Walks the whole pipeline over one file: load, profile, build a bar
/// chart from the first categorical/numeric column pair, save the
/// dashboard, and print the report.
///
/// Usage: easel-dashboard-demo <data-file> [store-dir]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(data_file) = args.next() else {
        bail!("usage: easel-dashboard-demo <data-file> [store-dir]");
    };
    let store_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./dashboards"));

    let mut session = AnalysisSession::open(&store_dir)
        .with_context(|| format!("opening dashboard store at {}", store_dir.display()))?;
    let table = session
        .load_file(&data_file)
        .with_context(|| format!("loading {data_file}"))?;
    println!(
        "Loaded '{}': {} rows, {} columns",
        table.name(),
        table.row_count(),
        table.column_count()
    );
    for (name, field_type) in table.column_types() {
        println!("  {name}: {field_type}");
    }

    let categorical = session
        .profiles()
        .iter()
        .find(|p| p.field_type.is_categorical())
        .map(|p| p.name.clone());
    let numeric = session
        .profiles()
        .iter()
        .find(|p| p.field_type.is_numeric())
        .map(|p| p.name.clone());
    let (Some(x), Some(y)) = (categorical, numeric) else {
        bail!("demo needs at least one categorical and one numeric column");
    };

    let spec = session.build_chart(
        ChartKind::Bar,
        &FieldSelection::new().with_x(&x).with_y(&y),
    )?;
    println!("Built {} chart: {} by {} ({})", spec.kind, y, x, spec.aggregation);

    let mut dashboard = Dashboard::new("demo").with_description("generated by easel-dashboard-demo");
    dashboard.push_chart(spec);
    session.save_dashboard(&dashboard)?;
    println!("Saved dashboard 'demo' ({} stored total)", session.list_dashboards()?.len());

    let report = session.generate_report("Demo report", &dashboard)?;
    println!("{}", report.to_html());
    Ok(())
}
