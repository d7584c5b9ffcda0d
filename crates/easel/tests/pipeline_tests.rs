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

use easel::{
    Aggregation, AnalysisSession, ChartData, ChartKind, Dashboard, EaselError, FieldSelection,
    FieldType, ReportSection,
};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

fn write_sales_csv(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("sales.csv");
    let mut file = fs::File::create(&path).unwrap();
    writeln!(file, "date,region,sales").unwrap();
    writeln!(file, "2024-01-01,north,100").unwrap();
    writeln!(file, "2024-01-02,south,250").unwrap();
    writeln!(file, "2024-01-03,north,80").unwrap();
    writeln!(file, "2024-01-04,west,40").unwrap();
    path
}

#[test]
fn csv_to_report_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = write_sales_csv(dir.path());

    let mut session = AnalysisSession::open(dir.path().join("dashboards")).unwrap();
    let table = session.load_file(&csv_path).unwrap();
    assert_eq!(table.row_count(), 4);
    assert_eq!(table.field_type("region"), Some(FieldType::Categorical));
    assert_eq!(table.field_type("sales"), Some(FieldType::Numeric));
    assert_eq!(table.field_type("date"), Some(FieldType::Datetime));

    let profiles = session.profiles();
    assert_eq!(profiles.len(), 3);
    let sales = profiles.iter().find(|p| p.name == "sales").unwrap();
    assert_eq!(sales.null_count, 0);
    assert!(sales.numeric.is_some());

    let spec = session
        .build_chart(
            ChartKind::Bar,
            &FieldSelection::new().with_x("region").with_y("sales"),
        )
        .unwrap();
    assert_eq!(spec.aggregation, Aggregation::Sum);

    let mut dashboard = Dashboard::new("weekly-sales");
    dashboard.push_chart(spec);
    session.save_dashboard(&dashboard).unwrap();
    assert_eq!(
        session.list_dashboards().unwrap(),
        vec!["weekly-sales".to_string()]
    );

    let reloaded = session.load_dashboard("weekly-sales").unwrap();
    assert_eq!(reloaded, dashboard);

    let report = session
        .generate_report("Weekly sales", &reloaded)
        .unwrap();
    let chart_section = report
        .sections
        .iter()
        .find_map(|s| match s {
            ReportSection::Chart { data, .. } => Some(data),
            _ => None,
        })
        .unwrap();
    assert_eq!(
        *chart_section,
        ChartData::Points {
            x: vec!["north".to_string(), "south".to_string(), "west".to_string()],
            y: vec![180.0, 250.0, 40.0],
        }
    );

    let html = report.to_html();
    assert!(html.contains("Weekly sales"));
    assert!(html.contains("north"));
}

#[test]
fn filters_narrow_the_session_table() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = write_sales_csv(dir.path());
    let mut session = AnalysisSession::open(dir.path().join("dashboards")).unwrap();
    session.load_file(&csv_path).unwrap();

    let table = session
        .apply_filters(&[easel::RowFilter::Equals {
            column: "region".to_string(),
            value: "north".to_string(),
        }])
        .unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.field_type("sales"), Some(FieldType::Numeric));

    let region = session
        .profiles()
        .iter()
        .find(|p| p.name == "region")
        .unwrap();
    assert_eq!(region.distinct_count, 1);
}

#[test]
fn chart_building_before_loading_fails() {
    let dir = tempfile::tempdir().unwrap();
    let session = AnalysisSession::open(dir.path()).unwrap();
    let result = session.build_chart(
        ChartKind::Bar,
        &FieldSelection::new().with_x("region").with_y("sales"),
    );
    assert!(matches!(result, Err(EaselError::Data(_))));
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    fs::write(&path, b"%PDF-1.4").unwrap();

    let mut session = AnalysisSession::open(dir.path().join("dashboards")).unwrap();
    let result = session.load_file(&path);
    let err = result.err().unwrap();
    assert_eq!(err.category(), "Data");
    assert!(err.to_string().contains("pdf"));
}

#[test]
fn report_on_header_only_csv_is_empty_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "date,region,sales\n").unwrap();

    let mut session = AnalysisSession::open(dir.path().join("dashboards")).unwrap();
    session.load_file(&path).unwrap();
    let dashboard = Dashboard::new("empty");
    let result = session.generate_report("Empty", &dashboard);
    let err = result.err().unwrap();
    assert_eq!(err.category(), "Report");
}

#[test]
fn invalid_selection_surfaces_the_reason() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = write_sales_csv(dir.path());
    let mut session = AnalysisSession::open(dir.path().join("dashboards")).unwrap();
    session.load_file(&csv_path).unwrap();

    let result = session.build_chart(
        ChartKind::Scatter,
        &FieldSelection::new().with_x("region").with_y("sales"),
    );
    let err = result.err().unwrap();
    assert_eq!(err.category(), "Chart");
    assert!(err.to_string().contains("scatter"));
}
