//! Export of a full pipeline run.

use approx::assert_relative_eq;
use chrono::{DateTime, NaiveDate, Utc};
use kessan_core::{
    DisclosureRecord, NetSalesGrowthRecord, Pipeline, PipelineConfig, PipelineOutput, Quarter,
    TabularRecord,
};
use kessan_output::{ExportFormat, Exporter, RunSummary, export_pipeline_output, to_dataframe};

fn full_year(year: i32, net_sales: f64) -> DisclosureRecord {
    let mut d = DisclosureRecord::new(
        "1301",
        "FYFinancialStatements_Consolidated_JP",
        Quarter::FullYear,
    );
    d.company_name = "KYOKUYO".to_string();
    d.filing_date = NaiveDate::from_ymd_opt(year, 5, 10);
    d.period_end = NaiveDate::from_ymd_opt(year, 3, 31);
    d.fiscal_year_end = d.period_end;
    d.total_assets = Some(1000.0);
    d.equity = Some(400.0);
    d.ordinary_profit = Some(100.0);
    d.net_sales = Some(net_sales);
    d.issued_shares = Some(100.0);
    d
}

fn output() -> PipelineOutput {
    let records = vec![full_year(2023, 1000.0), full_year(2024, 1100.0)];
    let stamp = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
    Pipeline::new(PipelineConfig::default()).run_at(records, stamp)
}

#[test]
fn test_valuation_csv_has_one_line_per_row() {
    let output = output();
    let csv = output
        .opvalue_growth
        .export_to_string(ExportFormat::Csv)
        .unwrap();

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 1 + output.opvalue_growth.len());
    assert_eq!(lines[0].split(',').count(), 39);
}

#[test]
fn test_sales_growth_frame() {
    let output = output();
    let df = to_dataframe(&output.sales_growth).unwrap();

    assert_eq!(df.width(), 16);
    let growth = df
        .column("growth_amount")
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap();
    assert_relative_eq!(growth.get(1).unwrap(), 100.0);
    assert_eq!(
        df.get_column_names()[0].as_str(),
        NetSalesGrowthRecord::COLUMNS[0].name
    );
}

#[test]
fn test_export_pipeline_output_files() {
    let dir = std::env::temp_dir().join(format!("kessan-export-{}", std::process::id()));
    let files = export_pipeline_output(&output(), &dir, "fins_all", ExportFormat::Json).unwrap();

    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        [
            "fins_all_adjusted.json",
            "fins_all_bps_opvalues.json",
            "fins_all_netsales.json"
        ]
    );
    assert!(files.iter().all(|p| p.exists()));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_summary_of_run() {
    let summary = RunSummary::from_output("fins_all", 2, &output());
    assert_eq!(summary.companies, 1);
    assert_eq!(summary.valuations, 2);
    assert_eq!(summary.sales_growth, 2);
}
