//! Transform provider statements into disclosure records.

use crate::jquants::{ListedInfo, RawStatement};
use chrono::{DateTime, Utc};
use kessan_core::{DisclosureRecord, Quarter, Revision};
use std::collections::HashMap;
use tracing::{debug, info};

/// Document types containing any of these are not ingested.
const EXCLUDED_DOCUMENT_MARKERS: [&str; 2] = ["Foreign", "REIT"];

/// Company names keyed by five-character issue code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyDirectory {
    names: HashMap<String, String>,
}

impl CompanyDirectory {
    /// Build a directory from `listed/info` entries.
    pub fn from_listed_info(info: impl IntoIterator<Item = ListedInfo>) -> Self {
        let names = info
            .into_iter()
            .map(|i| (i.code, i.company_name))
            .collect();
        Self { names }
    }

    /// Register or replace a company name.
    pub fn insert(&mut self, code: impl Into<String>, name: impl Into<String>) {
        self.names.insert(code.into(), name.into());
    }

    /// Company name for an issue code.
    pub fn get(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    /// Number of companies.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Counters of one ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Statements seen
    pub total: usize,
    /// Records produced
    pub kept: usize,
    /// Statements of foreign issuers or REITs
    pub skipped_foreign_or_reit: usize,
    /// Statements whose code is not in the directory
    pub unknown_company: usize,
}

/// Whether the document type is excluded from ingestion.
pub fn is_excluded_document(type_of_document: &str) -> bool {
    EXCLUDED_DOCUMENT_MARKERS
        .iter()
        .any(|marker| type_of_document.contains(marker))
}

/// Convert one statement, given its resolved company name.
pub fn to_disclosure(
    statement: RawStatement,
    company_name: &str,
    timestamp: DateTime<Utc>,
) -> DisclosureRecord {
    let seccode: String = statement.local_code.chars().take(4).collect();
    let mut record = DisclosureRecord::new(
        seccode,
        statement.type_of_document.as_str(),
        Quarter::from_period_type(&statement.type_of_current_period),
    );

    record.timestamp = timestamp;
    record.revision = Revision::detect(&statement.type_of_document);
    record.filing_date = statement.disclosed_date;
    record.company_name = company_name.to_string();
    record.fiscal_year_end = statement.current_fiscal_year_end_date;
    record.period_end = statement.current_period_end_date;

    record.total_assets = statement.total_assets;
    record.equity = statement.equity;
    record.net_sales = statement.net_sales;
    record.operating_profit = statement.operating_profit;
    record.ordinary_profit = statement.ordinary_profit;
    record.profit = statement.profit;
    record.earnings_per_share = statement.earnings_per_share;
    record.dividend_annual = statement.result_dividend_per_share_annual;

    record.forecast_net_sales = statement.forecast_net_sales;
    record.forecast_operating_profit = statement.forecast_operating_profit;
    record.forecast_ordinary_profit = statement.forecast_ordinary_profit;
    record.forecast_profit = statement.forecast_profit;
    record.forecast_dividend_annual = statement.forecast_dividend_per_share_annual;

    record.next_year_forecast_net_sales = statement.next_year_forecast_net_sales;
    record.next_year_forecast_operating_profit = statement.next_year_forecast_operating_profit;
    record.next_year_forecast_ordinary_profit = statement.next_year_forecast_ordinary_profit;
    record.next_year_forecast_profit = statement.next_year_forecast_profit;
    record.next_year_forecast_dividend_annual =
        statement.next_year_forecast_dividend_per_share_annual;

    record.issued_shares = statement.issued_shares_including_treasury;
    record.treasury_shares = statement.treasury_shares;
    record
}

/// Convert statements into disclosure records.
///
/// Foreign issuers, REITs and companies missing from `directory` are
/// dropped. Figures keep their nulls; no default is substituted.
pub fn ingest(
    statements: impl IntoIterator<Item = RawStatement>,
    directory: &CompanyDirectory,
    timestamp: DateTime<Utc>,
) -> (Vec<DisclosureRecord>, IngestStats) {
    let mut stats = IngestStats::default();
    let mut records = Vec::new();

    for statement in statements {
        stats.total += 1;

        if is_excluded_document(&statement.type_of_document) {
            stats.skipped_foreign_or_reit += 1;
            continue;
        }

        let Some(name) = directory.get(&statement.local_code) else {
            debug!(code = %statement.local_code, "unknown company, skipping");
            stats.unknown_company += 1;
            continue;
        };

        records.push(to_disclosure(statement, name, timestamp));
    }

    stats.kept = records.len();
    info!(
        total = stats.total,
        kept = stats.kept,
        foreign_or_reit = stats.skipped_foreign_or_reit,
        unknown = stats.unknown_company,
        "ingested statements"
    );
    (records, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn statement(code: &str, doc: &str, period: &str) -> RawStatement {
        RawStatement {
            local_code: code.to_string(),
            type_of_document: doc.to_string(),
            type_of_current_period: period.to_string(),
            disclosed_date: NaiveDate::from_ymd_opt(2024, 5, 10),
            net_sales: Some(1000.0),
            ..RawStatement::default()
        }
    }

    fn directory() -> CompanyDirectory {
        CompanyDirectory::from_listed_info([
            ListedInfo {
                code: "13010".to_string(),
                company_name: "KYOKUYO".to_string(),
            },
            ListedInfo {
                code: "72030".to_string(),
                company_name: "TOYOTA".to_string(),
            },
        ])
    }

    #[rstest]
    #[case("ForeignFYFinancialStatements", true)]
    #[case("FYFinancialStatements_NonConsolidated_REIT", true)]
    #[case("FYFinancialStatements_Consolidated_JP", false)]
    #[case("EarnForecastRevision", false)]
    fn test_excluded_documents(#[case] doc: &str, #[case] excluded: bool) {
        assert_eq!(is_excluded_document(doc), excluded);
    }

    #[test]
    fn test_ingest_filters_and_maps() {
        let statements = vec![
            statement("13010", "FYFinancialStatements_Consolidated_JP", "FY"),
            statement("72030", "1QFinancialStatements_Consolidated_JP", "1Q"),
            statement("89510", "FYFinancialStatements_NonConsolidated_REIT", "FY"),
            statement("99990", "FYFinancialStatements_Consolidated_JP", "FY"),
        ];

        let (records, stats) = ingest(statements, &directory(), Utc::now());

        assert_eq!(
            stats,
            IngestStats {
                total: 4,
                kept: 2,
                skipped_foreign_or_reit: 1,
                unknown_company: 1,
            }
        );
        assert_eq!(records[0].seccode, "1301");
        assert_eq!(records[0].company_name, "KYOKUYO");
        assert_eq!(records[0].quarter, Quarter::FullYear);
        assert_eq!(records[1].seccode, "7203");
        assert_eq!(records[1].quarter, Quarter::First);
        assert_eq!(records[1].net_sales, Some(1000.0));
    }

    #[test]
    fn test_revision_tag_detected_by_substring() {
        let (records, _) = ingest(
            [statement("13010", "EarnForecastRevision_REVISED", "FY")],
            &directory(),
            Utc::now(),
        );
        assert_eq!(records[0].revision, Some(Revision::EarnForecast));
        assert_eq!(records[0].docname, "EarnForecastRevision_REVISED");
    }

    #[test]
    fn test_directory_uses_full_code() {
        let dir = directory();
        assert_eq!(dir.get("13010"), Some("KYOKUYO"));
        assert_eq!(dir.get("1301"), None);
        assert_eq!(dir.len(), 2);
        assert!(!dir.is_empty());
    }
}
