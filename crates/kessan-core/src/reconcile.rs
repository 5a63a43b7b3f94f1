//! Revision reconciliation.
//!
//! Forecast-revision filings amend the forecast of an earlier substantive
//! filing without being a new period's statement. For each company, ordered
//! by filing date, the chronologically last filing is inspected: when it is a
//! revision, its non-zero forecast figures are folded into the nearest
//! preceding non-revision filing of the same fiscal year, which then takes
//! the revision's filing date and an update flag.
//!
//! Records are never created or removed; revision rows stay in the output.

use crate::group::{CompanyGroup, group_by_company, map_groups};
use crate::record::{DisclosureRecord, ReconciledRecord, Revision, RevisionMark};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Reconcile every company in a disclosure collection.
///
/// The output holds one [`ReconciledRecord`] per input record, grouped by
/// company and ordered by filing date within each company. Every record is
/// stamped with `stamped_at`.
pub fn reconcile(
    records: Vec<DisclosureRecord>,
    stamped_at: DateTime<Utc>,
    parallel: bool,
) -> Vec<ReconciledRecord> {
    let groups = group_by_company(records);
    info!(companies = groups.len(), "reconciling forecast revisions");

    map_groups(groups, parallel, |group| {
        let mut reconciled = reconcile_company(group);
        for record in &mut reconciled {
            record.disclosure.timestamp = stamped_at;
        }
        reconciled
    })
}

/// Reconcile the filings of a single company.
pub fn reconcile_company(mut group: CompanyGroup<DisclosureRecord>) -> Vec<ReconciledRecord> {
    debug!(seccode = %group.seccode, rows = group.len(), "adjusting company");
    group.sort_by_filing_date();

    let mut rows: Vec<ReconciledRecord> = group
        .records
        .into_iter()
        .map(ReconciledRecord::unflagged)
        .collect();

    let Some(last_index) = rows.len().checked_sub(1) else {
        return rows;
    };
    let Some(revision) = rows[last_index].disclosure.revision_kind() else {
        return rows;
    };
    let Some(previous_index) = (0..last_index)
        .rev()
        .find(|&i| !rows[i].disclosure.is_revision())
    else {
        debug!(seccode = %group.seccode, "no substantive filing precedes the revision");
        return rows;
    };

    let (head, tail) = rows.split_at_mut(last_index);
    apply_revision(&mut head[previous_index], &tail[0].disclosure, revision);

    rows
}

/// Fold the forecast figures of `revision_row` into `target`.
///
/// Returns whether `target` was modified.
fn apply_revision(
    target: &mut ReconciledRecord,
    revision_row: &DisclosureRecord,
    revision: Revision,
) -> bool {
    let same_fiscal_year = matches!(
        (target.disclosure.fiscal_year_end, revision_row.fiscal_year_end),
        (Some(a), Some(b)) if a == b
    );
    if !same_fiscal_year {
        debug!(
            seccode = %revision_row.seccode,
            revision = %revision,
            "fiscal year differs from the preceding filing, skipping"
        );
        return false;
    }

    let mut updated = false;
    for &field in revision.revised_fields() {
        match revision_row.forecast(field) {
            Some(value) if value != 0.0 => {
                info!(
                    seccode = %revision_row.seccode,
                    field = field.column(),
                    from = ?target.disclosure.forecast(field),
                    to = value,
                    "updating forecast"
                );
                target.disclosure.set_forecast(field, Some(value));
                updated = true;
            }
            original => {
                debug!(
                    seccode = %revision_row.seccode,
                    field = field.column(),
                    original = ?original,
                    "no update"
                );
            }
        }
    }

    if updated {
        info!(
            seccode = %revision_row.seccode,
            from = ?target.disclosure.filing_date,
            to = ?revision_row.filing_date,
            "updating filing date"
        );
        target.disclosure.filing_date = revision_row.filing_date;
        match revision {
            Revision::EarnForecast => target.earn_flag = Some(RevisionMark::Updated),
            Revision::DividendForecast => target.div_flag = Some(RevisionMark::Updated),
        }
    }

    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Quarter;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn filing(docname: &str, quarter: Quarter, filed: Option<NaiveDate>) -> DisclosureRecord {
        let mut r = DisclosureRecord::new("1301", docname, quarter);
        r.filing_date = filed;
        r.fiscal_year_end = date(2025, 3, 31);
        r
    }

    fn group(records: Vec<DisclosureRecord>) -> CompanyGroup<DisclosureRecord> {
        CompanyGroup {
            seccode: "1301".to_string(),
            records,
        }
    }

    #[test]
    fn test_earn_revision_updates_previous_substantive_filing() {
        let mut base = filing("2QFinancialStatements", Quarter::Second, date(2024, 11, 5));
        base.forecast_net_sales = Some(1000.0);
        base.forecast_profit = Some(50.0);
        base.forecast_dividend_annual = Some(20.0);

        let mut revision = filing("EarnForecastRevision", Quarter::FullYear, date(2025, 1, 20));
        revision.forecast_net_sales = Some(1100.0);
        revision.forecast_profit = Some(0.0);
        revision.forecast_dividend_annual = None;

        let out = reconcile_company(group(vec![revision, base]));

        assert_eq!(out.len(), 2);
        let updated = &out[0];
        assert_eq!(updated.disclosure.forecast_net_sales, Some(1100.0));
        assert_eq!(updated.disclosure.forecast_profit, Some(50.0));
        assert_eq!(updated.disclosure.forecast_dividend_annual, Some(20.0));
        assert_eq!(updated.disclosure.filing_date, date(2025, 1, 20));
        assert_eq!(updated.earn_flag, Some(RevisionMark::Updated));
        assert_eq!(updated.div_flag, None);

        // The revision row itself is untouched.
        assert_eq!(out[1].disclosure.docname, "EarnForecastRevision");
        assert_eq!(out[1].earn_flag, None);
    }

    #[test]
    fn test_dividend_revision_only_touches_dividend() {
        let mut base = filing("3QFinancialStatements", Quarter::Third, date(2025, 2, 5));
        base.forecast_net_sales = Some(1000.0);
        base.forecast_dividend_annual = Some(20.0);

        let mut revision = filing("DividendForecastRevision", Quarter::FullYear, date(2025, 3, 1));
        revision.forecast_net_sales = Some(9999.0);
        revision.forecast_dividend_annual = Some(25.0);

        let out = reconcile_company(group(vec![base, revision]));

        assert_eq!(out[0].disclosure.forecast_net_sales, Some(1000.0));
        assert_eq!(out[0].disclosure.forecast_dividend_annual, Some(25.0));
        assert_eq!(out[0].div_flag, Some(RevisionMark::Updated));
        assert_eq!(out[0].earn_flag, None);
    }

    #[test]
    fn test_fiscal_year_mismatch_leaves_group_unchanged() {
        let mut base = filing("FYFinancialStatements", Quarter::FullYear, date(2024, 5, 10));
        base.fiscal_year_end = date(2024, 3, 31);
        base.forecast_net_sales = Some(1000.0);

        let mut revision = filing("EarnForecastRevision", Quarter::FullYear, date(2024, 8, 1));
        revision.forecast_net_sales = Some(1200.0);

        let input = vec![base, revision];
        let out = reconcile_company(group(input.clone()));

        let disclosures: Vec<_> = out.iter().map(|r| r.disclosure.clone()).collect();
        assert_eq!(disclosures, input);
        assert!(out.iter().all(|r| r.earn_flag.is_none() && r.div_flag.is_none()));
    }

    #[test]
    fn test_revision_skips_earlier_revisions_to_find_predecessor() {
        let mut base = filing("1QFinancialStatements", Quarter::First, date(2024, 8, 1));
        base.forecast_operating_profit = Some(10.0);
        let mut older_revision =
            filing("DividendForecastRevision", Quarter::FullYear, date(2024, 9, 1));
        older_revision.forecast_dividend_annual = Some(30.0);
        let mut latest = filing("EarnForecastRevision", Quarter::FullYear, date(2024, 10, 1));
        latest.forecast_operating_profit = Some(12.0);

        let out = reconcile_company(group(vec![base, older_revision, latest]));

        assert_eq!(out[0].disclosure.forecast_operating_profit, Some(12.0));
        assert_eq!(out[0].earn_flag, Some(RevisionMark::Updated));
        // Only the trailing revision is applied.
        assert_eq!(out[0].disclosure.forecast_dividend_annual, None);
        assert_eq!(out[1].disclosure.forecast_dividend_annual, Some(30.0));
    }

    #[test]
    fn test_all_null_or_zero_forecasts_set_no_flag() {
        let base = filing("2QFinancialStatements", Quarter::Second, date(2024, 11, 5));
        let mut revision = filing("EarnForecastRevision", Quarter::FullYear, date(2025, 1, 20));
        revision.forecast_net_sales = Some(0.0);

        let out = reconcile_company(group(vec![base, revision]));

        assert_eq!(out[0].earn_flag, None);
        assert_eq!(out[0].disclosure.filing_date, date(2024, 11, 5));
    }

    #[test]
    fn test_only_revisions_or_single_record() {
        let single = reconcile_company(group(vec![filing(
            "EarnForecastRevision",
            Quarter::FullYear,
            date(2024, 1, 1),
        )]));
        assert_eq!(single.len(), 1);

        let revisions = reconcile_company(group(vec![
            filing("DividendForecastRevision", Quarter::FullYear, date(2024, 1, 1)),
            filing("EarnForecastRevision", Quarter::FullYear, date(2024, 2, 1)),
        ]));
        assert!(revisions.iter().all(|r| r.earn_flag.is_none()));

        assert!(reconcile_company(group(Vec::new())).is_empty());
    }

    #[test]
    fn test_null_fiscal_year_end_never_matches() {
        let mut base = filing("2QFinancialStatements", Quarter::Second, date(2024, 11, 5));
        base.fiscal_year_end = None;
        let mut revision = filing("EarnForecastRevision", Quarter::FullYear, date(2025, 1, 20));
        revision.fiscal_year_end = None;
        revision.forecast_net_sales = Some(5.0);

        let out = reconcile_company(group(vec![base, revision]));
        assert_eq!(out[0].earn_flag, None);
    }

    #[test]
    fn test_reconcile_stamps_and_keeps_every_record() {
        let stamp = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let mut other = filing("FYFinancialStatements", Quarter::FullYear, date(2024, 5, 1));
        other.seccode = "7203".to_string();
        let records = vec![
            other,
            filing("2QFinancialStatements", Quarter::Second, date(2024, 11, 5)),
            filing("EarnForecastRevision", Quarter::FullYear, date(2025, 1, 20)),
        ];

        let out = reconcile(records, stamp, true);

        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|r| r.disclosure.timestamp == stamp));
        assert_eq!(out[0].disclosure.seccode, "1301");
        assert_eq!(out[2].disclosure.seccode, "7203");
    }
}
