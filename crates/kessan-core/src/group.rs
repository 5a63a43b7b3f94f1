//! Grouping and ordering of records by company.
//!
//! Every per-record derivation only looks at the records of the same
//! company, so the pipeline works on [`CompanyGroup`]s. Groups are returned
//! in company-code order and keep the input order of their records until a
//! sort is requested; sorts are stable and place null dates last.

use crate::record::{DisclosureRecord, ReconciledRecord};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// A record that belongs to exactly one company.
pub trait CompanyRecord {
    /// Company identifier.
    fn seccode(&self) -> &str;

    /// Filing date, if known.
    fn filing_date(&self) -> Option<NaiveDate>;

    /// Period-end date, if known.
    fn period_end(&self) -> Option<NaiveDate>;
}

impl CompanyRecord for DisclosureRecord {
    fn seccode(&self) -> &str {
        &self.seccode
    }

    fn filing_date(&self) -> Option<NaiveDate> {
        self.filing_date
    }

    fn period_end(&self) -> Option<NaiveDate> {
        self.period_end
    }
}

impl CompanyRecord for ReconciledRecord {
    fn seccode(&self) -> &str {
        &self.disclosure.seccode
    }

    fn filing_date(&self) -> Option<NaiveDate> {
        self.disclosure.filing_date
    }

    fn period_end(&self) -> Option<NaiveDate> {
        self.disclosure.period_end
    }
}

/// All records of one company.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyGroup<T> {
    /// Company identifier shared by every record
    pub seccode: String,
    /// The company's records
    pub records: Vec<T>,
}

impl<T: CompanyRecord> CompanyGroup<T> {
    /// Sort ascending by filing date.
    pub fn sort_by_filing_date(&mut self) {
        self.records.sort_by_key(|r| nulls_last(r.filing_date()));
    }

    /// Sort ascending by period-end date.
    pub fn sort_by_period_end(&mut self) {
        self.records.sort_by_key(|r| nulls_last(r.period_end()));
    }

    /// Number of records in the group.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the group has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Sort key placing `None` after every date.
const fn nulls_last(date: Option<NaiveDate>) -> (bool, Option<NaiveDate>) {
    (date.is_none(), date)
}

/// Partition records by company identifier.
pub fn group_by_company<T: CompanyRecord>(records: Vec<T>) -> Vec<CompanyGroup<T>> {
    let mut groups: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.seccode().to_string())
            .or_default()
            .push(record);
    }

    groups
        .into_iter()
        .map(|(seccode, records)| CompanyGroup { seccode, records })
        .collect()
}

/// Apply a per-company transformation to every group and concatenate the results.
///
/// Groups are independent, so with `parallel` set they are processed on the
/// rayon pool. The concatenation keeps company-code order either way.
pub fn map_groups<T, R, F>(groups: Vec<CompanyGroup<T>>, parallel: bool, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(CompanyGroup<T>) -> Vec<R> + Sync + Send,
{
    let per_group: Vec<Vec<R>> = if parallel {
        groups.into_par_iter().map(f).collect()
    } else {
        groups.into_iter().map(f).collect()
    };

    per_group.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Quarter;

    fn record(seccode: &str, filed: Option<(i32, u32, u32)>) -> DisclosureRecord {
        let mut r = DisclosureRecord::new(seccode, "FYFinancialStatements", Quarter::FullYear);
        r.filing_date = filed.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        r
    }

    #[test]
    fn test_group_by_company_orders_codes_and_keeps_input_order() {
        let groups = group_by_company(vec![
            record("7203", Some((2024, 5, 1))),
            record("1301", Some((2024, 2, 1))),
            record("7203", Some((2023, 5, 1))),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].seccode, "1301");
        assert_eq!(groups[1].seccode, "7203");
        assert_eq!(
            groups[1].records[0].filing_date,
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
    }

    #[test]
    fn test_sort_places_null_dates_last() {
        let mut group = CompanyGroup {
            seccode: "1301".to_string(),
            records: vec![
                record("1301", None),
                record("1301", Some((2024, 2, 1))),
                record("1301", Some((2023, 2, 1))),
            ],
        };
        group.sort_by_filing_date();

        let dates: Vec<_> = group.records.iter().map(|r| r.filing_date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2023, 2, 1),
                NaiveDate::from_ymd_opt(2024, 2, 1),
                None
            ]
        );
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let mut first = record("1301", Some((2024, 2, 1)));
        first.docname = "first".to_string();
        let mut second = record("1301", Some((2024, 2, 1)));
        second.docname = "second".to_string();

        let mut group = CompanyGroup {
            seccode: "1301".to_string(),
            records: vec![first, second],
        };
        group.sort_by_filing_date();

        assert_eq!(group.records[0].docname, "first");
        assert_eq!(group.records[1].docname, "second");
    }

    #[test]
    fn test_map_groups_parallel_matches_sequential() {
        let records: Vec<_> = (0..50)
            .map(|i| record(&format!("{:04}", i % 7), Some((2020 + i % 5, 1, 1))))
            .collect();

        let sequential = map_groups(group_by_company(records.clone()), false, |g| {
            g.records.into_iter().map(|r| r.seccode).collect()
        });
        let parallel = map_groups(group_by_company(records), true, |g| {
            g.records.into_iter().map(|r| r.seccode).collect()
        });

        assert_eq!(sequential, parallel);
        assert_eq!(sequential.len(), 50);
    }

    #[test]
    fn test_empty_input() {
        let groups: Vec<CompanyGroup<DisclosureRecord>> = group_by_company(Vec::new());
        assert!(groups.is_empty());
    }
}
