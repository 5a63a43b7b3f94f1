//! Run summaries for terminal and markdown output.

use chrono::{DateTime, Utc};
use kessan_core::PipelineOutput;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Counts describing one derivation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Dataset name, usually the table prefix
    pub name: String,
    /// When the summary was produced
    pub generated_at: DateTime<Utc>,
    /// Disclosure records fed to the pipeline
    pub input_records: usize,
    /// Distinct companies
    pub companies: usize,
    /// Reconciled records
    pub reconciled: usize,
    /// Records updated by an earnings forecast revision
    pub earn_updates: usize,
    /// Records updated by a dividend forecast revision
    pub div_updates: usize,
    /// Valuation rows
    pub valuations: usize,
    /// Net-sales growth rows
    pub sales_growth: usize,
}

impl RunSummary {
    /// Summarize a pipeline output.
    pub fn from_output(
        name: impl Into<String>,
        input_records: usize,
        output: &PipelineOutput,
    ) -> Self {
        let companies = output
            .reconciled
            .iter()
            .map(|r| r.disclosure.seccode.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        Self {
            name: name.into(),
            generated_at: Utc::now(),
            input_records,
            companies,
            reconciled: output.reconciled.len(),
            earn_updates: output
                .reconciled
                .iter()
                .filter(|r| r.earn_flag.is_some())
                .count(),
            div_updates: output
                .reconciled
                .iter()
                .filter(|r| r.div_flag.is_some())
                .count(),
            valuations: output.opvalue_growth.len(),
            sales_growth: output.sales_growth.len(),
        }
    }

    /// Reconciled records without a valuation row (revisions and ineligible rows).
    pub const fn valuation_skipped(&self) -> usize {
        self.reconciled.saturating_sub(self.valuations)
    }

    fn rows(&self) -> [(&'static str, usize); 8] {
        [
            ("Input records", self.input_records),
            ("Companies", self.companies),
            ("Reconciled", self.reconciled),
            ("Earnings revisions applied", self.earn_updates),
            ("Dividend revisions applied", self.div_updates),
            ("Valuations", self.valuations),
            ("Without valuation", self.valuation_skipped()),
            ("Net-sales growth", self.sales_growth),
        ]
    }

    /// Format as an ASCII table for terminal output.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nRun Summary: {}\n", self.name));
        output.push_str(&format!(
            "Generated: {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&"=".repeat(48));
        output.push('\n');

        for (label, count) in self.rows() {
            output.push_str(&format!("  {:<32}{:>12}\n", format!("{label}:"), count));
        }

        output.push_str(&"=".repeat(48));
        output.push('\n');
        output
    }

    /// Format as markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Run Summary: {}\n\n", self.name));
        output.push_str(&format!(
            "**Generated:** {}\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str("| Stage | Rows |\n");
        output.push_str("|-------|-----:|\n");
        for (label, count) in self.rows() {
            output.push_str(&format!("| {label} | {count} |\n"));
        }
        output
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii_table())
    }
}
