//! Three-stage derivation pipeline.
//!
//! raw disclosures → reconciled disclosures → valuations → growth.
//! Each stage reads the previous stage's full output and produces a new
//! collection; nothing is updated in place.

use crate::growth::{
    NetSalesGrowthRecord, OpValueGrowthRecord, derive_opvalue_growth, derive_sales_growth,
};
use crate::reconcile::reconcile;
use crate::record::{DisclosureRecord, ReconciledRecord};
use crate::valuation::{ValuationConfig, ValuationEngine, ValuationRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Configuration for the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Process companies on the rayon pool (default: true)
    pub parallel: bool,
    /// Valuation parameters
    pub valuation: ValuationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            valuation: ValuationConfig::default(),
        }
    }
}

/// Every dataset produced by one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    /// Reconciled disclosures, revision filings included
    pub reconciled: Vec<ReconciledRecord>,
    /// Valuations with operation-value growth
    pub opvalue_growth: Vec<OpValueGrowthRecord>,
    /// Reconciled non-revision disclosures with net-sales growth
    pub sales_growth: Vec<NetSalesGrowthRecord>,
}

impl PipelineOutput {
    /// Valuations without their growth figures.
    pub fn valuations(&self) -> impl Iterator<Item = &ValuationRecord> {
        self.opvalue_growth.iter().map(|r| &r.valuation)
    }

    /// Whether the run produced nothing at all.
    pub fn is_empty(&self) -> bool {
        self.reconciled.is_empty()
    }
}

/// Runs reconciliation, valuation and growth over a disclosure collection
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
    valuation: ValuationEngine,
}

impl Pipeline {
    /// Create a pipeline.
    pub const fn new(config: PipelineConfig) -> Self {
        let valuation = ValuationEngine::with_config(config.valuation);
        Self { config, valuation }
    }

    /// The pipeline configuration.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage, stamping output with the current time.
    pub fn run(&self, records: Vec<DisclosureRecord>) -> PipelineOutput {
        self.run_at(records, Utc::now())
    }

    /// Run every stage, stamping output with `stamped_at`.
    ///
    /// The same input and stamp always yield the same output.
    pub fn run_at(
        &self,
        records: Vec<DisclosureRecord>,
        stamped_at: DateTime<Utc>,
    ) -> PipelineOutput {
        let parallel = self.config.parallel;
        let started = Instant::now();
        info!(records = records.len(), parallel, "pipeline started");

        if records.is_empty() {
            info!("no disclosures to process");
            return PipelineOutput::default();
        }

        let reconciled = reconcile(records, stamped_at, parallel);
        let flagged = reconciled
            .iter()
            .filter(|r| r.earn_flag.is_some() || r.div_flag.is_some())
            .count();
        info!(rows = reconciled.len(), flagged, "reconciliation finished");

        let derive_valuations = || {
            let valuations = self
                .valuation
                .derive(reconciled.clone(), stamped_at, parallel);
            derive_opvalue_growth(valuations, parallel)
        };
        let derive_sales = || derive_sales_growth(reconciled.clone(), stamped_at, parallel);

        let (opvalue_growth, sales_growth) = if parallel {
            rayon::join(derive_valuations, derive_sales)
        } else {
            (derive_valuations(), derive_sales())
        };

        info!(
            reconciled = reconciled.len(),
            valuations = opvalue_growth.len(),
            netsales = sales_growth.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline finished"
        );

        PipelineOutput {
            reconciled,
            opvalue_growth,
            sales_growth,
        }
    }
}
