use std::collections::BTreeMap;

use serde::Deserialize;

use crate::processing::response::VerdictRule;

pub mod enricher;
pub mod index;
pub mod orchestrator;
pub mod response;

/// How tariff codes are matched against a notification.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TariffStrategy {
    /// One call offering a capped list of codes; results go to `matched_hsn`.
    #[default]
    Batch,
    /// One yes/no call per code; results go to `HSN_ref`. Records that
    /// already carry `HSN_ref` are left alone.
    PerCode,
}

/// Knobs shared by every per-record enrichment.
#[derive(Debug, Clone, Copy)]
pub struct EnrichOptions {
    pub strategy: TariffStrategy,
    pub candidate_cap: usize,
    pub verdict_rule: VerdictRule,
    pub match_references: bool,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            strategy: TariffStrategy::Batch,
            candidate_cap: crate::MAX_CANDIDATES,
            verdict_rule: VerdictRule::ContainsYes,
            match_references: true,
        }
    }
}

/// Counters collected while enriching one record.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordStats {
    pub skipped: bool,
    pub classifier_calls: usize,
    pub unavailable: BTreeMap<&'static str, usize>,
    pub rejected_unknown: usize,
    pub skipped_codes: usize,
    pub references_found: usize,
    pub codes_found: usize,
}

/// Counters for a whole run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub records: usize,
    pub skipped_records: usize,
    pub failed_records: usize,
    pub classifier_calls: usize,
    pub unavailable: BTreeMap<&'static str, usize>,
    pub rejected_unknown: usize,
    pub skipped_codes: usize,
    pub references_found: usize,
    pub codes_found: usize,
}

impl RunStats {
    pub fn absorb(&mut self, record: &RecordStats) {
        self.records += 1;
        if record.skipped {
            self.skipped_records += 1;
        }
        self.classifier_calls += record.classifier_calls;
        for (kind, count) in &record.unavailable {
            *self.unavailable.entry(*kind).or_default() += count;
        }
        self.rejected_unknown += record.rejected_unknown;
        self.skipped_codes += record.skipped_codes;
        self.references_found += record.references_found;
        self.codes_found += record.codes_found;
    }

    pub fn record_failure(&mut self) {
        self.records += 1;
        self.failed_records += 1;
    }

    pub fn unavailable_total(&self) -> usize {
        self.unavailable.values().sum()
    }
}
