use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::sync::Semaphore;

use crate::classifier::Classifier;
use crate::domain::notification::Notification;
use crate::processing::enricher::RecordEnricher;
use crate::processing::index::CandidateIndex;
use crate::processing::{EnrichOptions, RunStats};

/// Output of a full enrichment run.
#[derive(Debug)]
pub struct EnrichmentReport {
    /// One record per input record, in input order.
    pub records: Vec<Notification>,
    pub stats: RunStats,
}

/// Runs the [`RecordEnricher`] over a whole collection with at most
/// `concurrency` records (and therefore classifier calls) in flight.
pub struct Orchestrator {
    enricher: RecordEnricher,
    concurrency: usize,
}

impl Orchestrator {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        index: Arc<CandidateIndex>,
        options: EnrichOptions,
        concurrency: usize,
    ) -> Self {
        Self {
            enricher: RecordEnricher::new(classifier, index, options),
            concurrency: concurrency.max(1),
        }
    }

    /// Enriches every record and waits for all of them.
    ///
    /// Each record runs in its own task behind a [`Semaphore`] permit.
    /// Results land in a slot per input index, so completion order does not
    /// matter. A task that panics still yields its input record, marked with
    /// `enrichment_error`.
    pub async fn run(&self, records: Vec<Notification>) -> EnrichmentReport {
        let total = records.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let fallbacks = records.clone();
        let mut slots: Vec<Option<Notification>> = vec![None; total];
        let mut stats = RunStats::default();

        log::info!(
            "Enriching {total} notifications with up to {} workers",
            self.concurrency
        );

        let mut tasks = FuturesUnordered::new();
        for (position, record) in records.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let enricher = self.enricher.clone();
            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                enricher.enrich(record).await
            });
            tasks.push(async move { (position, handle.await) });
        }

        let step = (total / 20).max(1);
        let mut completed = 0;
        while let Some((position, joined)) = tasks.next().await {
            match joined {
                Ok(enriched) => {
                    stats.absorb(&enriched.stats);
                    slots[position] = Some(enriched.record);
                }
                Err(e) => {
                    let mut record = fallbacks[position].clone();
                    log::error!(
                        "Enrichment failed for notification {}: {e}",
                        record.notification_no
                    );
                    record.enrichment_error = Some(e.to_string());
                    stats.record_failure();
                    slots[position] = Some(record);
                }
            }

            completed += 1;
            if completed % step == 0 || completed == total {
                log::info!("Enriched {completed}/{total} notifications");
            }
        }

        let records = slots
            .into_iter()
            .zip(fallbacks)
            .map(|(slot, fallback)| slot.unwrap_or(fallback))
            .collect();

        EnrichmentReport { records, stats }
    }
}

/// Logs the end-of-run summary.
pub fn log_run_stats(stats: &RunStats) {
    log::info!(
        "Finished enrichment: records={}, skipped_records={}, failed_records={}, classifier_calls={}, unavailable={}, rejected_unknown={}, skipped_codes={}, references_found={}, codes_found={}",
        stats.records,
        stats.skipped_records,
        stats.failed_records,
        stats.classifier_calls,
        stats.unavailable_total(),
        stats.rejected_unknown,
        stats.skipped_codes,
        stats.references_found,
        stats.codes_found
    );
    if stats.unavailable_total() > 0 || stats.failed_records > 0 {
        log::warn!(
            "Enrichment degraded: unavailable_by_kind={:?}, failed_records={}",
            stats.unavailable,
            stats.failed_records
        );
    }
}
