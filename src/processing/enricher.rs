use std::sync::Arc;

use crate::classifier::prompt::{reference_request, tariff_batch_request, tariff_verdict_request};
use crate::classifier::{ClassificationRequest, Classifier};
use crate::domain::notification::{Notification, ReferencedNotification};
use crate::processing::index::{CandidateIndex, is_placeholder_description};
use crate::processing::response::filter_known_lines;
use crate::processing::{EnrichOptions, RecordStats, TariffStrategy};

/// Descriptions shorter than this are too vague to ask about.
pub const MIN_DESCRIPTION_LEN: usize = 5;

/// A record after enrichment together with what it cost.
#[derive(Debug)]
pub struct EnrichedRecord {
    pub record: Notification,
    pub stats: RecordStats,
}

/// Annotates single notifications using a [`Classifier`].
///
/// Classifier failures never escape: they are logged, counted and treated
/// as "no match".
#[derive(Clone)]
pub struct RecordEnricher {
    classifier: Arc<dyn Classifier>,
    index: Arc<CandidateIndex>,
    options: EnrichOptions,
}

impl RecordEnricher {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        index: Arc<CandidateIndex>,
        options: EnrichOptions,
    ) -> Self {
        Self {
            classifier,
            index,
            options,
        }
    }

    pub async fn enrich(&self, mut record: Notification) -> EnrichedRecord {
        let mut stats = RecordStats::default();

        if self.options.strategy == TariffStrategy::PerCode && record.has_tariff_refs() {
            stats.skipped = true;
            return EnrichedRecord { record, stats };
        }

        let text = record.classification_text();

        if self.options.match_references {
            let references = self
                .find_references(&text, &record.notification_no, &mut stats)
                .await;
            stats.references_found = references.len();
            record.referenced_notifications = Some(references);
        }

        match self.options.strategy {
            TariffStrategy::Batch => {
                let codes = self
                    .find_codes_batch(&text, &record.notification_no, &mut stats)
                    .await;
                stats.codes_found = codes.len();
                record.matched_hsn = Some(codes);
            }
            TariffStrategy::PerCode => {
                let codes = self
                    .find_codes_per_code(&text, &record.notification_no, &mut stats)
                    .await;
                stats.codes_found = codes.len();
                record.hsn_ref = Some(codes);
            }
        }

        EnrichedRecord { record, stats }
    }

    /// Sends one request, converting failures into `None`.
    async fn ask(
        &self,
        request: &ClassificationRequest,
        subject: &str,
        stats: &mut RecordStats,
    ) -> Option<String> {
        stats.classifier_calls += 1;
        match self.classifier.complete(request).await {
            Ok(answer) => Some(answer),
            Err(e) => {
                log::warn!("Classification unavailable for {subject}: {e}");
                *stats.unavailable.entry(e.kind()).or_default() += 1;
                None
            }
        }
    }

    async fn find_references(
        &self,
        text: &str,
        current: &str,
        stats: &mut RecordStats,
    ) -> Vec<ReferencedNotification> {
        let candidates = self
            .index
            .reference_candidates(current, self.options.candidate_cap);
        if candidates.is_empty() {
            return vec![];
        }

        let request = reference_request(text, current, &candidates);
        let subject = format!("references of {current}");
        let Some(answer) = self.ask(&request, &subject, stats).await else {
            return vec![];
        };

        let outcome = filter_known_lines(&answer, |line| {
            line != current && self.index.contains_notification(line)
        });
        stats.rejected_unknown += outcome.rejected_unknown;

        outcome
            .matched
            .into_iter()
            .filter_map(|number| {
                let id = self.index.notification_id(&number)?.clone();
                Some(ReferencedNotification {
                    notification_no: number,
                    id,
                })
            })
            .collect()
    }

    async fn find_codes_batch(
        &self,
        text: &str,
        notification_no: &str,
        stats: &mut RecordStats,
    ) -> Vec<String> {
        let candidates = self.index.tariff_candidates(self.options.candidate_cap);
        if candidates.is_empty() {
            return vec![];
        }

        let request = tariff_batch_request(text, &candidates);
        let subject = format!("tariff codes of {notification_no}");
        let Some(answer) = self.ask(&request, &subject, stats).await else {
            return vec![];
        };

        let outcome = filter_known_lines(&answer, |line| self.index.contains_code(line));
        stats.rejected_unknown += outcome.rejected_unknown;
        outcome.matched
    }

    async fn find_codes_per_code(
        &self,
        text: &str,
        notification_no: &str,
        stats: &mut RecordStats,
    ) -> Vec<String> {
        let mut accepted = Vec::new();

        for candidate in self.index.tariff_codes() {
            if is_placeholder_description(&candidate.description)
                || candidate.description.chars().count() < MIN_DESCRIPTION_LEN
            {
                stats.skipped_codes += 1;
                continue;
            }

            let request = tariff_verdict_request(text, candidate);
            let subject = format!("code {} of {notification_no}", candidate.code);
            let Some(answer) = self.ask(&request, &subject, stats).await else {
                continue;
            };

            if self.options.verdict_rule.accepts(&answer) {
                accepted.push(candidate.code.clone());
            }
        }

        accepted
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::classifier::ClassifierResult;
    use crate::domain::tariff::TariffCode;

    #[derive(Default)]
    struct EchoClassifier {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Classifier for EchoClassifier {
        async fn complete(&self, request: &ClassificationRequest) -> ClassifierResult<String> {
            self.prompts
                .lock()
                .expect("prompts mutex poisoned")
                .push(request.prompt_text());
            Ok("2/2020\n1/2020\n2/2020".to_string())
        }
    }

    fn enricher(
        classifier: Arc<EchoClassifier>,
        records: &[Notification],
        options: EnrichOptions,
    ) -> RecordEnricher {
        let index = CandidateIndex::build(records, vec![TariffCode::new("0101", "Live horses")]);
        RecordEnricher::new(classifier, Arc::new(index), options)
    }

    #[tokio::test]
    async fn references_are_distinct_and_exclude_self() {
        let records = vec![Notification::new(1, "1/2020"), Notification::new(2, "2/2020")];
        let classifier = Arc::new(EchoClassifier::default());
        let enricher = enricher(classifier.clone(), &records, EnrichOptions::default());

        let enriched = enricher.enrich(records[0].clone()).await;

        let references = enriched.record.referenced_notifications.expect("populated");
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].notification_no, "2/2020");
        assert_eq!(enriched.stats.references_found, 1);
        assert_eq!(enriched.stats.classifier_calls, 2);
        assert_eq!(enriched.record.matched_hsn, Some(vec![]));
    }

    #[tokio::test]
    async fn lone_record_skips_the_reference_call() {
        let records = vec![Notification::new(1, "1/2020")];
        let classifier = Arc::new(EchoClassifier::default());
        let enricher = enricher(classifier.clone(), &records, EnrichOptions::default());

        let enriched = enricher.enrich(records[0].clone()).await;

        assert_eq!(enriched.record.referenced_notifications, Some(vec![]));
        let prompts = classifier.prompts.lock().expect("prompts mutex poisoned");
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("0101: Live horses"));
    }

    #[tokio::test]
    async fn resolved_record_passes_through_per_code_mode() {
        let mut record = Notification::new(1, "1/2020");
        record.hsn_ref = Some(vec!["0101".to_string()]);
        let classifier = Arc::new(EchoClassifier::default());
        let options = EnrichOptions {
            strategy: TariffStrategy::PerCode,
            ..Default::default()
        };
        let enricher = enricher(classifier.clone(), &[record.clone()], options);

        let enriched = enricher.enrich(record.clone()).await;

        assert_eq!(enriched.record, record);
        assert!(enriched.stats.skipped);
        assert!(classifier.prompts.lock().expect("prompts mutex poisoned").is_empty());
    }
}
