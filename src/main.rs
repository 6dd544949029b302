use std::env;
use std::sync::Arc;

use notification_enricher::classifier::Classifier;
use notification_enricher::classifier::openai::OpenAiClassifier;
use notification_enricher::models::config::{DEFAULT_CONFIG_FILE, EnricherConfig};
use notification_enricher::processing::index::CandidateIndex;
use notification_enricher::processing::orchestrator::{Orchestrator, log_run_stats};
use notification_enricher::repository::notification::JsonNotificationStore;
use notification_enricher::repository::tariff::SpreadsheetTariffSource;
use notification_enricher::repository::{
    NotificationReader, NotificationWriter, TariffCodeReader,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config_path =
        env::var("ENRICHER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let config = match EnricherConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let store = JsonNotificationStore::new(&config.input_path);
    let notifications = match store.list_notifications() {
        Ok(notifications) => notifications,
        Err(e) => {
            log::error!("Failed to load notifications: {e}");
            std::process::exit(1);
        }
    };

    let tariff_source = SpreadsheetTariffSource::new(
        &config.tariff_path,
        &config.code_column,
        &config.description_column,
    );
    let tariff_codes = match tariff_source.list_tariff_codes() {
        Ok(codes) => codes,
        Err(e) => {
            log::error!("Failed to load tariff codes: {e}");
            std::process::exit(1);
        }
    };

    let index = CandidateIndex::build(&notifications, tariff_codes);
    log::info!(
        "Loaded {} notifications, {} distinct notification numbers, {} usable tariff codes",
        notifications.len(),
        index.notification_count(),
        index.code_count()
    );

    let api_key = config
        .api_key
        .clone()
        .or_else(|| env::var("OPENAI_API_KEY").ok());
    let classifier: Arc<dyn Classifier> = match OpenAiClassifier::new(
        &config.api_base,
        api_key,
        config.model.clone(),
        config.request_timeout(),
    ) {
        Ok(classifier) => Arc::new(classifier),
        Err(e) => {
            log::error!("Failed to create classifier client: {e}");
            std::process::exit(1);
        }
    };

    let orchestrator = Orchestrator::new(
        classifier,
        Arc::new(index),
        config.enrich_options(),
        config.concurrency,
    );
    let report = orchestrator.run(notifications).await;
    log_run_stats(&report.stats);

    let output_path = config.resolved_output_path();
    let output = JsonNotificationStore::new(&output_path);
    match output.write_notifications(&report.records) {
        Ok(count) => log::info!("Wrote {count} notifications to {}", output_path.display()),
        Err(e) => {
            log::error!("Failed to write enriched notifications: {e}");
            std::process::exit(1);
        }
    }
}
