//! Helpers for integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use notification_enricher::classifier::{
    ClassificationRequest, Classifier, ClassifierError, ClassifierResult,
};
use notification_enricher::domain::notification::Notification;
use notification_enricher::domain::tariff::TariffCode;

type Responder = dyn Fn(&ClassificationRequest) -> ClassifierResult<String> + Send + Sync;

/// Which of the three prompts a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    References,
    TariffBatch,
    TariffVerdict,
}

pub fn request_kind(request: &ClassificationRequest) -> RequestKind {
    let text = request.prompt_text();
    if text.contains("Notification Numbers to Check Against") {
        RequestKind::References
    } else if text.contains("Available HSN Codes and Descriptions") {
        RequestKind::TariffBatch
    } else {
        RequestKind::TariffVerdict
    }
}

/// In-process classifier answering through a closure and recording traffic.
pub struct ScriptedClassifier {
    responder: Box<Responder>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: Mutex<Vec<ClassificationRequest>>,
}

impl ScriptedClassifier {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&ClassificationRequest) -> ClassifierResult<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A classifier whose every call fails like an unreachable endpoint.
    pub fn unavailable() -> Self {
        Self::new(|_| Err(ClassifierError::Transport("connection refused".to_string())))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ClassificationRequest> {
        self.requests.lock().expect("requests mutex poisoned").clone()
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn complete(&self, request: &ClassificationRequest) -> ClassifierResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let answer = (self.responder)(request);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        answer
    }
}

/// Notifications `N/2020` with ids `id-N` for N in `1..=count`.
pub fn notifications(count: usize) -> Vec<Notification> {
    (1..=count)
        .map(|n| {
            Notification::new(format!("id-{n}"), format!("{n}/2020"))
                .with_text(&format!("Notification {n}"), "Tomatoes and onions")
        })
        .collect()
}

pub fn tariff_codes() -> Vec<TariffCode> {
    vec![
        TariffCode::new("07021000", "Tomatoes, fresh or chilled"),
        TariffCode::new("07031010", "Onions, fresh or chilled"),
        TariffCode::new("07099990", "Other"),
        TariffCode::new("0710", "Veg"),
    ]
}
