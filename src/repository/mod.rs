use std::path::PathBuf;

use thiserror::Error;

use crate::domain::notification::Notification;
use crate::domain::tariff::TariffCode;

pub mod notification;
pub mod tariff;

/// Failures while loading or persisting run inputs and outputs.
///
/// These are fatal: a run that cannot load its inputs never dispatches work.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("spreadsheet error in {path}: {message}")]
    Spreadsheet { path: PathBuf, message: String },
    #[error("column {column} not found in {path}")]
    MissingColumn { path: PathBuf, column: String },
    #[error("no worksheet or header row in {0}")]
    EmptySheet(PathBuf),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

pub trait NotificationReader {
    fn list_notifications(&self) -> RepositoryResult<Vec<Notification>>;
}

pub trait NotificationWriter {
    fn write_notifications(&self, notifications: &[Notification]) -> RepositoryResult<usize>;
}

pub trait TariffCodeReader {
    fn list_tariff_codes(&self) -> RepositoryResult<Vec<TariffCode>>;
}
