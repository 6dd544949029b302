use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use crate::domain::notification::Notification;
use crate::repository::{
    NotificationReader, NotificationWriter, RepositoryError, RepositoryResult,
};

/// A notification collection stored as one JSON array file.
pub struct JsonNotificationStore {
    path: PathBuf,
}

impl JsonNotificationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: std::io::Error) -> RepositoryError {
        RepositoryError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn json_error(&self, source: serde_json::Error) -> RepositoryError {
        RepositoryError::Json {
            path: self.path.clone(),
            source,
        }
    }
}

impl NotificationReader for JsonNotificationStore {
    fn list_notifications(&self) -> RepositoryResult<Vec<Notification>> {
        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| self.json_error(e))
    }
}

impl NotificationWriter for JsonNotificationStore {
    /// Writes the whole collection, replacing any previous file.
    ///
    /// The data goes to a sibling temporary file first and is renamed into
    /// place, so an interrupted write never leaves a truncated collection.
    fn write_notifications(&self, notifications: &[Notification]) -> RepositoryResult<usize> {
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let file = File::create(&tmp_path).map_err(|e| self.io_error(e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, notifications).map_err(|e| self.json_error(e))?;
        writer.flush().map_err(|e| self.io_error(e))?;
        drop(writer);

        fs::rename(&tmp_path, &self.path).map_err(|e| self.io_error(e))?;
        Ok(notifications.len())
    }
}
