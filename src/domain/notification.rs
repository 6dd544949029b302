use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A link from one notification to another one mentioned in its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencedNotification {
    #[serde(rename = "notificationNo")]
    pub notification_no: String,
    pub id: Value,
}

/// A customs notification record.
///
/// Fields the enricher does not know about are kept in `extra` and written
/// back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Value,
    #[serde(rename = "notificationNo")]
    pub notification_no: String,
    #[serde(
        rename = "notificationName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub notification_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        rename = "referencedNotifications",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub referenced_notifications: Option<Vec<ReferencedNotification>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_hsn: Option<Vec<String>>,
    #[serde(rename = "HSN_ref", default, skip_serializing_if = "Option::is_none")]
    pub hsn_ref: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment_error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Notification {
    pub fn new(id: impl Into<Value>, notification_no: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            notification_no: notification_no.into(),
            notification_name: None,
            text: None,
            referenced_notifications: None,
            matched_hsn: None,
            hsn_ref: None,
            enrichment_error: None,
            extra: Map::new(),
        }
    }

    pub fn with_text(mut self, name: &str, text: &str) -> Self {
        self.notification_name = Some(name.to_string());
        self.text = Some(text.to_string());
        self
    }

    /// Text handed to the classifier: name and body separated by a newline.
    pub fn classification_text(&self) -> String {
        format!(
            "{}\n{}",
            self.notification_name.as_deref().unwrap_or(""),
            self.text.as_deref().unwrap_or("")
        )
    }

    /// Whether the per-code pass already resolved this record.
    pub fn has_tariff_refs(&self) -> bool {
        self.hsn_ref.as_ref().is_some_and(|codes| !codes.is_empty())
    }
}
