use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    #[serde(default)]
    pub tiny_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub inserted_at: Option<DateTime<Utc>>,
    /// Remaining provider fields, passed through untouched.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(default)]
    pub tiny_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub acknowledged: bool,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// The associated-alert endpoint has answered with bare ids and with
/// `{ "id": ... }` objects; both are accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum AlertRef {
    Id(String),
    Object { id: String },
}

impl From<AlertRef> for String {
    fn from(value: AlertRef) -> Self {
        match value {
            AlertRef::Id(id) | AlertRef::Object { id } => id,
        }
    }
}
