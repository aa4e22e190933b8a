use serde::Deserialize;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Success body shared by the OpsGenie REST endpoints.
#[derive(Debug, Deserialize)]
pub(super) struct Envelope<T> {
    pub(crate) data: Option<T>,
    #[serde(default, rename = "requestId")]
    pub(crate) request_id: Option<String>,
}

/// Body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorBody {
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) errors: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ApiErrorBody {
    pub(super) fn describe(self) -> String {
        let mut message = self
            .message
            .unwrap_or_else(|| "no error message".to_string());
        if let Some(errors) = self.errors.filter(|e| !e.is_empty()) {
            let fields: Vec<String> = errors
                .into_iter()
                .map(|(field, reason)| match reason {
                    serde_json::Value::String(reason) => format!("{field}: {reason}"),
                    other => format!("{field}: {other}"),
                })
                .collect();
            message.push_str(" (");
            message.push_str(&fields.join(", "));
            message.push(')');
        }
        message
    }
}

pub(super) fn body_preview(body: &[u8]) -> String {
    if body.is_empty() {
        return "<empty>".to_string();
    }
    let end = body.len().min(BODY_PREVIEW_LIMIT);
    let mut preview = String::from_utf8_lossy(&body[..end]).to_string();
    if body.len() > BODY_PREVIEW_LIMIT {
        preview.push_str("...");
    }
    preview.replace('\n', "\\n")
}
