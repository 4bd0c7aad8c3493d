use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use web_sys::RequestMode;

use crate::config;
use crate::forms::{self, SubmissionKind};
use crate::validation::{Backoff, ExistenceLookup, RemoteError};

const EMAIL_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SubmitError {
    #[error("could not encode request: {0}")]
    Encode(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("rejected with status {0}")]
    Rejected(u16),
}

/// Document-database collection query: `email == value`, at most one hit.
pub struct DocumentLookup {
    base_url: String,
    project: String,
    api_key: String,
}

#[derive(Deserialize)]
struct QueryEntry {
    document: Option<Value>,
}

impl DocumentLookup {
    pub fn new(base_url: &str, project: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            project: project.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn from_config() -> Self {
        Self::new(config::get_document_db_url(), config::get_document_project(), config::get_document_api_key())
    }

    fn query_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents:runQuery?key={}",
            self.base_url,
            self.project,
            urlencoding::encode(&self.api_key)
        )
    }
}

fn query_body(collection: &str, email: &str) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": "email" },
                    "op": "EQUAL",
                    "value": { "stringValue": email }
                }
            },
            "limit": 1
        }
    })
}

/// An empty result set still comes back as one entry without a `document`.
fn count_documents(entries: &[QueryEntry]) -> usize {
    entries.iter().filter(|e| e.document.is_some()).count()
}

impl ExistenceLookup for DocumentLookup {
    fn count_matches<'a>(&'a self, collection: &'a str, email: &'a str) -> LocalBoxFuture<'a, Result<usize, RemoteError>> {
        async move {
            let response = Request::post(&self.query_url())
                .header("Content-Type", "application/json")
                .json(&query_body(collection, email))
                .map_err(|e| RemoteError::Transport(e.to_string()))?
                .send()
                .await
                .map_err(|e| RemoteError::Transport(e.to_string()))?;

            if !response.ok() {
                return Err(RemoteError::Status(response.status()));
            }

            let entries: Vec<QueryEntry> = response
                .json()
                .await
                .map_err(|e| RemoteError::Decode(e.to_string()))?;
            Ok(count_documents(&entries))
        }
        .boxed_local()
    }
}

/// Backoff on the browser timer queue; never blocks the page.
#[derive(Clone, Copy, Default)]
pub struct TimerBackoff;

impl Backoff for TimerBackoff {
    fn wait(&self, delay: Duration) -> LocalBoxFuture<'static, ()> {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        TimeoutFuture::new(millis).boxed_local()
    }
}

/// Spreadsheet webhook that records form submissions.
pub struct SheetWebhook {
    url: String,
}

impl SheetWebhook {
    pub fn new(url: &str) -> Self {
        Self { url: url.to_string() }
    }

    pub fn from_config() -> Self {
        Self::new(config::get_sheet_url())
    }

    /// The response is opaque under `no-cors`, so only transport failures surface.
    pub async fn submit(&self, fields: &BTreeMap<String, String>, kind: SubmissionKind) -> Result<(), SubmitError> {
        let payload = forms::sheet_payload(fields, kind, Utc::now());
        Request::post(&self.url)
            .mode(RequestMode::NoCors)
            .header("Content-Type", "application/json")
            .json(&payload)
            .map_err(|e| SubmitError::Encode(e.to_string()))?
            .send()
            .await
            .map_err(|e| {
                error!("Sheet webhook unreachable: {}", e);
                SubmitError::Network(e.to_string())
            })?;
        info!("Submitted {} to sheet webhook", kind.as_str());
        Ok(())
    }
}

#[derive(Serialize)]
struct EmailSend<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a BTreeMap<String, String>,
}

/// Hosted email template delivery.
pub struct EmailDelivery {
    service_id: String,
    template_id: String,
    public_key: String,
}

impl EmailDelivery {
    pub fn new(service_id: &str, template_id: &str, public_key: &str) -> Self {
        Self {
            service_id: service_id.to_string(),
            template_id: template_id.to_string(),
            public_key: public_key.to_string(),
        }
    }

    pub fn from_config() -> Self {
        let settings = config::get_email_settings();
        Self::new(settings.service_id, settings.template_id, settings.public_key)
    }

    pub async fn send(&self, params: &BTreeMap<String, String>) -> Result<(), SubmitError> {
        let body = EmailSend {
            service_id: &self.service_id,
            template_id: &self.template_id,
            user_id: &self.public_key,
            template_params: params,
        };
        let response = Request::post(EMAIL_SEND_URL)
            .header("Content-Type", "application/json")
            .json(&body)
            .map_err(|e| SubmitError::Encode(e.to_string()))?
            .send()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;

        if response.ok() {
            Ok(())
        } else {
            Err(SubmitError::Rejected(response.status()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_filters_on_lowercased_email_field() {
        let body = query_body("newsletter_subscribers", "a@b.com");
        let query = &body["structuredQuery"];
        assert_eq!(query["from"][0]["collectionId"], "newsletter_subscribers");
        assert_eq!(query["where"]["fieldFilter"]["field"]["fieldPath"], "email");
        assert_eq!(query["where"]["fieldFilter"]["op"], "EQUAL");
        assert_eq!(query["where"]["fieldFilter"]["value"]["stringValue"], "a@b.com");
        assert_eq!(query["limit"], 1);
    }

    #[test]
    fn empty_result_set_counts_zero() {
        let none: Vec<QueryEntry> = serde_json::from_str(r#"[{"readTime":"2024-01-01T00:00:00Z"}]"#).unwrap();
        assert_eq!(count_documents(&none), 0);

        let one: Vec<QueryEntry> =
            serde_json::from_str(r#"[{"document":{"name":"x","fields":{}},"readTime":"2024-01-01T00:00:00Z"}]"#).unwrap();
        assert_eq!(count_documents(&one), 1);
    }

    #[test]
    fn api_key_is_escaped_in_query_url() {
        let lookup = DocumentLookup::new("https://db.example/v1/", "site", "k y");
        assert_eq!(
            lookup.query_url(),
            "https://db.example/v1/projects/site/databases/(default)/documents:runQuery?key=k%20y"
        );
    }

    #[test]
    fn email_send_body_uses_public_key_as_user_id() {
        let mut params = BTreeMap::new();
        params.insert("email".to_string(), "a@b.com".to_string());
        let body = EmailSend { service_id: "svc", template_id: "tpl", user_id: "pub", template_params: &params };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["user_id"], "pub");
        assert_eq!(value["template_params"]["email"], "a@b.com");
    }
}
