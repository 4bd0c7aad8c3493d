use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use thiserror::Error;

pub const COOLDOWN_MS: f64 = 60_000.0;
pub const MAX_ATTEMPTS: u32 = 5;
pub const JOB_REQUIRED: [&str; 3] = ["name", "email", "phone"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    JobApplication,
    Newsletter,
}

impl SubmissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionKind::JobApplication => "job_application",
            SubmissionKind::Newsletter => "newsletter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Email,
    Tel,
    TextArea,
}

pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

pub const JOB_FIELDS: [FieldSpec; 11] = [
    FieldSpec { name: "name", label: "Name", kind: FieldKind::Text },
    FieldSpec { name: "dob", label: "Date of Birth", kind: FieldKind::Date },
    FieldSpec { name: "address", label: "Place of Stay (Address)", kind: FieldKind::Text },
    FieldSpec { name: "email", label: "Email", kind: FieldKind::Email },
    FieldSpec { name: "phone", label: "Phone Number", kind: FieldKind::Tel },
    FieldSpec { name: "study", label: "Stream of Study", kind: FieldKind::Text },
    FieldSpec { name: "interest", label: "Area of Interest and Why", kind: FieldKind::TextArea },
    FieldSpec { name: "field", label: "Field You Want to Apply", kind: FieldKind::Text },
    FieldSpec { name: "whyUs", label: "Among All Others, Why Join Us?", kind: FieldKind::TextArea },
    FieldSpec { name: "favoriteProject", label: "Your Favorite Project and Why?", kind: FieldKind::TextArea },
    FieldSpec { name: "showcase", label: "Showcase (GitHub, Demo link)", kind: FieldKind::Text },
];

pub fn empty_job_application() -> BTreeMap<String, String> {
    JOB_FIELDS.iter().map(|f| (f.name.to_string(), String::new())).collect()
}

/// Required fields that are absent or blank, in the order they were asked for.
pub fn missing_required(fields: &BTreeMap<String, String>, required: &[&'static str]) -> Vec<&'static str> {
    required
        .iter()
        .copied()
        .filter(|name| fields.get(*name).map_or(true, |v| v.trim().is_empty()))
        .collect()
}

/// Webhook body: every form field plus `type` and an ISO-8601 `timestamp`.
pub fn sheet_payload(fields: &BTreeMap<String, String>, kind: SubmissionKind, at: DateTime<Utc>) -> Value {
    let mut body: Map<String, Value> = fields.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect();
    body.insert("type".to_string(), json!(kind.as_str()));
    body.insert("timestamp".to_string(), json!(at.to_rfc3339_opts(SecondsFormat::Millis, true)));
    Value::Object(body)
}

/// Template fields for the "new subscriber" notification mail.
pub fn newsletter_params(email: &str, notify: &str, timestamp: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("to_email".to_string(), notify.to_string());
    params.insert("from_email".to_string(), email.to_string());
    params.insert("email".to_string(), email.to_string());
    params.insert("message".to_string(), format!("New newsletter subscription from {}", email));
    params.insert("timestamp".to_string(), timestamp.to_string());
    params.insert("type".to_string(), SubmissionKind::Newsletter.as_str().to_string());
    params
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GateError {
    #[error("Please wait {remaining_secs} seconds before trying again")]
    Cooldown { remaining_secs: u64 },
    #[error("Maximum submit attempts reached. Please try again later.")]
    AttemptsExhausted,
}

/// Per-session submission limiter: a cooldown after each success and a cap on successes.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitGate {
    cooldown_ms: f64,
    max_attempts: u32,
    last_submit_ms: Option<f64>,
    attempts: u32,
}

impl Default for SubmitGate {
    fn default() -> Self {
        Self { cooldown_ms: COOLDOWN_MS, max_attempts: MAX_ATTEMPTS, last_submit_ms: None, attempts: 0 }
    }
}

impl SubmitGate {
    pub fn check(&self, now_ms: f64) -> Result<(), GateError> {
        if let Some(last) = self.last_submit_ms {
            let elapsed = now_ms - last;
            if elapsed < self.cooldown_ms {
                let remaining_secs = ((self.cooldown_ms - elapsed) / 1000.0).ceil() as u64;
                return Err(GateError::Cooldown { remaining_secs });
            }
        }
        if self.attempts >= self.max_attempts {
            return Err(GateError::AttemptsExhausted);
        }
        Ok(())
    }

    pub fn record_success(&mut self, now_ms: f64) {
        self.last_submit_ms = Some(now_ms);
        self.attempts += 1;
    }

    #[cfg(test)]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn reports_blank_required_fields_in_order() {
        let mut fields = empty_job_application();
        fields.insert("email".to_string(), "a@b.com".to_string());
        fields.insert("phone".to_string(), "   ".to_string());
        assert_eq!(missing_required(&fields, &JOB_REQUIRED), vec!["name", "phone"]);
    }

    #[test]
    fn payload_carries_type_and_timestamp() {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), "Ada".to_string());
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let body = sheet_payload(&fields, SubmissionKind::JobApplication, at);
        assert_eq!(body["name"], "Ada");
        assert_eq!(body["type"], "job_application");
        assert_eq!(body["timestamp"], "2024-05-01T12:30:00.000Z");
    }

    #[test]
    fn newsletter_params_address_both_sides() {
        let params = newsletter_params("fan@site.io", "team@brand.io", "now");
        assert_eq!(params["to_email"], "team@brand.io");
        assert_eq!(params["from_email"], "fan@site.io");
        assert_eq!(params["message"], "New newsletter subscription from fan@site.io");
        assert_eq!(params["type"], "newsletter");
    }

    #[test]
    fn gate_enforces_cooldown() {
        let mut gate = SubmitGate::default();
        assert!(gate.check(0.0).is_ok());
        gate.record_success(1_000.0);
        assert_eq!(gate.check(31_500.0), Err(GateError::Cooldown { remaining_secs: 30 }));
        assert_eq!(
            gate.check(31_500.0).unwrap_err().to_string(),
            "Please wait 30 seconds before trying again"
        );
        assert!(gate.check(61_000.0).is_ok());
    }

    #[test]
    fn gate_caps_attempts() {
        let mut gate = SubmitGate::default();
        let mut now = 0.0;
        for _ in 0..MAX_ATTEMPTS {
            assert!(gate.check(now).is_ok());
            gate.record_success(now);
            now += COOLDOWN_MS;
        }
        assert_eq!(gate.check(now), Err(GateError::AttemptsExhausted));
        assert_eq!(gate.attempts(), 5);
    }
}
