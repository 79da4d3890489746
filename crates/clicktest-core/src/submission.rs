//! Transport-facing submission payload and its schema check.
//!
//! Anything that fails here never reaches the validator: the client gets a
//! "missing required fields" style rejection instead of a stored trial.

use crate::cps::Cps;
use crate::model::NewTrial;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Missing required fields: {}", .fields.join(", "))]
    MissingRequiredFields { fields: Vec<&'static str> },

    #[error("duration_ms must be greater than zero")]
    ZeroDuration,

    #[error("Malformed cps: {0}")]
    MalformedCps(String),

    #[error("Malformed payload: {0}")]
    Malformed(String),
}

/// Raw submission as sent by a client; every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrialSubmission {
    pub duration_ms: Option<u64>,
    pub total_clicks: Option<u64>,
    pub cps: Option<serde_json::Value>,
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub user_agent: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl TrialSubmission {
    pub fn from_json(s: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(s).map_err(|e| SchemaError::Malformed(e.to_string()))
    }

    pub fn into_new_trial(self) -> Result<NewTrial, SchemaError> {
        let mut missing = Vec::new();
        if self.duration_ms.is_none() {
            missing.push("duration_ms");
        }
        if self.total_clicks.is_none() {
            missing.push("total_clicks");
        }
        if self.cps.as_ref().map_or(true, serde_json::Value::is_null) {
            missing.push("cps");
        }
        if self.started_at.is_none() {
            missing.push("started_at");
        }
        if self.ended_at.is_none() {
            missing.push("ended_at");
        }

        let (
            Some(duration_ms),
            Some(total_clicks),
            Some(cps),
            Some(started_at),
            Some(ended_at),
        ) = (
            self.duration_ms,
            self.total_clicks,
            self.cps,
            self.started_at,
            self.ended_at,
        )
        else {
            return Err(SchemaError::MissingRequiredFields { fields: missing });
        };
        if !missing.is_empty() {
            return Err(SchemaError::MissingRequiredFields { fields: missing });
        }

        if duration_ms == 0 {
            return Err(SchemaError::ZeroDuration);
        }
        let reported_cps: Cps =
            serde_json::from_value(cps).map_err(|e| SchemaError::MalformedCps(e.to_string()))?;
        if reported_cps < Cps::ZERO {
            return Err(SchemaError::MalformedCps(format!(
                "CPS must not be negative: {reported_cps}"
            )));
        }

        if ended_at < started_at {
            tracing::warn!(
                %started_at,
                %ended_at,
                "trial ends before it starts; accepting client timestamps as reported"
            );
        }

        Ok(NewTrial {
            duration_ms,
            total_clicks,
            reported_cps,
            started_at,
            ended_at,
            device_type: self.device_type,
            browser: self.browser,
            user_agent: self.user_agent,
        })
    }
}
