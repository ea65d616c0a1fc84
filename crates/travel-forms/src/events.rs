// File: src/events.rs
// Purpose: Change events broadcast to the presentation layer

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single applied field change.
///
/// `field` is a path: a record slot like `email`, or an indexed
/// sub-field like `passenger[0].name`.
#[derive(Debug, Clone, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub value: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl FieldChange {
    pub fn new(field: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            field: field.into(),
            value,
            timestamp: Utc::now(),
        }
    }
}
