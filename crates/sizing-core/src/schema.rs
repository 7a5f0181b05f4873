//! Request schema validation
//!
//! Every request type is checked here before it reaches an engine function.
//! Structural problems (bad JSON, missing fields, unknown enum values) surface
//! as [`SchemaError::Malformed`]; range violations are collected field by field
//! into [`SchemaError::Invalid`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Input rejected before evaluation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("{} field(s) failed validation", .0.len())]
    Invalid(Vec<FieldViolation>),
}

impl SchemaError {
    /// Field-level details, empty for malformed bodies
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            SchemaError::Malformed(_) => &[],
            SchemaError::Invalid(v) => v,
        }
    }
}

/// Range and consistency checks for a deserialized request
pub trait Validate {
    fn validate(&self) -> Result<(), SchemaError>;
}

/// Deserialize a JSON body and validate it in one step
pub fn parse_request<T>(body: &[u8]) -> Result<T, SchemaError>
where
    T: DeserializeOwned + Validate,
{
    let value: T =
        serde_json::from_slice(body).map_err(|e| SchemaError::Malformed(e.to_string()))?;
    value.validate()?;
    Ok(value)
}

/// Collects violations so callers see every bad field at once
#[derive(Debug, Default)]
pub(crate) struct Violations {
    items: Vec<FieldViolation>,
}

impl Violations {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.items.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    pub(crate) fn min_u32(&mut self, field: &str, value: u32, min: u32) {
        if value < min {
            self.push(field, format!("must be at least {min}, got {value}"));
        }
    }

    pub(crate) fn non_negative(&mut self, field: &str, value: f64) {
        if !value.is_finite() {
            self.push(field, "must be a finite number");
        } else if value < 0.0 {
            self.push(field, format!("must not be negative, got {value}"));
        }
    }

    pub(crate) fn optional_non_negative(&mut self, field: &str, value: Option<f64>) {
        if let Some(v) = value {
            self.non_negative(field, v);
        }
    }

    /// Non-negative and no larger than `max`
    pub(crate) fn optional_at_most(&mut self, field: &str, value: Option<f64>, max: f64) {
        if let Some(v) = value {
            if v.is_finite() && v > max {
                self.push(field, format!("must be at most {max}, got {v}"));
            } else {
                self.non_negative(field, v);
            }
        }
    }

    pub(crate) fn positive(&mut self, field: &str, value: f64) {
        if !value.is_finite() {
            self.push(field, "must be a finite number");
        } else if value <= 0.0 {
            self.push(field, format!("must be greater than 0, got {value}"));
        }
    }

    pub(crate) fn within(&mut self, field: &str, value: f64, min: f64, max: f64) {
        if !value.is_finite() {
            self.push(field, "must be a finite number");
        } else if value < min || value > max {
            self.push(field, format!("must be between {min} and {max}, got {value}"));
        }
    }

    pub(crate) fn finish(self) -> Result<(), SchemaError> {
        if self.items.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Invalid(self.items))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        count: u32,
        ratio: f64,
    }

    impl Validate for Probe {
        fn validate(&self) -> Result<(), SchemaError> {
            let mut v = Violations::new();
            v.min_u32("count", self.count, 1);
            v.within("ratio", self.ratio, 0.0, 1.0);
            v.finish()
        }
    }

    #[test]
    fn test_parse_request_accepts_valid_body() {
        let probe: Probe = parse_request(br#"{"count": 3, "ratio": 0.5}"#).unwrap();
        assert_eq!(probe.count, 3);
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let err = parse_request::<Probe>(br#"{"ratio": 0.5}"#).unwrap_err();
        match err {
            SchemaError::Malformed(msg) => assert!(msg.contains("count")),
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_all_violations_reported() {
        let err = parse_request::<Probe>(br#"{"count": 0, "ratio": 2.0}"#).unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["count", "ratio"]);
    }
}
