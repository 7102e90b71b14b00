//! Boundary to the external analysis backend.
//!
//! The gateway is stateless request/response. Callers must be able to tell a
//! failed call (`Err`) from a valid-but-empty result, which is why every
//! operation returns a [`GatewayError`] instead of synthesizing a fallback.
//! Degrading failures into displayable results is done by the sessions.

pub mod gemini;
pub mod prompts;

use crate::error::GatewayError;
use crate::locale::Locale;
use crate::workspace::ArtifactSnapshot;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use gemini::GeminiGateway;

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One finding reported by validation. `line` is 1-based; 0 means the
/// finding is not tied to a particular line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub line: u32,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(default)]
    pub errors: Vec<ValidationIssue>,
    #[serde(default)]
    pub general_feedback: String,
}

impl ValidationResult {
    /// Result shown when the backend could not be reached or answered garbage
    pub fn connection_failure() -> Self {
        Self {
            is_valid: false,
            errors: vec![ValidationIssue {
                line: 0,
                message: "Could not reach the analysis service to validate this file.".to_string(),
                severity: Severity::Error,
            }],
            general_feedback: "Validation could not be completed.".to_string(),
        }
    }
}

/// Explanation text used when the backend call fails
pub const EXPLANATION_FAILURE: &str =
    "An error occurred while requesting an explanation from the analysis service.";

/// Terminal output used when a simulated lookup cannot be performed
pub const LOOKUP_FAILURE: &str =
    ";; communications error: connection failed\n;; no servers could be reached";

/// Gateway operation, used for logging and metric labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOperation {
    Validate,
    Explain,
    Lookup,
}

impl GatewayOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayOperation::Validate => "validate",
            GatewayOperation::Explain => "explain",
            GatewayOperation::Lookup => "lookup",
        }
    }
}

impl fmt::Display for GatewayOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request/response contract of the analysis backend
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    /// Structurally validate one file
    async fn validate(
        &self,
        content: &str,
        filename: &str,
        locale: Locale,
    ) -> Result<ValidationResult>;

    /// Explain one file in prose
    async fn explain(&self, content: &str, filename: &str, locale: Locale) -> Result<String>;

    /// Simulate an nslookup run against the whole workspace, returning
    /// terminal-style output
    async fn simulate_lookup(
        &self,
        args: &str,
        artifacts: &[ArtifactSnapshot],
        locale: Locale,
    ) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_result_wire_format() {
        let json = r#"{
            "isValid": false,
            "errors": [{"line": 3, "message": "missing semicolon", "severity": "error"}],
            "generalFeedback": "One problem found."
        }"#;
        let result: ValidationResult = serde_json::from_str(json).unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].line, 3);
        assert_eq!(result.errors[0].severity, Severity::Error);
        assert_eq!(result.general_feedback, "One problem found.");
    }

    #[test]
    fn test_missing_feedback_defaults_to_empty() {
        let result: ValidationResult = serde_json::from_str(r#"{"isValid": true}"#).unwrap();
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.general_feedback.is_empty());
    }

    #[test]
    fn test_connection_failure_shape() {
        let result = ValidationResult::connection_failure();
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, 0);
        assert!(!result.general_feedback.is_empty());
    }
}
