#![allow(dead_code)]

use async_trait::async_trait;
use bindlab::engine::StudioHandle;
use bindlab::error::GatewayError;
use bindlab::gateway::{AnalysisGateway, Severity, ValidationIssue, ValidationResult};
use bindlab::locale::Locale;
use bindlab::studio::StudioView;
use bindlab::workspace::ArtifactSnapshot;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

/// A call observed by a test gateway
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Validate {
        content: String,
        filename: String,
        locale: Locale,
    },
    Explain {
        content: String,
        filename: String,
        locale: Locale,
    },
    Lookup {
        args: String,
        artifacts: Vec<ArtifactSnapshot>,
        locale: Locale,
    },
}

/// Gateway that answers every call with a fixed reply and records what it saw
pub struct ScriptedGateway {
    validation: Result<ValidationResult, GatewayError>,
    explanation: Result<String, GatewayError>,
    lookup: Result<String, GatewayError>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGateway {
    pub fn answering(
        validation: ValidationResult,
        explanation: &str,
        lookup: &str,
    ) -> Self {
        Self {
            validation: Ok(validation),
            explanation: Ok(explanation.to_string()),
            lookup: Ok(lookup.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every operation fails with `error`
    pub fn failing(error: GatewayError) -> Self {
        Self {
            validation: Err(error.clone()),
            explanation: Err(error.clone()),
            lookup: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AnalysisGateway for ScriptedGateway {
    async fn validate(
        &self,
        content: &str,
        filename: &str,
        locale: Locale,
    ) -> Result<ValidationResult, GatewayError> {
        self.record(RecordedCall::Validate {
            content: content.to_string(),
            filename: filename.to_string(),
            locale,
        });
        self.validation.clone()
    }

    async fn explain(
        &self,
        content: &str,
        filename: &str,
        locale: Locale,
    ) -> Result<String, GatewayError> {
        self.record(RecordedCall::Explain {
            content: content.to_string(),
            filename: filename.to_string(),
            locale,
        });
        self.explanation.clone()
    }

    async fn simulate_lookup(
        &self,
        args: &str,
        artifacts: &[ArtifactSnapshot],
        locale: Locale,
    ) -> Result<String, GatewayError> {
        self.record(RecordedCall::Lookup {
            args: args.to_string(),
            artifacts: artifacts.to_vec(),
            locale,
        });
        self.lookup.clone()
    }
}

type Gate<T> = oneshot::Receiver<Result<T, GatewayError>>;

/// Gateway whose replies are held until the test releases them.
///
/// Validation and explanation gates are keyed by file content, lookup gates
/// by arguments, so tests do not depend on the order tasks get scheduled in.
#[derive(Default)]
pub struct GatedGateway {
    validations: Mutex<HashMap<String, Gate<ValidationResult>>>,
    explanations: Mutex<HashMap<String, Gate<String>>>,
    lookups: Mutex<HashMap<String, Gate<String>>>,
}

impl GatedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gate_validation(
        &self,
        content: &str,
    ) -> oneshot::Sender<Result<ValidationResult, GatewayError>> {
        let (tx, rx) = oneshot::channel();
        self.validations
            .lock()
            .unwrap()
            .insert(content.to_string(), rx);
        tx
    }

    pub fn gate_explanation(&self, content: &str) -> oneshot::Sender<Result<String, GatewayError>> {
        let (tx, rx) = oneshot::channel();
        self.explanations
            .lock()
            .unwrap()
            .insert(content.to_string(), rx);
        tx
    }

    pub fn gate_lookup(&self, args: &str) -> oneshot::Sender<Result<String, GatewayError>> {
        let (tx, rx) = oneshot::channel();
        self.lookups.lock().unwrap().insert(args.to_string(), rx);
        tx
    }

    async fn wait<T>(gates: &Mutex<HashMap<String, Gate<T>>>, key: &str) -> Result<T, GatewayError> {
        let gate = gates.lock().unwrap().remove(key);
        match gate {
            Some(gate) => gate
                .await
                .unwrap_or_else(|_| Err(GatewayError::Http("gate dropped".to_string()))),
            None => Err(GatewayError::Http(format!("no gate for {}", key))),
        }
    }
}

#[async_trait]
impl AnalysisGateway for GatedGateway {
    async fn validate(
        &self,
        content: &str,
        _filename: &str,
        _locale: Locale,
    ) -> Result<ValidationResult, GatewayError> {
        Self::wait(&self.validations, content).await
    }

    async fn explain(
        &self,
        content: &str,
        _filename: &str,
        _locale: Locale,
    ) -> Result<String, GatewayError> {
        Self::wait(&self.explanations, content).await
    }

    async fn simulate_lookup(
        &self,
        args: &str,
        _artifacts: &[ArtifactSnapshot],
        _locale: Locale,
    ) -> Result<String, GatewayError> {
        Self::wait(&self.lookups, args).await
    }
}

/// Gateway whose tasks panic instead of replying
pub struct PanickingGateway;

#[async_trait]
impl AnalysisGateway for PanickingGateway {
    async fn validate(
        &self,
        _content: &str,
        _filename: &str,
        _locale: Locale,
    ) -> Result<ValidationResult, GatewayError> {
        panic!("validation backend exploded");
    }

    async fn explain(
        &self,
        _content: &str,
        _filename: &str,
        _locale: Locale,
    ) -> Result<String, GatewayError> {
        panic!("explanation backend exploded");
    }

    async fn simulate_lookup(
        &self,
        _args: &str,
        _artifacts: &[ArtifactSnapshot],
        _locale: Locale,
    ) -> Result<String, GatewayError> {
        panic!("lookup backend exploded");
    }
}

pub fn issue(line: u32, message: &str) -> ValidationIssue {
    ValidationIssue {
        line,
        message: message.to_string(),
        severity: Severity::Error,
    }
}

pub fn invalid(issues: Vec<ValidationIssue>, feedback: &str) -> ValidationResult {
    ValidationResult {
        is_valid: false,
        errors: issues,
        general_feedback: feedback.to_string(),
    }
}

pub fn valid(feedback: &str) -> ValidationResult {
    ValidationResult {
        is_valid: true,
        errors: Vec::new(),
        general_feedback: feedback.to_string(),
    }
}

/// Poll the engine until `predicate` holds, failing after two seconds
pub async fn wait_for_view<F>(handle: &StudioHandle, predicate: F) -> StudioView
where
    F: Fn(&StudioView) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let view = handle.view().await.expect("engine stopped");
        if predicate(&view) {
            return view;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached, last view: {:?}",
            view
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Poll an arbitrary condition, failing after two seconds
pub async fn wait_until<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(tokio::time::Instant::now() < deadline, "condition not reached");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
