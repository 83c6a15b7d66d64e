//! Error types for E2E testing

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Browser bridge failed to start: {0}")]
    BridgeStartup(String),

    #[error("Browser bridge closed unexpectedly")]
    BridgeClosed,

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Response for '{pattern}' failed with status {status}: {body}")]
    ResponseFailed {
        pattern: String,
        status: u16,
        body: String,
    },

    #[error("Cleanup of {kind} did not converge after {iterations} iterations")]
    CleanupStuck { kind: String, iterations: usize },

    #[error("Step [{index}] failed ({kind}): {label} - {detail}")]
    StepFailed {
        index: usize,
        label: String,
        kind: FailureKind,
        detail: String,
    },

    #[error("Scenario did not run: {0}")]
    NotRun(String),

    #[error("Unknown scenario or tag: {0}")]
    UnknownScenario(String),

    #[error("Config error: {0}")]
    Config(#[from] chatflow_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;

/// Where a failure originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The driver could not complete an action
    Transport,
    /// An expected UI state did not materialize
    Assertion,
    /// An intercepted response reported a non-success status
    Response,
    /// Anything else
    Unexpected,
}

impl FailureKind {
    fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::Assertion => "assertion",
            FailureKind::Response => "response",
            FailureKind::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl E2eError {
    /// Classify this error by origin
    pub fn kind(&self) -> FailureKind {
        match self {
            E2eError::BridgeClosed | E2eError::Driver(_) | E2eError::Timeout(_) => {
                FailureKind::Transport
            }
            E2eError::AssertionFailed(_) => FailureKind::Assertion,
            E2eError::ResponseFailed { .. } => FailureKind::Response,
            E2eError::StepFailed { kind, .. } => *kind,
            _ => FailureKind::Unexpected,
        }
    }

    /// True for the errors a driver raises when it gave up waiting
    pub fn is_timeout(&self) -> bool {
        matches!(self, E2eError::Timeout(_))
    }
}
