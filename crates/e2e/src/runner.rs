//! Step-sequenced scenario runner
//!
//! A scenario is an ordered list of steps. Steps run strictly in order and the
//! first failure ends the scenario; later steps never run. Each failure is
//! classified by origin so the report says which step broke and why.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

use crate::error::{E2eError, E2eResult, FailureKind};

pub type StepAction = Box<dyn FnOnce() -> BoxFuture<'static, E2eResult<()>> + Send>;

fn boxed<F, Fut>(action: F) -> StepAction
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = E2eResult<()>> + Send + 'static,
{
    Box::new(move || action().boxed())
}

pub struct Step {
    pub success_label: String,
    pub failure_label: String,
    action: StepAction,
}

/// Named, ordered list of steps
pub struct Scenario {
    pub name: String,
    pub tags: Vec<String>,
    steps: Vec<Step>,
    teardown: Option<StepAction>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            steps: Vec::new(),
            teardown: None,
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Append a step; insertion order is execution order
    pub fn step<F, Fut>(
        mut self,
        success_label: impl Into<String>,
        failure_label: impl Into<String>,
        action: F,
    ) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = E2eResult<()>> + Send + 'static,
    {
        self.steps.push(Step {
            success_label: success_label.into(),
            failure_label: failure_label.into(),
            action: boxed(action),
        });
        self
    }

    /// Runs after the steps whether they passed or not
    pub fn teardown<F, Fut>(mut self, action: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = E2eResult<()>> + Send + 'static,
    {
        self.teardown = Some(boxed(action));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Success labels in execution order
    pub fn step_labels(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.success_label.as_str()).collect()
    }
}

/// Result of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum StepOutcome {
    Passed,
    FailedTransport(String),
    FailedAssertion(String),
    FailedResponse(String),
    FailedUnexpected(String),
}

impl StepOutcome {
    pub fn from_error(err: &E2eError) -> Self {
        let detail = err.to_string();
        match err.kind() {
            FailureKind::Transport => StepOutcome::FailedTransport(detail),
            FailureKind::Assertion => StepOutcome::FailedAssertion(detail),
            FailureKind::Response => StepOutcome::FailedResponse(detail),
            FailureKind::Unexpected => StepOutcome::FailedUnexpected(detail),
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, StepOutcome::Passed)
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            StepOutcome::Passed => None,
            StepOutcome::FailedTransport(_) => Some(FailureKind::Transport),
            StepOutcome::FailedAssertion(_) => Some(FailureKind::Assertion),
            StepOutcome::FailedResponse(_) => Some(FailureKind::Response),
            StepOutcome::FailedUnexpected(_) => Some(FailureKind::Unexpected),
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            StepOutcome::Passed => None,
            StepOutcome::FailedTransport(d)
            | StepOutcome::FailedAssertion(d)
            | StepOutcome::FailedResponse(d)
            | StepOutcome::FailedUnexpected(d) => Some(d),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// 1-based position in the scenario
    pub index: usize,
    pub label: String,
    pub duration_ms: u64,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    #[serde(default)]
    pub skipped: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepRecord>,
    pub error: Option<String>,
}

impl TestResult {
    pub fn skipped(name: impl Into<String>, reason: &str) -> Self {
        Self {
            name: name.into(),
            success: false,
            skipped: true,
            duration_ms: 0,
            steps: vec![],
            error: Some(reason.to_string()),
        }
    }

    fn harness_error(name: impl Into<String>, err: &E2eError) -> Self {
        Self {
            name: name.into(),
            success: false,
            skipped: false,
            duration_ms: 0,
            steps: vec![],
            error: Some(err.to_string()),
        }
    }

    pub fn failed_step(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|s| !s.outcome.is_passed())
    }

    /// Re-raise the recorded failure, if any
    pub fn ensure_passed(&self) -> E2eResult<()> {
        match self.failed_step() {
            Some(step) => Err(E2eError::StepFailed {
                index: step.index,
                label: step.label.clone(),
                kind: step.outcome.failure_kind().unwrap_or(FailureKind::Unexpected),
                detail: step.outcome.detail().unwrap_or_default().to_string(),
            }),
            None if self.success => Ok(()),
            None => Err(E2eError::NotRun(
                self.error.clone().unwrap_or_else(|| self.name.clone()),
            )),
        }
    }
}

/// Result of running all scenarios
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }

    fn push(&mut self, result: TestResult) {
        self.total += 1;
        if result.skipped {
            self.skipped += 1;
        } else if result.success {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }
}

/// Scenario scheduled in a suite. `build` is deferred so each scenario gets
/// a fresh session only when its turn comes.
pub struct SuiteEntry {
    pub name: String,
    /// A failure here skips everything after it
    pub required: bool,
    build: Box<dyn FnOnce() -> BoxFuture<'static, E2eResult<Scenario>> + Send>,
}

impl SuiteEntry {
    pub fn new<F, Fut>(name: impl Into<String>, required: bool, build: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = E2eResult<Scenario>> + Send + 'static,
    {
        Self {
            name: name.into(),
            required,
            build: Box::new(move || build().boxed()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    output_dir: PathBuf,
}

impl ScenarioRunner {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run every step in order, stopping at the first failure
    pub async fn execute(&self, scenario: Scenario) -> TestResult {
        let start = Instant::now();
        let Scenario {
            name,
            steps,
            teardown,
            ..
        } = scenario;
        info!(scenario = %name, steps = steps.len(), "Running scenario");

        let mut records = Vec::with_capacity(steps.len());
        let mut test_error = None;

        for (i, step) in steps.into_iter().enumerate() {
            let index = i + 1;
            let step_start = Instant::now();
            let result = (step.action)().await;
            let duration_ms = step_start.elapsed().as_millis() as u64;

            match result {
                Ok(()) => {
                    info!(step = index, "Test PASSED: [{}] {}", index, step.success_label);
                    records.push(StepRecord {
                        index,
                        label: step.success_label,
                        duration_ms,
                        outcome: StepOutcome::Passed,
                    });
                }
                Err(err) => {
                    let outcome = StepOutcome::from_error(&err);
                    let kind = err.kind();
                    error!(step = index, %kind, "Test FAILED: [{}] {}", index, step.failure_label);
                    error!("{}", "=".repeat(60));
                    error!("{} detail: {}", banner(kind), err);
                    error!("{}", "=".repeat(60));

                    test_error = Some(
                        E2eError::StepFailed {
                            index,
                            label: step.failure_label.clone(),
                            kind,
                            detail: err.to_string(),
                        }
                        .to_string(),
                    );
                    records.push(StepRecord {
                        index,
                        label: step.failure_label,
                        duration_ms,
                        outcome,
                    });
                    break;
                }
            }
        }

        if let Some(teardown) = teardown {
            if let Err(e) = teardown().await {
                warn!(scenario = %name, "Teardown failed: {}", e);
            }
        }

        TestResult {
            name,
            success: test_error.is_none(),
            skipped: false,
            duration_ms: start.elapsed().as_millis() as u64,
            steps: records,
            error: test_error,
        }
    }

    /// Run a scenario and propagate its first failure
    pub async fn run(&self, scenario: Scenario) -> E2eResult<TestResult> {
        let result = self.execute(scenario).await;
        result.ensure_passed()?;
        Ok(result)
    }

    /// Run entries in order. Once a required entry fails, the rest are skipped.
    pub async fn run_suite(&self, entries: Vec<SuiteEntry>) -> TestSuiteResult {
        let start = Instant::now();
        let mut suite = TestSuiteResult::default();
        let mut blocked_by: Option<String> = None;

        info!("Running {} scenario(s)...", entries.len());

        for entry in entries {
            if let Some(blocker) = &blocked_by {
                warn!(scenario = %entry.name, "Skipped");
                suite.push(TestResult::skipped(
                    entry.name,
                    &format!("skipped because {} failed", blocker),
                ));
                continue;
            }

            let result = match (entry.build)().await {
                Ok(scenario) => self.execute(scenario).await,
                Err(e) => {
                    error!("✗ {} - {}", entry.name, e);
                    TestResult::harness_error(&entry.name, &e)
                }
            };

            if result.success {
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
                if entry.required {
                    blocked_by = Some(entry.name.clone());
                }
            }
            suite.push(result);
        }

        suite.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            suite.passed, suite.failed, suite.skipped, suite.duration_ms
        );
        suite
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

fn banner(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Transport => "PLAYWRIGHT ERROR",
        FailureKind::Assertion => "ASSERTION FAILED",
        FailureKind::Response => "RESPONSE ERROR",
        FailureKind::Unexpected => "UNEXPECTED ERROR",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(E2eError::Timeout("locator".into()), FailureKind::Transport ; "timeout")]
    #[test_case(E2eError::AssertionFailed("text".into()), FailureKind::Assertion ; "assertion")]
    #[test_case(E2eError::ResponseFailed { pattern: "**/app.json".into(), status: 500, body: String::new() }, FailureKind::Response ; "response")]
    #[test_case(E2eError::Io(std::io::Error::other("disk")), FailureKind::Unexpected ; "io")]
    fn test_outcome_classification(err: E2eError, kind: FailureKind) {
        let outcome = StepOutcome::from_error(&err);
        assert_eq!(outcome.failure_kind(), Some(kind));
        assert_eq!(outcome.detail(), Some(err.to_string().as_str()));
    }

    #[tokio::test]
    async fn test_teardown_runs_after_failure() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let scenario = Scenario::new("teardown")
            .step("ok", "not ok", || async { Err(E2eError::Driver("gone".into())) })
            .teardown(move || async move {
                let _ = tx.send(());
                Ok(())
            });

        let result = ScenarioRunner::default().execute(scenario).await;
        assert!(!result.success);
        assert!(rx.await.is_ok());
    }

    #[tokio::test]
    async fn test_ensure_passed_reports_step() {
        let scenario = Scenario::new("report")
            .step("first done", "first broke", || async { Ok(()) })
            .step("second done", "second broke", || async {
                Err(E2eError::AssertionFailed("Textitem4 missing".into()))
            });

        let result = ScenarioRunner::default().execute(scenario).await;
        match result.ensure_passed().unwrap_err() {
            E2eError::StepFailed { index, label, kind, detail } => {
                assert_eq!(index, 2);
                assert_eq!(label, "second broke");
                assert_eq!(kind, FailureKind::Assertion);
                assert!(detail.contains("Textitem4"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unrun_scenario_is_not_a_transport_failure() {
        let entries = vec![SuiteEntry::new("coupon", false, || async {
            Err(E2eError::BridgeStartup("node exited".into()))
        })];
        let suite = ScenarioRunner::default().run_suite(entries).await;

        let err = suite.results[0].ensure_passed().unwrap_err();
        assert!(matches!(err, E2eError::NotRun(_)));
        assert_eq!(err.kind(), FailureKind::Unexpected);
        assert!(err.to_string().contains("node exited"));

        let skipped = TestResult::skipped("carousel", "skipped because setup_cleanup failed");
        assert_eq!(skipped.ensure_passed().unwrap_err().kind(), FailureKind::Unexpected);
    }

    #[test]
    fn test_outcome_serializes_with_detail() {
        let record = StepRecord {
            index: 3,
            label: "Deploy failed".into(),
            duration_ms: 12,
            outcome: StepOutcome::FailedResponse("status 500".into()),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["outcome"], "failed_response");
        assert_eq!(json["detail"], "status 500");
    }
}
