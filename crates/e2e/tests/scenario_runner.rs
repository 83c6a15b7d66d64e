//! Runner behaviour across steps and suites

use chatflow_e2e::{E2eError, E2eResult, FailureKind, Scenario, ScenarioRunner, SuiteEntry, TestSuiteResult};
use parking_lot::Mutex;
use std::sync::Arc;

type Trace = Arc<Mutex<Vec<&'static str>>>;

fn record(trace: &Trace, name: &'static str) -> impl FnOnce() -> futures::future::Ready<E2eResult<()>> {
    let trace = trace.clone();
    move || {
        trace.lock().push(name);
        futures::future::ready(Ok(()))
    }
}

#[tokio::test]
async fn test_first_failure_stops_scenario() {
    let trace: Trace = Arc::default();
    let b_trace = trace.clone();
    let scenario = Scenario::new("abc")
        .step("A passed", "A failed", record(&trace, "A"))
        .step("B passed", "B failed", move || async move {
            b_trace.lock().push("B");
            Err(E2eError::Timeout("button[name=保存]".into()))
        })
        .step("C passed", "C failed", record(&trace, "C"));

    let result = ScenarioRunner::default().execute(scenario).await;

    assert!(!result.success);
    assert_eq!(*trace.lock(), vec!["A", "B"]);
    assert_eq!(result.steps.len(), 2);
    assert_eq!(result.steps[0].label, "A passed");
    assert!(result.steps[0].outcome.is_passed());

    let failed = result.failed_step().unwrap();
    assert_eq!(failed.index, 2);
    assert_eq!(failed.label, "B failed");
    assert_eq!(failed.outcome.failure_kind(), Some(FailureKind::Transport));
    assert!(failed.outcome.detail().unwrap().contains("保存"));
    assert!(result.error.as_deref().unwrap().contains("B failed"));
}

#[tokio::test]
async fn test_all_steps_pass() {
    let trace: Trace = Arc::default();
    let scenario = Scenario::new("ok")
        .step("one", "one failed", record(&trace, "1"))
        .step("two", "two failed", record(&trace, "2"));

    let result = ScenarioRunner::default().run(scenario).await.unwrap();

    assert!(result.success);
    assert!(result.error.is_none());
    assert_eq!(*trace.lock(), vec!["1", "2"]);
    assert_eq!(
        result.steps.iter().map(|s| s.index).collect::<Vec<_>>(),
        vec![1, 2]
    );
}

#[tokio::test]
async fn test_run_propagates_response_failure() {
    let scenario = Scenario::new("deploy").step("Deployed", "Deploy failed", || async {
        Err(E2eError::ResponseFailed {
            pattern: "**/app.json".into(),
            status: 500,
            body: "{\"error\":\"boom\"}".into(),
        })
    });

    let err = ScenarioRunner::default().run(scenario).await.unwrap_err();

    match err {
        E2eError::StepFailed { index, label, kind, detail } => {
            assert_eq!(index, 1);
            assert_eq!(label, "Deploy failed");
            assert_eq!(kind, FailureKind::Response);
            assert!(detail.contains("500"));
            assert!(detail.contains("boom"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn entry(name: &'static str, required: bool, pass: bool, trace: &Trace) -> SuiteEntry {
    let trace = trace.clone();
    SuiteEntry::new(name, required, move || async move {
        trace.lock().push(name);
        Ok(Scenario::new(name).step("done", "broke", move || async move {
            if pass {
                Ok(())
            } else {
                Err(E2eError::AssertionFailed(format!("{name} broke")))
            }
        }))
    })
}

#[tokio::test]
async fn test_failed_setup_skips_rest() {
    let trace: Trace = Arc::default();
    let entries = vec![
        entry("setup_cleanup", true, false, &trace),
        entry("text_chat", false, true, &trace),
        entry("coupon", false, true, &trace),
    ];

    let suite = ScenarioRunner::default().run_suite(entries).await;

    assert_eq!(*trace.lock(), vec!["setup_cleanup"]);
    assert_eq!((suite.total, suite.passed, suite.failed, suite.skipped), (3, 0, 1, 2));
    assert!(!suite.all_passed());
    assert!(suite.results[1].skipped);
    assert!(suite.results[2]
        .error
        .as_deref()
        .unwrap()
        .contains("setup_cleanup"));
}

#[tokio::test]
async fn test_optional_failure_does_not_block() {
    let trace: Trace = Arc::default();
    let entries = vec![
        entry("setup_cleanup", true, true, &trace),
        entry("coupon", false, false, &trace),
        entry("carousel", false, true, &trace),
    ];

    let suite = ScenarioRunner::default().run_suite(entries).await;

    assert_eq!(*trace.lock(), vec!["setup_cleanup", "coupon", "carousel"]);
    assert_eq!((suite.passed, suite.failed, suite.skipped), (2, 1, 0));
}

#[tokio::test]
async fn test_build_error_recorded_as_failure() {
    let entries = vec![SuiteEntry::new("setup_cleanup", true, || async {
        Err(E2eError::BridgeStartup("node exited".into()))
    })];

    let suite = ScenarioRunner::default().run_suite(entries).await;

    assert_eq!(suite.failed, 1);
    assert!(suite.results[0].steps.is_empty());
    assert!(suite.results[0].error.as_deref().unwrap().contains("node exited"));
}

#[tokio::test]
async fn test_results_written_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ScenarioRunner::new(dir.path().join("results"));
    let scenario = Scenario::new("coupon")
        .step("Coupon created.", "Coupon creation failed.", || async { Ok(()) })
        .step("Coupon sent.", "Coupon sending failed.", || async {
            Err(E2eError::AssertionFailed("row count".into()))
        });

    let mut suite = TestSuiteResult::default();
    let result = runner.execute(scenario).await;
    suite.total = 1;
    suite.failed = 1;
    suite.results.push(result);

    let path = runner.write_results(&suite).unwrap();
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(path.file_name().unwrap(), "test-results.json");
    let steps = &json["results"][0]["steps"];
    assert_eq!(steps[0]["outcome"], "passed");
    assert_eq!(steps[1]["outcome"], "failed_assertion");
    assert_eq!(steps[1]["label"], "Coupon sending failed.");
}
