//! Chatflow console E2E suite
//!
//! Drives the chatbot admin console through Playwright and checks that
//! conversation flows can be built and deployed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                chatflow-e2e binary (clap)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioRunner                                             │
//! │    ├── run_suite([SuiteEntry]) -> TestSuiteResult           │
//! │    ├── execute(Scenario) -> TestResult (first failure stops)│
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  scenarios::ScenarioKind::build(PageContext) -> Scenario    │
//! │    └── pages::*  (login, chatflow, coupon, keyword, ...)    │
//! │          ├── Expect      polling UI assertions              │
//! │          ├── network     arm / trigger / await responses    │
//! │          ├── deploy      popup + app.json verdict           │
//! │          └── cleanup     scan / delete / rescan to a fixpoint│
//! ├─────────────────────────────────────────────────────────────┤
//! │  Driver (async trait)                                       │
//! │    └── PlaywrightDriver  node bridge, JSON lines            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod cleanup;
pub mod deploy;
pub mod driver;
pub mod error;
pub mod expect;
pub mod locator;
pub mod network;
pub mod pages;
pub mod playwright;
pub mod runner;
pub mod scenarios;
pub mod session;

#[cfg(test)]
mod testing;

pub use cleanup::{CleanupEngine, KeepSet, RemoteList, ResourceElement, ResourceKind};
pub use deploy::{deploy_and_verify, DeployResult};
pub use driver::{Driver, SharedDriver};
pub use error::{E2eError, E2eResult, FailureKind};
pub use locator::Locator;
pub use runner::{Scenario, ScenarioRunner, StepOutcome, SuiteEntry, TestResult, TestSuiteResult};
pub use scenarios::ScenarioKind;
pub use session::Session;
