//! Polling UI expectations
//!
//! Each expectation re-queries the page until it holds or the UI timeout
//! runs out. A miss becomes [`E2eError::AssertionFailed`] with the last value
//! seen. Only a driver timeout counts as "not yet"; any other driver error
//! is returned as is.

use chatflow_common::TimeoutConfig;
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::driver::{Driver, WaitState};
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

pub struct Expect<'a> {
    driver: &'a dyn Driver,
    timeout: Duration,
    poll: Duration,
}

impl<'a> Expect<'a> {
    pub fn new(driver: &'a dyn Driver, timeouts: &TimeoutConfig) -> Self {
        Self {
            driver,
            timeout: timeouts.ui(),
            poll: timeouts.poll(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn visible(&self, target: &Locator) -> E2eResult<()> {
        self.state(target, WaitState::Visible).await
    }

    pub async fn hidden(&self, target: &Locator) -> E2eResult<()> {
        self.state(target, WaitState::Hidden).await
    }

    async fn state(&self, target: &Locator, state: WaitState) -> E2eResult<()> {
        match self.driver.wait_for(target, state, self.timeout).await {
            Err(E2eError::Timeout(detail)) => Err(E2eError::AssertionFailed(format!(
                "expected {} to be {:?} within {:?}: {}",
                target, state, self.timeout, detail
            ))),
            other => other,
        }
    }

    pub async fn editable(&self, target: &Locator) -> E2eResult<()> {
        self.poll(
            format!("{} to be editable", target),
            || self.driver.is_editable(target),
            |editable| *editable,
        )
        .await
    }

    pub async fn contains_text(&self, target: &Locator, text: &str) -> E2eResult<()> {
        self.poll(
            format!("{} to contain text '{}'", target, text),
            || self.driver.inner_text(target),
            |actual| actual.contains(text),
        )
        .await
    }

    pub async fn has_text(&self, target: &Locator, text: &str) -> E2eResult<()> {
        self.poll(
            format!("{} to have text '{}'", target, text),
            || self.driver.inner_text(target),
            |actual| actual.trim() == text,
        )
        .await
    }

    pub async fn has_value(&self, target: &Locator, value: &str) -> E2eResult<()> {
        self.poll(
            format!("{} to have value '{}'", target, value),
            || self.driver.input_value(target),
            |actual| actual == value,
        )
        .await
    }

    pub async fn has_count(&self, target: &Locator, count: usize) -> E2eResult<()> {
        self.poll(
            format!("{} to have count {}", target, count),
            || self.driver.count(target),
            |actual| *actual == count,
        )
        .await
    }

    /// Attribute `name` must exist and differ from `value`
    pub async fn attribute_differs(&self, target: &Locator, name: &str, value: &str) -> E2eResult<()> {
        self.poll(
            format!("{} attribute '{}' to differ from '{}'", target, name, value),
            || self.driver.attribute(target, name),
            |actual| actual.as_deref().is_some_and(|v| v != value),
        )
        .await
    }

    async fn poll<T, F, Fut, P>(&self, what: String, probe: F, accept: P) -> E2eResult<()>
    where
        T: Debug,
        F: Fn() -> Fut,
        Fut: Future<Output = E2eResult<T>>,
        P: Fn(&T) -> bool,
    {
        let deadline = Instant::now() + self.timeout;

        let last = loop {
            let observed = match probe().await {
                Ok(value) if accept(&value) => return Ok(()),
                Ok(value) => format!("{:?}", value),
                Err(e) if e.is_timeout() => e.to_string(),
                Err(e) => return Err(e),
            };

            if Instant::now() >= deadline {
                break observed;
            }
            sleep(self.poll).await;
        };

        Err(E2eError::AssertionFailed(format!(
            "expected {} within {:?} (last observed: {})",
            what, self.timeout, last
        )))
    }
}
