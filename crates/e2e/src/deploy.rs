//! Deploy-and-verify
//!
//! A deploy counts as successful only when the confirmation popup was shown
//! *and* the deploy manifest request came back 2xx. The response listener is
//! armed after the popup appears and before the OK click.

use chatflow_common::{DeployConfig, TimeoutConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::driver::{Driver, WaitState};
use crate::error::{E2eError, E2eResult};
use crate::expect::Expect;
use crate::locator::Locator;

const CONFIRM_TEXT: &str = "[公開]すると、以下のfacebook page、またはLINEアカウントに反映されます。";
const COMPLETE_TEXT: &str = "デプロイが完了しました！";

/// Controls involved in a deploy
#[derive(Debug, Clone)]
pub struct DeployControls {
    pub trigger: Locator,
    pub confirmation: Locator,
    pub confirm_button: Locator,
    pub complete: Locator,
    pub url_pattern: String,
}

impl DeployControls {
    pub fn console(deploy: &DeployConfig) -> Self {
        let confirmation = Locator::css(format!(".popup:has-text('{}')", CONFIRM_TEXT));
        Self {
            trigger: Locator::role("button", "公開する"),
            confirm_button: confirmation.within(&Locator::role("button", "OK")),
            confirmation,
            complete: Locator::css(format!(".popup:has-text('{}')", COMPLETE_TEXT)),
            url_pattern: deploy.url_pattern.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployResult {
    pub confirmation_visible: bool,
    pub status: Option<u16>,
    pub body: String,
}

impl DeployResult {
    pub fn is_success(&self) -> bool {
        self.confirmation_visible && self.status.is_some_and(|s| (200..=299).contains(&s))
    }

    /// Turn a failed result into the matching error
    pub fn verdict(self, pattern: &str) -> E2eResult<Self> {
        if !self.confirmation_visible {
            return Err(E2eError::AssertionFailed(
                "deploy confirmation popup did not appear".to_string(),
            ));
        }
        match self.status {
            Some(status) if self.is_success() => {
                info!(status, "Deploy response accepted");
                Ok(self)
            }
            Some(status) => Err(E2eError::ResponseFailed {
                pattern: pattern.to_string(),
                status,
                body: self.body,
            }),
            None => Err(E2eError::AssertionFailed(format!(
                "no response matching {} was observed",
                pattern
            ))),
        }
    }
}

pub async fn deploy_and_verify(
    driver: &dyn Driver,
    controls: &DeployControls,
    timeouts: &TimeoutConfig,
) -> E2eResult<DeployResult> {
    driver.click(&controls.trigger).await?;

    let confirmation_visible = match driver
        .wait_for(&controls.confirmation, WaitState::Visible, timeouts.ui())
        .await
    {
        Ok(()) => true,
        Err(e) if e.is_timeout() => false,
        Err(e) => return Err(e),
    };
    if !confirmation_visible {
        warn!("Deploy confirmation popup never appeared");
        return DeployResult {
            confirmation_visible,
            status: None,
            body: String::new(),
        }
        .verdict(&controls.url_pattern);
    }

    let watch = driver
        .arm_response(&controls.url_pattern, timeouts.response())
        .await?;
    driver.click(&controls.confirm_button).await?;
    let response = driver.await_response(watch).await?;

    let result = DeployResult {
        confirmation_visible,
        status: Some(response.status),
        body: response.body,
    }
    .verdict(&controls.url_pattern)?;

    Expect::new(driver, timeouts).visible(&controls.complete).await?;
    Ok(result)
}
