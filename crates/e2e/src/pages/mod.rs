//! Page objects for the console screens
//!
//! Every page object holds a [`PageContext`] and builds its locators on
//! demand. Nothing here caches an element between calls.

pub mod bot_list;
pub mod carousel;
pub mod chatflow;
pub mod cleanup_lists;
pub mod condition;
pub mod coupon;
pub mod image_carousel;
pub mod image_video;
pub mod keyword;
pub mod login;
pub mod text_chat;

pub use bot_list::BotListPage;
pub use carousel::CarouselPage;
pub use chatflow::{ChatflowPage, ItemKind};
pub use cleanup_lists::{CouponList, GroupList, KeywordList, MuteEditor, SegmentList};
pub use condition::ConditionPage;
pub use coupon::CouponPage;
pub use image_carousel::ImageCarouselPage;
pub use image_video::ImageVideoPage;
pub use keyword::KeywordPage;
pub use login::LoginPage;
pub use text_chat::TextChatPage;

use chatflow_common::fixtures::ACTION_API_PATTERN;
use chatflow_common::{ConsoleConfig, TimeoutConfig};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::deploy::{deploy_and_verify, DeployControls, DeployResult};
use crate::driver::{Driver, ResponseInfo, SharedDriver, WaitState};
use crate::error::E2eResult;
use crate::expect::Expect;
use crate::locator::Locator;
use crate::network::expect_response;

const TUTORIAL_TEXT: &str = "チャットボットの会話方法を選択";

/// Driver handle and settings shared by every page object
#[derive(Clone)]
pub struct PageContext {
    driver: SharedDriver,
    config: Arc<ConsoleConfig>,
    pub timeouts: TimeoutConfig,
    pub deploy: DeployControls,
}

impl PageContext {
    pub fn new(driver: SharedDriver, config: &ConsoleConfig) -> Self {
        Self {
            driver,
            timeouts: config.timeouts.clone(),
            deploy: DeployControls::console(&config.deploy),
            config: Arc::new(config.clone()),
        }
    }

    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn expect(&self) -> Expect<'_> {
        Expect::new(self.driver(), &self.timeouts)
    }

    /// Path of a logical upload asset
    pub fn asset(&self, name: &str) -> E2eResult<PathBuf> {
        Ok(self.config.asset_path(name)?)
    }

    pub fn tutorial_popup(&self) -> Locator {
        Locator::css(format!(".popup:has-text('{}')", TUTORIAL_TEXT))
    }

    /// Close the conversation-method tutorial, which must be showing
    pub async fn close_tutorial(&self) -> E2eResult<()> {
        let popup = self.tutorial_popup();
        self.expect().visible(&popup).await?;
        self.driver().click(&popup.find(".icon.close")).await?;
        self.expect().hidden(&popup).await
    }

    /// Close the tutorial if it shows up within the grace period.
    /// Returns whether it appeared.
    pub async fn dismiss_tutorial(&self) -> E2eResult<bool> {
        let popup = self.tutorial_popup();
        match self
            .driver()
            .wait_for(&popup, WaitState::Visible, self.timeouts.popup_grace())
            .await
        {
            Ok(()) => {
                self.driver().click(&popup.find(".icon.close")).await?;
                self.expect().hidden(&popup).await?;
                Ok(true)
            }
            Err(e) if e.is_timeout() => {
                debug!("No tutorial popup");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Run `trigger` and require a 2xx from the action API
    pub async fn expect_action_response<F>(&self, trigger: F) -> E2eResult<ResponseInfo>
    where
        F: Future<Output = E2eResult<()>>,
    {
        expect_response(
            self.driver(),
            ACTION_API_PATTERN,
            self.timeouts.response(),
            trigger,
        )
        .await
    }

    /// Pick `path` in the file chooser opened by `trigger` and require the
    /// upload request to succeed
    pub async fn upload(&self, trigger: &Locator, path: &Path) -> E2eResult<()> {
        self.expect_action_response(self.driver().upload_file(trigger, path))
            .await
            .map(|_| ())
    }

    pub async fn deploy(&self) -> E2eResult<DeployResult> {
        deploy_and_verify(self.driver(), &self.deploy, &self.timeouts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Effect, ScriptedDriver};

    fn context(driver: Arc<ScriptedDriver>) -> PageContext {
        let mut config = ConsoleConfig::default();
        config.timeouts.ui_ms = 20;
        config.timeouts.popup_grace_ms = 10;
        config.timeouts.poll_ms = 5;
        PageContext::new(driver, &config)
    }

    #[tokio::test]
    async fn test_dismiss_tutorial_tolerates_absence() {
        let driver = Arc::new(ScriptedDriver::new());
        let ctx = context(driver.clone());
        assert!(!ctx.dismiss_tutorial().await.unwrap());
        assert!(driver.calls().iter().all(|c| !c.starts_with("click:")));
    }

    #[tokio::test]
    async fn test_dismiss_tutorial_closes_popup() {
        let driver = Arc::new(ScriptedDriver::new());
        let ctx = context(driver.clone());
        let popup = ctx.tutorial_popup();
        driver.show(&popup);
        driver.on_click(
            &popup.find(".icon.close"),
            vec![Effect::Hide(popup.selector().to_string())],
        );

        assert!(ctx.dismiss_tutorial().await.unwrap());
        assert!(!driver.is_visible(&popup).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_asset_is_config_error() {
        let driver = Arc::new(ScriptedDriver::new());
        let ctx = context(driver);
        let err = ctx.asset("campaign_banner").unwrap_err();
        assert!(err.to_string().contains("campaign_banner"));
    }
}
