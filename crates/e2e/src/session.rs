//! Logged-in browser session
//!
//! Every scenario gets its own session: a fresh browser, signed in, with the
//! configured bot opened on the chat-flow screen.

use chatflow_common::ConsoleConfig;
use std::sync::Arc;
use tracing::{info, warn};

use crate::driver::SharedDriver;
use crate::error::E2eResult;
use crate::pages::{BotListPage, LoginPage, PageContext};
use crate::playwright::{PlaywrightConfig, PlaywrightDriver};

pub struct Session {
    ctx: PageContext,
}

impl Session {
    /// Launch a browser and sign in
    pub async fn open(config: &ConsoleConfig, playwright: PlaywrightConfig) -> E2eResult<Self> {
        info!(browser = playwright.browser.as_str(), headless = playwright.headless, "Launching browser");
        let driver: SharedDriver = Arc::new(PlaywrightDriver::launch(playwright).await?);
        match Self::start(driver.clone(), config).await {
            Ok(session) => Ok(session),
            Err(e) => {
                if let Err(close_err) = driver.close().await {
                    warn!("Failed to close browser after setup error: {}", close_err);
                }
                Err(e)
            }
        }
    }

    /// Sign in on an already running driver and open the configured bot
    pub async fn start(driver: SharedDriver, config: &ConsoleConfig) -> E2eResult<Self> {
        let (email, password) = config.credentials()?;
        let bot = config.bot_name()?;
        let ctx = PageContext::new(driver, config);

        let login = LoginPage::new(ctx.clone());
        login.navigate(&config.admin_url).await?;
        login.login(email, password).await?;
        BotListPage::new(ctx.clone()).search_and_select(bot).await?;

        info!(bot, profile = %config.bot_profile, "Session ready");
        Ok(Self { ctx })
    }

    pub fn ctx(&self) -> &PageContext {
        &self.ctx
    }

    pub async fn close(&self) -> E2eResult<()> {
        self.ctx.driver().close().await
    }
}
