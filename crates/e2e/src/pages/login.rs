//! Login screen

use tracing::info;

use super::PageContext;
use crate::error::E2eResult;
use crate::locator::Locator;

#[derive(Clone)]
pub struct LoginPage {
    ctx: PageContext,
}

impl LoginPage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    fn email_input(&self) -> Locator {
        Locator::css("input[name='email']")
    }

    fn password_input(&self) -> Locator {
        Locator::css("input[name='pass']")
    }

    fn login_button(&self) -> Locator {
        Locator::css("button.show-mail-login")
    }

    /// Only present once the operator is signed in
    fn new_app_button(&self) -> Locator {
        Locator::css("button[hint='新しいアプリ作成']")
    }

    pub async fn navigate(&self, url: &str) -> E2eResult<()> {
        self.ctx.driver().navigate(url).await
    }

    pub async fn login(&self, email: &str, password: &str) -> E2eResult<()> {
        let driver = self.ctx.driver();
        driver.fill(&self.email_input(), email).await?;
        driver.fill(&self.password_input(), password).await?;
        driver.click(&self.login_button()).await?;
        self.ctx.expect().visible(&self.new_app_button()).await?;
        info!(email, "Logged in");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Effect, ScriptedDriver};
    use chatflow_common::ConsoleConfig;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_login_waits_for_landing_page() {
        let driver = Arc::new(ScriptedDriver::new());
        let mut config = ConsoleConfig::default();
        config.timeouts.ui_ms = 20;
        let page = LoginPage::new(PageContext::new(driver.clone(), &config));

        assert!(page.login("qa@example.com", "secret").await.is_err());

        driver.on_click(
            &Locator::css("button.show-mail-login"),
            vec![Effect::Show("button[hint='新しいアプリ作成']".to_string())],
        );
        page.login("qa@example.com", "secret").await.unwrap();
        assert!(driver
            .calls()
            .contains(&"fill:input[name='pass']".to_string()));
    }
}
