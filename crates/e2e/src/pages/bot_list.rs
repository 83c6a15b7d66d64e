//! Bot list shown after login

use tracing::info;

use super::PageContext;
use crate::error::E2eResult;
use crate::locator::Locator;

#[derive(Clone)]
pub struct BotListPage {
    ctx: PageContext,
}

impl BotListPage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    fn all_apps_button(&self) -> Locator {
        Locator::css("dd[hint='全てのアプリ一覧']")
    }

    fn search_input(&self) -> Locator {
        Locator::placeholder("ボット名またはIDで検索")
    }

    fn list_view(&self) -> Locator {
        Locator::css(".list-view")
    }

    /// Search for `bot_name`, open it, and close the conversation-method popup
    pub async fn search_and_select(&self, bot_name: &str) -> E2eResult<()> {
        let driver = self.ctx.driver();
        driver.click(&self.all_apps_button()).await?;
        let search = self.search_input();
        driver.fill(&search, bot_name).await?;
        driver.press(&search, "Enter").await?;

        let list = self.list_view();
        self.ctx.expect().contains_text(&list, bot_name).await?;
        driver
            .click(&list.within(&Locator::text_contains(bot_name)).first())
            .await?;

        self.ctx.close_tutorial().await?;
        info!(bot = bot_name, "Bot selected");
        Ok(())
    }
}
