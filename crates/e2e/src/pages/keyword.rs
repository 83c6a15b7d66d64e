//! Keyword dictionary and mute/unmute words

use chatflow_common::fixtures::{
    KEYWORD_DESTINATION, KEYWORD_GROUP, KEYWORD_NAME, KEYWORD_TEXT_ITEM, KEYWORD_TEXT_MESSAGE,
    MUTE_WORD, UNMUTE_WORD,
};
use tracing::info;

use super::cleanup_lists::MuteEditor;
use super::{ChatflowPage, PageContext};
use crate::cleanup::MuteSettings;
use crate::deploy::DeployResult;
use crate::error::E2eResult;
use crate::locator::Locator;

#[derive(Clone)]
pub struct KeywordPage {
    flow: ChatflowPage,
    mute: MuteEditor,
}

impl KeywordPage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            mute: MuteEditor::new(ctx.clone()),
            flow: ChatflowPage::new(ctx),
        }
    }

    fn ctx(&self) -> &PageContext {
        self.flow.ctx()
    }

    fn table(&self) -> Locator {
        Locator::css("table[class='list-view']")
    }

    fn editor(&self) -> Locator {
        Locator::css("section[class='popup dict-editor']")
    }

    /// Keywords jump to Textitem1, so make sure it exists before leaving
    /// the chat-flow screen
    pub async fn open(&self) -> E2eResult<()> {
        if !self.flow.has_group(KEYWORD_GROUP).await? {
            self.flow.create_group(KEYWORD_GROUP).await?;
            self.flow
                .add_text_item(KEYWORD_TEXT_ITEM, KEYWORD_TEXT_MESSAGE)
                .await?;
        }
        self.ctx()
            .expect()
            .visible(&self.flow.group_list().find_text(KEYWORD_GROUP))
            .await?;

        self.ctx()
            .driver()
            .click(&Locator::css("dd[msg='navi-dict'] h2[class='icon comment']"))
            .await?;
        self.ctx().expect().visible(&self.table()).await
    }

    pub async fn add_keyword(&self) -> E2eResult<()> {
        let driver = self.ctx().driver();
        let expect = self.ctx().expect();
        let editor = self.editor();

        driver.click(&Locator::role("button", "新規登録")).await?;
        expect.visible(&editor).await?;
        driver
            .fill(&editor.find("textarea[placeholder^='キーワード入力']"), KEYWORD_NAME)
            .await?;
        driver
            .fill(
                &editor.find("input[placeholder='遷移先の会話']").first(),
                KEYWORD_DESTINATION,
            )
            .await?;
        driver
            .click(
                &Locator::css("ul#form-item-autocomplete")
                    .within(&Locator::text_contains(KEYWORD_DESTINATION))
                    .last(),
            )
            .await?;
        expect
            .visible(
                &Locator::css("span[class='autocomplete-select']")
                    .within(&Locator::text_contains(KEYWORD_DESTINATION)),
            )
            .await?;

        driver
            .click(&editor.within(&Locator::role("button", "保存")))
            .await?;
        expect
            .visible(&Locator::css(format!(
                "table[class='list-view']:has-text('{}')",
                KEYWORD_NAME
            )))
            .await?;
        info!(keyword = KEYWORD_NAME, "Keyword registered");
        Ok(())
    }

    /// Save both word lists, then reopen the editor to read them back
    pub async fn set_mute_words(&self) -> E2eResult<()> {
        self.mute.open().await?;
        self.mute.save_words(MUTE_WORD, UNMUTE_WORD).await?;

        self.mute.open().await?;
        let expect = self.ctx().expect();
        expect.has_value(&self.mute.mute_field(), MUTE_WORD).await?;
        expect.has_value(&self.mute.unmute_field(), UNMUTE_WORD).await?;
        self.mute.close().await
    }

    pub async fn deploy(&self) -> E2eResult<DeployResult> {
        self.ctx().deploy().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Effect, ScriptedDriver};
    use chatflow_common::ConsoleConfig;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_saved_words_are_read_back() {
        let driver = Arc::new(ScriptedDriver::new());
        let mut config = ConsoleConfig::default();
        config.timeouts.ui_ms = 20;
        config.timeouts.poll_ms = 5;
        let page = KeywordPage::new(PageContext::new(driver.clone(), &config));
        let popup = page.mute.popup().selector().to_string();

        driver.on_click(
            &Locator::role("button", "ミュート設定"),
            vec![Effect::Show(popup.clone())],
        );
        driver.on_click(
            &page.mute.popup().within(&Locator::role("button", "保存")),
            vec![Effect::Hide(popup.clone())],
        );
        driver.on_click(&Locator::css("i.icon.close").last(), vec![Effect::Hide(popup)]);

        page.set_mute_words().await.unwrap();

        let opens = driver
            .calls()
            .iter()
            .filter(|c| c.contains("ミュート設定"))
            .count();
        assert_eq!(opens, 2);
    }
}
