//! Plain text conversation flow (Group1)

use chatflow_common::fixtures::{
    GROUP_TEXT_CHAT, TEXTITEM1_BUTTON, TEXTITEM2_CHOICES, TEXTITEM2_DESTINATION,
    TEXTITEM3_DESTINATION, TEXT_ITEMS, TEXT_MESSAGES, USER_ATTRIBUTE_KEY,
};

use super::{ChatflowPage, PageContext};
use crate::deploy::DeployResult;
use crate::error::E2eResult;
use crate::locator::Locator;

#[derive(Clone)]
pub struct TextChatPage {
    flow: ChatflowPage,
}

impl TextChatPage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            flow: ChatflowPage::new(ctx),
        }
    }

    fn ctx(&self) -> &PageContext {
        self.flow.ctx()
    }

    fn reaction_control(&self, label: &str, nth: usize) -> Locator {
        self.flow
            .nodes_pane()
            .within(&Locator::text_contains(label))
            .nth(nth)
    }

    pub async fn create_group(&self) -> E2eResult<()> {
        self.flow.create_group(GROUP_TEXT_CHAT).await
    }

    pub async fn create_items(&self) -> E2eResult<()> {
        for (name, message) in TEXT_ITEMS.iter().zip(TEXT_MESSAGES.iter()) {
            self.flow.add_text_item(name, message).await?;
        }
        Ok(())
    }

    /// Every declared item is listed before deploy
    pub async fn verify_items_listed(&self) -> E2eResult<()> {
        let list = self.flow.item_list();
        for name in TEXT_ITEMS {
            self.ctx().expect().contains_text(&list, name).await?;
        }
        Ok(())
    }

    /// Textitem1: one big button
    pub async fn reaction_textitem1(&self) -> E2eResult<()> {
        self.flow.select_item(TEXT_ITEMS[0]).await?;
        self.flow
            .add_reaction_button("ボタンを追加", 0, TEXTITEM1_BUTTON)
            .await
    }

    /// Textitem2: two choice buttons stored in a user attribute, then on to Textitem3
    pub async fn reaction_textitem2(&self) -> E2eResult<()> {
        let driver = self.ctx().driver();
        self.flow.select_item(TEXT_ITEMS[1]).await?;
        for choice in TEXTITEM2_CHOICES {
            self.flow
                .add_reaction_button("選択式ボタンを追加", 1, choice)
                .await?;
        }

        driver.click(&self.reaction_control("一括編集", 1)).await?;
        driver
            .fill(&Locator::placeholder("ユーザの属性キー名"), USER_ATTRIBUTE_KEY)
            .await?;
        self.flow
            .choose_destination(
                &Locator::css("section[class='pop-inline btns-form fullscreen']"),
                TEXTITEM2_DESTINATION,
            )
            .await?;
        driver.click(&self.flow.save_button()).await?;
        self.ctx().expect().has_count(&self.flow.link_icons(), 2).await
    }

    /// Textitem3: pattern match on any input, then on to Textitem4
    pub async fn reaction_textitem3(&self) -> E2eResult<()> {
        let driver = self.ctx().driver();
        let expect = self.ctx().expect();
        self.flow.select_item(TEXT_ITEMS[2]).await?;
        driver.click(&self.reaction_control("文字入力後の設定", 2)).await?;

        let method = Locator::role_exact("listitem", "判定方法").find("div").nth(1);
        driver.click(&method).await?;
        driver.click(&Locator::text("パターン")).await?;
        expect.visible(&method.within(&Locator::text_contains("パターン"))).await?;

        let length = Locator::role_exact("listitem", "方法").find("div").nth(1);
        driver.click(&length).await?;
        driver.click(&Locator::text("指定なし")).await?;
        expect.has_text(&length, "指定なし").await?;

        self.flow
            .choose_destination(
                &Locator::css("section[class='pop-inline ipts-form']"),
                TEXTITEM3_DESTINATION,
            )
            .await?;
        driver.click(&self.flow.save_button()).await?;
        expect
            .visible(&self.flow.nodes_pane().within(&Locator::text_contains("is (len:1)")))
            .await
    }

    /// Textitem4: continue after a file is received
    pub async fn reaction_textitem4(&self) -> E2eResult<()> {
        let driver = self.ctx().driver();
        self.flow.select_item(TEXT_ITEMS[3]).await?;
        driver
            .click(&self.reaction_control("ファイル受信後の設定", 3))
            .await?;
        driver.click(&self.flow.save_button()).await?;
        self.ctx()
            .expect()
            .visible(&self.flow.nodes_pane().within(&Locator::text_contains("File")))
            .await
    }

    pub async fn deploy(&self) -> E2eResult<DeployResult> {
        self.ctx().deploy().await
    }
}
