//! Image and video flow (Group4)

use chatflow_common::fixtures::{
    GROUP_IMAGE_VIDEO, IMAGE_BUTTON, IMAGE_ITEM, IMAGE_VIDEO_VERIFY_ITEM,
    IMAGE_VIDEO_VERIFY_MESSAGE, VIDEO_BUTTON, VIDEO_ITEMS, VIDEO_URL, VIDEO_URL_BUTTON,
};

use super::image_carousel::PLACEHOLDER_STYLE;
use super::{ChatflowPage, ItemKind, PageContext};
use crate::deploy::DeployResult;
use crate::error::E2eResult;
use crate::locator::Locator;

/// Media cards use a different class list from the other item types
const MEDIA_CARDS: &str =
    "div[class='cells-frame rt-card rt-imagecard rt-image rt-video rt-audio rt-imagemap rt-flyer rt-flex']";

#[derive(Clone)]
pub struct ImageVideoPage {
    flow: ChatflowPage,
}

impl ImageVideoPage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            flow: ChatflowPage::new(ctx),
        }
    }

    fn ctx(&self) -> &PageContext {
        self.flow.ctx()
    }

    fn card(&self, nth: usize) -> Locator {
        Locator::css(MEDIA_CARDS).nth(nth)
    }

    pub fn video_url_input(&self) -> Locator {
        self.card(2).within(&Locator::placeholder("MP4動画のURL入力"))
    }

    fn thumbnail_icon(&self, card: usize) -> Locator {
        self.card(card)
            .find("i[class='icon camera large upload-btn left_t']")
    }

    pub async fn create_group(&self) -> E2eResult<()> {
        self.flow.create_group(GROUP_IMAGE_VIDEO).await
    }

    /// One image item followed by the two video items
    pub async fn create_items(&self) -> E2eResult<()> {
        self.flow.select_group(GROUP_IMAGE_VIDEO).await?;
        self.flow.add_item(ItemKind::Image, IMAGE_ITEM).await?;
        for name in VIDEO_ITEMS {
            self.flow.add_item(ItemKind::Video, name).await?;
        }
        Ok(())
    }

    pub async fn add_image(&self) -> E2eResult<()> {
        let ctx = self.ctx();
        self.flow.select_item(IMAGE_ITEM).await?;
        let card = self.card(0);
        ctx.upload(
            &card.find("i[class='icon camera large upload-btn']"),
            &ctx.asset("image1")?,
        )
        .await?;
        ctx.expect()
            .attribute_differs(&card.find("li.data.imagecard"), "style", PLACEHOLDER_STYLE)
            .await?;
        self.flow
            .add_reaction_button("選択式ボタンを追加", 0, IMAGE_BUTTON)
            .await
    }

    /// video1: uploaded mp4 with a thumbnail
    pub async fn add_video_file(&self) -> E2eResult<()> {
        let ctx = self.ctx();
        self.flow.select_item(VIDEO_ITEMS[0]).await?;
        ctx.upload(
            &self.card(1).find("i[class='icon video large upload-btn left_b']"),
            &ctx.asset("video1")?,
        )
        .await?;
        self.flow
            .add_reaction_button("選択式ボタンを追加", 1, VIDEO_BUTTON)
            .await?;
        ctx.upload(&self.thumbnail_icon(1), &ctx.asset("image1")?)
            .await
    }

    /// video2: mp4 referenced by URL with a thumbnail
    pub async fn add_video_url(&self) -> E2eResult<()> {
        let ctx = self.ctx();
        let driver = ctx.driver();
        self.flow.select_item(VIDEO_ITEMS[1]).await?;
        driver
            .click(&self.card(2).find("i[class='icon link large upload-btn']"))
            .await?;

        let input = self.video_url_input();
        driver.fill(&input, VIDEO_URL).await?;
        ctx.expect_action_response(driver.press(&input, "Enter"))
            .await?;

        self.flow
            .add_reaction_button("選択式ボタンを追加", 2, VIDEO_URL_BUTTON)
            .await?;
        ctx.upload(&self.thumbnail_icon(2), &ctx.asset("image1")?)
            .await
    }

    /// Text item reached from the video URL button
    pub async fn create_verification_item(&self) -> E2eResult<()> {
        self.flow
            .add_text_item(IMAGE_VIDEO_VERIFY_ITEM, IMAGE_VIDEO_VERIFY_MESSAGE)
            .await
    }

    pub async fn deploy(&self) -> E2eResult<DeployResult> {
        self.ctx().deploy().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::E2eError;
    use crate::testing::ScriptedDriver;
    use chatflow_common::fixtures::ACTION_API_PATTERN;
    use chatflow_common::ConsoleConfig;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_rejected_video_url_stops_before_button() {
        let driver = Arc::new(ScriptedDriver::new());
        let mut config = ConsoleConfig::default();
        config.timeouts.ui_ms = 20;
        config.timeouts.poll_ms = 5;
        let page = ImageVideoPage::new(PageContext::new(driver.clone(), &config));
        driver.respond(ACTION_API_PATTERN, 400, "unsupported media");

        let err = page.add_video_url().await.unwrap_err();
        assert!(matches!(err, E2eError::ResponseFailed { status: 400, .. }));

        let arm = driver.position(&format!("arm:{}", ACTION_API_PATTERN)).unwrap();
        let enter = driver
            .position(&format!("press:{}:Enter", page.video_url_input()))
            .unwrap();
        assert!(arm < enter);
        assert!(driver.calls().iter().all(|c| !c.contains("input_bot_btn")));
    }
}
