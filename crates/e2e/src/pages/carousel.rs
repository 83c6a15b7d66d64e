//! Carousel conversation flow (Group2)

use chatflow_common::fixtures::{
    CAROUSEL1_BUTTON, CAROUSEL2_BUTTON, CAROUSEL2_COUPON, CAROUSEL_ITEMS, CAROUSEL_SOURCE_API,
    CAROUSEL_VERIFY_ITEM, CAROUSEL_VERIFY_MESSAGE, GROUP_CAROUSEL,
};
use super::coupon::{CouponDraft, CouponPage};
use super::{ChatflowPage, ItemKind, PageContext};
use crate::deploy::DeployResult;
use crate::error::E2eResult;
use crate::locator::Locator;

/// Data source selector above each card ("API", "コンテンツ", ...)
const CARD_SOURCES: &str = "dl[class='card-src']";

#[derive(Clone)]
pub struct CarouselPage {
    flow: ChatflowPage,
}

impl CarouselPage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            flow: ChatflowPage::new(ctx),
        }
    }

    fn ctx(&self) -> &PageContext {
        self.flow.ctx()
    }

    fn card(&self, nth: usize) -> Locator {
        self.flow.content_cards().nth(nth)
    }

    /// Coupon shown by carousel2; created before the chat-flow edits
    pub async fn create_coupon(&self) -> E2eResult<()> {
        let coupons = CouponPage::new(self.ctx().clone());
        coupons.open().await?;
        coupons.create(&CouponDraft::named(CAROUSEL2_COUPON)).await
    }

    /// Back to the chat-flow editor with a fresh Group2
    pub async fn create_group(&self) -> E2eResult<()> {
        self.flow.open().await?;
        self.flow.create_group(GROUP_CAROUSEL).await
    }

    pub async fn create_items(&self) -> E2eResult<()> {
        for name in CAROUSEL_ITEMS {
            self.flow.add_item(ItemKind::Carousel, name).await?;
        }
        Ok(())
    }

    /// carousel1: cards pulled from an API, with one button on every card
    pub async fn reaction_carousel1(&self) -> E2eResult<()> {
        self.flow.select_item(CAROUSEL_ITEMS[0]).await?;
        let pages = self.flow.load_api_cards(0, CAROUSEL_SOURCE_API).await?;
        self.flow.add_card_button(0, pages, CAROUSEL1_BUTTON).await
    }

    /// carousel2: a coupon card with a choice button
    pub async fn reaction_carousel2(&self) -> E2eResult<()> {
        let driver = self.ctx().driver();
        self.flow.select_item(CAROUSEL_ITEMS[1]).await?;
        driver
            .click(&Locator::css(CARD_SOURCES).nth(1).within(&Locator::text_contains("コンテンツ")))
            .await?;
        driver
            .click(&Locator::css("p[class='srcs src-content']").nth(1).find("role=button"))
            .await?;
        driver
            .click(&Locator::css("ul[class='ui-dropdown-opts']").find_text("クーポン"))
            .await?;
        self.ctx()
            .expect()
            .visible(
                &self
                    .card(1)
                    .find(&format!("input[data-value='{}']", CAROUSEL2_COUPON))
                    .last(),
            )
            .await?;

        self.flow
            .add_reaction_button("選択式ボタンを追加", 1, CAROUSEL2_BUTTON)
            .await
    }

    /// Text item the carousel2 button leads to
    pub async fn create_verification_item(&self) -> E2eResult<()> {
        self.flow
            .add_text_item(CAROUSEL_VERIFY_ITEM, CAROUSEL_VERIFY_MESSAGE)
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

    fn page() -> (Arc<ScriptedDriver>, CarouselPage) {
        let driver = Arc::new(ScriptedDriver::new());
        let mut config = ConsoleConfig::default();
        config.timeouts.ui_ms = 20;
        config.timeouts.poll_ms = 5;
        let page = CarouselPage::new(PageContext::new(driver.clone(), &config));
        (driver, page)
    }

    #[tokio::test]
    async fn test_api_source_with_too_few_pages_is_assertion() {
        let (driver, page) = page();
        driver.respond(ACTION_API_PATTERN, 200, "{}");
        driver.set_count(&page.flow.card_pages(0), 2);

        let err = page.reaction_carousel1().await.unwrap_err();
        assert!(matches!(err, E2eError::AssertionFailed(_)));
        assert!(driver.position("press:[placeholder=\"Your API URL\"] >> nth=0:Enter").is_some());
    }

    #[tokio::test]
    async fn test_api_source_listener_armed_before_enter() {
        let (driver, page) = page();
        driver.respond(ACTION_API_PATTERN, 500, "source unreachable");

        let err = page.reaction_carousel1().await.unwrap_err();
        assert!(matches!(err, E2eError::ResponseFailed { status: 500, .. }));

        let arm = driver.position(&format!("arm:{}", ACTION_API_PATTERN)).unwrap();
        let enter = driver
            .position("press:[placeholder=\"Your API URL\"] >> nth=0:Enter")
            .unwrap();
        assert!(arm < enter);
    }
}
