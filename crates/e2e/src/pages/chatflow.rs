//! Chat-flow editor (会話フロー)
//!
//! Groups on the left, conversation items in the middle pane, the selected
//! item's content and reactions on the right.

use chatflow_common::fixtures::{CAROUSEL_ITEMS, GROUP_CAROUSEL, GROUP_TEXT_CHAT, TEXT_ITEMS, TEXT_MESSAGES};
use tracing::{debug, info};

use super::PageContext;
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

/// Content cards of the selected item. The class list is matched verbatim.
pub(crate) const CONTENT_CARDS: &str =
    "div[class='cells rt-card rt-image rt-video rt-audio rt-imagemap rt-flyer rt-imagecard rt-flex']";

/// Conversation item types offered by the "add conversation" menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Text,
    Carousel,
    ImageCarousel,
    ImageMap,
    Image,
    Video,
    Condition,
}

impl ItemKind {
    /// Value of the menu entry's `rt` attribute
    pub fn rt(&self) -> &'static str {
        match self {
            ItemKind::Text => "text",
            ItemKind::Carousel => "card",
            ItemKind::ImageCarousel => "imagecard",
            ItemKind::ImageMap => "imagemap",
            ItemKind::Image => "image",
            ItemKind::Video => "video",
            ItemKind::Condition => "logical",
        }
    }
}

#[derive(Clone)]
pub struct ChatflowPage {
    ctx: PageContext,
}

impl ChatflowPage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    pub fn ctx(&self) -> &PageContext {
        &self.ctx
    }

    fn group_pane(&self) -> Locator {
        Locator::css("section[class='left-pane group-pane']")
    }

    fn action_pane(&self) -> Locator {
        Locator::css("section[class='left-pane action-pane']")
    }

    fn canvas_pane(&self) -> Locator {
        Locator::css("section[class='center-pane canv']")
    }

    pub fn group_list(&self) -> Locator {
        Locator::css("ul.groups")
    }

    /// Middle pane listing the conversation items of the selected group
    pub fn item_list(&self) -> Locator {
        Locator::css(".actions")
    }

    /// Name box of a group or item that is being created
    fn editing_textbox(&self) -> Locator {
        Locator::css("li.editing").find("role=textbox")
    }

    pub fn last_message(&self) -> Locator {
        Locator::css("textarea.msg.with-emoticon").last()
    }

    /// Reaction editor of the selected item
    pub fn nodes_pane(&self) -> Locator {
        Locator::css("section[class='nodes-pane']")
    }

    pub fn button_name_input(&self) -> Locator {
        Locator::css("input[id='input_bot_btn']")
    }

    pub fn content_cards(&self) -> Locator {
        Locator::css(CONTENT_CARDS)
    }

    pub fn save_button(&self) -> Locator {
        Locator::css("button[id='save_btn_purple']")
    }

    /// Link icons drawn for every reaction that jumps to another item
    pub fn link_icons(&self) -> Locator {
        Locator::css(".icon.signout")
    }

    /// Switch to the chat-flow tab from another console screen
    pub async fn open(&self) -> E2eResult<()> {
        self.ctx
            .driver()
            .click(&Locator::xpath("//a[@name='bot_edit_view']"))
            .await?;
        self.ctx.dismiss_tutorial().await?;
        Ok(())
    }

    pub async fn verify_ui(&self) -> E2eResult<()> {
        let expect = self.ctx.expect();

        let groups = self.group_pane();
        expect.visible(&groups).await?;
        expect.visible(&groups.find_text("グループ一覧")).await?;
        expect.visible(&groups.within(&Locator::role("button", "グループ追加"))).await?;

        let actions = self.action_pane();
        expect.visible(&actions).await?;
        expect.visible(&actions.find_text("会話・アクション一覧")).await?;
        expect.visible(&actions.within(&Locator::role("button", "会話を追加"))).await?;

        let canvas = self.canvas_pane();
        expect.visible(&canvas).await?;
        expect.visible(&canvas.find("input[data-value='最初の挨拶']")).await?;

        debug!("Chat-flow panes visible");
        Ok(())
    }

    pub async fn has_group(&self, name: &str) -> E2eResult<bool> {
        self.ctx
            .driver()
            .is_visible(&self.group_list().find_text(name))
            .await
    }

    async fn enter_new_name(&self, name: &str) -> E2eResult<()> {
        let driver = self.ctx.driver();
        let textbox = self.editing_textbox();
        self.ctx.expect().editable(&textbox).await?;
        driver.fill(&textbox, name).await?;
        driver.press(&textbox, "Enter").await
    }

    pub async fn create_group(&self, name: &str) -> E2eResult<()> {
        let driver = self.ctx.driver();
        driver.hover(&Locator::role("button", "グループ追加")).await?;
        driver.click(&Locator::css("dd[act='group']")).await?;
        self.enter_new_name(name).await?;
        self.ctx
            .expect()
            .visible(&self.group_list().find_text(name))
            .await?;
        self.ctx.dismiss_tutorial().await?;
        info!(group = name, "Group created");
        Ok(())
    }

    pub async fn select_group(&self, name: &str) -> E2eResult<()> {
        self.ctx
            .driver()
            .click(&self.group_list().find_text(name))
            .await
    }

    /// Add a conversation item of `kind` to the selected group
    pub async fn add_item(&self, kind: ItemKind, name: &str) -> E2eResult<()> {
        let driver = self.ctx.driver();
        driver.hover(&Locator::role("button", "会話を追加")).await?;
        driver
            .click(&Locator::css(format!("dd[rt='{}']", kind.rt())))
            .await?;
        self.enter_new_name(name).await?;
        self.ctx.expect().contains_text(&self.item_list(), name).await?;
        debug!(item = name, kind = kind.rt(), "Item created");
        Ok(())
    }

    pub async fn select_item(&self, name: &str) -> E2eResult<()> {
        self.ctx
            .driver()
            .click(&self.item_list().within(&Locator::text_contains(name)).first())
            .await
    }

    /// Type the message of the most recently added text item
    pub async fn set_last_message(&self, message: &str) -> E2eResult<()> {
        let driver = self.ctx.driver();
        let textarea = self.last_message();
        driver.fill(&textarea, message).await?;
        driver.press(&textarea, "Enter").await?;
        self.ctx.dismiss_tutorial().await?;
        self.ctx.expect().has_value(&textarea, message).await
    }

    pub async fn add_text_item(&self, name: &str, message: &str) -> E2eResult<()> {
        self.add_item(ItemKind::Text, name).await?;
        self.set_last_message(message).await
    }

    /// Click the `nth` reaction control labelled `control` and name the new button
    pub async fn add_reaction_button(&self, control: &str, nth: usize, name: &str) -> E2eResult<()> {
        let driver = self.ctx.driver();
        driver
            .click(&self.nodes_pane().within(&Locator::text_contains(control)).nth(nth))
            .await?;
        let input = self.button_name_input();
        driver.fill(&input, name).await?;
        driver.press(&input, "Enter").await?;
        self.ctx
            .expect()
            .visible(&self.nodes_pane().within(&Locator::text_contains(name)).first())
            .await
    }

    /// Choose "manual" next-item selection inside `form` and pick `destination`
    pub async fn choose_destination(&self, form: &Locator, destination: &str) -> E2eResult<()> {
        let driver = self.ctx.driver();
        driver.click(&form.within(&Locator::text_contains("手動で指定"))).await?;

        let input = Locator::css("input[target_name='act']");
        driver.fill(&input, destination).await?;
        driver
            .click(
                &Locator::css("ul#form-item-autocomplete")
                    .within(&Locator::text_contains(destination))
                    .last(),
            )
            .await?;
        self.ctx
            .expect()
            .visible(
                &Locator::css("span[class='autocomplete-select']")
                    .within(&Locator::text_contains(destination)),
            )
            .await
    }

    /// Pages rendered inside the `nth` card once its source is resolved
    pub fn card_pages(&self, nth: usize) -> Locator {
        self.content_cards().nth(nth).find(":scope > ol")
    }

    /// Point the `nth` card at an API source and return how many pages it
    /// rendered. More than two are required.
    pub async fn load_api_cards(&self, nth: usize, url: &str) -> E2eResult<usize> {
        let driver = self.ctx.driver();
        driver
            .click(
                &Locator::css("dl[class='card-src']")
                    .nth(nth)
                    .within(&Locator::text_contains("API")),
            )
            .await?;

        let api = Locator::placeholder("Your API URL").nth(nth);
        driver.fill(&api, url).await?;
        self.ctx
            .expect_action_response(driver.press(&api, "Enter"))
            .await?;

        let pages = driver.count(&self.card_pages(nth)).await?;
        if pages <= 2 {
            return Err(E2eError::AssertionFailed(format!(
                "expected more than 2 card pages from {}, found {}",
                url, pages
            )));
        }
        info!(pages, "Cards loaded from API");
        Ok(pages)
    }

    /// Add a big button named `name` to card `nth` and require it on every
    /// filled page. The trailing page is the empty "add" slot.
    pub async fn add_card_button(&self, nth: usize, pages: usize, name: &str) -> E2eResult<()> {
        let driver = self.ctx.driver();
        let card = self.content_cards().nth(nth);
        driver
            .click(&card.within(&Locator::text_contains("ボタンを追加")).first())
            .await?;
        let input = self.button_name_input();
        driver.fill(&input, name).await?;
        driver.press(&input, "Enter").await?;

        let buttons = card.within(&Locator::text_contains(name));
        for i in 0..pages.saturating_sub(1) {
            self.ctx.expect().visible(&buttons.nth(i)).await?;
        }
        Ok(())
    }

    /// Group1 with Textitem1, which other flows link to
    pub async fn ensure_text_group(&self) -> E2eResult<()> {
        if !self.has_group(GROUP_TEXT_CHAT).await? {
            info!(group = GROUP_TEXT_CHAT, "Creating missing prerequisite group");
            self.create_group(GROUP_TEXT_CHAT).await?;
            self.add_text_item(TEXT_ITEMS[0], TEXT_MESSAGES[0]).await?;
        }
        self.ctx
            .expect()
            .visible(&self.group_list().find_text(GROUP_TEXT_CHAT))
            .await
    }

    /// Group2 with titled carousel items, which other flows link to
    pub async fn ensure_carousel_group(&self) -> E2eResult<()> {
        if !self.has_group(GROUP_CAROUSEL).await? {
            info!(group = GROUP_CAROUSEL, "Creating missing prerequisite group");
            self.create_group(GROUP_CAROUSEL).await?;
            for (i, item) in CAROUSEL_ITEMS.iter().enumerate() {
                self.add_item(ItemKind::Carousel, item).await?;
                let title = self
                    .content_cards()
                    .nth(i)
                    .find("input[placeholder='タイトル']");
                let driver = self.ctx.driver();
                driver.fill(&title, &format!("Test Carousel{} Title", i + 1)).await?;
                driver.press(&title, "Enter").await?;
            }
        }
        self.ctx
            .expect()
            .visible(&self.group_list().find_text(GROUP_CAROUSEL))
            .await
    }
}
