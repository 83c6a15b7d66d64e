//! Scenario registry
//!
//! Each [`ScenarioKind`] builds the ordered steps of one console flow on top
//! of the page objects. Step labels are what the runner logs and reports.

use chatflow_common::ConsoleConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use tracing::info;

use crate::cleanup::{clear_mute_settings, CleanupEngine, KeepSet};
use crate::deploy::DeployResult;
use crate::error::{E2eError, E2eResult};
use crate::pages::coupon::CouponExpiry;
use crate::pages::{
    CarouselPage, ChatflowPage, ConditionPage, CouponPage, GroupList, ImageCarouselPage,
    ImageVideoPage, KeywordList, KeywordPage, MuteEditor, PageContext, SegmentList, TextChatPage,
};
use crate::runner::Scenario;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    SetupCleanup,
    TextChat,
    Coupon,
    Carousel,
    ImageCarouselMap,
    ImageVideo,
    ConditionItem,
    KeywordMuteUnmute,
}

impl ScenarioKind {
    /// Suite order. Setup comes first; later flows link to groups the
    /// earlier ones leave behind.
    pub const ALL: [ScenarioKind; 8] = [
        ScenarioKind::SetupCleanup,
        ScenarioKind::TextChat,
        ScenarioKind::Coupon,
        ScenarioKind::Carousel,
        ScenarioKind::ImageCarouselMap,
        ScenarioKind::ImageVideo,
        ScenarioKind::ConditionItem,
        ScenarioKind::KeywordMuteUnmute,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::SetupCleanup => "setup_cleanup",
            ScenarioKind::TextChat => "text_chat",
            ScenarioKind::Coupon => "coupon",
            ScenarioKind::Carousel => "carousel",
            ScenarioKind::ImageCarouselMap => "image_carousel_map",
            ScenarioKind::ImageVideo => "image_video",
            ScenarioKind::ConditionItem => "condition_item",
            ScenarioKind::KeywordMuteUnmute => "keyword_mute_unmute",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn tags(&self) -> &'static [&'static str] {
        match self {
            ScenarioKind::SetupCleanup => &["setup", "cleanup"],
            ScenarioKind::TextChat => &["chatflow", "textitem"],
            ScenarioKind::Coupon => &["coupon"],
            ScenarioKind::Carousel => &["chatflow", "carousel"],
            ScenarioKind::ImageCarouselMap => &["chatflow", "image_carousel"],
            ScenarioKind::ImageVideo => &["chatflow", "image_video"],
            ScenarioKind::ConditionItem => &["chatflow", "condition_item"],
            ScenarioKind::KeywordMuteUnmute => &["keyword"],
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScenarioKind::SetupCleanup => "Clear groups, keywords, mute words, coupons and segments left by earlier runs",
            ScenarioKind::TextChat => "Group1 with four text items and their reactions",
            ScenarioKind::Coupon => "Segment plus coupon create, edit, send, delete and search",
            ScenarioKind::Carousel => "Group2 with an API carousel and a coupon carousel",
            ScenarioKind::ImageCarouselMap => "Group3 with an API image carousel and a three-area image map",
            ScenarioKind::ImageVideo => "Group4 with an image and two videos",
            ScenarioKind::ConditionItem => "Group5 with a branch on a user attribute",
            ScenarioKind::KeywordMuteUnmute => "Keyword entry plus mute and unmute words",
        }
    }

    /// Must pass before anything else runs
    pub fn is_setup(&self) -> bool {
        matches!(self, ScenarioKind::SetupCleanup)
    }

    pub fn matches(&self, filter: &str) -> bool {
        self.name() == filter || self.tags().contains(&filter)
    }

    /// Steps of this flow, bound to `ctx`
    pub fn build(&self, ctx: &PageContext) -> Scenario {
        let scenario = Scenario::new(self.name());
        let scenario = self.tags().iter().fold(scenario, |s, tag| s.tag(*tag));
        match self {
            ScenarioKind::SetupCleanup => setup_cleanup(scenario, ctx),
            ScenarioKind::TextChat => text_chat(scenario, ctx),
            ScenarioKind::Coupon => coupon(scenario, ctx),
            ScenarioKind::Carousel => carousel(scenario, ctx),
            ScenarioKind::ImageCarouselMap => image_carousel_map(scenario, ctx),
            ScenarioKind::ImageVideo => image_video(scenario, ctx),
            ScenarioKind::ConditionItem => condition_item(scenario, ctx),
            ScenarioKind::KeywordMuteUnmute => keyword_mute_unmute(scenario, ctx),
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve name/tag filters into suite order. Setup is always included and
/// always first; no filters selects everything.
pub fn select(filters: &[String]) -> E2eResult<Vec<ScenarioKind>> {
    if let Some(unknown) = filters
        .iter()
        .find(|f| !ScenarioKind::ALL.iter().any(|k| k.matches(f)))
    {
        return Err(E2eError::UnknownScenario(unknown.clone()));
    }

    Ok(ScenarioKind::ALL
        .into_iter()
        .filter(|k| k.is_setup() || filters.is_empty() || filters.iter().any(|f| k.matches(f)))
        .collect())
}

/// Give a step its own clone of `page`
fn with<P, F, Fut>(page: &P, action: F) -> impl FnOnce() -> Fut
where
    P: Clone,
    F: FnOnce(P) -> Fut,
    Fut: Future<Output = E2eResult<()>>,
{
    let page = page.clone();
    move || action(page)
}

fn deployed(result: E2eResult<DeployResult>) -> E2eResult<()> {
    let result = result?;
    info!(status = ?result.status, "Deploy verified");
    Ok(())
}

fn setup_cleanup(scenario: Scenario, ctx: &PageContext) -> Scenario {
    let config: &ConsoleConfig = ctx.config();
    let engine = CleanupEngine::new(config.cleanup.max_iterations);
    let group_keep: KeepSet = config.cleanup.group_keep.iter().cloned().collect();
    let keyword_keep: KeepSet = config.cleanup.keyword_keep.iter().cloned().collect();
    let flow = ChatflowPage::new(ctx.clone());
    let groups_engine = engine.clone();
    let keywords_engine = engine;

    scenario
        .step(
            "Chatflow page loaded successfully.",
            "FAILED to verify UI elements on Chatflow page.",
            with(&flow, |f| async move { f.verify_ui().await }),
        )
        .step(
            "Check and Clear all previous created Groups Chatflow data.",
            "FAILED to clear Group Chatflow data",
            with(ctx, move |c| async move {
                groups_engine.clean(&GroupList::new(c), &group_keep).await?;
                Ok(())
            }),
        )
        .step(
            "Check and Clear all previous created Keyword/Mute/Unmute data.",
            "FAILED to clear Keyword/Mute/Unmute data.",
            with(ctx, move |c| async move {
                keywords_engine
                    .clean(&KeywordList::new(c.clone()), &keyword_keep)
                    .await?;
                clear_mute_settings(&MuteEditor::new(c)).await?;
                Ok(())
            }),
        )
        .step(
            "Check and Clear all previous created Coupons data.",
            "FAILED to clear Coupon data.",
            with(&CouponPage::new(ctx.clone()), |p| async move {
                p.open_empty().await?;
                Ok(())
            }),
        )
        .step(
            "Check and Clear all previous created Segment data.",
            "FAILED to clear Segment data.",
            with(ctx, move |c| async move {
                CleanupEngine::new(c.config().cleanup.max_iterations)
                    .clean(&SegmentList::new(c.clone()), &KeepSet::empty())
                    .await?;
                Ok(())
            }),
        )
}

fn text_chat(scenario: Scenario, ctx: &PageContext) -> Scenario {
    let page = TextChatPage::new(ctx.clone());
    scenario
        .step(
            "Created a new Group1.",
            "FAILED to create a new Group1.",
            with(&page, |p| async move { p.create_group().await }),
        )
        .step(
            "Created new 会話 (Textitem1-Textitem4).",
            "FAILED to create new text items.",
            with(&page, |p| async move { p.create_items().await }),
        )
        .step(
            "Set reaction for Textitem1: Big button.",
            "FAILED to set reaction for Textitem1.",
            with(&page, |p| async move { p.reaction_textitem1().await }),
        )
        .step(
            "Set reaction for Textitem2: Multiple choice.",
            "FAILED to set reaction for Textitem2.",
            with(&page, |p| async move { p.reaction_textitem2().await }),
        )
        .step(
            "Set reaction for Textitem3: Pattern matching.",
            "FAILED to set reaction for Textitem3.",
            with(&page, |p| async move { p.reaction_textitem3().await }),
        )
        .step(
            "Set reaction for Textitem4: File received.",
            "FAILED to set reaction for Textitem4.",
            with(&page, |p| async move { p.reaction_textitem4().await }),
        )
        .step(
            "All text items listed.",
            "FAILED to find every text item in the list.",
            with(&page, |p| async move { p.verify_items_listed().await }),
        )
        .step(
            "Deployed the chatflow successfully.",
            "FAILED to deploy the chatflow.",
            with(&page, |p| async move { deployed(p.deploy().await) }),
        )
}

fn coupon(scenario: Scenario, ctx: &PageContext) -> Scenario {
    let page = CouponPage::new(ctx.clone());
    let expiry = CouponExpiry::tomorrow();
    scenario
        .step(
            "Created a new segment.",
            "FAILED to create a new segment.",
            with(&page, |p| async move { p.create_segment().await }),
        )
        .step(
            "Accessed the coupon screen.",
            "FAILED to access the coupon screen.",
            with(&page, |p| async move {
                p.open_empty().await?;
                Ok(())
            }),
        )
        .step(
            "Created a new coupon flow.",
            "FAILED to create a new coupon flow.",
            with(&page, move |p| async move { p.create_full_coupon(&expiry).await }),
        )
        .step(
            "Verify that unsent coupon can be edited.",
            "FAILED to edit the unsent coupon.",
            with(&page, |p| async move { p.edit_unsent().await }),
        )
        .step(
            "Verify that unsent coupon can be send.",
            "FAILED to send the unsent coupon.",
            with(&page, |p| async move { p.send_unsent().await }),
        )
        .step(
            "Verify that able to delete sent coupon.",
            "FAILED to delete the sent coupon.",
            with(&page, |p| async move { p.delete_sent().await }),
        )
        .step(
            "Verify that able to delete unsent coupon.",
            "FAILED to delete the unsent coupon.",
            with(&page, |p| async move { p.delete_unsent().await }),
        )
        .step(
            "Verify that able to search the coupon.",
            "FAILED to search the coupon.",
            with(&page, |p| async move { p.search().await }),
        )
}

fn carousel(scenario: Scenario, ctx: &PageContext) -> Scenario {
    let page = CarouselPage::new(ctx.clone());
    let flow = ChatflowPage::new(ctx.clone());
    scenario
        .step(
            "Created a new coupon for using in carousel2.",
            "FAILED to create a new coupon for using in carousel2.",
            with(&page, |p| async move { p.create_coupon().await }),
        )
        .step(
            "Chatflow page loaded successfully.",
            "FAILED to verify UI elements on Chatflow page.",
            with(&flow, |f| async move {
                f.open().await?;
                f.verify_ui().await
            }),
        )
        .step(
            "Created a new Group2.",
            "FAILED to create a new Group2.",
            with(&page, |p| async move { p.create_group().await }),
        )
        .step(
            "Created new カルーセル (carousel1-carousel2).",
            "FAILED to create new carousel items.",
            with(&page, |p| async move { p.create_items().await }),
        )
        .step(
            "Set reaction for carousel1.",
            "FAILED to set reaction for carousel1.",
            with(&page, |p| async move { p.reaction_carousel1().await }),
        )
        .step(
            "Set reaction for carousel2.",
            "FAILED to set reaction for carousel2.",
            with(&page, |p| async move { p.reaction_carousel2().await }),
        )
        .step(
            "Created a new text item for verification purpose.",
            "FAILED to create a new text item for verification purpose.",
            with(&page, |p| async move { p.create_verification_item().await }),
        )
        .step(
            "Deployed the chatflow successfully.",
            "FAILED to deploy the chatflow.",
            with(&page, |p| async move { deployed(p.deploy().await) }),
        )
}

fn image_carousel_map(scenario: Scenario, ctx: &PageContext) -> Scenario {
    let page = ImageCarouselPage::new(ctx.clone());
    scenario
        .step(
            "Created a new group for using in image carousel test.",
            "FAILED to create a new group for using in image carousel test.",
            with(&page, |p| async move { p.create_group().await }),
        )
        .step(
            "Created a new イメージカルーセル chat flow.",
            "FAILED to create a new イメージカルーセル chat flow.",
            with(&page, |p| async move { p.create_image_carousel().await }),
        )
        .step(
            "Set reaction for image carousel.",
            "FAILED to set reaction for image carousel.",
            with(&page, |p| async move { p.reaction_image_carousel().await }),
        )
        .step(
            "Created a new イメージマップ chat flow.",
            "FAILED to create a new イメージマップ chat flow.",
            with(&page, |p| async move { p.create_image_map().await }),
        )
        .step(
            "Set reaction area for イメージマップ.",
            "FAILED to Set reaction area for イメージマップ.",
            with(&page, |p| async move { p.draw_image_map().await }),
        )
        .step(
            "Set reaction for イメージマップ.",
            "FAILED to Set reaction for イメージマップ.",
            with(&page, |p| async move { p.reaction_image_map().await }),
        )
        .step(
            "Created a new text item for verification purpose.",
            "FAILED to create a new text item for verification purpose.",
            with(&page, |p| async move { p.create_verification_item().await }),
        )
        .step(
            "Deployed the chatflow successfully.",
            "FAILED to deploy the chatflow.",
            with(&page, |p| async move { deployed(p.deploy().await) }),
        )
}

fn image_video(scenario: Scenario, ctx: &PageContext) -> Scenario {
    let page = ImageVideoPage::new(ctx.clone());
    scenario
        .step(
            "Created a new Group4.",
            "FAILED to create a new Group4.",
            with(&page, |p| async move { p.create_group().await }),
        )
        .step(
            "Created new 画像＆動画 items.",
            "FAILED to create new 画像＆動画 items.",
            with(&page, |p| async move { p.create_items().await }),
        )
        .step(
            "Set reaction for Image item.",
            "FAILED to set reaction for Image item.",
            with(&page, |p| async move { p.add_image().await }),
        )
        .step(
            "Set reaction for Video item.",
            "FAILED to set reaction for Video item.",
            with(&page, |p| async move { p.add_video_file().await }),
        )
        .step(
            "Set video URL for Video item.",
            "FAILED to set video URL for Video item.",
            with(&page, |p| async move { p.add_video_url().await }),
        )
        .step(
            "Created a new text item for verification purpose.",
            "FAILED to create a new text item for verification purpose.",
            with(&page, |p| async move { p.create_verification_item().await }),
        )
        .step(
            "Deployed the chatflow successfully.",
            "FAILED to deploy the chatflow.",
            with(&page, |p| async move { deployed(p.deploy().await) }),
        )
}

fn condition_item(scenario: Scenario, ctx: &PageContext) -> Scenario {
    let page = ConditionPage::new(ctx.clone());
    scenario
        .step(
            "Created a new Group5.",
            "FAILED to create a new Group5.",
            with(&page, |p| async move { p.create_group().await }),
        )
        .step(
            "Created new 条件式 item.",
            "FAILED to create new 条件式 item.",
            with(&page, |p| async move { p.create_item().await }),
        )
        .step(
            "Set condition for 条件式 item.",
            "FAILED to set condition for 条件式 item.",
            with(&page, |p| async move { p.set_condition().await }),
        )
        .step(
            "Deployed the chatflow successfully.",
            "FAILED to deploy the chatflow.",
            with(&page, |p| async move { deployed(p.deploy().await) }),
        )
}

fn keyword_mute_unmute(scenario: Scenario, ctx: &PageContext) -> Scenario {
    let page = KeywordPage::new(ctx.clone());
    scenario
        .step(
            "Navigated to Keyword Mute/Unmute section.",
            "FAILED to navigate to Keyword Mute/Unmute section.",
            with(&page, |p| async move { p.open().await }),
        )
        .step(
            "Created new keyword.",
            "FAILED to create new keyword.",
            with(&page, |p| async move { p.add_keyword().await }),
        )
        .step(
            "Created Mute and Unmute keywords.",
            "FAILED to create Mute and Unmute keywords.",
            with(&page, |p| async move { p.set_mute_words().await }),
        )
        .step(
            "Deployed the chatflow successfully.",
            "FAILED to deploy the chatflow.",
            with(&page, |p| async move { deployed(p.deploy().await) }),
        )
}
