//! Conditional branch flow (Group5)

use chatflow_common::fixtures::{CONDITION_ITEM, CONDITION_SUBJECT, CONDITION_VALUE, GROUP_CONDITION};

use super::{ChatflowPage, ItemKind, PageContext};
use crate::deploy::DeployResult;
use crate::error::E2eResult;
use crate::locator::Locator;

#[derive(Clone)]
pub struct ConditionPage {
    flow: ChatflowPage,
}

impl ConditionPage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            flow: ChatflowPage::new(ctx),
        }
    }

    /// The "もし" subject dropdown
    pub fn subject_dropdown(&self) -> Locator {
        Locator::css("div[class='ui-dropdown']").first()
    }

    pub fn condition_input(&self) -> Locator {
        Locator::css(".condition-box input[name='condition']")
    }

    pub async fn create_group(&self) -> E2eResult<()> {
        self.flow.ensure_text_group().await?;
        self.flow.ensure_carousel_group().await?;
        self.flow.create_group(GROUP_CONDITION).await
    }

    pub async fn create_item(&self) -> E2eResult<()> {
        self.flow.add_item(ItemKind::Condition, CONDITION_ITEM).await
    }

    /// Branch on the user attribute written by Textitem2's choice buttons
    pub async fn set_condition(&self) -> E2eResult<()> {
        let ctx = self.flow.ctx();
        let driver = ctx.driver();
        let dropdown = self.subject_dropdown();

        driver.click(&dropdown).await?;
        driver
            .click(
                &Locator::css("ul[class='ui-dropdown-opts']")
                    .within(&Locator::text_contains(CONDITION_SUBJECT)),
            )
            .await?;
        ctx.expect().has_text(&dropdown, CONDITION_SUBJECT).await?;

        let input = self.condition_input();
        driver.click(&input).await?;
        driver.fill(&input, CONDITION_VALUE).await?;
        driver.press(&input, "Enter").await
    }

    pub async fn deploy(&self) -> E2eResult<DeployResult> {
        self.flow.ctx().deploy().await
    }
}
