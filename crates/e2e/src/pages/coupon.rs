//! Coupon screen and the user segment it targets

use chrono::{Duration, Local, NaiveDate, NaiveTime};
use chatflow_common::fixtures::{COUPON_DESCRIPTION, COUPON_DISCOUNT, COUPON_NAMES, COUPON_SEGMENT};
use std::path::PathBuf;
use tracing::info;

use super::cleanup_lists::{open_coupon_screen, open_user_screen, CouponList};
use super::PageContext;
use crate::cleanup::{CleanupEngine, KeepSet};
use crate::error::E2eResult;
use crate::locator::Locator;

/// Everything the coupon form accepts. Only the name is mandatory.
#[derive(Debug, Clone, Default)]
pub struct CouponDraft {
    pub name: String,
    pub segment: Option<String>,
    /// `%Y-%m-%d %H:%M`
    pub valid_until: Option<String>,
    pub description: Option<String>,
    pub image: Option<PathBuf>,
}

impl CouponDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Expiry used for the fully specified coupon: tomorrow at 17:00
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponExpiry {
    /// What the form takes
    pub datetime: String,
    /// What the list shows
    pub date: String,
}

impl CouponExpiry {
    pub fn day_after(today: NaiveDate) -> Self {
        let tomorrow = today + Duration::days(1);
        let at = tomorrow.and_time(NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default());
        Self {
            datetime: at.format("%Y-%m-%d %H:%M").to_string(),
            date: tomorrow.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn tomorrow() -> Self {
        Self::day_after(Local::now().date_naive())
    }
}

#[derive(Clone)]
pub struct CouponPage {
    ctx: PageContext,
}

impl CouponPage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    fn form(&self) -> Locator {
        Locator::xpath("//section[@class='popup white form coupon-edit-popup']")
    }

    fn create_button(&self) -> Locator {
        Locator::role("button", "クーポン発行")
    }

    pub fn first_row(&self) -> Locator {
        CouponList::row(0)
    }

    pub fn rows(&self) -> Locator {
        CouponList::rows()
    }

    fn send_icon(&self) -> Locator {
        self.first_row().find(".icon.send")
    }

    /// Save a segment over all users
    pub async fn create_segment(&self) -> E2eResult<()> {
        let driver = self.ctx.driver();
        let expect = self.ctx.expect();
        open_user_screen(&self.ctx).await?;

        let mid_menu = Locator::xpath("//section[@class='left-pane subgroups']");
        driver
            .click(
                &mid_menu
                    .find("button[hint='セグメント追加']")
                    .within(&Locator::text_contains("セグメント")),
            )
            .await?;
        let editor = Locator::xpath("//div[@class='wide-window']");
        expect.visible(&editor).await?;
        driver.click(&editor.find("button[class='icon save label']")).await?;

        let name = Locator::css("input[id='filter_name']");
        expect.visible(&name).await?;
        driver.fill(&name, COUPON_SEGMENT).await?;
        driver.press(&name, "Enter").await?;
        expect.contains_text(&mid_menu, COUPON_SEGMENT).await
    }

    pub async fn open(&self) -> E2eResult<()> {
        open_coupon_screen(&self.ctx).await
    }

    /// Open the coupon screen and delete every coupon on it
    pub async fn open_empty(&self) -> E2eResult<usize> {
        let list = CouponList::new(self.ctx.clone());
        let engine = CleanupEngine::new(self.ctx.config().cleanup.max_iterations);
        let removed = engine.clean(&list, &KeepSet::empty()).await?;
        info!(removed, "Coupon screen cleared");
        Ok(removed)
    }

    pub async fn create(&self, draft: &CouponDraft) -> E2eResult<()> {
        let driver = self.ctx.driver();
        let expect = self.ctx.expect();
        let form = self.form();

        driver.click(&self.create_button()).await?;
        expect.visible(&form).await?;
        driver
            .fill(&form.find("input[placeholder='クーポン名']"), &draft.name)
            .await?;

        if let Some(segment) = &draft.segment {
            driver
                .fill(&form.find("input[placeholder='Enter を入力して保存']"), segment)
                .await?;
            driver
                .click(
                    &Locator::css("ul#form-item-autocomplete")
                        .within(&Locator::text_contains(segment))
                        .last(),
                )
                .await?;
        }
        if let Some(until) = &draft.valid_until {
            driver
                .fill(&Locator::css("input[class='dt-picker dt-picker-ipt']").last(), until)
                .await?;
        }
        if let Some(description) = &draft.description {
            driver
                .fill(&Locator::css("textarea[title='詳細説明']"), description)
                .await?;
        }
        if let Some(image) = &draft.image {
            driver
                .set_input_files(&Locator::css("input[type=\"file\"][name=\"image\"]"), image)
                .await?;
            let crop = Locator::css("section[class='popup popup-confirm']");
            expect.visible(&crop).await?;
            driver
                .click(&crop.find("button").within(&Locator::text_contains("確定")))
                .await?;
        }

        driver
            .click(&form.within(&Locator::role("button", "保存")))
            .await?;
        expect.hidden(&form).await?;
        info!(coupon = %draft.name, "Coupon created");
        Ok(())
    }

    /// Coupon with every field set; lands unsent at the top of the list
    pub async fn create_full_coupon(&self, expiry: &CouponExpiry) -> E2eResult<()> {
        let draft = CouponDraft {
            name: COUPON_NAMES[0].to_string(),
            segment: Some(COUPON_SEGMENT.to_string()),
            valid_until: Some(expiry.datetime.clone()),
            description: Some(COUPON_DESCRIPTION.to_string()),
            image: Some(self.ctx.asset("coupon")?),
        };
        self.create(&draft).await?;

        let expect = self.ctx.expect();
        let row = self.first_row();
        expect.contains_text(&row, COUPON_NAMES[0]).await?;
        expect.contains_text(&row, COUPON_SEGMENT).await?;
        expect.contains_text(&row, &expiry.date).await?;
        expect.visible(&self.send_icon()).await
    }

    /// Switch the top coupon to a fixed JPY discount
    pub async fn edit_unsent(&self) -> E2eResult<()> {
        let driver = self.ctx.driver();
        let expect = self.ctx.expect();
        let form = self.form();

        driver.click(&self.first_row()).await?;
        expect.visible(&form).await?;
        driver
            .fill(&form.find("input[name='discount']"), COUPON_DISCOUNT)
            .await?;
        driver.click(&form.find("input[data-value='JPY']")).await?;
        driver
            .click(&form.within(&Locator::role("button", "保存")))
            .await?;
        expect
            .contains_text(&self.first_row(), &format!("{}JPY", COUPON_DISCOUNT))
            .await
    }

    pub async fn send_unsent(&self) -> E2eResult<()> {
        let driver = self.ctx.driver();
        let expect = self.ctx.expect();

        driver.click(&self.send_icon()).await?;
        let preview = Locator::css("section[id='coupon_priview']");
        expect.visible(&preview).await?;
        driver.click(&preview.find(".icon.send")).await?;

        let done = Locator::css("div[class='popup window']");
        expect.visible(&done).await?;
        driver.click(&done.find("i.icon.close")).await?;
        expect.hidden(&done).await
    }

    /// Delete the top coupon and require the row count to drop by one
    pub async fn delete_first(&self) -> E2eResult<()> {
        let before = self.ctx.driver().count(&self.rows()).await?;
        CouponList::delete_row(&self.ctx, 0).await?;
        self.ctx
            .expect()
            .has_count(&self.rows(), before.saturating_sub(1))
            .await
    }

    pub async fn delete_sent(&self) -> E2eResult<()> {
        self.delete_first().await
    }

    pub async fn delete_unsent(&self) -> E2eResult<()> {
        self.create(&CouponDraft::named(COUPON_NAMES[1])).await?;
        self.delete_first().await
    }

    pub async fn search(&self) -> E2eResult<()> {
        let driver = self.ctx.driver();
        self.create(&CouponDraft::named(COUPON_NAMES[1])).await?;
        self.create(&CouponDraft::named(COUPON_NAMES[2])).await?;

        let search = Locator::placeholder("クーポンコードまたは名前で検索");
        driver.fill(&search, COUPON_NAMES[1]).await?;
        driver.press(&search, "Enter").await?;
        self.ctx
            .expect()
            .contains_text(&self.first_row(), COUPON_NAMES[1])
            .await
    }
}
