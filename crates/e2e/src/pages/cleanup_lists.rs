//! Console lists wired into the cleanup engine

use async_trait::async_trait;
use tracing::{debug, warn};

use super::PageContext;
use crate::cleanup::{MuteSettings, RemoteList, ResourceElement, ResourceKind};
use crate::driver::WaitState;
use crate::error::{E2eResult, FailureKind};
use crate::locator::Locator;

fn confirm_popup() -> Locator {
    Locator::css("section[class='popup popup-confirm']")
}

/// Open the coupon screen through the header's three-dot menu
pub(crate) async fn open_coupon_screen(ctx: &PageContext) -> E2eResult<()> {
    let driver = ctx.driver();
    driver
        .click(&Locator::css("header[scope='controller']").find("a[class='miniapps icon dots-v']"))
        .await?;
    let menu = Locator::xpath("//section[@class='popover bottom white']");
    ctx.expect().visible(&menu).await?;
    driver
        .click(&menu.within(&Locator::text_contains("クーポン")).first())
        .await?;
    ctx.expect()
        .visible(&Locator::role("button", "クーポン発行"))
        .await
}

/// Open the user screen with every user listed
pub(crate) async fn open_user_screen(ctx: &PageContext) -> E2eResult<()> {
    let driver = ctx.driver();
    let expect = ctx.expect();
    let tab = Locator::xpath("//a[@name='user_list_view']");
    expect.visible(&tab).await?;
    driver.click(&tab).await?;

    let left = Locator::xpath("//section[@class='left-pane with-thumb']");
    expect.visible(&left).await?;
    driver.click(&left.find_text("すべて")).await?;
    expect
        .visible(&Locator::xpath("//section[@class='left-pane subgroups']"))
        .await
}

/// Chat-flow groups. Built-in groups have no settings cog.
pub struct GroupList {
    ctx: PageContext,
}

impl GroupList {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    fn items(&self) -> Locator {
        Locator::css("section.groups > ul.groups > li")
    }

    fn settings_popover(&self) -> Locator {
        Locator::css("section[class='popover right group-form']")
    }
}

#[async_trait]
impl RemoteList for GroupList {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Groups
    }

    async fn scan(&self) -> E2eResult<Vec<ResourceElement>> {
        let driver = self.ctx.driver();
        let items = self.items();
        let count = driver.count(&items).await?;

        let mut elements = Vec::with_capacity(count);
        for index in 0..count {
            let item = items.nth(index);
            let name = driver.inner_text(&item.find("h5")).await?;
            let removable = driver.count(&item.find("i.icon.cog")).await? > 0;
            elements.push(ResourceElement::new(index, name.trim(), removable));
        }
        Ok(elements)
    }

    async fn remove(&self, element: &ResourceElement) -> E2eResult<()> {
        let driver = self.ctx.driver();
        let expect = self.ctx.expect();
        let popover = self.settings_popover();

        driver
            .click(&self.items().nth(element.index).find("i.icon.cog"))
            .await?;
        expect.visible(&popover).await?;
        driver
            .click(&popover.within(&Locator::role("button", "削除")))
            .await?;

        let confirm = confirm_popup();
        expect.visible(&confirm).await?;
        driver
            .click(&confirm.within(&Locator::role("button", "はい")))
            .await?;
        expect.hidden(&popover).await
    }

    async fn settle(&self) -> E2eResult<()> {
        self.ctx.dismiss_tutorial().await.map(|_| ())
    }
}

/// Coupon table; every row goes
pub struct CouponList {
    ctx: PageContext,
}

impl CouponList {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    pub(crate) fn rows() -> Locator {
        Locator::css("table.list-view tr[i]")
    }

    pub(crate) fn row(index: usize) -> Locator {
        Locator::css(".list-view").find(&format!("tr[i='{}']", index))
    }

    /// Delete the row at `index` through its trash icon
    pub(crate) async fn delete_row(ctx: &PageContext, index: usize) -> E2eResult<()> {
        let confirm = confirm_popup();
        ctx.driver()
            .click(&Self::row(index).find("i.icon.trash"))
            .await?;
        ctx.expect().visible(&confirm).await?;
        ctx.driver()
            .click(&confirm.within(&Locator::role("button", "確定")))
            .await?;
        ctx.expect().hidden(&confirm).await
    }
}

#[async_trait]
impl RemoteList for CouponList {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Coupons
    }

    async fn open(&self) -> E2eResult<()> {
        open_coupon_screen(&self.ctx).await
    }

    async fn scan(&self) -> E2eResult<Vec<ResourceElement>> {
        let count = self.ctx.driver().count(&Self::rows()).await?;
        Ok((0..count)
            .map(|i| ResourceElement::new(i, format!("coupon row {}", i), true))
            .collect())
    }

    async fn remove(&self, element: &ResourceElement) -> E2eResult<()> {
        Self::delete_row(&self.ctx, element.index).await
    }
}

/// Saved user segments
pub struct SegmentList {
    ctx: PageContext,
}

impl SegmentList {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    fn items(&self) -> Locator {
        Locator::css("section > ul.filters > li.filter")
    }
}

#[async_trait]
impl RemoteList for SegmentList {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Segments
    }

    async fn open(&self) -> E2eResult<()> {
        open_user_screen(&self.ctx).await
    }

    async fn scan(&self) -> E2eResult<Vec<ResourceElement>> {
        let count = self.ctx.driver().count(&self.items()).await?;
        Ok((0..count)
            .map(|i| ResourceElement::new(i, format!("segment {}", i), true))
            .collect())
    }

    async fn remove(&self, element: &ResourceElement) -> E2eResult<()> {
        let driver = self.ctx.driver();
        let editor = Locator::xpath("//div[@class='wide-window']");
        driver
            .click(&self.items().nth(element.index).find("dd.icon.edit"))
            .await?;
        self.ctx.expect().visible(&editor).await?;
        driver
            .click(&editor.within(&Locator::role("button", "削除")))
            .await?;
        self.ctx.expect().hidden(&editor).await
    }
}

/// Keyword dictionary on the auto-response screen
pub struct KeywordList {
    ctx: PageContext,
}

impl KeywordList {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    fn table(&self) -> Locator {
        Locator::css("table.list-view")
    }

    fn rows(&self) -> Locator {
        Locator::css("table.list-view tr[i]")
    }
}

#[async_trait]
impl RemoteList for KeywordList {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Keywords
    }

    async fn open(&self) -> E2eResult<()> {
        self.ctx
            .driver()
            .click(&Locator::css("dd[msg='navi-dict'] h2[class='icon comment']"))
            .await?;
        if let Err(e) = self
            .ctx
            .driver()
            .wait_for(&self.table(), WaitState::Visible, self.ctx.timeouts.ui())
            .await
        {
            if !e.is_timeout() {
                return Err(e);
            }
            warn!("Keyword table not visible; treating as empty");
        }
        Ok(())
    }

    async fn scan(&self) -> E2eResult<Vec<ResourceElement>> {
        let driver = self.ctx.driver();
        if !driver.is_visible(&self.table()).await? {
            return Ok(vec![]);
        }

        let rows = self.rows();
        let count = driver.count(&rows).await?;
        let mut elements = Vec::with_capacity(count);
        for index in 0..count {
            let label = rows.nth(index).find("td.list-item-val label");
            match driver.inner_text(&label).await {
                Ok(name) => elements.push(ResourceElement::new(index, name.trim(), true)),
                // Rows can re-render mid-scan; the next scan sees them again
                Err(e) if e.kind() == FailureKind::Transport => {
                    debug!(index, "Skipping unreadable keyword row: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(elements)
    }

    async fn remove(&self, element: &ResourceElement) -> E2eResult<()> {
        let driver = self.ctx.driver();
        let expect = self.ctx.expect();
        let editor = Locator::css("section[class='popup dict-editor']");

        driver.click(&self.rows().nth(element.index)).await?;
        expect.visible(&editor).await?;
        driver
            .click(&editor.within(&Locator::role("button", "削除")))
            .await?;

        let confirm = confirm_popup();
        expect.visible(&confirm).await?;
        driver
            .click(&confirm.within(&Locator::role("button", "はい")))
            .await?;
        expect.hidden(&confirm).await
    }
}

/// Mute/unmute word editor on the auto-response screen
#[derive(Clone)]
pub struct MuteEditor {
    ctx: PageContext,
}

impl MuteEditor {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    pub fn popup(&self) -> Locator {
        Locator::css("div[class='dict-mute-editor']")
    }

    pub fn mute_field(&self) -> Locator {
        self.popup().find(".left textarea")
    }

    pub fn unmute_field(&self) -> Locator {
        self.popup().find(".right textarea")
    }

    /// Fill both fields and save
    pub async fn save_words(&self, mute: &str, unmute: &str) -> E2eResult<()> {
        let driver = self.ctx.driver();
        driver.fill(&self.mute_field(), mute).await?;
        driver.fill(&self.unmute_field(), unmute).await?;
        driver
            .click(&self.popup().within(&Locator::role("button", "保存")))
            .await?;
        self.ctx.expect().hidden(&self.popup()).await
    }
}

#[async_trait]
impl MuteSettings for MuteEditor {
    async fn open(&self) -> E2eResult<()> {
        self.ctx
            .driver()
            .click(&Locator::role("button", "ミュート設定"))
            .await?;
        self.ctx.expect().visible(&self.popup()).await
    }

    async fn read(&self) -> E2eResult<(String, String)> {
        let driver = self.ctx.driver();
        let mute = driver
            .attribute(&self.mute_field(), "data-value")
            .await?
            .unwrap_or_default();
        let unmute = driver
            .attribute(&self.unmute_field(), "data-value")
            .await?
            .unwrap_or_default();
        Ok((mute, unmute))
    }

    async fn clear_and_save(&self) -> E2eResult<()> {
        self.save_words("", "").await
    }

    async fn close(&self) -> E2eResult<()> {
        self.ctx
            .driver()
            .click(&Locator::css("i.icon.close").last())
            .await?;
        self.ctx.expect().hidden(&self.popup()).await
    }
}
