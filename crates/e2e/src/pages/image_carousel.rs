//! Image carousel and image map flow (Group3)
//!
//! The image map's first two areas jump into Group1 and Group2, so both
//! groups are recreated first when a previous scenario did not leave them.

use chatflow_common::fixtures::{
    CAROUSEL_ITEMS, GROUP_IMAGE_CAROUSEL, IMAGE_CAROUSEL_BUTTON, IMAGE_CAROUSEL_ITEM,
    IMAGE_CAROUSEL_SOURCE_API, IMAGE_MAP_AREAS, IMAGE_MAP_ITEM, IMAGE_MAP_RECTS,
    IMAGE_MAP_VERIFY_ITEM, IMAGE_MAP_VERIFY_MESSAGE, TEXT_ITEMS,
};
use tracing::debug;

use super::{ChatflowPage, ItemKind, PageContext};
use crate::deploy::DeployResult;
use crate::driver::Point;
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

/// Inline style of an image card before anything is uploaded
pub(crate) const PLACEHOLDER_STYLE: &str = "background-image: url(\"/images/bg_cam_1.jpg\");";

#[derive(Clone)]
pub struct ImageCarouselPage {
    flow: ChatflowPage,
}

impl ImageCarouselPage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            flow: ChatflowPage::new(ctx),
        }
    }

    fn ctx(&self) -> &PageContext {
        self.flow.ctx()
    }

    fn map_card(&self) -> Locator {
        self.flow.content_cards().last().find(":scope > ol")
    }

    /// Drawing surface of the area editor
    pub fn drawing_area(&self) -> Locator {
        Locator::css("div[class='imagemap']")
    }

    fn area_buttons(&self) -> Locator {
        Locator::css("div[class='react-btns']")
    }

    pub fn area_input(&self, area: &str) -> Locator {
        Locator::css(format!("input[data-value='{}']", area))
    }

    pub async fn create_group(&self) -> E2eResult<()> {
        self.flow.ensure_text_group().await?;
        self.flow.ensure_carousel_group().await?;
        self.flow.create_group(GROUP_IMAGE_CAROUSEL).await
    }

    pub async fn create_image_carousel(&self) -> E2eResult<()> {
        self.flow
            .add_item(ItemKind::ImageCarousel, IMAGE_CAROUSEL_ITEM)
            .await
    }

    pub async fn reaction_image_carousel(&self) -> E2eResult<()> {
        let pages = self
            .flow
            .load_api_cards(0, IMAGE_CAROUSEL_SOURCE_API)
            .await?;
        self.flow
            .add_card_button(0, pages, IMAGE_CAROUSEL_BUTTON)
            .await
    }

    pub async fn create_image_map(&self) -> E2eResult<()> {
        self.flow.add_item(ItemKind::ImageMap, IMAGE_MAP_ITEM).await
    }

    /// Upload the map image, then draw and save its three areas
    pub async fn draw_image_map(&self) -> E2eResult<()> {
        let path = self.ctx().asset("image_map")?;
        let card = self.map_card();
        self.ctx()
            .upload(&card.find("i[class='icon camera large upload-btn']"), &path)
            .await?;
        self.ctx()
            .expect()
            .attribute_differs(&card.find("li.data.imagecard"), "style", PLACEHOLDER_STYLE)
            .await?;

        self.ctx()
            .driver()
            .click(&card.find("i[class='icon brush large upload-btn']"))
            .await?;
        self.ctx()
            .expect()
            .visible(&Locator::css("div[class='image-pane']"))
            .await?;
        self.draw_areas().await
    }

    /// Drag each area rectangle relative to the drawing surface's corner
    pub async fn draw_areas(&self) -> E2eResult<()> {
        let driver = self.ctx().driver();
        let surface = self.drawing_area();
        let origin = driver.bounding_box(&surface).await?.ok_or_else(|| {
            E2eError::AssertionFailed(format!("{} has no bounding box", surface))
        })?;

        for (area, (x0, y0, x1, y1)) in IMAGE_MAP_AREAS.iter().zip(IMAGE_MAP_RECTS) {
            driver
                .mouse_drag(
                    Point::new(origin.x + x0, origin.y + y0),
                    Point::new(origin.x + x1, origin.y + y1),
                )
                .await?;
            self.ctx().expect().editable(&self.area_input(area)).await?;
            debug!(area, "Image map area drawn");
        }

        driver.click(&Locator::role("button", "保存")).await?;
        self.ctx().expect().hidden(&surface).await
    }

    /// Area 1 goes to Textitem1, Area 2 to carousel1, Area 3 keeps "next item"
    pub async fn reaction_image_map(&self) -> E2eResult<()> {
        self.ctx().expect().visible(&self.area_buttons()).await?;
        let destinations = [(IMAGE_MAP_AREAS[0], TEXT_ITEMS[0]), (IMAGE_MAP_AREAS[1], CAROUSEL_ITEMS[0])];
        for (area, destination) in destinations {
            self.link_area(area, destination).await?;
        }
        self.ctx()
            .expect()
            .has_count(&self.flow.link_icons(), destinations.len())
            .await
    }

    async fn link_area(&self, area: &str, destination: &str) -> E2eResult<()> {
        let driver = self.ctx().driver();
        driver
            .click(&self.area_buttons().within(&Locator::text_contains(area)))
            .await?;
        self.ctx()
            .expect()
            .visible(&Locator::css("section[class='pop-inline btns-form']"))
            .await?;
        self.flow
            .choose_destination(
                &Locator::css("div[class='form-type-radio']").nth(1),
                destination,
            )
            .await?;
        driver.click(&self.flow.save_button()).await
    }

    /// Text item reached from Area 3
    pub async fn create_verification_item(&self) -> E2eResult<()> {
        self.flow
            .add_text_item(IMAGE_MAP_VERIFY_ITEM, IMAGE_MAP_VERIFY_MESSAGE)
            .await
    }

    /// Deploy, then click the page corner to drop focus from the editor
    pub async fn deploy(&self) -> E2eResult<DeployResult> {
        let result = self.ctx().deploy().await?;
        self.ctx().driver().mouse_click(Point::new(10.0, 10.0)).await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Effect, ScriptedDriver};
    use chatflow_common::ConsoleConfig;
    use std::sync::Arc;

    fn page() -> (Arc<ScriptedDriver>, ImageCarouselPage) {
        let driver = Arc::new(ScriptedDriver::new());
        let mut config = ConsoleConfig::default();
        config.timeouts.ui_ms = 20;
        config.timeouts.poll_ms = 5;
        let page = ImageCarouselPage::new(PageContext::new(driver.clone(), &config));
        (driver, page)
    }

    #[tokio::test]
    async fn test_areas_are_dragged_from_surface_origin() {
        let (driver, page) = page();
        let surface = page.drawing_area();
        driver.show(&surface);
        for area in IMAGE_MAP_AREAS {
            driver.show(&page.area_input(area));
        }
        driver.on_click(
            &Locator::role("button", "保存"),
            vec![Effect::Hide(surface.selector().to_string())],
        );

        page.draw_areas().await.unwrap();

        // Scripted surface sits at (100, 50)
        let drags: Vec<String> = driver
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("drag:"))
            .collect();
        assert_eq!(
            drags,
            vec!["drag:100,50->333,535", "drag:336,50->659,290", "drag:336,293->659,533"]
        );
    }

    #[tokio::test]
    async fn test_missing_area_input_stops_drawing() {
        let (driver, page) = page();
        driver.show(&page.drawing_area());
        driver.show(&page.area_input(IMAGE_MAP_AREAS[0]));

        let err = page.draw_areas().await.unwrap_err();
        assert!(err.to_string().contains("Area 2"));
        assert_eq!(
            driver.calls().iter().filter(|c| c.starts_with("drag:")).count(),
            2
        );
    }
}
