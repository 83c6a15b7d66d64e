//! Literal test data used by the console scenarios.
//!
//! Names here are what the scenarios type into the console and then look for
//! again, so they double as assertions. Keep them unique across groups.

/// URL glob of the deployment manifest fetched when a deploy is confirmed
pub const DEPLOY_URL_PATTERN: &str = "**/app.json";

/// URL glob of the action endpoint used by uploads and API-sourced cards
pub const ACTION_API_PATTERN: &str = "**/api/bot/action";

/// Logical upload asset names and their file names under the assets directory
pub const ASSETS: &[(&str, &str)] = &[
    ("coupon", "coupon_img.png"),
    ("image_map", "image_map.jpg"),
    ("image1", "image1.jpg"),
    ("video1", "video1.mp4"),
];

/// Look up the file name registered for a logical asset name
pub fn asset_file(name: &str) -> Option<&'static str> {
    ASSETS
        .iter()
        .find(|(logical, _)| *logical == name)
        .map(|(_, file)| *file)
}

// Plain text conversation flow

pub const GROUP_TEXT_CHAT: &str = "Group1";
/// Conversation item names, in creation order
pub const TEXT_ITEMS: [&str; 4] = ["Textitem1", "Textitem2", "Textitem3", "Textitem4"];
/// Message body typed into each text item, aligned with [`TEXT_ITEMS`]
pub const TEXT_MESSAGES: [&str; 4] = ["Text1", "Text2", "Text3", "Text4"];
pub const TEXTITEM1_BUTTON: &str = "text1 button";
pub const TEXTITEM2_CHOICES: [&str; 2] = ["choice1", "choice2"];
pub const USER_ATTRIBUTE_KEY: &str = "choice";
pub const TEXTITEM2_DESTINATION: &str = "3:Textitem3";
pub const TEXTITEM3_DESTINATION: &str = "4:Textitem4";

// Carousel flow

pub const GROUP_CAROUSEL: &str = "Group2";
pub const CAROUSEL_ITEMS: [&str; 2] = ["carousel1", "carousel2"];
pub const CAROUSEL_SOURCE_API: &str = "https://pre.bonp.me/api/service/recipes/?format=list";
pub const CAROUSEL1_BUTTON: &str = "carousel1 button";
pub const CAROUSEL2_BUTTON: &str = "carousel2 button";
pub const CAROUSEL2_COUPON: &str = "Carousel2Coupon";
pub const CAROUSEL_VERIFY_ITEM: &str = "Carousel:Textitem";
pub const CAROUSEL_VERIFY_MESSAGE: &str = "Verify next chatflow content after clicking carousel2 button.";

// Coupon management

pub const COUPON_SEGMENT: &str = "cp-segment1";
pub const COUPON_NAMES: [&str; 3] = ["cp-coupon1", "cp-coupon2", "cp-coupon3"];
pub const COUPON_DESCRIPTION: &str = "Here is a description for cp-coupon1";
pub const COUPON_DISCOUNT: &str = "10";

// Image carousel and image map flow

pub const GROUP_IMAGE_CAROUSEL: &str = "Group3";
pub const IMAGE_CAROUSEL_ITEM: &str = "image_carousel";
pub const IMAGE_MAP_ITEM: &str = "image_map";
pub const IMAGE_CAROUSEL_SOURCE_API: &str = "https://pre.bonp.me/api/service/recipes/?format=list";
pub const IMAGE_CAROUSEL_BUTTON: &str = "IMG_ボタン";
pub const IMAGE_MAP_AREAS: [&str; 3] = ["Area 1", "Area 2", "Area 3"];
/// Drag rectangles for each area as (x0, y0, x1, y1) offsets from the image's top-left corner
pub const IMAGE_MAP_RECTS: [(f64, f64, f64, f64); 3] = [
    (0.0, 0.0, 233.0, 485.0),
    (236.0, 0.0, 559.0, 240.0),
    (236.0, 243.0, 559.0, 483.0),
];
pub const IMAGE_MAP_VERIFY_ITEM: &str = "Area3:Textitem";
pub const IMAGE_MAP_VERIFY_MESSAGE: &str = "Verify next chatflow content from Image Map Area 3.";

// Image and video flow

pub const GROUP_IMAGE_VIDEO: &str = "Group4";
pub const IMAGE_ITEM: &str = "image1";
/// First video is uploaded as a file, the second is set by URL
pub const VIDEO_ITEMS: [&str; 2] = ["video1", "video2"];
pub const IMAGE_BUTTON: &str = "画像ボタン";
pub const VIDEO_BUTTON: &str = "動画ボタン";
pub const VIDEO_URL_BUTTON: &str = "動画URLボタン";
pub const VIDEO_URL: &str = "https://www.w3schools.com/html/mov_bbb.mp4";
pub const IMAGE_VIDEO_VERIFY_ITEM: &str = "Video2:Textitem";
pub const IMAGE_VIDEO_VERIFY_MESSAGE: &str = "Verify next chatflow content after clicking video URL button.";

// Conditional branch flow

pub const GROUP_CONDITION: &str = "Group5";
pub const CONDITION_ITEM: &str = "condition1";
pub const CONDITION_SUBJECT: &str = "User key";
pub const CONDITION_VALUE: &str = "choice == choice1";

// Keyword and mute/unmute

pub const KEYWORD_GROUP: &str = "Group1";
pub const KEYWORD_TEXT_ITEM: &str = "Textitem1";
pub const KEYWORD_TEXT_MESSAGE: &str = "Text1";
pub const KEYWORD_NAME: &str = "kw-hello";
pub const KEYWORD_DESTINATION: &str = "1:Textitem1";
pub const MUTE_WORD: &str = "mute-me";
pub const UNMUTE_WORD: &str = "unmute-me";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_lookup() {
        assert_eq!(asset_file("image_map"), Some("image_map.jpg"));
        assert_eq!(asset_file("campaign_banner"), None);
    }

    #[test]
    fn test_text_items_are_distinct() {
        let mut names: Vec<&str> = TEXT_ITEMS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), TEXT_ITEMS.len());
    }
}
