//! Browser automation seam.
//!
//! Everything that touches the console goes through [`Driver`]. The Playwright
//! bridge implements it for real runs; unit tests use a scripted fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::E2eResult;
use crate::locator::Locator;

/// Shared handle used by page objects and scenario steps
pub type SharedDriver = Arc<dyn Driver>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

/// Ticket for a response listener armed with [`Driver::arm_response`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseWatch {
    pub id: u64,
    pub pattern: String,
}

/// An intercepted network response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseInfo {
    pub url: String,
    pub status: u16,
    #[serde(default)]
    pub body: String,
}

impl ResponseInfo {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[async_trait]
pub trait Driver: Send + Sync {
    async fn navigate(&self, url: &str) -> E2eResult<()>;

    async fn fill(&self, target: &Locator, text: &str) -> E2eResult<()>;

    async fn click(&self, target: &Locator) -> E2eResult<()>;

    async fn hover(&self, target: &Locator) -> E2eResult<()>;

    async fn press(&self, target: &Locator, key: &str) -> E2eResult<()>;

    /// Block until `target` reaches `state` or `timeout` elapses
    async fn wait_for(&self, target: &Locator, state: WaitState, timeout: Duration) -> E2eResult<()>;

    /// Start listening for the next response whose URL matches `pattern`.
    /// Must be called before the action that causes the request.
    async fn arm_response(&self, pattern: &str, timeout: Duration) -> E2eResult<ResponseWatch>;

    /// Wait for the response of a previously armed watch
    async fn await_response(&self, watch: ResponseWatch) -> E2eResult<ResponseInfo>;

    /// Click `trigger`, catch the file chooser it opens, and supply `path`
    async fn upload_file(&self, trigger: &Locator, path: &Path) -> E2eResult<()>;

    /// Set files directly on an `<input type=file>`
    async fn set_input_files(&self, target: &Locator, path: &Path) -> E2eResult<()>;

    async fn attribute(&self, target: &Locator, name: &str) -> E2eResult<Option<String>>;

    async fn count(&self, target: &Locator) -> E2eResult<usize>;

    async fn inner_text(&self, target: &Locator) -> E2eResult<String>;

    async fn input_value(&self, target: &Locator) -> E2eResult<String>;

    async fn is_visible(&self, target: &Locator) -> E2eResult<bool>;

    async fn is_editable(&self, target: &Locator) -> E2eResult<bool>;

    async fn bounding_box(&self, target: &Locator) -> E2eResult<Option<BoundingBox>>;

    /// Press the primary button at `from`, move to `to`, release
    async fn mouse_drag(&self, from: Point, to: Point) -> E2eResult<()>;

    async fn mouse_click(&self, at: Point) -> E2eResult<()>;

    async fn close(&self) -> E2eResult<()>;
}
