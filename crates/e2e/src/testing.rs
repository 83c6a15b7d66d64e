//! Scripted in-memory driver for unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::driver::{BoundingBox, Driver, Point, ResponseInfo, ResponseWatch, WaitState};
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

#[derive(Debug, Clone)]
pub(crate) enum Effect {
    Show(String),
    Hide(String),
}

/// Driver whose page is a set of visible selectors plus canned values.
/// Every call is appended to `calls` as `op:selector`.
#[derive(Default)]
pub(crate) struct ScriptedDriver {
    visible: Mutex<HashSet<String>>,
    texts: Mutex<HashMap<String, String>>,
    attributes: Mutex<HashMap<(String, String), String>>,
    counts: Mutex<HashMap<String, usize>>,
    responses: Mutex<HashMap<String, ResponseInfo>>,
    on_click: Mutex<HashMap<String, Vec<Effect>>>,
    armed: Mutex<HashMap<u64, String>>,
    next_watch: AtomicU64,
    closed: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&self, target: &Locator) {
        self.visible.lock().insert(target.selector().to_string());
    }

    pub fn set_text(&self, target: &Locator, text: &str) {
        self.texts.lock().insert(target.selector().to_string(), text.to_string());
    }

    pub fn set_attribute(&self, target: &Locator, name: &str, value: &str) {
        self.attributes
            .lock()
            .insert((target.selector().to_string(), name.to_string()), value.to_string());
    }

    pub fn set_count(&self, target: &Locator, count: usize) {
        self.counts.lock().insert(target.selector().to_string(), count);
    }

    pub fn respond(&self, pattern: &str, status: u16, body: &str) {
        self.responses.lock().insert(
            pattern.to_string(),
            ResponseInfo {
                url: format!("https://console.test/{}", pattern.trim_start_matches("**/")),
                status,
                body: body.to_string(),
            },
        );
    }

    pub fn on_click(&self, target: &Locator, effects: Vec<Effect>) {
        self.on_click.lock().insert(target.selector().to_string(), effects);
    }

    /// Every read from now on fails as if the bridge had exited
    pub fn disconnect(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }

    fn alive(&self) -> E2eResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            Err(E2eError::BridgeClosed)
        } else {
            Ok(())
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn position(&self, call: &str) -> Option<usize> {
        self.calls.lock().iter().position(|c| c == call)
    }

    fn record(&self, op: &str, target: &str) {
        self.calls.lock().push(format!("{}:{}", op, target));
    }

    fn apply(&self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::Show(sel) => {
                    self.visible.lock().insert(sel.clone());
                }
                Effect::Hide(sel) => {
                    self.visible.lock().remove(sel);
                }
            }
        }
    }
}

#[async_trait]
impl Driver for ScriptedDriver {
    async fn navigate(&self, url: &str) -> E2eResult<()> {
        self.record("navigate", url);
        Ok(())
    }

    async fn fill(&self, target: &Locator, text: &str) -> E2eResult<()> {
        self.record("fill", target.selector());
        self.texts.lock().insert(target.selector().to_string(), text.to_string());
        Ok(())
    }

    async fn click(&self, target: &Locator) -> E2eResult<()> {
        self.record("click", target.selector());
        let effects = self.on_click.lock().get(target.selector()).cloned();
        if let Some(effects) = effects {
            self.apply(&effects);
        }
        Ok(())
    }

    async fn hover(&self, target: &Locator) -> E2eResult<()> {
        self.record("hover", target.selector());
        Ok(())
    }

    async fn press(&self, target: &Locator, key: &str) -> E2eResult<()> {
        self.record("press", &format!("{}:{}", target.selector(), key));
        Ok(())
    }

    async fn wait_for(&self, target: &Locator, state: WaitState, _timeout: Duration) -> E2eResult<()> {
        self.record("wait", target.selector());
        let shown = self.visible.lock().contains(target.selector());
        let reached = match state {
            WaitState::Visible | WaitState::Attached => shown,
            WaitState::Hidden | WaitState::Detached => !shown,
        };
        if reached {
            Ok(())
        } else {
            Err(E2eError::Timeout(format!("{} to be {:?}", target, state)))
        }
    }

    async fn arm_response(&self, pattern: &str, _timeout: Duration) -> E2eResult<ResponseWatch> {
        self.record("arm", pattern);
        let id = self.next_watch.fetch_add(1, Ordering::Relaxed);
        self.armed.lock().insert(id, pattern.to_string());
        Ok(ResponseWatch { id, pattern: pattern.to_string() })
    }

    async fn await_response(&self, watch: ResponseWatch) -> E2eResult<ResponseInfo> {
        self.record("await", &watch.pattern);
        if self.armed.lock().remove(&watch.id).is_none() {
            return Err(E2eError::Driver(format!("watch {} was never armed", watch.id)));
        }
        self.responses
            .lock()
            .get(&watch.pattern)
            .cloned()
            .ok_or_else(|| E2eError::Timeout(format!("response matching {}", watch.pattern)))
    }

    async fn upload_file(&self, trigger: &Locator, path: &Path) -> E2eResult<()> {
        self.record("upload", &format!("{}:{}", trigger.selector(), path.display()));
        Ok(())
    }

    async fn set_input_files(&self, target: &Locator, path: &Path) -> E2eResult<()> {
        self.record("set_files", &format!("{}:{}", target.selector(), path.display()));
        Ok(())
    }

    async fn attribute(&self, target: &Locator, name: &str) -> E2eResult<Option<String>> {
        self.alive()?;
        Ok(self
            .attributes
            .lock()
            .get(&(target.selector().to_string(), name.to_string()))
            .cloned())
    }

    async fn count(&self, target: &Locator) -> E2eResult<usize> {
        self.alive()?;
        Ok(self.counts.lock().get(target.selector()).copied().unwrap_or(0))
    }

    async fn inner_text(&self, target: &Locator) -> E2eResult<String> {
        self.alive()?;
        self.texts
            .lock()
            .get(target.selector())
            .cloned()
            .ok_or_else(|| E2eError::Timeout(format!("{} to be attached", target)))
    }

    async fn input_value(&self, target: &Locator) -> E2eResult<String> {
        self.inner_text(target).await
    }

    async fn is_visible(&self, target: &Locator) -> E2eResult<bool> {
        self.alive()?;
        Ok(self.visible.lock().contains(target.selector()))
    }

    async fn is_editable(&self, target: &Locator) -> E2eResult<bool> {
        self.is_visible(target).await
    }

    async fn bounding_box(&self, target: &Locator) -> E2eResult<Option<BoundingBox>> {
        Ok(self.is_visible(target).await?.then_some(BoundingBox {
            x: 100.0,
            y: 50.0,
            width: 560.0,
            height: 486.0,
        }))
    }

    async fn mouse_drag(&self, from: Point, to: Point) -> E2eResult<()> {
        self.record("drag", &format!("{},{}->{},{}", from.x, from.y, to.x, to.y));
        Ok(())
    }

    async fn mouse_click(&self, at: Point) -> E2eResult<()> {
        self.record("mouse_click", &format!("{},{}", at.x, at.y));
        Ok(())
    }

    async fn close(&self) -> E2eResult<()> {
        self.record("close", "");
        Ok(())
    }
}
