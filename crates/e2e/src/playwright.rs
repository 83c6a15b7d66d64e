//! Playwright browser automation
//!
//! Runs a long-lived `node` process with the bridge script from
//! `bridge/driver.js` and speaks newline-delimited JSON with it. One bridge
//! owns one browser page for the whole session.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::driver::{BoundingBox, Driver, Point, ResponseInfo, ResponseWatch, WaitState};
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

const BRIDGE_SCRIPT: &str = include_str!("../bridge/driver.js");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }

    /// Parse a browser name, falling back to Chromium
    pub fn from_name(name: &str) -> Self {
        match name {
            "firefox" => Browser::Firefox,
            "webkit" => Browser::Webkit,
            _ => Browser::Chromium,
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Default timeout for actions that take no explicit one
    pub action_timeout: Duration,
    /// How long to wait for the bridge to report ready
    pub startup_timeout: Duration,
    pub node_binary: PathBuf,
    /// `NODE_PATH` for resolving the `playwright` package
    pub node_path: Option<PathBuf>,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            action_timeout: Duration::from_secs(15),
            startup_timeout: Duration::from_secs(60),
            node_binary: PathBuf::from("node"),
            node_path: std::env::var_os("NODE_PATH").map(PathBuf::from),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum BridgeCommand<'a> {
    Navigate { url: &'a str },
    Fill { selector: &'a str, text: &'a str },
    Click { selector: &'a str },
    Hover { selector: &'a str },
    Press { selector: &'a str, key: &'a str },
    WaitFor { selector: &'a str, state: WaitState, timeout_ms: u64 },
    ArmResponse { watch: u64, pattern: &'a str, timeout_ms: u64 },
    AwaitResponse { watch: u64 },
    UploadFile { selector: &'a str, path: &'a Path },
    SetInputFiles { selector: &'a str, path: &'a Path },
    Attribute { selector: &'a str, name: &'a str },
    Count { selector: &'a str },
    InnerText { selector: &'a str },
    InputValue { selector: &'a str },
    IsVisible { selector: &'a str },
    IsEditable { selector: &'a str },
    BoundingBox { selector: &'a str },
    MouseDrag { from: Point, to: Point },
    MouseClick { at: Point },
    Close,
}

#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    id: u64,
    #[serde(flatten)]
    command: BridgeCommand<'a>,
}

#[derive(Debug, Deserialize)]
struct BridgeReply {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    error: Option<BridgeFault>,
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    fatal: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BridgeFault {
    #[serde(default)]
    name: String,
    #[serde(default)]
    message: String,
}

impl From<BridgeFault> for E2eError {
    fn from(fault: BridgeFault) -> Self {
        if fault.name == "TimeoutError" {
            E2eError::Timeout(fault.message)
        } else {
            E2eError::Driver(fault.message)
        }
    }
}

struct BridgeIo {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

/// Playwright-backed [`Driver`]
pub struct PlaywrightDriver {
    io: Mutex<BridgeIo>,
    next_id: AtomicU64,
    next_watch: AtomicU64,
    // Holds the bridge script on disk for the lifetime of the process
    _script_dir: tempfile::TempDir,
}

impl PlaywrightDriver {
    /// Spawn the bridge and wait until the browser page is ready
    pub async fn launch(config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed()?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("driver.js");
        std::fs::write(&script_path, BRIDGE_SCRIPT)?;

        let launch = serde_json::json!({
            "browser": config.browser.as_str(),
            "headless": config.headless,
            "viewport_width": config.viewport_width,
            "viewport_height": config.viewport_height,
            "timeout_ms": config.action_timeout.as_millis() as u64,
        });

        let mut cmd = TokioCommand::new(&config.node_binary);
        cmd.arg(&script_path)
            .arg(launch.to_string())
            .current_dir(script_dir.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(node_path) = &config.node_path {
            cmd.env("NODE_PATH", node_path);
        }

        let mut child = cmd.spawn().map_err(|e| {
            E2eError::BridgeStartup(format!(
                "Failed to spawn {}: {}",
                config.node_binary.display(),
                e
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::BridgeStartup("stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::BridgeStartup("stdout not captured".to_string()))?;
        let mut lines = BufReader::new(stdout).lines();

        tokio::time::timeout(config.startup_timeout, Self::await_ready(&mut lines))
            .await
            .map_err(|_| {
                E2eError::BridgeStartup(format!(
                    "no ready signal within {:?}",
                    config.startup_timeout
                ))
            })??;

        info!(
            "Playwright bridge ready ({}, headless: {})",
            config.browser.as_str(),
            config.headless
        );

        Ok(Self {
            io: Mutex::new(BridgeIo { child, stdin, stdout: lines }),
            next_id: AtomicU64::new(1),
            next_watch: AtomicU64::new(1),
            _script_dir: script_dir,
        })
    }

    /// Check if Playwright is installed
    fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    async fn await_ready(lines: &mut Lines<BufReader<ChildStdout>>) -> E2eResult<()> {
        while let Some(line) = lines.next_line().await? {
            match serde_json::from_str::<BridgeReply>(&line) {
                Ok(reply) if reply.ready => return Ok(()),
                Ok(BridgeReply { fatal: Some(fatal), .. }) => {
                    return Err(E2eError::BridgeStartup(fatal));
                }
                _ => debug!("bridge: {}", line),
            }
        }
        Err(E2eError::BridgeClosed)
    }

    /// Send one command and wait for its reply
    async fn call(&self, command: BridgeCommand<'_>) -> E2eResult<serde_json::Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut line = serde_json::to_string(&BridgeRequest { id, command })?;
        line.push('\n');

        let mut io = self.io.lock().await;
        io.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|_| E2eError::BridgeClosed)?;
        io.stdin.flush().await.map_err(|_| E2eError::BridgeClosed)?;

        loop {
            let Some(raw) = io.stdout.next_line().await? else {
                return Err(E2eError::BridgeClosed);
            };
            let reply: BridgeReply = match serde_json::from_str(&raw) {
                Ok(reply) => reply,
                Err(_) => {
                    debug!("bridge: {}", raw);
                    continue;
                }
            };
            if let Some(fatal) = reply.fatal {
                return Err(E2eError::Driver(fatal));
            }
            if reply.id != Some(id) {
                warn!("Dropping bridge reply for stale request {:?}", reply.id);
                continue;
            }
            if reply.ok {
                return Ok(reply.value);
            }
            return Err(reply.error.unwrap_or_default().into());
        }
    }

    async fn call_as<T: DeserializeOwned>(&self, command: BridgeCommand<'_>) -> E2eResult<T> {
        let value = self.call(command).await?;
        serde_json::from_value(value).map_err(E2eError::from)
    }
}

#[async_trait]
impl Driver for PlaywrightDriver {
    async fn navigate(&self, url: &str) -> E2eResult<()> {
        debug!("navigate: {}", url);
        self.call(BridgeCommand::Navigate { url }).await.map(drop)
    }

    async fn fill(&self, target: &Locator, text: &str) -> E2eResult<()> {
        self.call(BridgeCommand::Fill { selector: target.selector(), text })
            .await
            .map(drop)
    }

    async fn click(&self, target: &Locator) -> E2eResult<()> {
        debug!("click: {}", target);
        self.call(BridgeCommand::Click { selector: target.selector() })
            .await
            .map(drop)
    }

    async fn hover(&self, target: &Locator) -> E2eResult<()> {
        self.call(BridgeCommand::Hover { selector: target.selector() })
            .await
            .map(drop)
    }

    async fn press(&self, target: &Locator, key: &str) -> E2eResult<()> {
        self.call(BridgeCommand::Press { selector: target.selector(), key })
            .await
            .map(drop)
    }

    async fn wait_for(&self, target: &Locator, state: WaitState, timeout: Duration) -> E2eResult<()> {
        self.call(BridgeCommand::WaitFor {
            selector: target.selector(),
            state,
            timeout_ms: timeout.as_millis() as u64,
        })
        .await
        .map(drop)
    }

    async fn arm_response(&self, pattern: &str, timeout: Duration) -> E2eResult<ResponseWatch> {
        let watch = self.next_watch.fetch_add(1, Ordering::Relaxed);
        self.call(BridgeCommand::ArmResponse {
            watch,
            pattern,
            timeout_ms: timeout.as_millis() as u64,
        })
        .await?;
        Ok(ResponseWatch { id: watch, pattern: pattern.to_string() })
    }

    async fn await_response(&self, watch: ResponseWatch) -> E2eResult<ResponseInfo> {
        self.call_as(BridgeCommand::AwaitResponse { watch: watch.id }).await
    }

    async fn upload_file(&self, trigger: &Locator, path: &Path) -> E2eResult<()> {
        self.call(BridgeCommand::UploadFile { selector: trigger.selector(), path })
            .await
            .map(drop)
    }

    async fn set_input_files(&self, target: &Locator, path: &Path) -> E2eResult<()> {
        self.call(BridgeCommand::SetInputFiles { selector: target.selector(), path })
            .await
            .map(drop)
    }

    async fn attribute(&self, target: &Locator, name: &str) -> E2eResult<Option<String>> {
        self.call_as(BridgeCommand::Attribute { selector: target.selector(), name })
            .await
    }

    async fn count(&self, target: &Locator) -> E2eResult<usize> {
        self.call_as(BridgeCommand::Count { selector: target.selector() }).await
    }

    async fn inner_text(&self, target: &Locator) -> E2eResult<String> {
        self.call_as(BridgeCommand::InnerText { selector: target.selector() }).await
    }

    async fn input_value(&self, target: &Locator) -> E2eResult<String> {
        self.call_as(BridgeCommand::InputValue { selector: target.selector() }).await
    }

    async fn is_visible(&self, target: &Locator) -> E2eResult<bool> {
        self.call_as(BridgeCommand::IsVisible { selector: target.selector() }).await
    }

    async fn is_editable(&self, target: &Locator) -> E2eResult<bool> {
        self.call_as(BridgeCommand::IsEditable { selector: target.selector() }).await
    }

    async fn bounding_box(&self, target: &Locator) -> E2eResult<Option<BoundingBox>> {
        self.call_as(BridgeCommand::BoundingBox { selector: target.selector() }).await
    }

    async fn mouse_drag(&self, from: Point, to: Point) -> E2eResult<()> {
        self.call(BridgeCommand::MouseDrag { from, to }).await.map(drop)
    }

    async fn mouse_click(&self, at: Point) -> E2eResult<()> {
        self.call(BridgeCommand::MouseClick { at }).await.map(drop)
    }

    async fn close(&self) -> E2eResult<()> {
        if let Err(e) = self.call(BridgeCommand::Close).await {
            warn!("Bridge close request failed: {}", e);
        }

        let mut io = self.io.lock().await;
        match tokio::time::timeout(Duration::from_secs(5), io.child.wait()).await {
            Ok(Ok(status)) => debug!("Bridge exited with {}", status),
            _ => {
                warn!("Bridge did not exit, killing it");
                io.child.kill().await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request = BridgeRequest {
            id: 7,
            command: BridgeCommand::WaitFor {
                selector: ".popup",
                state: WaitState::Hidden,
                timeout_ms: 15000,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "op": "wait_for",
                "selector": ".popup",
                "state": "hidden",
                "timeout_ms": 15000
            })
        );
    }

    #[test]
    fn test_fault_mapping() {
        let timeout: E2eError = BridgeFault {
            name: "TimeoutError".into(),
            message: "locator.click: Timeout 15000ms exceeded".into(),
        }
        .into();
        assert!(timeout.is_timeout());

        let other: E2eError = BridgeFault {
            name: "Error".into(),
            message: "strict mode violation".into(),
        }
        .into();
        assert!(matches!(other, E2eError::Driver(_)));
    }

    #[test]
    fn test_reply_without_value_decodes_as_null() {
        let reply: BridgeReply = serde_json::from_str(r#"{"id":3,"ok":true}"#).unwrap();
        assert_eq!(reply.id, Some(3));
        assert!(reply.value.is_null());
        let attr: Option<String> = serde_json::from_value(reply.value).unwrap();
        assert!(attr.is_none());
    }
}
