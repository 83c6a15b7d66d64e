//! Console test configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::fixtures;

/// Top-level configuration for a test run against the chatbot console
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Login page of the admin console
    pub admin_url: String,

    /// Operator credentials
    pub credentials: Credentials,

    /// Selected bot profile id (a key of `profiles`)
    pub bot_profile: String,

    /// Pre-provisioned bots, keyed by profile id
    pub profiles: BTreeMap<String, BotProfile>,

    /// Wait budgets
    pub timeouts: TimeoutConfig,

    /// Environment reset settings
    pub cleanup: CleanupConfig,

    /// Deploy verification settings
    pub deploy: DeployConfig,

    /// Directory holding upload assets
    pub assets_dir: PathBuf,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "1.0".to_string(),
            BotProfile { name: "Jarr_regression_2509_API1".to_string() },
        );
        profiles.insert(
            "2.0".to_string(),
            BotProfile { name: "Jarr_regression_2509_API2".to_string() },
        );

        Self {
            admin_url: "https://pre.bonp.me/member/".to_string(),
            credentials: Credentials::default(),
            bot_profile: "2.0".to_string(),
            profiles,
            timeouts: TimeoutConfig::default(),
            cleanup: CleanupConfig::default(),
            deploy: DeployConfig::default(),
            assets_dir: PathBuf::from("uploaddata"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: Option<String>,

    /// Never written back out by `save`
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotProfile {
    /// Bot name as shown in the console's bot list
    pub name: String,
}

/// Wait budgets. Each one is configured on its own; none is derived from another.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Element visibility and state waits
    pub ui_ms: u64,

    /// Intercepted network response waits
    pub response_ms: u64,

    /// How long to look for a transient onboarding popup before moving on
    pub popup_grace_ms: u64,

    /// Expectation polling interval
    pub poll_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            ui_ms: 15_000,
            response_ms: 30_000,
            popup_grace_ms: 3_000,
            poll_ms: 100,
        }
    }
}

impl TimeoutConfig {
    pub fn ui(&self) -> Duration {
        Duration::from_millis(self.ui_ms)
    }

    pub fn response(&self) -> Duration {
        Duration::from_millis(self.response_ms)
    }

    pub fn popup_grace(&self) -> Duration {
        Duration::from_millis(self.popup_grace_ms)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Upper bound on scan-delete iterations per resource list
    pub max_iterations: usize,

    /// Chat-flow groups that are never deleted
    pub group_keep: Vec<String>,

    /// Keyword entries that are never deleted
    pub keyword_keep: Vec<String>,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            group_keep: vec![
                "定期配信".to_string(),
                "アーカイブ".to_string(),
                "デフォルトグループ".to_string(),
            ],
            keyword_keep: vec!["最初の挨拶".to_string(), "未登録な質問".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// URL glob of the response that proves the deploy reached the server
    pub url_pattern: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            url_pattern: fixtures::DEPLOY_URL_PATTERN.to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from file, falling back to defaults when it is absent
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from file, then apply process environment overrides
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `ADMIN_EMAIL`, `ADMIN_PASSWORD`, `ADMIN_URL` and
    /// `CHATFLOW_BOT_PROFILE` from `lookup`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(email) = get("ADMIN_EMAIL") {
            self.credentials.email = Some(email);
        }
        if let Some(password) = get("ADMIN_PASSWORD") {
            self.credentials.password = Some(password);
        }
        if let Some(url) = get("ADMIN_URL") {
            self.admin_url = url;
        }
        if let Some(profile) = get("CHATFLOW_BOT_PROFILE") {
            self.bot_profile = profile;
        }
    }

    /// Name of the bot selected by `bot_profile`
    pub fn bot_name(&self) -> Result<&str> {
        self.profiles
            .get(&self.bot_profile)
            .map(|p| p.name.as_str())
            .ok_or_else(|| Error::UnknownProfile {
                profile: self.bot_profile.clone(),
                known: self.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
            })
    }

    /// Email and password, both required
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let email = self
            .credentials
            .email
            .as_deref()
            .ok_or(Error::MissingCredential("ADMIN_EMAIL"))?;
        let password = self
            .credentials
            .password
            .as_deref()
            .ok_or(Error::MissingCredential("ADMIN_PASSWORD"))?;
        Ok((email, password))
    }

    /// Full path of a logical upload asset; the file must exist
    pub fn asset_path(&self, name: &str) -> Result<PathBuf> {
        let file = fixtures::asset_file(name).ok_or_else(|| Error::UnknownAsset(name.to_string()))?;
        let path = self.assets_dir.join(file);
        if !path.is_file() {
            return Err(Error::AssetMissing(path));
        }
        Ok(path)
    }

    /// Reject settings that would make every wait fail immediately
    pub fn validate(&self) -> Result<()> {
        if self.timeouts.ui_ms == 0 || self.timeouts.response_ms == 0 {
            return Err(Error::InvalidConfig("timeouts must be non-zero".to_string()));
        }
        if self.cleanup.max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "cleanup.max_iterations must be at least 1".to_string(),
            ));
        }
        self.bot_name()?;
        Ok(())
    }
}
