//! Convergent cleanup
//!
//! Resets a remote list to its protected baseline by repeatedly scanning it,
//! deleting the first removable element, and scanning again. Element handles
//! never survive a deletion: every iteration works from a fresh scan.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Groups,
    Coupons,
    Segments,
    Keywords,
    MuteSettings,
}

impl ResourceKind {
    /// Coupons and segments are emptied outright, without consulting the keep set
    pub fn honours_keep_set(&self) -> bool {
        matches!(self, ResourceKind::Groups | ResourceKind::Keywords)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Groups => "groups",
            ResourceKind::Coupons => "coupons",
            ResourceKind::Segments => "segments",
            ResourceKind::Keywords => "keywords",
            ResourceKind::MuteSettings => "mute settings",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element from a single scan. Only valid until the next mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceElement {
    /// Position in display order at scan time
    pub index: usize,
    pub name: String,
    /// Whether the element exposes a delete affordance
    pub removable: bool,
}

impl ResourceElement {
    pub fn new(index: usize, name: impl Into<String>, removable: bool) -> Self {
        Self {
            index,
            name: name.into(),
            removable,
        }
    }
}

/// Names that must never be deleted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeepSet(BTreeSet<String>);

impl KeepSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for KeepSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A list-shaped resource in the console
#[async_trait]
pub trait RemoteList: Send + Sync {
    fn kind(&self) -> ResourceKind;

    /// Navigate to the screen that shows the list
    async fn open(&self) -> E2eResult<()> {
        Ok(())
    }

    /// Read the list as it is right now, in display order
    async fn scan(&self) -> E2eResult<Vec<ResourceElement>>;

    /// Delete one element and wait until every confirmation has closed
    async fn remove(&self, element: &ResourceElement) -> E2eResult<()>;

    /// Dismiss transient UI left behind by a deletion
    async fn settle(&self) -> E2eResult<()> {
        Ok(())
    }
}

/// First element, in display order, that should be deleted
pub fn select_candidate<'a>(
    kind: ResourceKind,
    elements: &'a [ResourceElement],
    keep: &KeepSet,
) -> Option<&'a ResourceElement> {
    if !kind.honours_keep_set() {
        return elements.first();
    }
    elements
        .iter()
        .find(|e| e.removable && !keep.contains(&e.name))
}

#[derive(Debug, Clone)]
pub struct CleanupEngine {
    max_iterations: usize,
}

impl Default for CleanupEngine {
    fn default() -> Self {
        Self { max_iterations: 200 }
    }
}

impl CleanupEngine {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Delete everything not protected and return how many elements went.
    ///
    /// Fails with [`E2eError::CleanupStuck`] when candidates remain after
    /// `max_iterations` deletions.
    pub async fn clean(&self, list: &dyn RemoteList, keep: &KeepSet) -> E2eResult<usize> {
        let kind = list.kind();
        info!(%kind, "Cleaning up");
        list.open().await?;

        let mut removed = 0;
        loop {
            let elements = list.scan().await?;
            let Some(candidate) = select_candidate(kind, &elements, keep) else {
                info!(%kind, removed, remaining = elements.len(), "Cleanup finished");
                return Ok(removed);
            };

            if removed >= self.max_iterations {
                return Err(E2eError::CleanupStuck {
                    kind: kind.to_string(),
                    iterations: removed,
                });
            }

            debug!(%kind, name = %candidate.name, index = candidate.index, "Removing");
            list.remove(candidate).await?;
            list.settle().await?;
            removed += 1;
        }
    }
}

/// The mute/unmute word editor, which holds two free-text fields
#[async_trait]
pub trait MuteSettings: Send + Sync {
    async fn open(&self) -> E2eResult<()>;

    /// Current (mute, unmute) contents
    async fn read(&self) -> E2eResult<(String, String)>;

    /// Empty both fields and save; the editor closes on save
    async fn clear_and_save(&self) -> E2eResult<()>;

    /// Close without saving
    async fn close(&self) -> E2eResult<()>;
}

/// Returns true if anything had to be cleared
pub async fn clear_mute_settings(settings: &dyn MuteSettings) -> E2eResult<bool> {
    settings.open().await?;
    let (mute, unmute) = settings.read().await?;
    info!(mute = %mute, unmute = %unmute, "Mute settings");

    if mute.is_empty() && unmute.is_empty() {
        settings.close().await?;
        Ok(false)
    } else {
        settings.clear_and_save().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn groups() -> Vec<ResourceElement> {
        vec![
            ResourceElement::new(0, "定期配信", true),
            ResourceElement::new(1, "Locked", false),
            ResourceElement::new(2, "Group1", true),
            ResourceElement::new(3, "Group2", true),
        ]
    }

    #[test]
    fn test_select_skips_keep_set_and_locked() {
        let keep: KeepSet = ["定期配信", "アーカイブ"].into_iter().collect();
        let elements = groups();
        let picked = select_candidate(ResourceKind::Groups, &elements, &keep).unwrap();
        assert_eq!(picked.name, "Group1");
    }

    #[test]
    fn test_select_ignores_keep_set_for_coupons() {
        let keep: KeepSet = ["定期配信"].into_iter().collect();
        let elements = groups();
        let picked = select_candidate(ResourceKind::Coupons, &elements, &keep).unwrap();
        assert_eq!(picked.index, 0);
        assert!(select_candidate(ResourceKind::Segments, &[], &keep).is_none());
    }

    struct Editor {
        values: Mutex<(String, String)>,
        saved: Mutex<bool>,
        closed: Mutex<bool>,
    }

    impl Editor {
        fn new(mute: &str, unmute: &str) -> Self {
            Self {
                values: Mutex::new((mute.to_string(), unmute.to_string())),
                saved: Mutex::new(false),
                closed: Mutex::new(false),
            }
        }
    }

    #[async_trait]
    impl MuteSettings for Editor {
        async fn open(&self) -> E2eResult<()> {
            Ok(())
        }

        async fn read(&self) -> E2eResult<(String, String)> {
            Ok(self.values.lock().clone())
        }

        async fn clear_and_save(&self) -> E2eResult<()> {
            *self.values.lock() = (String::new(), String::new());
            *self.saved.lock() = true;
            Ok(())
        }

        async fn close(&self) -> E2eResult<()> {
            *self.closed.lock() = true;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_mute_settings_cleared_when_either_side_set() {
        let editor = Editor::new("", "resume");
        assert!(clear_mute_settings(&editor).await.unwrap());
        assert!(*editor.saved.lock());
        assert_eq!(*editor.values.lock(), (String::new(), String::new()));
    }

    #[tokio::test]
    async fn test_empty_mute_settings_close_without_saving() {
        let editor = Editor::new("", "");
        assert!(!clear_mute_settings(&editor).await.unwrap());
        assert!(!*editor.saved.lock());
        assert!(*editor.closed.lock());
    }
}
