//! Convergence properties of the cleanup engine over in-memory lists

use async_trait::async_trait;
use chatflow_e2e::cleanup::{clear_mute_settings, select_candidate, MuteSettings};
use chatflow_e2e::{CleanupEngine, E2eError, E2eResult, KeepSet, RemoteList, ResourceElement, ResourceKind};
use parking_lot::Mutex;
use test_case::test_case;

/// List held in memory. Names listed in `stuck` refuse to disappear.
struct MemoryList {
    kind: ResourceKind,
    items: Mutex<Vec<(String, bool)>>,
    stuck: Vec<String>,
    removals: Mutex<Vec<String>>,
    scans: Mutex<usize>,
}

impl MemoryList {
    fn new(kind: ResourceKind, items: &[(&str, bool)]) -> Self {
        Self {
            kind,
            items: Mutex::new(items.iter().map(|(n, r)| (n.to_string(), *r)).collect()),
            stuck: Vec::new(),
            removals: Mutex::new(Vec::new()),
            scans: Mutex::new(0),
        }
    }

    fn with_stuck(mut self, name: &str) -> Self {
        self.stuck.push(name.to_string());
        self
    }

    fn names(&self) -> Vec<String> {
        self.items.lock().iter().map(|(n, _)| n.clone()).collect()
    }

    fn removal_count(&self) -> usize {
        self.removals.lock().len()
    }
}

#[async_trait]
impl RemoteList for MemoryList {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn scan(&self) -> E2eResult<Vec<ResourceElement>> {
        *self.scans.lock() += 1;
        Ok(self
            .items
            .lock()
            .iter()
            .enumerate()
            .map(|(i, (name, removable))| ResourceElement::new(i, name.clone(), *removable))
            .collect())
    }

    async fn remove(&self, element: &ResourceElement) -> E2eResult<()> {
        self.removals.lock().push(element.name.clone());
        if self.stuck.contains(&element.name) {
            return Ok(());
        }
        let mut items = self.items.lock();
        if items.get(element.index).map(|(n, _)| n) != Some(&element.name) {
            return Err(E2eError::Driver(format!("stale handle for {}", element.name)));
        }
        items.remove(element.index);
        Ok(())
    }
}

fn group_keep() -> KeepSet {
    ["定期配信", "アーカイブ", "デフォルトグループ"].into_iter().collect()
}

fn console_groups() -> Vec<(&'static str, bool)> {
    vec![
        ("定期配信", false),
        ("Group1", true),
        ("アーカイブ", false),
        ("Group2", true),
        ("デフォルトグループ", false),
        ("Group3", true),
    ]
}

#[tokio::test]
async fn test_groups_converge_to_keep_set() {
    let list = MemoryList::new(ResourceKind::Groups, &console_groups());

    let removed = CleanupEngine::default().clean(&list, &group_keep()).await.unwrap();

    assert_eq!(removed, 3);
    assert_eq!(list.names(), vec!["定期配信", "アーカイブ", "デフォルトグループ"]);
    // One scan per deletion plus the final empty check
    assert_eq!(*list.scans.lock(), 4);
}

#[tokio::test]
async fn test_second_clean_deletes_nothing() {
    let list = MemoryList::new(ResourceKind::Groups, &console_groups());
    let engine = CleanupEngine::default();

    engine.clean(&list, &group_keep()).await.unwrap();
    let before = list.removal_count();
    let removed = engine.clean(&list, &group_keep()).await.unwrap();

    assert_eq!(removed, 0);
    assert_eq!(list.removal_count(), before);
}

#[test_case(&["Group1", "Group2", "Group3"] ; "ascending")]
#[test_case(&["Group3", "Group1", "Group2"] ; "shuffled")]
#[test_case(&["Group2", "Group3", "Group1"] ; "rotated")]
fn test_final_state_ignores_order(order: &[&str]) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut items: Vec<(&str, bool)> = vec![("デフォルトグループ", false), ("最初の挨拶", true)];
    items.extend(order.iter().map(|n| (*n, true)));
    let keep: KeepSet = ["デフォルトグループ", "最初の挨拶"].into_iter().collect();
    let list = MemoryList::new(ResourceKind::Keywords, &items);

    let removed = rt.block_on(CleanupEngine::default().clean(&list, &keep)).unwrap();

    assert_eq!(removed, 3);
    assert_eq!(list.names(), vec!["デフォルトグループ", "最初の挨拶"]);
}

#[test_case(0 ; "empty")]
#[test_case(1 ; "single")]
#[test_case(25 ; "many")]
fn test_iterations_bounded_by_list_size(n: usize) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let names: Vec<String> = (0..n).map(|i| format!("cp-coupon{}", i)).collect();
    let items: Vec<(&str, bool)> = names.iter().map(|n| (n.as_str(), true)).collect();
    let list = MemoryList::new(ResourceKind::Coupons, &items);

    let removed = rt
        .block_on(CleanupEngine::default().clean(&list, &KeepSet::empty()))
        .unwrap();

    assert_eq!(removed, n);
    assert!(list.names().is_empty());
}

#[tokio::test]
async fn test_coupons_ignore_keep_set() {
    let list = MemoryList::new(ResourceKind::Coupons, &[("Carousel2Coupon", true), ("cp-coupon1", true)]);
    let keep: KeepSet = ["Carousel2Coupon"].into_iter().collect();

    CleanupEngine::default().clean(&list, &keep).await.unwrap();
    assert!(list.names().is_empty());
}

#[tokio::test]
async fn test_undeletable_element_hits_cap() {
    let list = MemoryList::new(ResourceKind::Segments, &[("cp-segment1", true)]).with_stuck("cp-segment1");

    let err = CleanupEngine::new(5).clean(&list, &KeepSet::empty()).await.unwrap_err();

    match err {
        E2eError::CleanupStuck { kind, iterations } => {
            assert_eq!(kind, "segments");
            assert_eq!(iterations, 5);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(list.removal_count(), 5);
}

#[test]
fn test_protected_elements_never_selected() {
    let elements = vec![
        ResourceElement::new(0, "デフォルトグループ", true),
        ResourceElement::new(1, "Group9", false),
    ];
    assert!(select_candidate(ResourceKind::Groups, &elements, &group_keep()).is_none());
}

struct MemoryMute {
    words: Mutex<(String, String)>,
    saves: Mutex<usize>,
}

#[async_trait]
impl MuteSettings for MemoryMute {
    async fn open(&self) -> E2eResult<()> {
        Ok(())
    }

    async fn read(&self) -> E2eResult<(String, String)> {
        Ok(self.words.lock().clone())
    }

    async fn clear_and_save(&self) -> E2eResult<()> {
        *self.words.lock() = (String::new(), String::new());
        *self.saves.lock() += 1;
        Ok(())
    }

    async fn close(&self) -> E2eResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_mute_settings_converge_in_one_save() {
    let mute = MemoryMute {
        words: Mutex::new(("mute-me".into(), String::new())),
        saves: Mutex::new(0),
    };

    assert!(clear_mute_settings(&mute).await.unwrap());
    assert!(!clear_mute_settings(&mute).await.unwrap());
    assert_eq!(*mute.saves.lock(), 1);
}
