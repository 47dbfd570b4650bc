//! `navigate_to_menu` behaviour against a recording navigator

use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use voice_concierge_config::NavigationSettings;
use voice_concierge_core::{
    ContinuityFlag, ContinuityStore, Error, InMemoryStore, Navigator, PersistentStore, Result,
};
use voice_concierge_tools::{
    NavigateToMenuTool, PendingNavigation, SessionLease, Tool, ToolOutput,
};

struct RecordingNavigator {
    path: String,
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    fn at(path: &str) -> Arc<Self> {
        Arc::new(Self {
            path: path.to_string(),
            visits: Mutex::new(Vec::new()),
        })
    }

    fn visits(&self) -> Vec<String> {
        self.visits.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.path.clone()
    }

    fn navigate(&self, target: &str) -> Result<()> {
        self.visits.lock().push(target.to_string());
        Ok(())
    }
}

/// Store whose writes always fail
struct ReadOnlyStore;

impl PersistentStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(Error::Store("quota exceeded".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

struct Fixture {
    navigator: Arc<RecordingNavigator>,
    continuity: ContinuityStore,
    pending: Arc<PendingNavigation>,
    lease: Arc<SessionLease>,
    tool: NavigateToMenuTool,
}

fn fixture(path: &str, store: Arc<dyn PersistentStore>) -> Fixture {
    let navigator = RecordingNavigator::at(path);
    let continuity = ContinuityStore::with_default_keys(store);
    let pending = PendingNavigation::new(navigator.clone());
    let lease = SessionLease::new();
    let tool = NavigateToMenuTool::new(
        navigator.clone(),
        continuity.clone(),
        pending.clone(),
        NavigationSettings::default(),
        lease.clone(),
    );
    Fixture {
        navigator,
        continuity,
        pending,
        lease,
        tool,
    }
}

#[tokio::test(start_paused = true)]
async fn test_navigates_after_delay_with_resume_flag() {
    let f = fixture("/index.html", Arc::new(InMemoryStore::new()));
    let settings = NavigationSettings::default();

    let out = f.tool.execute(json!({})).await.unwrap();
    assert_eq!(out, ToolOutput::text(settings.navigating_message.clone()));
    assert!(f
        .continuity
        .is_set(ContinuityFlag::ReturnToConversation)
        .unwrap());

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert!(f.navigator.visits().is_empty());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(f.navigator.visits(), vec!["catering.html".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_already_on_menu_is_a_no_op() {
    let f = fixture("/Catering.html", Arc::new(InMemoryStore::new()));

    let out = f.tool.execute(json!({})).await.unwrap();
    assert_eq!(
        out,
        ToolOutput::text(NavigationSettings::default().already_here_message)
    );
    assert!(!f.pending.is_pending());
    assert_eq!(f.continuity.consume().unwrap(), None);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(f.navigator.visits().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_before_delay_keeps_user_on_page() {
    let f = fixture("/about.html", Arc::new(InMemoryStore::new()));

    f.tool.execute(json!({})).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert!(f.pending.cancel());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(f.navigator.visits().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_store_failure_reports_unavailable() {
    let f = fixture("/index.html", Arc::new(ReadOnlyStore));

    let out = f.tool.execute(json!({})).await.unwrap();
    assert_eq!(
        out,
        ToolOutput::text(NavigationSettings::default().unavailable_message)
    );
    assert!(!f.pending.is_pending());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(f.navigator.visits().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_revoked_lease_has_no_side_effects() {
    let f = fixture("/index.html", Arc::new(InMemoryStore::new()));
    assert!(f.lease.revoke());

    let out = f.tool.execute(json!({})).await.unwrap();
    assert_eq!(
        out,
        ToolOutput::text(NavigationSettings::default().unavailable_message)
    );
    assert!(!f.pending.is_pending());
    assert_eq!(f.continuity.consume().unwrap(), None);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(f.navigator.visits().is_empty());
}
