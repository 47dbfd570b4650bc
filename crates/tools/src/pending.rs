//! Deferred, cancellable page navigation
//!
//! At most one navigation is pending at a time. Scheduling a new one cancels
//! the previous one; cancelling before the delay elapses guarantees the
//! redirect never happens.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use voice_concierge_core::{Error, Navigator, Result};

struct Scheduled {
    id: u64,
    target: String,
    fire_at: Instant,
    handle: JoinHandle<()>,
}

pub struct PendingNavigation {
    navigator: Arc<dyn Navigator>,
    slot: Mutex<Option<Scheduled>>,
    next_id: AtomicU64,
}

impl PendingNavigation {
    pub fn new(navigator: Arc<dyn Navigator>) -> Arc<Self> {
        Arc::new(Self {
            navigator,
            slot: Mutex::new(None),
            next_id: AtomicU64::new(1),
        })
    }

    /// Navigate to `target` after `delay`, replacing any pending navigation
    pub fn schedule(self: &Arc<Self>, target: impl Into<String>, delay: Duration) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Navigation(format!("no runtime for redirect timer: {}", e)))?;

        let target = target.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let fire_at = Instant::now() + delay;
        let this: Weak<Self> = Arc::downgrade(self);
        let task_target = target.clone();

        let mut slot = self.slot.lock();
        if let Some(previous) = slot.take() {
            previous.handle.abort();
            tracing::debug!(target = %previous.target, "Replaced pending navigation");
        }

        let handle = runtime.spawn(async move {
            tokio::time::sleep_until(fire_at).await;
            let Some(this) = this.upgrade() else {
                return;
            };
            // Only fire if still the current navigation
            {
                let mut slot = this.slot.lock();
                match slot.as_ref() {
                    Some(s) if s.id == id => {
                        slot.take();
                    },
                    _ => return,
                }
            }
            tracing::info!(target = %task_target, "Navigating");
            if let Err(e) = this.navigator.navigate(&task_target) {
                tracing::error!(error = %e, target = %task_target, "Navigation failed");
            }
        });

        *slot = Some(Scheduled {
            id,
            target: target.clone(),
            fire_at,
            handle,
        });
        tracing::debug!(target = %target, delay_ms = delay.as_millis() as u64, "Navigation scheduled");
        Ok(())
    }

    /// Cancel the pending navigation. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        match self.slot.lock().take() {
            Some(scheduled) => {
                scheduled.handle.abort();
                tracing::debug!(target = %scheduled.target, "Pending navigation cancelled");
                true
            },
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub fn target(&self) -> Option<String> {
        self.slot.lock().as_ref().map(|s| s.target.clone())
    }

    /// Time left until the pending navigation fires
    pub fn remaining(&self) -> Option<Duration> {
        self.slot
            .lock()
            .as_ref()
            .map(|s| s.fire_at.saturating_duration_since(Instant::now()))
    }
}

impl Drop for PendingNavigation {
    fn drop(&mut self) {
        if let Some(scheduled) = self.slot.get_mut().take() {
            scheduled.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingNavigator {
        visits: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn current_path(&self) -> String {
            "/index.html".to_string()
        }

        fn navigate(&self, target: &str) -> Result<()> {
            self.visits.lock().push(target.to_string());
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let nav = Arc::new(RecordingNavigator::default());
        let pending = PendingNavigation::new(nav.clone());

        pending
            .schedule("catering.html", Duration::from_millis(2_600))
            .unwrap();
        assert!(pending.is_pending());
        assert_eq!(pending.remaining(), Some(Duration::from_millis(2_600)));

        tokio::time::sleep(Duration::from_millis(2_599)).await;
        assert!(nav.visits.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(*nav.visits.lock(), vec!["catering.html".to_string()]);
        assert!(!pending.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_navigation() {
        let nav = Arc::new(RecordingNavigator::default());
        let pending = PendingNavigation::new(nav.clone());

        pending
            .schedule("catering.html", Duration::from_millis(2_600))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert!(pending.cancel());
        assert!(!pending.cancel());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(nav.visits.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_schedule_replaces_old() {
        let nav = Arc::new(RecordingNavigator::default());
        let pending = PendingNavigation::new(nav.clone());

        pending.schedule("a.html", Duration::from_millis(500)).unwrap();
        pending.schedule("b.html", Duration::from_millis(1_000)).unwrap();
        assert_eq!(pending.target().as_deref(), Some("b.html"));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(*nav.visits.lock(), vec!["b.html".to_string()]);
    }
}
