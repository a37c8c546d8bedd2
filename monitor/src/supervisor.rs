//! Supervisor - Orchestrates monitor lifecycle.
//!
//! Starts one monitor loop per configured account, keeps their handles and
//! status trackers, and stops them together on shutdown.

use crate::discord::DiscordNotifier;
use crate::notifier::Notifier;
use crate::roblox::RobloxSource;
use crate::runners::monitor::{MonitorPhase, MonitorStatus, PresenceMonitor};
use crate::source::{MetadataResolver, PresenceSource};
use anyhow::{Context, Result};
use futures::future::join_all;
use presence_tracker::config::TrackerConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Supervisor - owns every monitor loop.
///
/// # Responsibilities
/// - Start one independent loop per account
/// - Track status for all accounts
/// - Signal shutdown and wait for loops to finish
///
/// Loops share only the read-only collaborators; each owns its own state.
pub struct Supervisor {
    source: Arc<dyn PresenceSource>,
    metadata: Arc<dyn MetadataResolver>,
    notifier: Arc<dyn Notifier>,
    poll_interval: Duration,
    shutdown_tx: watch::Sender<bool>,
    /// Loop task handles, by username
    handles: Vec<(String, JoinHandle<()>)>,
    /// Status tracking per username
    status_map: HashMap<String, Arc<Mutex<MonitorStatus>>>,
}

impl Supervisor {
    pub fn new(
        source: Arc<dyn PresenceSource>,
        metadata: Arc<dyn MetadataResolver>,
        notifier: Arc<dyn Notifier>,
        poll_interval: Duration,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            source,
            metadata,
            notifier,
            poll_interval,
            shutdown_tx,
            handles: Vec::new(),
            status_map: HashMap::new(),
        }
    }

    /// Builds the Roblox source and Discord notifier from configuration.
    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        let roblox = Arc::new(
            RobloxSource::from_config(config).context("Failed to initialize Roblox client")?,
        );
        let notifier = Arc::new(
            DiscordNotifier::new(config.webhook_url.clone())
                .context("Failed to initialize webhook notifier")?,
        );
        Ok(Self::new(
            roblox.clone(),
            roblox,
            notifier,
            Duration::from_secs(config.poll_interval_secs),
        ))
    }

    /// Returns the status trackers, keyed by username.
    pub fn status_map(&self) -> &HashMap<String, Arc<Mutex<MonitorStatus>>> {
        &self.status_map
    }

    /// Starts a monitor loop for each username not already being monitored.
    ///
    /// Names are trimmed and compared case-insensitively; blank names are
    /// skipped.
    ///
    /// # Returns
    /// Number of loops started
    pub fn start(&mut self, usernames: &[String]) -> usize {
        let mut started = 0;
        for username in usernames.iter().map(|u| u.trim()) {
            if username.is_empty() {
                continue;
            }
            if self.is_monitoring(username) {
                warn!(username = %username, "Already monitoring user, skipping");
                continue;
            }
            let username = username.to_string();

            let monitor = PresenceMonitor::new(
                username.clone(),
                Arc::clone(&self.source),
                Arc::clone(&self.metadata),
                Arc::clone(&self.notifier),
                self.poll_interval,
            );
            self.status_map.insert(username.clone(), monitor.status());
            let handle = monitor.start(self.shutdown_tx.subscribe());
            self.handles.push((username.clone(), handle));
            started += 1;
        }

        info!(started, total = self.handles.len(), "Presence monitors started");
        started
    }

    fn is_monitoring(&self, username: &str) -> bool {
        self.status_map
            .keys()
            .any(|known| known.eq_ignore_ascii_case(username))
    }

    /// Signals every loop to stop and waits up to `grace` for them to exit.
    ///
    /// Loops still running after the grace period are aborted and marked
    /// `Stopped`. A loop that panicked is logged; it never affects the others.
    pub async fn shutdown(self, grace: Duration) {
        info!(monitors = self.handles.len(), "Stopping presence monitors");
        let _ = self.shutdown_tx.send(true);

        let (names, handles): (Vec<String>, Vec<JoinHandle<()>>) =
            self.handles.into_iter().unzip();
        let aborts: Vec<_> = handles.iter().map(|h| h.abort_handle()).collect();

        match tokio::time::timeout(grace, join_all(handles)).await {
            Ok(results) => {
                for (username, result) in names.iter().zip(results) {
                    if let Err(e) = result {
                        error!(username = %username, error = %e, "Presence monitor task failed");
                    }
                }
            }
            Err(_) => {
                warn!(
                    grace_ms = grace.as_millis() as u64,
                    "Monitors did not stop in time, aborting"
                );
                for abort in aborts {
                    abort.abort();
                }
                for (username, status) in &self.status_map {
                    let mut status = status.lock().await;
                    if status.phase != MonitorPhase::Stopped {
                        warn!(username = %username, "Presence monitor aborted");
                        status.phase = MonitorPhase::Stopped;
                    }
                }
            }
        }

        info!("Presence monitors stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::Utc;
    use presence_tracker::{EntityId, PresenceEvent, PresenceSnapshot, PresenceTuple};

    /// Resolves every name except "ghost", ignoring case; polls fail for
    /// "flaky" (id 2) and never complete for "stuck" (id 3).
    struct FakeSource;

    #[async_trait]
    impl PresenceSource for FakeSource {
        async fn resolve_entity(&self, name: &str) -> Result<Option<EntityId>> {
            Ok(match name.to_ascii_lowercase().as_str() {
                "ghost" => None,
                "flaky" => Some(EntityId(2)),
                "stuck" => Some(EntityId(3)),
                _ => Some(EntityId(1)),
            })
        }

        async fn fetch_presence(&self, id: EntityId) -> Result<PresenceSnapshot> {
            match id {
                EntityId(2) => Err(anyhow!("connection refused")),
                EntityId(3) => futures::future::pending().await,
                _ => Ok(PresenceSnapshot::new(PresenceTuple::offline(), Utc::now())),
            }
        }
    }

    #[async_trait]
    impl MetadataResolver for FakeSource {
        async fn resolve_label(&self, _: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    /// Counts delivered events per account.
    #[derive(Default)]
    struct CountingNotifier {
        delivered: std::sync::Mutex<HashMap<EntityId, usize>>,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        fn name(&self) -> &str {
            "counting"
        }

        async fn notify(&self, event: &PresenceEvent) -> Result<()> {
            *self
                .delivered
                .lock()
                .unwrap()
                .entry(event.entity_id)
                .or_default() += 1;
            Ok(())
        }
    }

    fn make_supervisor_with(notifier: Arc<CountingNotifier>) -> Supervisor {
        let source = Arc::new(FakeSource);
        Supervisor::new(source.clone(), source, notifier, Duration::from_millis(10))
    }

    fn make_supervisor() -> Supervisor {
        make_supervisor_with(Arc::new(CountingNotifier::default()))
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_start_skips_duplicates() {
        let mut supervisor = make_supervisor();
        assert_eq!(supervisor.start(&names(&["alice", "bob"])), 2);
        assert_eq!(supervisor.start(&names(&["alice"])), 0);
        assert_eq!(supervisor.status_map().len(), 2);
        supervisor.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_case_variants_share_one_monitor() {
        let notifier = Arc::new(CountingNotifier::default());
        let mut supervisor = make_supervisor_with(Arc::clone(&notifier));

        assert_eq!(supervisor.start(&names(&["alice", "ALICE", " ", "alice "])), 1);
        assert_eq!(supervisor.start(&names(&["Alice"])), 0);
        assert_eq!(supervisor.status_map().len(), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        supervisor.shutdown(Duration::from_secs(1)).await;

        // One Tracking Started for the single account, nothing else
        let delivered = notifier.delivered.lock().unwrap();
        assert_eq!(delivered.get(&EntityId(1)), Some(&1));
    }

    #[tokio::test]
    async fn test_shutdown_aborts_stuck_monitor() {
        let mut supervisor = make_supervisor();
        supervisor.start(&names(&["stuck", "alice"]));
        tokio::time::sleep(Duration::from_millis(50)).await;

        let stuck = Arc::clone(&supervisor.status_map()["stuck"]);
        let alice = Arc::clone(&supervisor.status_map()["alice"]);
        assert_eq!(stuck.lock().await.phase, MonitorPhase::Running);
        assert_eq!(stuck.lock().await.poll_count, 0);

        let started = std::time::Instant::now();
        supervisor.shutdown(Duration::from_millis(100)).await;
        assert!(started.elapsed() < Duration::from_secs(1));

        assert_eq!(stuck.lock().await.phase, MonitorPhase::Stopped);
        assert_eq!(alice.lock().await.phase, MonitorPhase::Stopped);
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let mut supervisor = make_supervisor();
        supervisor.start(&names(&["alice", "ghost", "flaky"]));
        tokio::time::sleep(Duration::from_millis(100)).await;

        let statuses: HashMap<String, MonitorStatus> = {
            let mut out = HashMap::new();
            for (name, status) in supervisor.status_map() {
                out.insert(name.clone(), status.lock().await.clone());
            }
            out
        };

        assert_eq!(statuses["ghost"].phase, MonitorPhase::Stopped);
        assert_eq!(statuses["flaky"].phase, MonitorPhase::Suspended);
        assert!(statuses["flaky"].error_count >= 1);
        assert_eq!(statuses["alice"].phase, MonitorPhase::Running);
        assert!(statuses["alice"].poll_count >= 1);
        assert_eq!(statuses["alice"].events_sent, 1);

        let status_map = supervisor.status_map().clone();
        supervisor.shutdown(Duration::from_secs(1)).await;
        for status in status_map.values() {
            assert_eq!(status.lock().await.phase, MonitorPhase::Stopped);
        }
    }

    #[test]
    fn test_from_config() {
        let config = TrackerConfig {
            webhook_url: "https://discord.example/api/webhooks/1/abc".to_string(),
            usernames: names(&["alice"]),
            ..TrackerConfig::default()
        };
        let supervisor = Supervisor::from_config(&config).unwrap();
        assert_eq!(supervisor.poll_interval, Duration::from_secs(5));
        assert!(supervisor.status_map().is_empty());
    }
}
