//! Per-account monitor loop.
//!
//! Each configured account gets its own loop that resolves the account once,
//! then polls its presence on a fixed interval, diffs it against the last
//! successful reading and notifies on every classified transition.

use crate::error::MonitorError;
use crate::notifier::Notifier;
use crate::source::{MetadataResolver, PresenceSource};
use chrono::{DateTime, Utc};
use presence_tracker::{classify, EntityId, EntityState, EventLabel, PresenceEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

/// Game name used when the lookup fails or finds nothing.
pub const UNKNOWN_GAME: &str = "Unknown Game";

/// Lifecycle phase of a monitor loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorPhase {
    /// Looking up the account id
    Resolving,
    /// Last poll succeeded
    Running,
    /// Last poll failed; retrying on the next cycle
    Suspended,
    /// Terminal: resolution failed or shutdown was requested
    Stopped,
}

/// Status information for one monitored account.
#[derive(Clone, Debug)]
pub struct MonitorStatus {
    pub phase: MonitorPhase,
    /// Resolved account id, once known
    pub entity_id: Option<EntityId>,
    /// Last successful poll timestamp
    pub last_poll: Option<DateTime<Utc>>,
    /// Last event delivered or attempted
    pub last_event: Option<EventLabel>,
    /// Last error message (if any)
    pub last_error: Option<String>,
    /// Total number of successful polls
    pub poll_count: u64,
    /// Total number of failed polls
    pub error_count: u64,
    /// Polls failed in a row since the last success
    pub consecutive_failures: u64,
    /// Events delivered
    pub events_sent: u64,
    /// Events the notifier failed to deliver
    pub delivery_failures: u64,
}

impl Default for MonitorStatus {
    fn default() -> Self {
        Self {
            phase: MonitorPhase::Resolving,
            entity_id: None,
            last_poll: None,
            last_event: None,
            last_error: None,
            poll_count: 0,
            error_count: 0,
            consecutive_failures: 0,
            events_sent: 0,
            delivery_failures: 0,
        }
    }
}

/// Result of one successful poll cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Presence matched the last reading
    Unchanged,
    /// A transition was classified and delivered
    Notified(EventLabel),
    /// A transition was classified but the notifier failed
    DeliveryFailed(EventLabel),
}

/// Monitor loop for a single account.
///
/// Owns the account's [`EntityState`] exclusively. Polls are strictly
/// sequential: the next poll starts only after the previous cycle, including
/// its notification, has finished.
pub struct PresenceMonitor {
    username: String,
    source: Arc<dyn PresenceSource>,
    metadata: Arc<dyn MetadataResolver>,
    notifier: Arc<dyn Notifier>,
    poll_interval: Duration,
    state: Option<EntityState>,
    status: Arc<Mutex<MonitorStatus>>,
}

impl PresenceMonitor {
    pub fn new(
        username: String,
        source: Arc<dyn PresenceSource>,
        metadata: Arc<dyn MetadataResolver>,
        notifier: Arc<dyn Notifier>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            username,
            source,
            metadata,
            notifier,
            poll_interval,
            state: None,
            status: Arc::new(Mutex::new(MonitorStatus::default())),
        }
    }

    /// Returns a clone of the status tracker for external monitoring.
    pub fn status(&self) -> Arc<Mutex<MonitorStatus>> {
        Arc::clone(&self.status)
    }

    /// Tracked state, once the account has been resolved.
    pub fn entity_state(&self) -> Option<&EntityState> {
        self.state.as_ref()
    }

    /// Resolves the configured name to an account id.
    ///
    /// Called once. A failure here is permanent for this account.
    pub async fn resolve(&mut self) -> Result<EntityId, MonitorError> {
        self.status.lock().await.phase = MonitorPhase::Resolving;

        let entity_id = match self.source.resolve_entity(&self.username).await {
            Ok(Some(id)) => id,
            Ok(None) => return Err(MonitorError::NotFound(self.username.clone())),
            Err(e) => return Err(MonitorError::resolution(&e)),
        };

        self.state = Some(EntityState::new(entity_id, self.username.clone()));

        let mut status = self.status.lock().await;
        status.entity_id = Some(entity_id);
        status.phase = MonitorPhase::Running;

        info!(username = %self.username, entity_id = %entity_id, "Resolved user");
        Ok(entity_id)
    }

    /// Runs one poll, diff, classify and notify cycle.
    ///
    /// A failed poll returns `Err` and leaves the tracked state untouched, so
    /// the next successful poll is diffed against the last good reading.
    /// Metadata and delivery failures never fail the cycle.
    pub async fn poll_once(&mut self) -> Result<CycleOutcome, MonitorError> {
        let state = match self.state.as_mut() {
            Some(state) => state,
            None => {
                return Err(MonitorError::Poll(format!(
                    "user '{}' has not been resolved",
                    self.username
                )))
            }
        };

        let snapshot = match self.source.fetch_presence(state.entity_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let err = MonitorError::poll(&e);
                let mut status = self.status.lock().await;
                status.phase = MonitorPhase::Suspended;
                status.last_error = Some(err.to_string());
                status.error_count += 1;
                status.consecutive_failures += 1;
                return Err(err);
            }
        };

        let diff = state.observe(&snapshot);
        {
            let mut status = self.status.lock().await;
            status.phase = MonitorPhase::Running;
            status.last_poll = Some(snapshot.observed_at);
            status.poll_count += 1;
            status.consecutive_failures = 0;
        }

        let label = match classify(&diff.previous, &diff.current, diff.first_observation) {
            Some(label) => label,
            None => {
                debug!(username = %self.username, "Presence unchanged");
                return Ok(CycleOutcome::Unchanged);
            }
        };

        info!(
            username = %self.username,
            event = %label,
            status = %diff.current.code(),
            "Presence transition"
        );

        let mut event = PresenceEvent::from_diff(state.entity_id, &state.display_name, label, &diff);
        if let Some(universe_id) = snapshot.universe_id.as_deref() {
            let game_name = match self.metadata.resolve_label(universe_id).await {
                Ok(Some(name)) => name,
                Ok(None) => UNKNOWN_GAME.to_string(),
                Err(e) => {
                    let err = MonitorError::metadata(&e);
                    warn!(
                        username = %self.username,
                        universe_id = %universe_id,
                        kind = err.kind(),
                        error = %err,
                        "Game lookup failed, using placeholder"
                    );
                    UNKNOWN_GAME.to_string()
                }
            };
            event = event.with_game_name(game_name);
        }

        let outcome = match self.notifier.notify(&event).await {
            Ok(()) => CycleOutcome::Notified(label),
            Err(e) => {
                let err = MonitorError::delivery(&e);
                error!(
                    username = %self.username,
                    notifier = %self.notifier.name(),
                    event = %label,
                    kind = err.kind(),
                    error = %err,
                    "Failed to deliver presence event"
                );
                self.status.lock().await.last_error = Some(err.to_string());
                CycleOutcome::DeliveryFailed(label)
            }
        };

        let mut status = self.status.lock().await;
        status.last_event = Some(label);
        match outcome {
            CycleOutcome::Notified(_) => status.events_sent += 1,
            CycleOutcome::DeliveryFailed(_) => status.delivery_failures += 1,
            CycleOutcome::Unchanged => {}
        }

        Ok(outcome)
    }

    /// Runs the loop until a fatal error or until `shutdown` flips to `true`.
    ///
    /// The first cycle resolves the account; every later cycle polls it.
    /// The shutdown signal is checked between cycles and interrupts the
    /// sleep; an in-flight poll or notification is allowed to finish. A
    /// dropped sender counts as shutdown.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            username = %self.username,
            interval_ms = self.poll_interval.as_millis() as u64,
            "Starting presence monitor"
        );

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            let result = if self.state.is_none() {
                // Poll right away once resolved
                match self.resolve().await {
                    Ok(_) => continue,
                    Err(e) => Err(e),
                }
            } else {
                self.poll_once().await.map(|_| ())
            };

            if let Err(e) = result {
                if e.is_fatal() {
                    error!(
                        username = %self.username,
                        kind = e.kind(),
                        error = %e,
                        "Monitoring stopped"
                    );
                    self.status.lock().await.last_error = Some(e.to_string());
                    break;
                }
                warn!(
                    username = %self.username,
                    kind = e.kind(),
                    error = %e,
                    "Presence poll failed, retrying next cycle"
                );
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = stop_requested(&mut shutdown) => break,
            }
        }

        self.status.lock().await.phase = MonitorPhase::Stopped;
        info!(username = %self.username, "Presence monitor stopped");
    }

    /// Spawns the loop on the runtime (non-blocking).
    pub fn start(self, shutdown: watch::Receiver<bool>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}

/// Resolves once the shutdown flag reads `true` or the sender is gone.
async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
