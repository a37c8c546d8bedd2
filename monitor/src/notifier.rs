use anyhow::Result;
use async_trait::async_trait;
use presence_tracker::PresenceEvent;

/// Delivers presence events to an external channel.
///
/// Delivery is one-shot: the monitor loop logs a failed `notify()` and moves
/// on, it never retries.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name used in logs (e.g., "discord").
    fn name(&self) -> &str;

    async fn notify(&self, event: &PresenceEvent) -> Result<()>;
}
