use anyhow::Result;
use async_trait::async_trait;
use presence_tracker::{EntityId, PresenceSnapshot};

/// Source of presence readings for monitored accounts.
///
/// Implementations are stateless apart from connection reuse; all per-account
/// state lives in the monitor loop that calls them.
///
/// # Lifecycle
/// 1. Monitor loop calls `resolve_entity()` once with the configured name
/// 2. On success, `fetch_presence()` is called on every poll
/// 3. Errors from `fetch_presence()` are transient: the loop skips the cycle
#[async_trait]
pub trait PresenceSource: Send + Sync {
    /// Resolves a display name to a stable account id.
    ///
    /// # Returns
    /// * `Ok(Some(id))` - account exists
    /// * `Ok(None)` - no such account
    /// * `Err(...)` - network or API error
    async fn resolve_entity(&self, display_name: &str) -> Result<Option<EntityId>>;

    /// Fetches the current presence of one account.
    ///
    /// The snapshot is stamped with the time the response arrived and has
    /// already been normalised (unknown presence codes read as offline).
    async fn fetch_presence(&self, entity_id: EntityId) -> Result<PresenceSnapshot>;
}

/// Best-effort lookup of a human-readable game name.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Resolves the name of the experience behind `universe_id`.
    ///
    /// `Ok(None)` means the API knows nothing about it. Callers substitute a
    /// placeholder for both `None` and errors.
    async fn resolve_label(&self, universe_id: &str) -> Result<Option<String>>;
}
