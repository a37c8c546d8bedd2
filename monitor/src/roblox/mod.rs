pub mod api;
pub mod config;

use crate::source::{MetadataResolver, PresenceSource};
use anyhow::Result;
use async_trait::async_trait;
use presence_tracker::config::TrackerConfig;
use presence_tracker::{EntityId, PresenceSnapshot};

use self::api::RobloxClient;

/// Roblox presence source: resolves usernames, polls presence and looks up
/// game names through one shared HTTP client.
pub struct RobloxSource {
    client: RobloxClient,
}

impl RobloxSource {
    pub fn new(client: RobloxClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        let client = RobloxClient::new(config.endpoints.clone(), config.roblosecurity.clone())?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl PresenceSource for RobloxSource {
    async fn resolve_entity(&self, display_name: &str) -> Result<Option<EntityId>> {
        let user = self.client.fetch_user(display_name).await?;
        Ok(user.map(|u| EntityId(u.id)))
    }

    async fn fetch_presence(&self, entity_id: EntityId) -> Result<PresenceSnapshot> {
        let presence = self.client.fetch_presence(entity_id.0).await?;
        Ok(presence.into_snapshot())
    }
}

#[async_trait]
impl MetadataResolver for RobloxSource {
    async fn resolve_label(&self, universe_id: &str) -> Result<Option<String>> {
        self.client.fetch_game_name(universe_id).await
    }
}
