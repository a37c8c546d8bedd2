use crate::classify::EventLabel;
use crate::presence::{EntityId, PresenceCode, PresenceTuple};
use crate::state::{CumulativeDurations, DiffResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;


const PLACE_URL: &str = "https://www.roblox.com/games";
const JOIN_URL: &str = "roblox://experiences/start";

/// PresenceEvent is the notification handed to a notifier for one classified
/// transition.
///
/// Carries everything a channel needs to render the transition; notifiers do
/// no further lookups of their own.
#[derive(Clone, Debug, Serialize)]
pub struct PresenceEvent {
    /// UUIDv7 identifier (time-ordered)
    pub event_id: String,

    pub entity_id: EntityId,

    /// Configured account name
    pub display_name: String,

    pub label: EventLabel,

    /// State the account is in now
    pub current: PresenceTuple,

    /// Resolved game name, when the snapshot carried a universe id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_name: Option<String>,

    /// Seconds spent in the state that just ended
    pub duration_in_previous_state: f64,

    pub durations: CumulativeDurations,

    pub timestamp: DateTime<Utc>,
}

impl PresenceEvent {
    /// Build an event from a tracker diff.
    pub fn from_diff(
        entity_id: EntityId,
        display_name: &str,
        label: EventLabel,
        diff: &DiffResult,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7().to_string(),
            entity_id,
            display_name: display_name.to_string(),
            label,
            current: diff.current.clone(),
            game_name: None,
            duration_in_previous_state: diff.duration_in_previous_state,
            durations: diff.durations,
            timestamp: diff.observed_at,
        }
    }

    pub fn with_game_name(mut self, game_name: impl Into<String>) -> Self {
        self.game_name = Some(game_name.into());
        self
    }

    pub fn status(&self) -> PresenceCode {
        self.current.code()
    }

    /// Drives the colour indicator: anything not offline/invisible is active.
    pub fn is_active(&self) -> bool {
        !self.status().is_offline()
    }

    /// Web link to the place the account is in.
    pub fn place_url(&self) -> Option<String> {
        self.current
            .context_id()
            .map(|place| format!("{}/{}", PLACE_URL, place))
    }

    /// Deep link that joins the exact server the account is in.
    pub fn join_url(&self) -> Option<String> {
        let place = self.current.context_id()?;
        let server = self.current.sub_context_id()?;
        Some(format!("{}?placeId={}&gameId={}", JOIN_URL, place, server))
    }
}

/// Render seconds as `"{h}h {m}m {s}s"`. Fractions are truncated.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let (mins, secs) = (total / 60, total % 60);
    let (hours, mins) = (mins / 60, mins % 60);
    format!("{}h {}m {}s", hours, mins, secs)
}
