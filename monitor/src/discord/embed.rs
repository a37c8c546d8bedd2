use crate::roblox::config::avatar_url;
use presence_tracker::event::format_duration;
use presence_tracker::state::DurationClass;
use presence_tracker::PresenceEvent;
use serde::Serialize;

pub const COLOR_ACTIVE: u32 = 0x00ff00;
pub const COLOR_OFFLINE: u32 = 0xff0000;
pub const FOOTER_TEXT: &str = "Roblox Presence Tracker";

/// Webhook request body.
#[derive(Debug, Serialize)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub thumbnail: EmbedImage,
    pub footer: EmbedFooter,
    /// RFC 3339
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

fn field(name: &str, value: impl Into<String>, inline: bool) -> EmbedField {
    EmbedField {
        name: name.to_string(),
        value: value.into(),
        inline,
    }
}

/// Transform a presence event into a Discord embed.
///
/// Field order: event, status, the three duration counters, time in the
/// previous state, timestamp, then whichever of game link, game name and
/// server details the event carries.
pub fn event_to_embed(event: &PresenceEvent) -> Embed {
    let durations = &event.durations;
    let mut fields = vec![
        field("Event", event.label.as_str(), true),
        field("Status", event.status().to_string(), true),
        field(
            "Online Duration",
            format_duration(durations.get(DurationClass::Online)),
            true,
        ),
        field(
            "Offline Duration",
            format_duration(durations.get(DurationClass::Offline)),
            true,
        ),
        field(
            "In-Game Duration",
            format_duration(durations.get(DurationClass::Active)),
            true,
        ),
        field(
            "Time in Previous State",
            format_duration(event.duration_in_previous_state),
            true,
        ),
        field(
            "Timestamp",
            event.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            false,
        ),
    ];

    if let Some(place_url) = event.place_url() {
        fields.push(field("Game Link", format!("[Join Game]({})", place_url), false));
    }
    if let Some(game_name) = &event.game_name {
        fields.push(field("Game Name", game_name.as_str(), true));
    }
    if let (Some(join_url), Some(server_id)) = (event.join_url(), event.current.sub_context_id()) {
        fields.push(field("Join Server", join_url, false));
        fields.push(field("Server ID", server_id, true));
    }

    Embed {
        title: format!("🔔 {} Activity Update", event.display_name),
        color: if event.is_active() {
            COLOR_ACTIVE
        } else {
            COLOR_OFFLINE
        },
        fields,
        thumbnail: EmbedImage {
            url: avatar_url(event.entity_id),
        },
        footer: EmbedFooter {
            text: FOOTER_TEXT.to_string(),
        },
        timestamp: event.timestamp.to_rfc3339(),
    }
}
