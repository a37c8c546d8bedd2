//! Transition classification.
//!
//! Maps a `(previous, current)` pair of presence tuples onto the event label
//! that gets delivered. Rules are checked in order and the first match wins,
//! so a single poll that both comes online and joins a game reports the
//! coarser "Came Online".

use crate::presence::{PresenceCode, PresenceTuple};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-meaningful name of a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventLabel {
    TrackingStarted,
    WentOffline,
    CameOnline,
    JoinedGame,
    EnteredStudio,
    StatusChanged,
}

impl EventLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventLabel::TrackingStarted => "Tracking Started",
            EventLabel::WentOffline => "Went Offline",
            EventLabel::CameOnline => "Came Online",
            EventLabel::JoinedGame => "Joined Game",
            EventLabel::EnteredStudio => "Entered Studio",
            EventLabel::StatusChanged => "Status Changed",
        }
    }
}

impl fmt::Display for EventLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a transition. Returns `None` when nothing changed.
pub fn classify(
    previous: &PresenceTuple,
    current: &PresenceTuple,
    first_observation: bool,
) -> Option<EventLabel> {
    if first_observation {
        return Some(EventLabel::TrackingStarted);
    }
    if previous == current {
        return None;
    }

    let was_offline = previous.code().is_offline();
    let is_offline = current.code().is_offline();

    let label = if is_offline && !was_offline {
        EventLabel::WentOffline
    } else if was_offline && !is_offline {
        EventLabel::CameOnline
    } else if current.code() == PresenceCode::InGame
        && current.context_id() != previous.context_id()
    {
        EventLabel::JoinedGame
    } else if current.code() == PresenceCode::InStudio
        && previous.code() != PresenceCode::InStudio
    {
        EventLabel::EnteredStudio
    } else {
        EventLabel::StatusChanged
    };

    Some(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(code: PresenceCode, context: Option<&str>, sub: Option<&str>) -> PresenceTuple {
        PresenceTuple::new(
            code,
            context.map(str::to_string),
            sub.map(str::to_string),
        )
    }

    fn offline() -> PresenceTuple {
        PresenceTuple::offline()
    }

    fn game(place: &str) -> PresenceTuple {
        tuple(PresenceCode::InGame, Some(place), None)
    }

    #[test]
    fn test_first_observation_is_tracking_started() {
        assert_eq!(
            classify(&offline(), &offline(), true),
            Some(EventLabel::TrackingStarted)
        );
        assert_eq!(
            classify(&offline(), &game("1"), true),
            Some(EventLabel::TrackingStarted)
        );
    }

    #[test]
    fn test_unchanged_is_none() {
        assert_eq!(classify(&game("1"), &game("1"), false), None);
        assert_eq!(classify(&offline(), &offline(), false), None);
    }

    #[test]
    fn test_went_offline() {
        assert_eq!(
            classify(&game("1"), &offline(), false),
            Some(EventLabel::WentOffline)
        );
        let invisible = tuple(PresenceCode::Invisible, None, None);
        assert_eq!(
            classify(&tuple(PresenceCode::OnlineWeb, None, None), &invisible, false),
            Some(EventLabel::WentOffline)
        );
    }

    #[test]
    fn test_offline_beats_joined_game() {
        // Previous was in a game; the new state has a different (absent) context
        let label = classify(&game("123"), &offline(), false);
        assert_eq!(label, Some(EventLabel::WentOffline));
    }

    #[test]
    fn test_came_online_beats_joined_game() {
        assert_eq!(
            classify(&offline(), &game("123"), false),
            Some(EventLabel::CameOnline)
        );
    }

    #[test]
    fn test_came_online_from_invisible() {
        let invisible = tuple(PresenceCode::Invisible, None, None);
        assert_eq!(
            classify(&invisible, &tuple(PresenceCode::OnlineWeb, None, None), false),
            Some(EventLabel::CameOnline)
        );
    }

    #[test]
    fn test_offline_to_invisible_is_status_changed() {
        let invisible = tuple(PresenceCode::Invisible, None, None);
        assert_eq!(
            classify(&offline(), &invisible, false),
            Some(EventLabel::StatusChanged)
        );
    }

    #[test]
    fn test_joined_game() {
        assert_eq!(
            classify(&game("123"), &game("456"), false),
            Some(EventLabel::JoinedGame)
        );
        assert_eq!(
            classify(&tuple(PresenceCode::OnlineWeb, None, None), &game("123"), false),
            Some(EventLabel::JoinedGame)
        );
    }

    #[test]
    fn test_server_hop_is_status_changed() {
        let a = tuple(PresenceCode::InGame, Some("123"), Some("a"));
        let b = tuple(PresenceCode::InGame, Some("123"), Some("b"));
        assert_eq!(classify(&a, &b, false), Some(EventLabel::StatusChanged));
    }

    #[test]
    fn test_entered_studio() {
        let studio = tuple(PresenceCode::InStudio, Some("9"), None);
        assert_eq!(
            classify(&game("1"), &studio, false),
            Some(EventLabel::EnteredStudio)
        );
        let other_studio = tuple(PresenceCode::InStudio, Some("10"), None);
        assert_eq!(
            classify(&studio, &other_studio, false),
            Some(EventLabel::StatusChanged)
        );
    }

    #[test]
    fn test_game_to_website_is_status_changed() {
        assert_eq!(
            classify(&game("1"), &tuple(PresenceCode::OnlineWeb, None, None), false),
            Some(EventLabel::StatusChanged)
        );
    }

    #[test]
    fn test_classify_is_deterministic() {
        let pairs = [
            (offline(), game("1")),
            (game("1"), game("2")),
            (game("2"), offline()),
            (game("2"), game("2")),
        ];
        for (prev, next) in &pairs {
            for first in [true, false] {
                let a = classify(prev, next, first);
                let b = classify(prev, next, first);
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn test_label_text() {
        assert_eq!(EventLabel::TrackingStarted.to_string(), "Tracking Started");
        assert_eq!(EventLabel::JoinedGame.as_str(), "Joined Game");
    }
}
