use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;


/// Stable account identifier returned by identifier resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observable presence of an account, as reported by the presence API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresenceCode {
    Offline,
    OnlineWeb,
    InGame,
    InStudio,
    Invisible,
}

impl PresenceCode {
    /// Map the API's numeric presence type. Unknown values are treated as offline.
    pub fn from_api(value: i64) -> Self {
        match value {
            1 => PresenceCode::OnlineWeb,
            2 => PresenceCode::InGame,
            3 => PresenceCode::InStudio,
            4 => PresenceCode::Invisible,
            _ => PresenceCode::Offline,
        }
    }

    /// Offline and Invisible both count as "not around".
    pub fn is_offline(self) -> bool {
        matches!(self, PresenceCode::Offline | PresenceCode::Invisible)
    }

    /// Only being in a game counts as active play time.
    pub fn is_active(self) -> bool {
        self == PresenceCode::InGame
    }
}

impl fmt::Display for PresenceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PresenceCode::Offline => "Offline",
            PresenceCode::OnlineWeb => "Online on Website",
            PresenceCode::InGame => "In Game",
            PresenceCode::InStudio => "In Studio",
            PresenceCode::Invisible => "Invisible",
        };
        f.write_str(text)
    }
}

/// The part of a presence reading that defines a transition.
///
/// Two readings are "the same state" exactly when their tuples are equal.
/// Built through [`PresenceTuple::new`], which drops context ids that cannot
/// accompany the presence code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PresenceTuple {
    code: PresenceCode,
    context_id: Option<String>,
    sub_context_id: Option<String>,
}

impl PresenceTuple {
    pub fn new(
        code: PresenceCode,
        context_id: Option<String>,
        sub_context_id: Option<String>,
    ) -> Self {
        if code.is_offline() {
            return Self::offline_as(code);
        }

        let context_id = context_id.filter(|c| !c.is_empty());
        let sub_context_id = match context_id {
            Some(_) => sub_context_id.filter(|s| !s.is_empty()),
            None => None,
        };

        Self {
            code,
            context_id,
            sub_context_id,
        }
    }

    /// Tuple with no context, for Offline or Invisible.
    fn offline_as(code: PresenceCode) -> Self {
        Self {
            code,
            context_id: None,
            sub_context_id: None,
        }
    }

    pub fn offline() -> Self {
        Self::offline_as(PresenceCode::Offline)
    }

    pub fn code(&self) -> PresenceCode {
        self.code
    }

    /// Place the account is in (a Roblox place id).
    pub fn context_id(&self) -> Option<&str> {
        self.context_id.as_deref()
    }

    /// Server instance within the place (a Roblox game/job id).
    pub fn sub_context_id(&self) -> Option<&str> {
        self.sub_context_id.as_deref()
    }
}

/// One successful poll of an account's presence.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PresenceSnapshot {
    pub tuple: PresenceTuple,

    /// Experience (universe) id, used only to look up a game name.
    /// Not part of the transition key.
    pub universe_id: Option<String>,

    pub observed_at: DateTime<Utc>,
}

impl PresenceSnapshot {
    pub fn new(tuple: PresenceTuple, observed_at: DateTime<Utc>) -> Self {
        Self {
            tuple,
            universe_id: None,
            observed_at,
        }
    }

    pub fn with_universe_id(mut self, universe_id: Option<String>) -> Self {
        self.universe_id = if self.tuple.code().is_offline() {
            None
        } else {
            universe_id
        };
        self
    }
}
