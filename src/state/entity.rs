use crate::presence::{EntityId, PresenceTuple};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Buckets that elapsed poll time is accounted into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationClass {
    Online,
    Offline,
    /// In a game. Counted on top of `Online`, never instead of it.
    Active,
}

/// Accumulated seconds per duration class since tracking began.
///
/// Values only ever grow; [`CumulativeDurations::add`] ignores negative and
/// non-finite input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeDurations {
    online: f64,
    offline: f64,
    active: f64,
}

impl CumulativeDurations {
    pub fn get(&self, class: DurationClass) -> f64 {
        match class {
            DurationClass::Online => self.online,
            DurationClass::Offline => self.offline,
            DurationClass::Active => self.active,
        }
    }

    pub fn add(&mut self, class: DurationClass, seconds: f64) {
        if !seconds.is_finite() || seconds <= 0.0 {
            return;
        }
        match class {
            DurationClass::Online => self.online += seconds,
            DurationClass::Offline => self.offline += seconds,
            DurationClass::Active => self.active += seconds,
        }
    }

    /// Online + offline, i.e. all time accounted since the first observation.
    pub fn tracked(&self) -> f64 {
        self.online + self.offline
    }
}

/// Last known state of one monitored account.
///
/// Owned by exactly one monitor loop; nothing else reads or writes it.
#[derive(Clone, Debug)]
pub struct EntityState {
    /// Resolved account id (immutable)
    pub entity_id: EntityId,

    /// Name the account was configured under
    pub display_name: String,

    /// Current `(code, context, sub-context)`; offline until the first poll
    pub(crate) tuple: PresenceTuple,

    /// When the current tuple was first observed
    pub(crate) entered_at: Option<DateTime<Utc>>,

    /// Time of the most recent successful observation
    pub(crate) last_observed_at: Option<DateTime<Utc>>,

    pub(crate) durations: CumulativeDurations,

    /// Number of successful observations
    pub(crate) observations: u64,
}

impl EntityState {
    pub fn new(entity_id: EntityId, display_name: impl Into<String>) -> Self {
        Self {
            entity_id,
            display_name: display_name.into(),
            tuple: PresenceTuple::offline(),
            entered_at: None,
            last_observed_at: None,
            durations: CumulativeDurations::default(),
            observations: 0,
        }
    }

    pub fn tuple(&self) -> &PresenceTuple {
        &self.tuple
    }

    pub fn entered_at(&self) -> Option<DateTime<Utc>> {
        self.entered_at
    }

    pub fn last_observed_at(&self) -> Option<DateTime<Utc>> {
        self.last_observed_at
    }

    pub fn durations(&self) -> CumulativeDurations {
        self.durations
    }

    pub fn observations(&self) -> u64 {
        self.observations
    }

    /// True until the first successful poll has been observed.
    pub fn is_untracked(&self) -> bool {
        self.observations == 0
    }
}
