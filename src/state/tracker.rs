use crate::presence::{PresenceSnapshot, PresenceTuple};
use crate::state::entity::{CumulativeDurations, DurationClass, EntityState};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Outcome of feeding one snapshot into an [`EntityState`].
#[derive(Clone, Debug, PartialEq)]
pub struct DiffResult {
    /// This was the first successful observation of the account
    pub first_observation: bool,

    /// Tuple differs from the stored one (always true on the first observation)
    pub changed: bool,

    /// Tuple before this observation (equal to `current` on the first one)
    pub previous: PresenceTuple,

    pub current: PresenceTuple,

    /// Seconds spent in `previous`; zero unless `changed`
    pub duration_in_previous_state: f64,

    /// Duration counters after accounting this observation
    pub durations: CumulativeDurations,

    pub observed_at: DateTime<Utc>,
}

impl EntityState {
    /// Account elapsed time and diff the snapshot against the stored tuple.
    ///
    /// Elapsed time since the previous observation is credited to the class of
    /// the state the account was in *before* this snapshot. Timestamps that go
    /// backwards are treated as zero elapsed and never rewind stored times.
    pub fn observe(&mut self, snapshot: &PresenceSnapshot) -> DiffResult {
        let observed_at = snapshot.observed_at;
        let first_observation = self.is_untracked();

        let last = self.last_observed_at.unwrap_or(observed_at);
        let elapsed = seconds_between(last, observed_at);

        let code = self.tuple.code();
        if code.is_offline() {
            self.durations.add(DurationClass::Offline, elapsed);
        } else {
            self.durations.add(DurationClass::Online, elapsed);
            if code.is_active() {
                self.durations.add(DurationClass::Active, elapsed);
            }
        }

        if observed_at > last || first_observation {
            self.last_observed_at = Some(observed_at);
        }
        self.observations += 1;

        let previous = if first_observation {
            snapshot.tuple.clone()
        } else {
            self.tuple.clone()
        };
        let changed = first_observation || previous != snapshot.tuple;

        let mut duration_in_previous_state = 0.0;
        if changed {
            let entered_at = self.entered_at.unwrap_or(observed_at);
            duration_in_previous_state = seconds_between(entered_at, observed_at);

            self.tuple = snapshot.tuple.clone();
            if observed_at > entered_at || self.entered_at.is_none() {
                self.entered_at = Some(observed_at);
            }

            debug!(
                entity_id = %self.entity_id,
                from = ?previous.code(),
                to = ?self.tuple.code(),
                first_observation,
                "Presence state changed"
            );
        }

        DiffResult {
            first_observation,
            changed,
            previous,
            current: self.tuple.clone(),
            duration_in_previous_state,
            durations: self.durations,
            observed_at,
        }
    }
}

/// Non-negative seconds from `from` to `to`, millisecond resolution.
fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let millis = (to - from).num_milliseconds();
    if millis <= 0 {
        0.0
    } else {
        millis as f64 / 1000.0
    }
}
