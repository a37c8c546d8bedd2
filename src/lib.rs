// Presence model and transition key
pub mod presence;

// Per-account state tracking
pub mod state;

// Transition classification
pub mod classify;

// Notification event model
pub mod event;

// Configuration loading
pub mod config;

pub use classify::{classify, EventLabel};
pub use event::PresenceEvent;
pub use presence::{EntityId, PresenceCode, PresenceSnapshot, PresenceTuple};
pub use state::{DiffResult, EntityState};
