//! Presence Monitor - Polls account presence and reports transitions.
//!
//! This crate wires the core tracker from `presence_tracker` to the outside
//! world: it resolves and polls accounts through a [`PresenceSource`], and
//! delivers classified transitions through a [`Notifier`].
//!
//! # Architecture
//!
//! ```text
//!        Supervisor (one loop per configured account)
//!              ↓
//! ┌─────────────────────────────────────────┐
//! │       PresenceMonitor (per account)      │
//! │  - Resolve account once                  │
//! │  - Poll presence on a fixed interval     │
//! │  - Diff against last good reading        │
//! │  - Classify transition                   │
//! └─────────────────────────────────────────┘
//!          ↓                      ↓
//!   MetadataResolver          Notifier
//!   (game name, best effort)  (Discord webhook, one shot)
//! ```
//!
//! # Core Types
//!
//! - [`PresenceSource`] - Resolves accounts and polls presence
//! - [`MetadataResolver`] - Looks up game names
//! - [`Notifier`] - Delivers presence events
//! - [`PresenceMonitor`] - Per-account loop
//! - [`Supervisor`] - Starts and stops all loops
//!
//! # Plugging in a different channel
//!
//! ```no_run
//! use anyhow::Result;
//! use async_trait::async_trait;
//! use presence_monitor::Notifier;
//! use presence_tracker::PresenceEvent;
//!
//! struct StdoutNotifier;
//!
//! #[async_trait]
//! impl Notifier for StdoutNotifier {
//!     fn name(&self) -> &str {
//!         "stdout"
//!     }
//!
//!     async fn notify(&self, event: &PresenceEvent) -> Result<()> {
//!         println!("{}: {}", event.display_name, event.label);
//!         Ok(())
//!     }
//! }
//! ```

mod error;
mod notifier;
mod source;
pub mod discord;
pub mod roblox;
pub mod runners;
pub mod supervisor;

pub use error::MonitorError;
pub use notifier::Notifier;
pub use runners::monitor::{CycleOutcome, MonitorPhase, MonitorStatus, PresenceMonitor};
pub use source::{MetadataResolver, PresenceSource};
pub use supervisor::Supervisor;
