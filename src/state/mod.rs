// Per-account state tracking and duration accounting

mod entity;
mod tracker;

pub use entity::{CumulativeDurations, DurationClass, EntityState};
pub use tracker::DiffResult;

#[cfg(test)]
mod tests;
