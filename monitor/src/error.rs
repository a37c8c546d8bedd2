use std::fmt;

/// Failures a monitor loop can run into, split by how the loop reacts.
///
/// Resolution failures stop monitoring of that account for the rest of the
/// process lifetime. Everything else costs at most one cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorError {
    /// Name did not resolve to an account
    NotFound(String),
    /// Resolution call itself failed
    Resolution(String),
    /// Presence poll failed (network, status, malformed payload)
    Poll(String),
    /// Game name lookup failed
    Metadata(String),
    /// Notifier could not deliver an event
    Delivery(String),
}

impl MonitorError {
    pub fn resolution(err: &anyhow::Error) -> Self {
        MonitorError::Resolution(format!("{:#}", err))
    }

    pub fn poll(err: &anyhow::Error) -> Self {
        MonitorError::Poll(format!("{:#}", err))
    }

    pub fn metadata(err: &anyhow::Error) -> Self {
        MonitorError::Metadata(format!("{:#}", err))
    }

    pub fn delivery(err: &anyhow::Error) -> Self {
        MonitorError::Delivery(format!("{:#}", err))
    }

    /// Fatal errors end monitoring of the account.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MonitorError::NotFound(_) | MonitorError::Resolution(_))
    }

    /// Short tag for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            MonitorError::NotFound(_) => "not_found",
            MonitorError::Resolution(_) => "resolution",
            MonitorError::Poll(_) => "poll",
            MonitorError::Metadata(_) => "metadata",
            MonitorError::Delivery(_) => "delivery",
        }
    }
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorError::NotFound(name) => write!(f, "user not found: {}", name),
            MonitorError::Resolution(e) => write!(f, "failed to resolve user: {}", e),
            MonitorError::Poll(e) => write!(f, "presence poll failed: {}", e),
            MonitorError::Metadata(e) => write!(f, "game lookup failed: {}", e),
            MonitorError::Delivery(e) => write!(f, "notification delivery failed: {}", e),
        }
    }
}

impl std::error::Error for MonitorError {}
