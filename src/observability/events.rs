//! Lifecycle events
//!
//! Events are explicit and typed. Each is emitted as the `event` field of
//! a structured tracing record.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Startup begins
    BootStart,
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Seed documents loaded into the store
    SeedLoaded,

    // Listing
    /// A list request produced an envelope
    ListExecuted,
    /// A list request failed
    ListFailed,

    // Server
    /// HTTP listener bound
    ServerListening,
}

impl Event {
    /// Stable upper-snake name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BOOT_START",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SeedLoaded => "SEED_LOADED",
            Event::ListExecuted => "LIST_EXECUTED",
            Event::ListFailed => "LIST_FAILED",
            Event::ServerListening => "SERVER_LISTENING",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
