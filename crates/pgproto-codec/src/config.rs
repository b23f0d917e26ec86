//! Framer configuration.
//!
//! Built with chained setters or deserialized from an application config
//! file; missing keys fall back to the defaults.

use serde::{Deserialize, Serialize};

/// Default upper bound for a single message, tag included.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 8 * 1024 * 1024;

/// Default initial capacity of the framer's input buffer.
pub const DEFAULT_INITIAL_CAPACITY: usize = 8 * 1024;

/// Limits and sizing for a [`MessageFramer`](crate::MessageFramer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramerConfig {
    /// Largest accepted message, counting tag and length prefix.
    pub max_message_size: usize,
    /// Bytes reserved up front for the input buffer.
    pub initial_capacity: usize,
}

impl Default for FramerConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl FramerConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum message size.
    pub fn max_message_size(mut self, max: usize) -> Self {
        self.max_message_size = max;
        self
    }

    /// Set the initial buffer capacity.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let cfg = FramerConfig::new().max_message_size(1024).initial_capacity(64);
        assert_eq!(cfg.max_message_size, 1024);
        assert_eq!(cfg.initial_capacity, 64);
    }

    #[test]
    fn default_matches_constants() {
        let cfg = FramerConfig::default();
        assert_eq!(cfg.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert_eq!(cfg.initial_capacity, DEFAULT_INITIAL_CAPACITY);
    }
}
