//! Real-time WebSocket engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Capacity of each connection's group-event inbox.
    #[serde(default = "default_inbox_buffer")]
    pub inbox_buffer_size: usize,
    /// Capacity of each connection's outbound frame queue.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
    /// Per-member delivery timeout during a group publish, in milliseconds.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_ms: u64,
    /// WebSocket ping interval in seconds (0 disables pings).
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Maximum accepted inbound frame length in bytes.
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
}

impl RealtimeConfig {
    /// Smallest usable inbox: a sender's own echo plus one peer event.
    pub const MIN_INBOX_BUFFER: usize = 2;

    /// Rejects settings the broker cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.inbox_buffer_size < Self::MIN_INBOX_BUFFER {
            return Err(AppError::configuration(format!(
                "realtime.inbox_buffer_size must be at least {}, got {}",
                Self::MIN_INBOX_BUFFER,
                self.inbox_buffer_size
            )));
        }
        if self.outbound_buffer_size == 0 {
            return Err(AppError::configuration(
                "realtime.outbound_buffer_size must be positive",
            ));
        }
        Ok(())
    }

    /// Per-member delivery timeout as a [`Duration`].
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            inbox_buffer_size: default_inbox_buffer(),
            outbound_buffer_size: default_outbound_buffer(),
            send_timeout_ms: default_send_timeout(),
            ping_interval_seconds: default_ping_interval(),
            max_message_length: default_max_message_length(),
        }
    }
}

fn default_inbox_buffer() -> usize {
    64
}

fn default_outbound_buffer() -> usize {
    64
}

fn default_send_timeout() -> u64 {
    2_000
}

fn default_ping_interval() -> u64 {
    30
}

fn default_max_message_length() -> usize {
    65_536
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RealtimeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_inbox_smaller_than_echo_plus_peer() {
        for size in [0, 1] {
            let config = RealtimeConfig {
                inbox_buffer_size: size,
                ..RealtimeConfig::default()
            };
            let err = config.validate().unwrap_err();
            assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
        }

        let config = RealtimeConfig {
            inbox_buffer_size: RealtimeConfig::MIN_INBOX_BUFFER,
            ..RealtimeConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
