//! Connection lifecycle and reconnect backoff.
//!
//! ```text
//!   connecting ──joined──▶ connected ──drop──▶ disconnected
//!        ▲                     │                   │
//!        │                   error                backoff elapsed
//!        │                     ▼                   │
//!        └──reconnect()──── error        connecting ◀┘
//! ```
//!
//! A dropped connection retries on its own; a transport error waits for an
//! explicit [`Connection::reconnect`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Error => "error",
        })
    }
}

/// Configuration for exponential reconnect backoff
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffConfig {
    /// Delay before the first retry
    pub initial: Duration,
    /// Upper bound for any delay
    pub max: Duration,
    /// Growth factor per failed attempt (typically 2.0). Values below 1.0,
    /// and NaN, are treated as 1.0.
    pub multiplier: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl BackoffConfig {
    /// Delay before retry number `attempt` (0-based).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let multiplier = if self.multiplier >= 1.0 {
            self.multiplier
        } else {
            1.0
        };
        let base = self.initial.as_secs_f64() * multiplier.powi(exponent);
        Duration::from_secs_f64(base.min(self.max.as_secs_f64()))
    }
}

#[derive(Debug, Clone)]
pub struct Connection {
    state: ConnectionState,
    backoff: BackoffConfig,
    attempts: u32,
    retry_at: Option<Instant>,
}

impl Connection {
    pub fn new(backoff: BackoffConfig) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            backoff,
            attempts: 0,
            retry_at: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// When the next automatic retry is due.
    pub fn retry_at(&self) -> Option<Instant> {
        self.retry_at
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn connecting(&mut self) {
        self.transition(ConnectionState::Connecting);
        self.retry_at = None;
    }

    pub fn connected(&mut self) {
        self.transition(ConnectionState::Connected);
        self.attempts = 0;
        self.retry_at = None;
    }

    /// The link dropped; schedule a retry.
    pub fn disconnected(&mut self, now: Instant) {
        let delay = self.backoff.delay(self.attempts);
        self.attempts = self.attempts.saturating_add(1);
        self.retry_at = Some(now + delay);
        tracing::debug!(?delay, attempt = self.attempts, "reconnect scheduled");
        self.transition(ConnectionState::Disconnected);
    }

    /// The transport failed; stay down until [`Connection::reconnect`].
    pub fn failed(&mut self) {
        self.retry_at = None;
        self.transition(ConnectionState::Error);
    }

    /// Start the scheduled retry if it is due.
    pub fn poll_reconnect(&mut self, now: Instant) -> bool {
        match (self.state, self.retry_at) {
            (ConnectionState::Disconnected, Some(at)) if now >= at => {
                self.connecting();
                true
            }
            _ => false,
        }
    }

    /// Explicit reconnect, the only way out of [`ConnectionState::Error`].
    pub fn reconnect(&mut self) -> bool {
        match self.state {
            ConnectionState::Error | ConnectionState::Disconnected => {
                self.attempts = 0;
                self.connecting();
                true
            }
            _ => false,
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state != next {
            tracing::info!(from = %self.state, to = %next, "connection state changed");
            self.state = next;
        }
    }
}
