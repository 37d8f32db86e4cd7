use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ConnectionState {
    Connected,
    Disconnected(String),
    NotConfigured,
    Unknown,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected(_) => "disconnected",
            ConnectionState::NotConfigured => "not configured",
            ConnectionState::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub market_feed: ConnectionState,
    pub account: ConnectionState,
    pub last_checked: Option<DateTime<Utc>>,
}

impl Default for SystemStatus {
    fn default() -> Self {
        Self {
            market_feed: ConnectionState::Unknown,
            account: ConnectionState::Unknown,
            last_checked: None,
        }
    }
}

impl SystemStatus {
    /// True when the dashboard is running without exchange credentials.
    pub fn is_demo(&self) -> bool {
        self.account == ConnectionState::NotConfigured
    }
}
