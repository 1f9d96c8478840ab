//! Data models for zyxel-presence

use std::fmt;

use chrono::{DateTime, Utc};

// ============================================================================
// Router Models
// ============================================================================

/// A DHCP client the router reports as active.
///
/// Identity is all five fields together; there is no separate id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDevice {
    pub name: String,
    pub ip: String,
    pub mac: String,
    pub net: String,
    pub net_number: i32,
}

/// Encrypted router credentials plus the trust anchor for the router's
/// self-signed certificate. Never persisted.
#[derive(Clone)]
pub struct RouterCredentials {
    pub encrypted_username: String,
    pub encrypted_password: String,
    pub key: String,
    pub router_address: String,
    pub thumbprint: String,
}

impl fmt::Debug for RouterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterCredentials")
            .field("encrypted_username", &"<redacted>")
            .field("encrypted_password", &"<redacted>")
            .field("key", &"<redacted>")
            .field("router_address", &self.router_address)
            .field("thumbprint", &self.thumbprint)
            .finish()
    }
}

/// Session key issued by the router on login, valid for the current run only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// History Models
// ============================================================================

/// One continuous observed-presence interval of a device identity
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ActiveDeviceRecord {
    pub active_device_id: i64,
    pub name: String,
    pub ip: String,
    pub mac: String,
    pub net: String,
    pub net_number: i32,
    pub starting: DateTime<Utc>,
    pub ending: DateTime<Utc>,
}
