//! Session configuration.

use mazelink_protocol::ProtocolProfile;
use serde::{Deserialize, Serialize};

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "localhost";

/// Port the maze server listens on by default.
pub const DEFAULT_PORT: u16 = 4000;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Everything needed to open one session.
///
/// Only `username` and `level` have no sensible default. Everything else can
/// be left alone:
///
/// ```rust
/// use mazelink_session::SessionConfig;
///
/// let config = SessionConfig::new("alice", "lvl1").with_wait(false);
/// assert_eq!(config.port, 4000);
/// ```
///
/// `#[serde(default)]` means a config file only needs the fields it wants
/// to override; missing ones come from [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Server host name or IP address.
    ///
    /// Default: `"localhost"`.
    pub host: String,

    /// Server TCP port.
    ///
    /// Default: `4000`.
    pub port: u16,

    /// Sent with `USER`. The server closes the session if it does not know
    /// this user.
    pub username: String,

    /// Level code sent with `LEVL`. Servers accept lower-case letters and
    /// digits only.
    pub level: String,

    /// Whether to send `WAIT` right after the handshake and block until a
    /// viewer presses start.
    ///
    /// Default: `true`.
    pub wait: bool,

    /// Level keyword and move alphabet for the server generation in use.
    ///
    /// Default: [`ProtocolProfile::standard`].
    pub profile: ProtocolProfile,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            username: String::new(),
            level: String::new(),
            wait: true,
            profile: ProtocolProfile::standard(),
        }
    }
}

impl SessionConfig {
    /// Creates a config for `username` on `level` with default settings.
    pub fn new(username: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            level: level.into(),
            ..Self::default()
        }
    }

    /// Sets the server host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the server port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enables or disables the `WAIT` step.
    pub fn with_wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    /// Sets the protocol profile.
    pub fn with_profile(mut self, profile: ProtocolProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Returns `host:port`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
