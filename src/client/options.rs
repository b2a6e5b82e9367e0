//! Connection options.
//!
//! Options are supplied once and stay fixed for the lifetime of a
//! [`Client`](crate::Client). They can be built in code or deserialized from
//! the JSON record a dev server hands to its client runtime.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use hmr_client::Options;
//!
//! let options = Options::new("/_next/webpack-hmr", "")
//!     .with_timeout(Duration::from_secs(1))
//!     .with_log();
//!
//! assert!(options.validate().is_ok());
//! ```
//!
//! # JSON Form
//!
//! ```json
//! { "path": "/_next/webpack-hmr", "assetPrefix": "", "timeout": 5000, "log": false }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default delay before each reconnect attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

// ============================================================================
// Options
// ============================================================================

/// Connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Endpoint suffix appended to the built URL verbatim.
    pub path: String,

    /// Asset prefix; may be empty. An absolute `http(s)://` prefix replaces
    /// the page host in the connection URL.
    #[serde(default)]
    pub asset_prefix: String,

    /// Delay before each reconnect attempt. Zero means the default.
    #[serde(default = "default_timeout", with = "millis")]
    pub timeout: Duration,

    /// Emit a human-readable trace when the connection opens.
    #[serde(default)]
    pub log: bool,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

// ============================================================================
// Constructors
// ============================================================================

impl Options {
    /// Creates options with the default timeout and logging disabled.
    #[must_use]
    pub fn new(path: impl Into<String>, asset_prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            asset_prefix: asset_prefix.into(),
            timeout: DEFAULT_TIMEOUT,
            log: false,
        }
    }

    /// Parses options from their JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the record is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Empty path and prefix; fails [`Options::validate`] until a path is set.
impl Default for Options {
    fn default() -> Self {
        Self::new("", "")
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl Options {
    /// Sets the reconnect delay.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables the connect trace.
    #[inline]
    #[must_use]
    pub fn with_log(mut self) -> Self {
        self.log = true;
        self
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl Options {
    /// Returns the endpoint suffix.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the asset prefix.
    #[inline]
    #[must_use]
    pub fn asset_prefix(&self) -> &str {
        &self.asset_prefix
    }

    /// Returns the effective reconnect delay.
    ///
    /// A zero timeout falls back to [`DEFAULT_TIMEOUT`].
    #[inline]
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `path` is empty.
    pub fn validate(&self) -> Result<()> {
        if self.path.is_empty() {
            return Err(Error::config(
                "Endpoint path is required. Use .path() to set it.\n\
                 Example: Client::builder().path(\"/_next/webpack-hmr\")",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Serde Helpers
// ============================================================================

/// Serializes a [`Duration`] as integer milliseconds.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

// ============================================================================
// Tests
// ============================================================================
