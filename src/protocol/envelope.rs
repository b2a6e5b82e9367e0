//! Notification envelopes.
//!
//! Every notification handed to subscribers is wrapped in an [`Envelope`]
//! that tells a freshly established connection apart from a data-bearing
//! message pushed by the dev server.

// ============================================================================
// Imports
// ============================================================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_str, from_value};

use crate::error::Result;

// ============================================================================
// Envelope
// ============================================================================

/// A notification delivered to subscribers.
///
/// # Format
///
/// ```json
/// { "type": "connected" }
/// { "type": "message", "data": { "action": "built", "hash": "f00" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Envelope {
    /// The transport reported that the connection is open.
    Connected,

    /// A frame received while the connection is open.
    Message {
        /// Frame text parsed as JSON.
        data: Value,
    },
}

impl Envelope {
    /// Parses an inbound text frame into a [`Envelope::Message`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if `text` is not valid JSON.
    pub fn from_frame(text: &str) -> Result<Self> {
        let data = from_str(text)?;
        Ok(Self::Message { data })
    }

    /// Returns `true` for [`Envelope::Connected`].
    #[inline]
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns the message payload, if any.
    #[inline]
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        match self {
            Self::Connected => None,
            Self::Message { data } => Some(data),
        }
    }

    /// Deserializes the message payload into a typed value.
    ///
    /// Returns `Ok(None)` for [`Envelope::Connected`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the payload does not
    /// match `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match self.data() {
            Some(data) => Ok(Some(from_value(data.clone())?)),
            None => Ok(None),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
