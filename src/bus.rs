//! Subscriber fan-out.
//!
//! The [`EventBus`] keeps an append-only, ordered list of callbacks and hands
//! every [`Envelope`] to each of them in registration order.
//!
//! # Failure Semantics
//!
//! Subscribers are infallible callbacks. A frame that is not valid JSON is
//! rejected by [`EventBus::dispatch_frame`] before any envelope exists, so
//! no subscriber sees it and the error is returned to the caller. A
//! subscriber that panics is not isolated here: the panic unwinds out of
//! [`EventBus::dispatch`] and the remaining subscribers for that event are
//! skipped. The [`Client`](crate::Client) event loop catches the unwind, so
//! the next event is dispatched normally.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::error::Result;
use crate::protocol::Envelope;

// ============================================================================
// Types
// ============================================================================

/// Subscriber callback type.
pub type Subscriber = Arc<dyn Fn(&Envelope) + Send + Sync>;

// ============================================================================
// EventBus
// ============================================================================

/// Ordered fan-out of envelopes to registered subscribers.
///
/// # Example
///
/// ```
/// use hmr_client::{Envelope, EventBus};
///
/// let bus = EventBus::new();
/// bus.register(|envelope| println!("first: {envelope:?}"));
/// bus.register(|envelope| println!("second: {envelope:?}"));
/// bus.dispatch(&Envelope::Connected);
/// ```
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<Subscriber>>,
}

impl EventBus {
    /// Creates an empty bus.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a subscriber.
    ///
    /// The same callback may be registered more than once and is then
    /// invoked once per registration.
    pub fn register<F>(&self, subscriber: F)
    where
        F: Fn(&Envelope) + Send + Sync + 'static,
    {
        self.subscribers.write().push(Arc::new(subscriber));
    }

    /// Invokes every subscriber in registration order.
    ///
    /// Works on a snapshot of the list, so a subscriber may register further
    /// subscribers; those see the next event, not this one.
    pub fn dispatch(&self, envelope: &Envelope) {
        let subscribers = self.subscribers.read().clone();

        trace!(subscribers = subscribers.len(), ?envelope, "Dispatching envelope");

        for subscriber in &subscribers {
            subscriber(envelope);
        }
    }

    /// Parses a text frame and dispatches it as [`Envelope::Message`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) without invoking any
    /// subscriber if `text` is not valid JSON.
    pub fn dispatch_frame(&self, text: &str) -> Result<Envelope> {
        let envelope = Envelope::from_frame(text)?;
        self.dispatch(&envelope);
        Ok(envelope)
    }

    /// Returns the number of registered subscribers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Returns `true` if no subscriber is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
