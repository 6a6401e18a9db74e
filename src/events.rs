//! Process-wide notifications about API traffic.
//!
//! Every successful response is announced as [`ApiEvent::Loaded`] (the
//! `api:loaded` signal). Subscribers only observe. Nothing in the request
//! pipeline waits on them.

use crate::response::RawResponse;
use std::sync::OnceLock;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

static GLOBAL: OnceLock<EventBus> = OnceLock::new();

/// An event published by the request dispatcher.
#[derive(Debug, Clone)]
pub enum ApiEvent {
    /// A request completed with a 2xx status.
    Loaded {
        /// The resolved URL that was requested.
        url: String,
        /// The undecoded response.
        response: RawResponse,
    },
}

impl ApiEvent {
    /// The event name, `"api:loaded"` for [`ApiEvent::Loaded`].
    pub fn name(&self) -> &'static str {
        match self {
            ApiEvent::Loaded { .. } => "api:loaded",
        }
    }
}

/// A broadcast channel of [`ApiEvent`]s.
///
/// Cloning the bus shares the channel. Subscribers that fall more than
/// the channel capacity behind see `RecvError::Lagged` and skip ahead.
///
/// # Examples
///
/// ```
/// use bookie_client::{ApiEvent, EventBus, RawResponse};
///
/// let bus = EventBus::new(8);
/// let mut rx = bus.subscribe();
///
/// bus.publish(ApiEvent::Loaded {
///     url: "https://bookie.example.com/api/v1/alice/ping".to_string(),
///     response: RawResponse::transport_failure("", std::time::Duration::ZERO),
/// });
///
/// let event = rx.try_recv().unwrap();
/// assert_eq!(event.name(), "api:loaded");
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ApiEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribes to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ApiEvent> {
        self.tx.subscribe()
    }

    /// Publishes an event to every current subscriber.
    ///
    /// Publishing with no subscribers is not an error; the event is dropped.
    pub fn publish(&self, event: ApiEvent) {
        let name = event.name();
        match self.tx.send(event) {
            Ok(receivers) => tracing::trace!(event = name, receivers, "Published API event"),
            Err(_) => tracing::trace!(event = name, "No subscribers for API event"),
        }
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// The process-wide bus clients publish to unless configured otherwise.
pub fn global() -> &'static EventBus {
    GLOBAL.get_or_init(EventBus::default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn loaded(url: &str) -> ApiEvent {
        ApiEvent::Loaded {
            url: url.to_string(),
            response: RawResponse::transport_failure("", Duration::ZERO),
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = EventBus::new(4);
        assert_eq!(bus.receiver_count(), 0);
        bus.publish(loaded("http://x"));
    }

    #[test]
    fn test_every_subscriber_sees_event() {
        let bus = EventBus::new(4);
        let mut first = bus.subscribe();
        let mut second = bus.clone().subscribe();

        bus.publish(loaded("http://x/alice/ping"));

        for rx in [&mut first, &mut second] {
            match rx.try_recv().unwrap() {
                ApiEvent::Loaded { url, .. } => assert_eq!(url, "http://x/alice/ping"),
            }
        }
    }

    #[test]
    fn test_global_is_shared() {
        let mut rx = global().subscribe();
        global().publish(loaded("http://global"));
        assert_eq!(rx.try_recv().unwrap().name(), "api:loaded");
    }
}
