//! Event Bus implementation

use crate::event::{DynEventHandler, Event, EventHandler, EventHandlerError, TypedEventHandler};
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, error, trace, warn};

/// Event bus for in-process event publishing and handling.
///
/// Dispatch is synchronous: `publish` invokes every matching handler on the
/// calling thread, in registration order, and only returns once all of them
/// (and anything they transitively published) have completed. Handlers may
/// re-enter the bus with further publishes; such cascades run depth-first and
/// are bounded by [`EventBusConfig::max_cascade_depth`].
///
/// Cloning the bus is cheap and yields a handle to the same subscription
/// index, so components can hold their own handle for publishing.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

struct BusInner {
    /// Handlers registered for each event type
    handlers: DashMap<TypeId, Vec<Arc<dyn DynEventHandler>>>,

    /// Configuration
    config: EventBusConfig,

    /// Current publish nesting depth on this bus
    depth: AtomicUsize,

    /// Set once the owning registry tears down
    closed: AtomicBool,
}

/// Event bus configuration
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Continue dispatching to remaining handlers after one fails.
    ///
    /// Off by default: the first failure aborts the publish and propagates
    /// to the caller. Enabling this is the documented deviation for callers
    /// wanting per-handler containment.
    pub continue_on_error: bool,

    /// Enable dispatch logging
    pub enable_logging: bool,

    /// Ceiling on nested publish depth before failing with
    /// [`EventBusError::CascadeTooDeep`]
    pub max_cascade_depth: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            continue_on_error: false,
            enable_logging: true,
            max_cascade_depth: 64,
        }
    }
}

/// Decrements the cascade depth counter on every exit path out of `publish`.
struct DepthGuard<'a>(&'a AtomicUsize);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl EventBus {
    /// Create new event bus
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// Create event bus with custom config
    pub fn with_config(config: EventBusConfig) -> Self {
        Self {
            inner: Arc::new(BusInner {
                handlers: DashMap::new(),
                config,
                depth: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Subscribe a handler to an event type
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let bus = EventBus::new();
    /// bus.subscribe::<MyEvent, _>(MyHandler::new());
    /// ```
    pub fn subscribe<E, H>(&self, handler: H)
    where
        E: Event,
        H: EventHandler<E> + 'static,
    {
        if self.is_closed() {
            warn!("subscribe on a closed event bus ignored");
            return;
        }

        let type_id = TypeId::of::<E>();
        let handler: Arc<dyn DynEventHandler> = Arc::new(TypedEventHandler::<E, H>::new(handler));

        self.inner.handlers.entry(type_id).or_default().push(handler);

        if self.inner.config.enable_logging {
            debug!(event_type = std::any::type_name::<E>(), "subscribed handler");
        }
    }

    /// Publish an event
    ///
    /// All handlers registered for this event's exact type are invoked in
    /// registration order. Publishing an event nobody subscribed to is a
    /// silent no-op: decoupled publishers must not care whether anyone is
    /// listening.
    ///
    /// With default configuration the first handler error aborts delivery to
    /// the remaining handlers and is returned as
    /// [`EventBusError::HandlerFailed`]; handlers that already ran are not
    /// rolled back.
    pub fn publish<E: Event>(&self, event: E) -> Result<(), EventBusError> {
        if self.is_closed() {
            return Err(EventBusError::BusClosed);
        }

        let depth = self.inner.depth.fetch_add(1, Ordering::SeqCst) + 1;
        let _depth = DepthGuard(&self.inner.depth);
        if depth > self.inner.config.max_cascade_depth {
            return Err(EventBusError::CascadeTooDeep { depth });
        }

        if self.inner.config.enable_logging {
            debug!(event = event.event_name(), depth, "publishing event");
        }

        // Clone the handler list out of the map so no shard lock is held
        // while handlers run; a handler is free to publish again.
        let handlers: Vec<Arc<dyn DynEventHandler>> =
            match self.inner.handlers.get(&TypeId::of::<E>()) {
                Some(entry) => entry.clone(),
                None => {
                    if self.inner.config.enable_logging {
                        trace!(event = event.event_name(), "no subscribers for event");
                    }
                    return Ok(());
                }
            };

        for handler in handlers.iter() {
            if let Err(e) = handler.handle_dyn(&event) {
                if self.inner.config.continue_on_error {
                    error!(
                        event = event.event_name(),
                        error = %e,
                        "handler failed, continuing with remaining handlers"
                    );
                } else {
                    return Err(EventBusError::HandlerFailed {
                        event: event.event_name().to_string(),
                        source: e,
                    });
                }
            }
        }

        Ok(())
    }

    /// Unsubscribe all handlers for an event type
    pub fn unsubscribe<E: Event>(&self) {
        self.inner.handlers.remove(&TypeId::of::<E>());

        if self.inner.config.enable_logging {
            debug!(
                event_type = std::any::type_name::<E>(),
                "unsubscribed all handlers"
            );
        }
    }

    /// Clear all handlers
    pub fn clear(&self) {
        self.inner.handlers.clear();
    }

    /// Get handler count for an event type
    pub fn handler_count<E: Event>(&self) -> usize {
        self.inner
            .handlers
            .get(&TypeId::of::<E>())
            .map(|h| h.len())
            .unwrap_or(0)
    }

    /// Close the bus. Subsequent publishes fail with
    /// [`EventBusError::BusClosed`], including through clones held by
    /// components.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }

    /// Whether the bus has been closed
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Event bus errors
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("event bus is closed")]
    BusClosed,

    #[error("event cascade exceeded the depth ceiling at depth {depth}")]
    CascadeTooDeep { depth: usize },

    #[error("handler failed while dispatching `{event}`: {source}")]
    HandlerFailed {
        event: String,
        #[source]
        source: EventHandlerError,
    },
}

/// Event bus builder
pub struct EventBusBuilder {
    config: EventBusConfig,
}

impl EventBusBuilder {
    /// Create new event bus builder
    pub fn new() -> Self {
        Self {
            config: EventBusConfig::default(),
        }
    }

    /// Enable/disable continue on error
    pub fn continue_on_error(mut self, enabled: bool) -> Self {
        self.config.continue_on_error = enabled;
        self
    }

    /// Enable/disable logging
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.config.enable_logging = enabled;
        self
    }

    /// Set the nested publish depth ceiling
    pub fn max_cascade_depth(mut self, depth: usize) -> Self {
        self.config.max_cascade_depth = depth;
        self
    }

    /// Build the event bus
    pub fn build(self) -> EventBus {
        EventBus::with_config(self.config)
    }
}

impl Default for EventBusBuilder {
    fn default() -> Self {
        Self::new()
    }
}
