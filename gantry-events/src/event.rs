//! Event definitions and traits

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;
use uuid::Uuid;

use crate::bus::EventBusError;

/// Event trait
///
/// All events must implement this trait to be published through the event bus.
/// Dispatch matches on the concrete Rust type of the event: two event kinds
/// with identical payload shape are still distinct dispatch targets.
pub trait Event: Send + Sync + Debug + 'static {
    /// Get event name
    fn event_name(&self) -> &str;

    /// Cast to Any for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Clone the event (box clone pattern)
    fn clone_event(&self) -> Box<dyn Event>;
}

/// Base event metadata
///
/// Optional provenance for events that want it. The bus never inspects
/// metadata; dispatch is by type identity only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event ID
    pub id: Uuid,

    /// Event name/type
    pub name: String,

    /// Timestamp when event was created
    pub timestamp: DateTime<Utc>,

    /// Optional correlation ID for tracing
    pub correlation_id: Option<Uuid>,

    /// Optional causation ID (ID of the event that caused this event)
    pub causation_id: Option<Uuid>,

    /// Custom metadata
    pub metadata: serde_json::Value,
}

impl EventMetadata {
    /// Create new event metadata
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            causation_id: None,
            metadata: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Metadata for an event published from inside a handler, chained to the
    /// event that triggered it. Correlation carries across the whole cascade;
    /// causation points at the immediate parent.
    pub fn caused_by(name: impl Into<String>, parent: &EventMetadata) -> Self {
        Self::new(name)
            .with_correlation_id(parent.correlation_id.unwrap_or(parent.id))
            .with_causation_id(parent.id)
    }

    /// Set correlation ID
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Set causation ID
    pub fn with_causation_id(mut self, id: Uuid) -> Self {
        self.causation_id = Some(id);
        self
    }
}

/// Event handler trait
///
/// Implemented by a component once per event kind it subscribes to. Handlers
/// run synchronously on the publishing thread and may publish further events.
pub trait EventHandler<E: Event>: Send + Sync {
    /// Handle the event
    fn handle(&self, event: &E) -> Result<(), EventHandlerError>;
}

// Registries hold components as Arc and subscribe the shared instance.
impl<E: Event, H: EventHandler<E> + ?Sized> EventHandler<E> for Arc<H> {
    fn handle(&self, event: &E) -> Result<(), EventHandlerError> {
        (**self).handle(event)
    }
}

/// Event handler error
#[derive(Debug, thiserror::Error)]
pub enum EventHandlerError {
    #[error("handler failed: {0}")]
    HandlerFailed(String),

    #[error("nested publish failed: {0}")]
    Publish(#[source] Box<EventBusError>),
}

impl From<EventBusError> for EventHandlerError {
    fn from(err: EventBusError) -> Self {
        Self::Publish(Box::new(err))
    }
}

/// Type-erased event handler
pub trait DynEventHandler: Send + Sync {
    /// Handle event (type-erased)
    fn handle_dyn(&self, event: &dyn Event) -> Result<(), EventHandlerError>;
}

/// Wrapper for typed event handlers
pub struct TypedEventHandler<E: Event, H: EventHandler<E>> {
    handler: H,
    _phantom: std::marker::PhantomData<E>,
}

impl<E: Event, H: EventHandler<E>> TypedEventHandler<E, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<E: Event, H: EventHandler<E> + 'static> DynEventHandler for TypedEventHandler<E, H> {
    fn handle_dyn(&self, event: &dyn Event) -> Result<(), EventHandlerError> {
        if let Some(typed_event) = event.as_any().downcast_ref::<E>() {
            self.handler.handle(typed_event)
        } else {
            Err(EventHandlerError::HandlerFailed(format!(
                "event type mismatch for subscription (got `{}`)",
                event.event_name()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct TestEvent {
        metadata: EventMetadata,
        data: String,
    }

    impl TestEvent {
        fn new(data: String) -> Self {
            Self {
                metadata: EventMetadata::new("test_event"),
                data,
            }
        }
    }

    impl Event for TestEvent {
        fn event_name(&self) -> &str {
            &self.metadata.name
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn clone_event(&self) -> Box<dyn Event> {
            Box::new(self.clone())
        }
    }

    #[derive(Debug, Clone, Copy)]
    struct OtherEvent;

    impl Event for OtherEvent {
        fn event_name(&self) -> &str {
            "other_event"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn clone_event(&self) -> Box<dyn Event> {
            Box::new(*self)
        }
    }

    struct EchoHandler;

    impl EventHandler<TestEvent> for EchoHandler {
        fn handle(&self, event: &TestEvent) -> Result<(), EventHandlerError> {
            if event.data.is_empty() {
                return Err(EventHandlerError::HandlerFailed("empty payload".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_event_metadata() {
        let metadata = EventMetadata::new("test_event").with_correlation_id(Uuid::new_v4());

        assert_eq!(metadata.name, "test_event");
        assert!(metadata.correlation_id.is_some());
    }

    #[test]
    fn test_caused_by_chains_ids() {
        let parent = EventMetadata::new("parent");
        let child = EventMetadata::caused_by("child", &parent);

        assert_eq!(child.causation_id, Some(parent.id));
        assert_eq!(child.correlation_id, Some(parent.id));

        let grandchild = EventMetadata::caused_by("grandchild", &child);
        assert_eq!(grandchild.causation_id, Some(child.id));
        assert_eq!(grandchild.correlation_id, Some(parent.id));
    }

    #[test]
    fn test_typed_handler_dispatches_matching_event() {
        let handler: TypedEventHandler<TestEvent, _> = TypedEventHandler::new(EchoHandler);
        let event = TestEvent::new("hello".to_string());

        assert!(handler.handle_dyn(&event).is_ok());
    }

    #[test]
    fn test_typed_handler_rejects_mismatched_event() {
        let handler: TypedEventHandler<TestEvent, _> = TypedEventHandler::new(EchoHandler);

        let result = handler.handle_dyn(&OtherEvent);
        assert!(matches!(result, Err(EventHandlerError::HandlerFailed(_))));
    }

    #[test]
    fn test_arc_handler_delegates() {
        let handler: Arc<EchoHandler> = Arc::new(EchoHandler);
        let event = TestEvent::new("hello".to_string());

        assert!(handler.handle(&event).is_ok());
    }
}
