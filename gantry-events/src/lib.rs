//! Typed publish/subscribe for Gantry
//!
//! This crate provides the in-process event bus: typed subscriptions,
//! synchronous in-order dispatch, and depth-first cascades.
//!
//! ## Features
//!
//! - **Event Bus** - Publish/subscribe event system
//! - **Type-safe** - Dispatch matches on the exact event type
//! - **Synchronous** - Handlers run on the publishing thread, in
//!   registration order, before `publish` returns
//! - **Re-entrant** - Handlers may publish further events; cascades complete
//!   depth-first and are bounded by a configurable ceiling
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gantry_events::*;
//! use std::any::Any;
//!
//! // Define an event
//! #[derive(Debug, Clone)]
//! struct UserCreated {
//!     email: String,
//! }
//!
//! impl Event for UserCreated {
//!     fn event_name(&self) -> &str { "user_created" }
//!     fn as_any(&self) -> &dyn Any { self }
//!     fn clone_event(&self) -> Box<dyn Event> { Box::new(self.clone()) }
//! }
//!
//! // Define a handler
//! struct WelcomeMailer;
//!
//! impl EventHandler<UserCreated> for WelcomeMailer {
//!     fn handle(&self, event: &UserCreated) -> Result<(), EventHandlerError> {
//!         println!("Sending welcome email to {}", event.email);
//!         Ok(())
//!     }
//! }
//!
//! // Use the event bus
//! let bus = EventBus::new();
//! bus.subscribe::<UserCreated, _>(WelcomeMailer);
//! bus.publish(UserCreated { email: "alice@example.com".to_string() })?;
//! # Ok::<(), EventBusError>(())
//! ```
//!
//! ## Error Handling
//!
//! ```rust,ignore
//! match bus.publish(event) {
//!     Ok(()) => println!("All handlers completed"),
//!     Err(EventBusError::HandlerFailed { event, source }) => {
//!         eprintln!("Dispatch of {event} aborted: {source}");
//!     }
//!     Err(e) => eprintln!("Publish error: {}", e),
//! }
//! ```
//!
//! The first handler failure aborts delivery to the remaining handlers by
//! default. `EventBusBuilder::continue_on_error(true)` switches to
//! per-handler containment: failures are logged and dispatch continues.

pub mod bus;
pub mod event;

pub use bus::{EventBus, EventBusBuilder, EventBusConfig, EventBusError};
pub use event::{
    DynEventHandler, Event, EventHandler, EventHandlerError, EventMetadata, TypedEventHandler,
};
