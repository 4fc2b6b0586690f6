// Gantry - a typed synchronous event bus with container-managed components
//
// This library wires two collaboration styles over one registry: direct
// method invocation through injected references, and decoupled
// publish/subscribe through typed events.

// Re-export core functionality
pub use gantry_core::*;

// Re-export the event bus
pub use gantry_events::*;

pub use gantry_core::components;

// Prelude for common imports
pub mod prelude {
    pub use gantry_core::{
        components, BuildContext, Component, ComponentRegistration, Container, Dependency, Error,
        LogConfig, LogFormat, LogLevel, LogOutput, Registry, RegistryBuilder,
    };
    pub use gantry_events::{
        Event, EventBus, EventBusBuilder, EventBusConfig, EventBusError, EventHandler,
        EventHandlerError, EventMetadata,
    };
}
