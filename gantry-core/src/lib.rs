// Core library for the Gantry framework
// This module contains the registry, component contract, and lifecycle runtime

pub mod component;
pub mod container;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod registry;

// Re-export commonly used types
pub use component::{BuildContext, Component, ComponentRegistration, Dependency};
pub use container::Container;
pub use error::Error;
pub use lifecycle::LifecycleManager;
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use registry::{Registry, RegistryBuilder};
