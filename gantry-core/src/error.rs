// Error types for the Gantry framework

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("component not found: {0}")]
    ComponentNotFound(String),

    #[error("unresolved dependency: {component} requires {dependency}, which is not in the component set")]
    UnresolvedDependency {
        component: &'static str,
        dependency: &'static str,
    },

    #[error("circular dependency among components: {0:?}")]
    CircularDependency(Vec<&'static str>),

    #[error("duplicate component registration: {0}")]
    DuplicateComponent(&'static str),

    #[error("registry is closed")]
    RegistryClosed,

    #[error("component construction failed: {0}")]
    Construction(String),

    #[error(transparent)]
    Event(#[from] gantry_events::EventBusError),
}
