//! Component contract and registration tables.
//!
//! A component declares everything the registry needs as explicit tables: a
//! constructor over a [`BuildContext`], a static dependency list for its
//! direct-call references, and a subscription hook run once at build time.
//! There is no runtime reflection and no annotation scanning; the
//! [`ComponentRegistration`] descriptor is the whole contract.
//!
//! ## Two calling conventions
//!
//! Direct operations are ordinary methods, reachable by whoever resolved the
//! instance; their collaborators are `Arc` fields wired at construction.
//! Event handlers are [`EventHandler`](gantry_events::EventHandler) impls
//! registered in [`Component::subscriptions`], invoked only by the bus, and
//! indifferent to whether zero, one, or many listeners exist.

use crate::container::Container;
use crate::error::Error;
use gantry_events::EventBus;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Resolution context handed to component constructors during registry
/// build. Exposes the instances constructed so far and the registry-owned
/// bus.
pub struct BuildContext<'a> {
    container: &'a Container,
    bus: &'a EventBus,
}

impl<'a> BuildContext<'a> {
    pub(crate) fn new(container: &'a Container, bus: &'a EventBus) -> Self {
        Self { container, bus }
    }

    /// Resolve a dependency declared in [`Component::dependencies`].
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        self.container.resolve()
    }

    /// A handle to the registry-owned bus, for components that publish.
    pub fn bus(&self) -> EventBus {
        self.bus.clone()
    }
}

/// A unit of behavior managed by a [`Registry`](crate::Registry).
pub trait Component: Send + Sync + 'static {
    /// Construct the instance, resolving direct-call references from `ctx`.
    fn construct(ctx: &BuildContext<'_>) -> Result<Self, Error>
    where
        Self: Sized;

    /// Component types this component resolves in [`Component::construct`].
    /// Every entry must be present in the registry's component set.
    fn dependencies() -> Vec<Dependency>
    where
        Self: Sized,
    {
        Vec::new()
    }

    /// Register this instance's event subscriptions. Called exactly once at
    /// build time; subscriptions cannot change while the registry runs.
    fn subscriptions(instance: &Arc<Self>, bus: &EventBus)
    where
        Self: Sized,
    {
        let _ = (instance, bus);
    }

    /// Called after the whole component set is wired, in supplied order.
    fn on_init(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Called during teardown, in reverse supplied order.
    fn on_teardown(&self) {}
}

/// A declared direct-call dependency slot
#[derive(Clone, Copy)]
pub struct Dependency {
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl Dependency {
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }
}

impl std::fmt::Debug for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dependency")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Registration information for a component
#[derive(Clone)]
pub struct ComponentRegistration {
    /// TypeId of the component
    pub type_id: TypeId,
    /// Human-readable type name
    pub type_name: &'static str,
    /// Declared direct-call dependency slots
    pub dependencies: fn() -> Vec<Dependency>,
    /// Factory producing the type-erased singleton
    pub construct: fn(&BuildContext<'_>) -> Result<Arc<dyn Any + Send + Sync>, Error>,
    /// Registers the instance's subscriptions on the registry bus
    pub subscribe: fn(&Arc<dyn Any + Send + Sync>, &EventBus),
    /// Init hook shim
    pub init: fn(&Arc<dyn Any + Send + Sync>) -> Result<(), Error>,
    /// Teardown hook shim
    pub teardown: fn(&Arc<dyn Any + Send + Sync>),
}

impl ComponentRegistration {
    /// Build the registration descriptor for a component type.
    pub fn of<C: Component>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            type_name: std::any::type_name::<C>(),
            dependencies: C::dependencies,
            construct: |ctx| {
                let instance = C::construct(ctx)?;
                Ok(Arc::new(instance) as Arc<dyn Any + Send + Sync>)
            },
            subscribe: |instance, bus| {
                if let Ok(typed) = instance.clone().downcast::<C>() {
                    C::subscriptions(&typed, bus);
                }
            },
            init: |instance| match instance.clone().downcast::<C>() {
                Ok(typed) => typed.on_init(),
                Err(_) => Ok(()),
            },
            teardown: |instance| {
                if let Ok(typed) = instance.clone().downcast::<C>() {
                    typed.on_teardown();
                }
            },
        }
    }
}

impl std::fmt::Debug for ComponentRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistration")
            .field("type_id", &self.type_id)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Helper macro to build a component set
///
/// ```rust,ignore
/// let registry = Registry::build(components![PrintService, NotifierService])?;
/// ```
#[macro_export]
macro_rules! components {
    ($($component:ty),* $(,)?) => {
        vec![$($crate::ComponentRegistration::of::<$component>()),*]
    };
}
