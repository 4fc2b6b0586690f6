//! Registry: component lifetimes and the subscription index for one
//! isolated run.
//!
//! A registry is built from an explicit, ordered component set. Build
//! performs one upfront resolution pass: validate the dependency tables,
//! construct every instance in dependency order, register subscriptions on
//! the registry-owned bus, then run init hooks. Construction fails fast when
//! a declared dependency is missing from the set.
//!
//! Registries built independently are fully isolated: each owns its store
//! and its bus, so publishing on one never reaches instances owned by
//! another.

use crate::component::{BuildContext, Component, ComponentRegistration};
use crate::container::Container;
use crate::error::Error;
use crate::lifecycle::LifecycleManager;
use gantry_events::{Event, EventBus, EventBusConfig};
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// Owner of component instances and the subscription index for one run
pub struct Registry {
    container: Container,
    bus: EventBus,
    lifecycle: Mutex<LifecycleManager>,
    closed: AtomicBool,
}

impl Registry {
    /// Build a registry from a component set with a default bus.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let registry = Registry::build(components![PrintService, NotifierService])?;
    /// ```
    pub fn build(registrations: Vec<ComponentRegistration>) -> Result<Self, Error> {
        Self::build_with_bus(registrations, EventBus::new())
    }

    fn build_with_bus(
        registrations: Vec<ComponentRegistration>,
        bus: EventBus,
    ) -> Result<Self, Error> {
        debug!(components = registrations.len(), "building registry");

        let mut supplied = HashSet::new();
        for reg in &registrations {
            if !supplied.insert(reg.type_id) {
                return Err(Error::DuplicateComponent(reg.type_name));
            }
        }

        // Every declared dependency slot must name a type in the set.
        for reg in &registrations {
            for dep in (reg.dependencies)() {
                if !supplied.contains(&dep.type_id) {
                    return Err(Error::UnresolvedDependency {
                        component: reg.type_name,
                        dependency: dep.type_name,
                    });
                }
            }
        }

        let container = Container::new();
        let mut lifecycle = LifecycleManager::new();
        let mut instances: HashMap<TypeId, Arc<dyn Any + Send + Sync>> = HashMap::new();

        // Construct in dependency order: each pass builds every component
        // whose dependencies already exist. A pass without progress on a
        // validated set means the remaining components depend on each other.
        let mut remaining = registrations.clone();
        while !remaining.is_empty() {
            let before = remaining.len();
            let mut deferred = Vec::new();

            for reg in remaining {
                let ready = (reg.dependencies)()
                    .iter()
                    .all(|dep| instances.contains_key(&dep.type_id));
                if ready {
                    trace!(component = reg.type_name, "constructing component");
                    let ctx = BuildContext::new(&container, &bus);
                    let instance = (reg.construct)(&ctx)?;
                    container.register_by_id(reg.type_id, instance.clone());
                    instances.insert(reg.type_id, instance);
                } else {
                    deferred.push(reg);
                }
            }

            if deferred.len() == before {
                return Err(Error::CircularDependency(
                    deferred.iter().map(|reg| reg.type_name).collect(),
                ));
            }
            remaining = deferred;
        }

        // Subscriptions and lifecycle hooks follow the supplied order, which
        // fixes dispatch order for handlers of the same event kind.
        for reg in &registrations {
            let instance = &instances[&reg.type_id];
            (reg.subscribe)(instance, &bus);
            lifecycle.register(reg.type_name, instance.clone(), reg.init, reg.teardown);
        }

        lifecycle.run_init_hooks()?;

        debug!("registry build complete");
        Ok(Self {
            container,
            bus,
            lifecycle: Mutex::new(lifecycle),
            closed: AtomicBool::new(false),
        })
    }

    /// Resolve the singleton instance of a component type, for direct
    /// invocation.
    pub fn resolve<C: Component>(&self) -> Result<Arc<C>, Error> {
        self.ensure_open()?;
        self.container.resolve()
    }

    /// Publish an event on the registry-owned bus.
    pub fn publish<E: Event>(&self, event: E) -> Result<(), Error> {
        self.ensure_open()?;
        self.bus.publish(event)?;
        Ok(())
    }

    /// The registry-owned bus
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Release all instances. Teardown hooks run in reverse registration
    /// order; afterwards every registry operation fails with
    /// [`Error::RegistryClosed`] and component-held bus handles refuse to
    /// publish.
    pub fn teardown(&self) -> Result<(), Error> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(Error::RegistryClosed);
        }

        debug!("tearing down registry");
        let mut lifecycle = self.lifecycle.lock();
        lifecycle.run_teardown_hooks();
        lifecycle.clear();
        self.bus.close();
        self.bus.clear();
        self.container.clear();
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::RegistryClosed);
        }
        Ok(())
    }
}

/// Builder for assembling a registry with a fluent API
pub struct RegistryBuilder {
    registrations: Vec<ComponentRegistration>,
    bus_config: EventBusConfig,
}

impl RegistryBuilder {
    /// Create a new registry builder
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
            bus_config: EventBusConfig::default(),
        }
    }

    /// Add a component type to the set
    pub fn component<C: Component>(mut self) -> Self {
        self.registrations.push(ComponentRegistration::of::<C>());
        self
    }

    /// Add a pre-built component set
    pub fn components(mut self, registrations: Vec<ComponentRegistration>) -> Self {
        self.registrations.extend(registrations);
        self
    }

    /// Replace the bus configuration
    pub fn bus_config(mut self, config: EventBusConfig) -> Self {
        self.bus_config = config;
        self
    }

    /// Enable per-handler error containment on the bus
    pub fn continue_on_error(mut self, enabled: bool) -> Self {
        self.bus_config.continue_on_error = enabled;
        self
    }

    /// Set the nested publish depth ceiling on the bus
    pub fn max_cascade_depth(mut self, depth: usize) -> Self {
        self.bus_config.max_cascade_depth = depth;
        self
    }

    /// Build the registry
    pub fn build(self) -> Result<Registry, Error> {
        Registry::build_with_bus(self.registrations, EventBus::with_config(self.bus_config))
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
