// Singleton component store

use crate::Error;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// The singleton instance store backing a [`Registry`](crate::Registry).
///
/// Maps each component type to its single instance for one registry's
/// lifetime. Two containers never share instances.
#[derive(Clone)]
pub struct Container {
    instances: Arc<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>>,
}

impl Container {
    pub fn new() -> Self {
        Self {
            instances: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register an instance
    pub fn register<T: Send + Sync + 'static>(&self, instance: T) {
        self.register_by_id(TypeId::of::<T>(), Arc::new(instance));
    }

    /// Register an instance by TypeId (internal use)
    pub fn register_by_id(&self, type_id: TypeId, instance: Arc<dyn Any + Send + Sync>) {
        trace!(type_id = ?type_id, "registering instance by TypeId");
        let mut instances = self.instances.write();
        instances.insert(type_id, instance);
    }

    /// Resolve an instance by type
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        let type_name = std::any::type_name::<T>();

        trace!(component = type_name, "attempting to resolve instance");
        let instances = self.instances.read();

        let result = instances
            .get(&TypeId::of::<T>())
            .and_then(|any| any.clone().downcast::<T>().ok())
            .ok_or_else(|| Error::ComponentNotFound(type_name.to_string()));

        match &result {
            Ok(_) => trace!(component = type_name, "instance resolved"),
            Err(_) => debug!(component = type_name, "instance not found in store"),
        }

        result
    }

    /// Check if an instance is registered
    pub fn has<T: Send + Sync + 'static>(&self) -> bool {
        self.instances.read().contains_key(&TypeId::of::<T>())
    }

    /// Clear all instances
    pub fn clear(&self) {
        let mut instances = self.instances.write();
        let count = instances.len();
        instances.clear();

        debug!(instance_count = count, "cleared component store");
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
