//! Lifecycle hook execution for registry-managed components.
//!
//! Hooks are registered from the component registration tables during
//! registry build. `on_init` hooks run once the full component set is wired,
//! in supplied order; `on_teardown` hooks run at registry teardown in
//! reverse order (LIFO).

use crate::error::Error;
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, error};

type Instance = Arc<dyn Any + Send + Sync>;

struct HookEntry {
    name: &'static str,
    instance: Instance,
    init: fn(&Instance) -> Result<(), Error>,
    teardown: fn(&Instance),
}

/// Manages lifecycle hooks for all registered components
#[derive(Default)]
pub struct LifecycleManager {
    hooks: Vec<HookEntry>,
}

impl LifecycleManager {
    /// Create a new lifecycle manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component's hook shims
    pub fn register(
        &mut self,
        name: &'static str,
        instance: Instance,
        init: fn(&Instance) -> Result<(), Error>,
        teardown: fn(&Instance),
    ) {
        self.hooks.push(HookEntry {
            name,
            instance,
            init,
            teardown,
        });
    }

    /// Execute all init hooks, in registration order. The first failure
    /// aborts the run and surfaces as a construction error.
    pub fn run_init_hooks(&self) -> Result<(), Error> {
        for hook in self.hooks.iter() {
            (hook.init)(&hook.instance).map_err(|e| {
                error!(component = hook.name, error = %e, "init hook failed");
                Error::Construction(format!("init hook for {} failed: {}", hook.name, e))
            })?;
            debug!(component = hook.name, "init hook completed");
        }
        Ok(())
    }

    /// Execute all teardown hooks in reverse order (LIFO)
    pub fn run_teardown_hooks(&self) {
        for hook in self.hooks.iter().rev() {
            (hook.teardown)(&hook.instance);
            debug!(component = hook.name, "teardown hook completed");
        }
    }

    /// Number of registered hook entries
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Clear all registered hooks, releasing the held instances
    pub fn clear(&mut self) {
        self.hooks.clear();
    }
}
