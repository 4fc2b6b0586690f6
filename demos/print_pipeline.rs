//! Runs the same interaction over two component sets to contrast the two
//! calling conventions: a direct call always reaches the statically wired
//! notifier, while a published event reaches whatever the current set
//! subscribed, including nobody.
//!
//! ```text
//! cargo run --example print_pipeline
//! ```

use gantry::prelude::*;
use std::any::Any;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct PrintRequested {
    message: String,
    metadata: EventMetadata,
}

impl PrintRequested {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            metadata: EventMetadata::new("print_requested"),
        }
    }
}

impl Event for PrintRequested {
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

#[derive(Debug, Clone)]
struct MessagePrinted {
    message: String,
    metadata: EventMetadata,
}

impl Event for MessagePrinted {
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

struct NotifierService;

impl NotifierService {
    fn notify_printed(&self, message: &str) {
        println!("notifier: message '{message}' has been sent");
    }
}

impl Component for NotifierService {
    fn construct(_ctx: &BuildContext<'_>) -> Result<Self, Error> {
        Ok(Self)
    }

    fn subscriptions(instance: &Arc<Self>, bus: &EventBus) {
        bus.subscribe::<MessagePrinted, _>(instance.clone());
    }
}

impl EventHandler<MessagePrinted> for NotifierService {
    fn handle(&self, event: &MessagePrinted) -> Result<(), EventHandlerError> {
        self.notify_printed(&event.message);
        Ok(())
    }
}

struct PrintService {
    notifier: Arc<NotifierService>,
    bus: EventBus,
}

impl PrintService {
    fn print_internal(&self, message: &str) {
        println!("printer: printing message: {message}");
    }

    /// Direct operation: the followup notifier is wired at construction.
    fn print_message(&self, message: &str) {
        self.print_internal(message);
        self.notifier.notify_printed(message);
    }
}

impl Component for PrintService {
    fn construct(ctx: &BuildContext<'_>) -> Result<Self, Error> {
        Ok(Self {
            notifier: ctx.resolve::<NotifierService>()?,
            bus: ctx.bus(),
        })
    }

    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::of::<NotifierService>()]
    }

    fn subscriptions(instance: &Arc<Self>, bus: &EventBus) {
        bus.subscribe::<PrintRequested, _>(instance.clone());
    }
}

impl EventHandler<PrintRequested> for PrintService {
    fn handle(&self, event: &PrintRequested) -> Result<(), EventHandlerError> {
        self.print_internal(&event.message);
        // Republish instead of calling anyone: the followup is whatever is
        // currently subscribed to the printed-message kind.
        self.bus.publish(MessagePrinted {
            message: event.message.clone(),
            metadata: EventMetadata::caused_by("message_printed", &event.metadata),
        })?;
        Ok(())
    }
}

struct RequestAuditor;

impl Component for RequestAuditor {
    fn construct(_ctx: &BuildContext<'_>) -> Result<Self, Error> {
        Ok(Self)
    }

    fn subscriptions(instance: &Arc<Self>, bus: &EventBus) {
        bus.subscribe::<PrintRequested, _>(instance.clone());
    }
}

impl EventHandler<PrintRequested> for RequestAuditor {
    fn handle(&self, event: &PrintRequested) -> Result<(), EventHandlerError> {
        println!("auditor: observed print request '{}'", event.message);
        Ok(())
    }
}

fn main() -> Result<(), Error> {
    LogConfig::new()
        .format(LogFormat::Compact)
        .level(LogLevel::Warn)
        .init();

    let component_sets = [
        components![NotifierService, PrintService],
        components![NotifierService, PrintService, RequestAuditor],
    ];

    // Run the same interaction on each setup.
    for (run, set) in component_sets.into_iter().enumerate() {
        println!("--- run {} ({} components) ---", run + 1, set.len());
        let registry = Registry::build(set)?;

        // Resolve a service and call it directly.
        let printer = registry.resolve::<PrintService>()?;
        printer.print_message("Hello via method!");

        // Or publish an event and let the bus find the listeners.
        registry.publish(PrintRequested::new("Hello using event!"))?;

        registry.teardown()?;
    }

    Ok(())
}
