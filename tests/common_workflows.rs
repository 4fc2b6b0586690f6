//! Integration tests for common Gantry workflows.
//!
//! These exercise both calling conventions over the same registry: direct
//! invocation through injected references and decoupled dispatch through
//! the bus, including cascades, isolation between registries, and teardown.

use gantry::prelude::*;
use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

// =============================================================================
// Events
// =============================================================================

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

// =============================================================================
// Components
// =============================================================================

/// Shared sink the services write their observable output into.
struct Transcript {
    lines: Mutex<Vec<String>>,
}

impl Transcript {
    fn record(&self, line: String) {
        self.lines.lock().push(line);
    }

    fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl Component for Transcript {
    fn construct(_ctx: &BuildContext<'_>) -> Result<Self, Error> {
        Ok(Self {
            lines: Mutex::new(Vec::new()),
        })
    }
}

/// Consumes printed-message notifications: directly when called, or from the
/// bus when subscribed.
struct NotifierService {
    transcript: Arc<Transcript>,
}

impl NotifierService {
    fn notify_printed(&self, message: &str) {
        self.transcript
            .record(format!("notifier: message '{message}' has been sent"));
    }
}

impl Component for NotifierService {
    fn construct(ctx: &BuildContext<'_>) -> Result<Self, Error> {
        Ok(Self {
            transcript: ctx.resolve::<Transcript>()?,
        })
    }

    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::of::<Transcript>()]
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

/// Prints messages. The direct operation is statically coupled to the
/// notifier; the event handler republishes instead and lets the bus find
/// whoever is listening.
struct PrintService {
    notifier: Arc<NotifierService>,
    transcript: Arc<Transcript>,
    bus: EventBus,
}

impl PrintService {
    fn print_internal(&self, message: &str) {
        self.transcript
            .record(format!("printer: printing message: {message}"));
    }

    fn print_message(&self, message: &str) {
        self.print_internal(message);
        self.notifier.notify_printed(message);
    }
}

impl Component for PrintService {
    fn construct(ctx: &BuildContext<'_>) -> Result<Self, Error> {
        Ok(Self {
            notifier: ctx.resolve::<NotifierService>()?,
            transcript: ctx.resolve::<Transcript>()?,
            bus: ctx.bus(),
        })
    }

    fn dependencies() -> Vec<Dependency> {
        vec![
            Dependency::of::<NotifierService>(),
            Dependency::of::<Transcript>(),
        ]
    }

    fn subscriptions(instance: &Arc<Self>, bus: &EventBus) {
        bus.subscribe::<PrintRequested, _>(instance.clone());
    }
}

impl EventHandler<PrintRequested> for PrintService {
    fn handle(&self, event: &PrintRequested) -> Result<(), EventHandlerError> {
        self.print_internal(&event.message);
        self.bus.publish(MessagePrinted {
            message: event.message.clone(),
            metadata: EventMetadata::caused_by("message_printed", &event.metadata),
        })?;
        Ok(())
    }
}

/// Listens to print requests without anyone knowing it exists.
struct RequestAuditor {
    transcript: Arc<Transcript>,
    observed: AtomicU32,
}

impl Component for RequestAuditor {
    fn construct(ctx: &BuildContext<'_>) -> Result<Self, Error> {
        Ok(Self {
            transcript: ctx.resolve::<Transcript>()?,
            observed: AtomicU32::new(0),
        })
    }

    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::of::<Transcript>()]
    }

    fn subscriptions(instance: &Arc<Self>, bus: &EventBus) {
        bus.subscribe::<PrintRequested, _>(instance.clone());
    }
}

impl EventHandler<PrintRequested> for RequestAuditor {
    fn handle(&self, event: &PrintRequested) -> Result<(), EventHandlerError> {
        self.observed.fetch_add(1, Ordering::SeqCst);
        self.transcript
            .record(format!("auditor: observed print request '{}'", event.message));
        Ok(())
    }
}

// =============================================================================
// Direct-call workflows
// =============================================================================

#[test]
fn test_direct_call_prints_then_notifies() {
    let registry =
        Registry::build(components![Transcript, NotifierService, PrintService]).unwrap();

    let printer = registry.resolve::<PrintService>().unwrap();
    printer.print_message("hello");

    let transcript = registry.resolve::<Transcript>().unwrap();
    assert_eq!(
        transcript.lines(),
        vec![
            "printer: printing message: hello",
            "notifier: message 'hello' has been sent"
        ]
    );
}

#[test]
fn test_direct_coupling_is_static() {
    // The auditor subscribes to print requests, but a direct call bypasses
    // the bus entirely and always reaches the statically wired notifier.
    let registry = Registry::build(components![
        Transcript,
        NotifierService,
        PrintService,
        RequestAuditor
    ])
    .unwrap();

    let printer = registry.resolve::<PrintService>().unwrap();
    printer.print_message("hello");

    let auditor = registry.resolve::<RequestAuditor>().unwrap();
    assert_eq!(auditor.observed.load(Ordering::SeqCst), 0);

    let transcript = registry.resolve::<Transcript>().unwrap();
    assert_eq!(transcript.lines().len(), 2);
}

// =============================================================================
// Bus dispatch workflows
// =============================================================================

#[test]
fn test_publish_cascades_to_notifier() {
    let registry =
        Registry::build(components![Transcript, NotifierService, PrintService]).unwrap();

    registry.publish(PrintRequested::new("hello")).unwrap();

    // Two handler invocations, in cascade order.
    let transcript = registry.resolve::<Transcript>().unwrap();
    assert_eq!(
        transcript.lines(),
        vec![
            "printer: printing message: hello",
            "notifier: message 'hello' has been sent"
        ]
    );
}

#[test]
fn test_auditor_fires_once_per_publish_after_cascade() {
    let registry = Registry::build(components![
        Transcript,
        NotifierService,
        PrintService,
        RequestAuditor
    ])
    .unwrap();

    registry.publish(PrintRequested::new("hello")).unwrap();

    // Print-request handlers run in registration order, and the printer's
    // nested message-printed cascade completes before the auditor runs.
    let transcript = registry.resolve::<Transcript>().unwrap();
    assert_eq!(
        transcript.lines(),
        vec![
            "printer: printing message: hello",
            "notifier: message 'hello' has been sent",
            "auditor: observed print request 'hello'"
        ]
    );

    let auditor = registry.resolve::<RequestAuditor>().unwrap();
    assert_eq!(auditor.observed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_publish_without_any_subscriber_is_noop() {
    let registry = Registry::build(components![Transcript, NotifierService]).unwrap();

    // Nothing subscribes to print requests in this set.
    registry.publish(PrintRequested::new("hello")).unwrap();

    let transcript = registry.resolve::<Transcript>().unwrap();
    assert!(transcript.lines().is_empty());
}

// =============================================================================
// Isolation between registries
// =============================================================================

#[test]
fn test_unregistered_listener_is_never_invoked() {
    let without_auditor =
        Registry::build(components![Transcript, NotifierService, PrintService]).unwrap();
    let with_auditor = Registry::build(components![
        Transcript,
        NotifierService,
        PrintService,
        RequestAuditor
    ])
    .unwrap();

    without_auditor
        .publish(PrintRequested::new("hello"))
        .unwrap();

    // The second registry's auditor saw nothing, even though an identically
    // typed component is subscribed there.
    let auditor = with_auditor.resolve::<RequestAuditor>().unwrap();
    assert_eq!(auditor.observed.load(Ordering::SeqCst), 0);

    with_auditor.publish(PrintRequested::new("hello")).unwrap();
    assert_eq!(auditor.observed.load(Ordering::SeqCst), 1);

    // And the first registry's transcript never saw the second publish.
    let transcript = without_auditor.resolve::<Transcript>().unwrap();
    assert_eq!(transcript.lines().len(), 2);
}

#[test]
fn test_run_loop_over_contrasting_component_sets() {
    // The reference driver: the same interaction over two component sets.
    let sets = [
        components![Transcript, NotifierService, PrintService],
        components![Transcript, NotifierService, PrintService, RequestAuditor],
    ];
    let mut line_counts = Vec::new();

    for set in sets {
        let registry = Registry::build(set).unwrap();

        let printer = registry.resolve::<PrintService>().unwrap();
        printer.print_message("Hello via method!");
        registry
            .publish(PrintRequested::new("Hello using event!"))
            .unwrap();

        let transcript = registry.resolve::<Transcript>().unwrap();
        line_counts.push(transcript.lines().len());
        registry.teardown().unwrap();
    }

    // Direct call: two lines in both runs. Publish: two lines without the
    // auditor, three with it.
    assert_eq!(line_counts, vec![4, 5]);
}

// =============================================================================
// Construction failure and teardown
// =============================================================================

#[test]
fn test_construction_fails_without_notifier() {
    let err = Registry::build(components![Transcript, PrintService])
        .map(|_| ())
        .unwrap_err();

    match err {
        Error::UnresolvedDependency {
            component,
            dependency,
        } => {
            assert!(component.ends_with("PrintService"));
            assert!(dependency.ends_with("NotifierService"));
        }
        other => panic!("expected UnresolvedDependency, got {other:?}"),
    }
}

#[test]
fn test_teardown_closes_registry_and_bus() {
    let registry =
        Registry::build(components![Transcript, NotifierService, PrintService]).unwrap();
    let bus = registry.bus().clone();

    registry.teardown().unwrap();

    assert!(matches!(
        registry.resolve::<PrintService>(),
        Err(Error::RegistryClosed)
    ));
    assert!(matches!(
        registry.publish(PrintRequested::new("too late")),
        Err(Error::RegistryClosed)
    ));
    assert!(matches!(
        bus.publish(PrintRequested::new("too late")),
        Err(EventBusError::BusClosed)
    ));
}
