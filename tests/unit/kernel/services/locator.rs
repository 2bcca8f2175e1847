use super::*;
use crate::core::event::{
    EventData, LoadProjectEvent, SaveResourceEvent, LOAD_PROJECT_NOTIFICATION,
    SAVE_RESOURCE_NOTIFICATION,
};
use crate::core::service::{Result as ServiceResult, Service, ServiceError};
use crate::kernel::services::adapters::DiagnosticLog;
use crate::kernel::services::fanout::FailureKind;
use crate::kernel::services::ports::{ProjectHook, ProjectService, ResourceHook, ResourceService};
use crate::kernel::services::EventBus;
use serde_json::json;
use std::cell::{Cell, RefCell};

/// Registers itself for resource saves, then optionally fails.
struct SaveCounter {
    name: &'static str,
    fail_init: bool,
    saves: Cell<usize>,
}

impl SaveCounter {
    fn new(name: &'static str) -> Rc<Self> {
        Rc::new(Self {
            name,
            fail_init: false,
            saves: Cell::new(0),
        })
    }

    fn failing(name: &'static str) -> Rc<Self> {
        Rc::new(Self {
            name,
            fail_init: true,
            saves: Cell::new(0),
        })
    }
}

impl Service for SaveCounter {
    fn name(&self) -> &str {
        self.name
    }
}

impl ResourceService for SaveCounter {
    fn resource_hooks(&self) -> &'static [ResourceHook] {
        &[ResourceHook::Save]
    }

    fn save(&self, _ev: &SaveResourceEvent) -> ServiceResult<()> {
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

impl HostExtension for SaveCounter {
    fn initialize(self: Rc<Self>, locator: &ServiceLocator) -> ServiceResult<()> {
        locator.resource_services().register(self.clone());
        if self.fail_init {
            return Err(ServiceError::initialization_failed("missing toolchain"));
        }
        Ok(())
    }
}

struct Panicky;

impl Service for Panicky {
    fn name(&self) -> &str {
        "Panicky"
    }
}

impl HostExtension for Panicky {
    fn initialize(self: Rc<Self>, _locator: &ServiceLocator) -> ServiceResult<()> {
        panic!("initialize blew up");
    }
}

struct ProjectEcho {
    seen: RefCell<Vec<String>>,
}

impl Service for ProjectEcho {
    fn name(&self) -> &str {
        "ProjectEcho"
    }
}

impl ProjectService for ProjectEcho {
    fn project_hooks(&self) -> &'static [ProjectHook] {
        &[ProjectHook::ProjectLoaded]
    }

    fn project_loaded(&self, ev: &LoadProjectEvent) -> ServiceResult<()> {
        self.seen.borrow_mut().push(ev.path.clone());
        Ok(())
    }
}

impl HostExtension for ProjectEcho {
    fn initialize(self: Rc<Self>, locator: &ServiceLocator) -> ServiceResult<()> {
        locator.project_services().register(self);
        Ok(())
    }
}

fn locator() -> (ServiceLocator, Rc<DiagnosticLog>) {
    let log = Rc::new(DiagnosticLog::new());
    (ServiceLocator::new(log.clone()), log)
}

#[test]
fn test_new_locator_is_unattached_and_empty() {
    let (locator, _log) = locator();
    assert!(!locator.is_attached());
    assert!(locator.resource_services().is_empty());
    assert!(locator.project_services().is_empty());
}

#[test]
fn test_passthrough_before_attach_is_silent_noop() {
    let (locator, log) = locator();
    let called = Rc::new(Cell::new(false));
    let flag = called.clone();

    locator.subscribe_to_event("Custom", Box::new(move |_: &EventData| flag.set(true)));
    locator.send_event("Custom", &json!(1));

    let bus = Rc::new(EventBus::new());
    locator.subscribe_to_events(bus.clone());
    locator.send_event("Custom", &json!(2));

    assert!(!called.get());
    assert_eq!(bus.handler_count("Custom"), 0);
    assert!(log.is_empty());
}

#[test]
fn test_passthrough_after_attach() {
    let (locator, _log) = locator();
    let bus = Rc::new(EventBus::new());
    locator.subscribe_to_events(bus.clone());
    assert!(locator.is_attached());

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    locator.subscribe_to_event(
        "Custom",
        Box::new(move |data: &EventData| sink.borrow_mut().push(data.clone())),
    );
    locator.send_event("Custom", &json!({ "n": 1 }));
    bus.send_event("Custom", &json!({ "n": 2 }));

    assert_eq!(*seen.borrow(), vec![json!({ "n": 1 }), json!({ "n": 2 })]);
}

#[test]
fn test_attach_subscribes_category_registries() {
    let (locator, _log) = locator();
    let counter = SaveCounter::new("Counter");
    locator.load_service(counter.clone()).unwrap();

    let bus = Rc::new(EventBus::new());
    locator.subscribe_to_events(bus.clone());

    for key in [
        crate::core::event::LOAD_PROJECT_NOTIFICATION,
        crate::core::event::CLOSE_PROJECT,
        crate::core::event::PLAYER_START_REQUEST,
        crate::core::event::SAVE_RESOURCE_NOTIFICATION,
        crate::core::event::DELETE_RESOURCE_NOTIFICATION,
        crate::core::event::RENAME_RESOURCE_NOTIFICATION,
    ] {
        assert_eq!(bus.handler_count(key), 1, "{key}");
    }

    locator.send_event(SAVE_RESOURCE_NOTIFICATION, &json!({ "path": "a.ts" }));
    assert_eq!(counter.saves.get(), 1);
}

#[test]
fn test_second_attach_duplicates_subscriptions() {
    let (locator, _log) = locator();
    let counter = SaveCounter::new("Counter");
    locator.load_service(counter.clone()).unwrap();

    let bus = Rc::new(EventBus::new());
    locator.subscribe_to_events(bus.clone());
    locator.subscribe_to_events(bus.clone());

    assert_eq!(bus.handler_count(SAVE_RESOURCE_NOTIFICATION), 2);
    bus.send_event(SAVE_RESOURCE_NOTIFICATION, &json!({ "path": "a.ts" }));
    assert_eq!(counter.saves.get(), 2);
}

#[test]
fn test_failing_initialize_keeps_locator_usable() {
    let (locator, log) = locator();
    let broken = SaveCounter::failing("Broken");

    let failure = locator.load_service(broken.clone()).unwrap_err();
    assert_eq!(failure.extension, "Broken");
    assert_eq!(failure.kind, FailureKind::Error);
    assert!(failure.message.contains("missing toolchain"));

    let shown = log.take();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].title, "Extension Error");
    assert!(shown[0].message.contains("extension Broken"));

    // Registered before the failure, so it stays.
    assert_eq!(locator.resource_services().len(), 1);

    let healthy = SaveCounter::new("Healthy");
    locator.load_service(healthy.clone()).unwrap();
    assert_eq!(locator.resource_services().len(), 2);

    let report = locator.resource_services().save_resource(&SaveResourceEvent {
        path: "a.ts".to_string(),
    });
    assert_eq!(report.delivered(), 2);
    assert_eq!(broken.saves.get(), 1);
    assert_eq!(healthy.saves.get(), 1);
}

#[test]
fn test_panicking_initialize_is_caught() {
    let (locator, log) = locator();
    let failure = locator.load_service(Rc::new(Panicky)).unwrap_err();
    assert_eq!(failure.kind, FailureKind::Panic);
    assert_eq!(log.len(), 1);
}

#[test]
fn test_load_services_continues_past_failures() {
    let (locator, log) = locator();
    let echo = Rc::new(ProjectEcho {
        seen: RefCell::new(Vec::new()),
    });
    let extensions: Vec<Rc<dyn HostExtension>> = vec![
        Rc::new(Panicky),
        SaveCounter::failing("Broken"),
        echo.clone(),
    ];

    let failures = locator.load_services(extensions);
    let names: Vec<&str> = failures.iter().map(|f| f.extension.as_str()).collect();
    assert_eq!(names, vec!["Panicky", "Broken"]);
    assert_eq!(log.len(), 2);

    let bus = Rc::new(EventBus::new());
    locator.subscribe_to_events(bus);
    locator.send_event(LOAD_PROJECT_NOTIFICATION, &json!({ "path": "/game" }));
    assert_eq!(*echo.seen.borrow(), vec!["/game"]);
}

#[test]
fn test_default_locator_uses_log_sink() {
    let locator = ServiceLocator::default();
    assert!(locator.load_service(Rc::new(Panicky)).is_err());
}
