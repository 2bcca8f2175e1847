use super::*;
use crate::core::service::{Result as ServiceResult, ServiceError};
use crate::core::Service;
use crate::kernel::services::adapters::DiagnosticLog;
use crate::kernel::services::fanout::ListenerOutcome;
use crate::kernel::services::EventBus;
use serde_json::json;
use std::cell::RefCell;

struct Recorder {
    name: &'static str,
    hooks: &'static [ResourceHook],
    fail_save: bool,
    seen: RefCell<Vec<String>>,
}

impl Recorder {
    fn new(name: &'static str, hooks: &'static [ResourceHook]) -> Rc<Self> {
        Rc::new(Self {
            name,
            hooks,
            fail_save: false,
            seen: RefCell::new(Vec::new()),
        })
    }

    fn failing(name: &'static str, hooks: &'static [ResourceHook]) -> Rc<Self> {
        Rc::new(Self {
            name,
            hooks,
            fail_save: true,
            seen: RefCell::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }
}

impl Service for Recorder {
    fn name(&self) -> &str {
        self.name
    }
}

impl ResourceService for Recorder {
    fn resource_hooks(&self) -> &'static [ResourceHook] {
        self.hooks
    }

    fn save(&self, ev: &SaveResourceEvent) -> ServiceResult<()> {
        self.seen.borrow_mut().push(format!("save {}", ev.path));
        if self.fail_save {
            return Err(ServiceError::failed("disk full"));
        }
        Ok(())
    }

    fn delete(&self, ev: &DeleteResourceEvent) -> ServiceResult<()> {
        self.seen.borrow_mut().push(format!("delete {}", ev.path));
        Ok(())
    }

    fn rename(&self, ev: &RenameResourceEvent) -> ServiceResult<()> {
        self.seen
            .borrow_mut()
            .push(format!("rename {} -> {}", ev.path, ev.new_path));
        Ok(())
    }
}

const ALL: &[ResourceHook] = &[ResourceHook::Save, ResourceHook::Delete, ResourceHook::Rename];
const NO_SAVE: &[ResourceHook] = &[ResourceHook::Delete, ResourceHook::Rename];

fn registry() -> (Rc<ResourceServiceRegistry>, Rc<DiagnosticLog>) {
    let log = Rc::new(DiagnosticLog::new());
    let registry = Rc::new(ResourceServiceRegistry::new(log.clone()));
    (registry, log)
}

fn save(path: &str) -> SaveResourceEvent {
    SaveResourceEvent {
        path: path.to_string(),
    }
}

#[test]
fn test_failing_save_does_not_block_others() {
    let (registry, log) = registry();
    let a = Recorder::failing("A", ALL);
    let b = Recorder::new("B", ALL);
    let c = Recorder::new("C", NO_SAVE);
    registry.register(a.clone());
    registry.register(b.clone());
    registry.register(c.clone());

    let report = registry.save_resource(&save("main.ts"));

    assert_eq!(a.seen(), vec!["save main.ts"]);
    assert_eq!(b.seen(), vec!["save main.ts"]);
    assert!(c.seen().is_empty());

    assert!(matches!(report.outcome_of("A"), Some(ListenerOutcome::Failed(_))));
    assert_eq!(report.outcome_of("B"), Some(&ListenerOutcome::Delivered));
    assert_eq!(report.outcome_of("C"), Some(&ListenerOutcome::Skipped));

    let shown = log.take();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].title, "Extension Error");
    assert!(shown[0].message.contains("extension A"));
    assert!(shown[0].message.contains("disk full"));
}

#[test]
fn test_delete_and_rename_unaffected_by_failing_save() {
    let (registry, log) = registry();
    let a = Recorder::failing("A", ALL);
    let c = Recorder::new("C", NO_SAVE);
    registry.register(a.clone());
    registry.register(c.clone());

    let deleted = registry.delete_resource(&DeleteResourceEvent {
        path: "old.ts".to_string(),
    });
    let renamed = registry.rename_resource(&RenameResourceEvent {
        path: "x.ts".to_string(),
        new_path: "y.ts".to_string(),
        new_name: "y".to_string(),
    });

    assert!(deleted.is_clean());
    assert!(renamed.is_clean());
    assert_eq!(deleted.delivered(), 2);
    assert_eq!(c.seen(), vec!["delete old.ts", "rename x.ts -> y.ts"]);
    assert!(log.is_empty());
}

#[test]
fn test_empty_registry_dispatch_is_noop() {
    let (registry, log) = registry();
    let report = registry.save_resource(&save("a.ts"));
    assert!(report.listeners.is_empty());
    assert!(log.is_empty());
}

#[test]
fn test_dispatch_follows_registration_order() {
    let (registry, _log) = registry();
    let order = Rc::new(RefCell::new(Vec::new()));

    struct Ordered {
        name: &'static str,
        order: Rc<RefCell<Vec<&'static str>>>,
    }
    impl Service for Ordered {
        fn name(&self) -> &str {
            self.name
        }
    }
    impl ResourceService for Ordered {
        fn resource_hooks(&self) -> &'static [ResourceHook] {
            &[ResourceHook::Save]
        }
        fn save(&self, _ev: &SaveResourceEvent) -> ServiceResult<()> {
            self.order.borrow_mut().push(self.name);
            Ok(())
        }
    }

    for name in ["first", "second", "third"] {
        registry.register(Rc::new(Ordered {
            name,
            order: order.clone(),
        }));
    }
    registry.save_resource(&save("a.ts"));

    assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    assert_eq!(registry.len(), 3);
}

#[test]
fn test_bus_events_reach_services() {
    let (registry, log) = registry();
    let b = Recorder::new("B", ALL);
    registry.register(b.clone());

    let bus = EventBus::new();
    registry.subscribe_to_events(&bus);

    bus.send_event(SAVE_RESOURCE_NOTIFICATION, &json!({ "path": "a.ts" }));
    bus.send_event(DELETE_RESOURCE_NOTIFICATION, &json!({ "path": "b.ts" }));
    bus.send_event(
        RENAME_RESOURCE_NOTIFICATION,
        &json!({ "path": "c.ts", "newPath": "d.ts", "newName": "d" }),
    );

    assert_eq!(
        b.seen(),
        vec!["save a.ts", "delete b.ts", "rename c.ts -> d.ts"]
    );
    assert!(log.is_empty());
}

#[test]
fn test_malformed_payload_is_not_dispatched() {
    let (registry, log) = registry();
    let b = Recorder::new("B", ALL);
    registry.register(b.clone());

    let bus = EventBus::new();
    registry.subscribe_to_events(&bus);
    bus.send_event(SAVE_RESOURCE_NOTIFICATION, &json!({ "file": "a.ts" }));

    assert!(b.seen().is_empty());
    assert!(log.is_empty());
}

#[test]
fn test_dropped_registry_ignores_bus_events() {
    let bus = EventBus::new();
    let b = Recorder::new("B", ALL);
    {
        let (registry, _log) = registry();
        registry.register(b.clone());
        registry.subscribe_to_events(&bus);
    }

    bus.send_event(SAVE_RESOURCE_NOTIFICATION, &json!({ "path": "a.ts" }));
    assert!(b.seen().is_empty());
}

struct BrokenHooks;

impl Service for BrokenHooks {
    fn name(&self) -> &str {
        "BrokenHooks"
    }
}

impl ResourceService for BrokenHooks {
    fn resource_hooks(&self) -> &'static [ResourceHook] {
        panic!("hook table corrupted")
    }
}

#[test]
fn test_panicking_hook_declaration_is_isolated() {
    let (registry, log) = registry();
    let good = Recorder::new("Good", ALL);
    registry.register(Rc::new(BrokenHooks));
    registry.register(good.clone());

    let report = registry.save_resource(&save("a.ts"));

    assert_eq!(good.seen(), vec!["save a.ts"]);
    assert_eq!(report.outcome_of("Good"), Some(&ListenerOutcome::Delivered));
    match report.outcome_of("BrokenHooks") {
        Some(ListenerOutcome::Failed(failure)) => {
            assert_eq!(failure.message, "hook table corrupted");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let shown = log.take();
    assert_eq!(shown.len(), 1);
    assert!(shown[0].message.contains("extension BrokenHooks"));
}
