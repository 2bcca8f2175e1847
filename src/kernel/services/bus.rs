use std::cell::RefCell;
use std::rc::Rc;

use compact_str::CompactString;
use rustc_hash::FxHashMap;

use crate::core::event::EventData;

use super::ports::{EventDispatcher, EventHandler};

type SharedHandler = Rc<dyn Fn(&EventData)>;

/// Synchronous publish/subscribe bus for the host window.
///
/// Handlers for one event type run in subscription order. Delivery walks a
/// snapshot of the handler list, so a handler subscribed while an event is
/// being delivered first fires on the next `send_event`. Handlers may publish
/// further events; those are delivered depth-first.
///
/// Handlers are not guarded. The category registries isolate extension
/// failures themselves; a raw handler that panics stops delivery of that
/// event to the handlers after it.
#[derive(Default)]
pub struct EventBus {
    handlers: RefCell<FxHashMap<CompactString, Vec<SharedHandler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler_count(&self, event_type: &str) -> usize {
        self.handlers
            .borrow()
            .get(event_type)
            .map_or(0, |handlers| handlers.len())
    }

    fn snapshot(&self, event_type: &str) -> Vec<SharedHandler> {
        self.handlers
            .borrow()
            .get(event_type)
            .cloned()
            .unwrap_or_default()
    }
}

impl EventDispatcher for EventBus {
    fn subscribe_to_event(&self, event_type: &str, handler: EventHandler) {
        self.handlers
            .borrow_mut()
            .entry(CompactString::from(event_type))
            .or_default()
            .push(Rc::from(handler));
    }

    fn send_event(&self, event_type: &str, data: &EventData) {
        let handlers = self.snapshot(event_type);
        tracing::trace!(event_type, handlers = handlers.len(), "send_event");
        for handler in handlers {
            handler(data);
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/services/bus.rs"]
mod tests;
