use std::cell::RefCell;
use std::rc::Rc;

use crate::core::event::EventData;

use super::adapters::LogDiagnostics;
use super::fanout::{guarded_call, report_failure, service_name, ExtensionFailure};
use super::ports::{DiagnosticSink, EventDispatcher, EventHandler, HostExtension};
use super::project::ProjectServiceRegistry;
use super::resource::ResourceServiceRegistry;

/// Composition root handed to every extension.
///
/// Starts unattached; `subscribe_to_events` attaches the host window's
/// dispatcher and wires both category registries to it. Until then
/// `send_event` / `subscribe_to_event` do nothing.
pub struct ServiceLocator {
    resource_services: Rc<ResourceServiceRegistry>,
    project_services: Rc<ProjectServiceRegistry>,
    event_dispatcher: RefCell<Option<Rc<dyn EventDispatcher>>>,
    diagnostics: Rc<dyn DiagnosticSink>,
}

impl ServiceLocator {
    pub fn new(diagnostics: Rc<dyn DiagnosticSink>) -> Self {
        Self {
            resource_services: Rc::new(ResourceServiceRegistry::new(Rc::clone(&diagnostics))),
            project_services: Rc::new(ProjectServiceRegistry::new(Rc::clone(&diagnostics))),
            event_dispatcher: RefCell::new(None),
            diagnostics,
        }
    }

    pub fn resource_services(&self) -> &Rc<ResourceServiceRegistry> {
        &self.resource_services
    }

    pub fn project_services(&self) -> &Rc<ProjectServiceRegistry> {
        &self.project_services
    }

    pub fn diagnostics(&self) -> &Rc<dyn DiagnosticSink> {
        &self.diagnostics
    }

    pub fn is_attached(&self) -> bool {
        self.event_dispatcher.borrow().is_some()
    }

    /// Runs the extension's `initialize`. A failure is reported and returned;
    /// whatever the extension registered before failing stays registered.
    pub fn load_service(&self, extension: Rc<dyn HostExtension>) -> Result<(), ExtensionFailure> {
        let name = service_name(extension.as_ref());
        match guarded_call(&name, || extension.initialize(self)) {
            Ok(()) => {
                tracing::info!(extension = %name, "extension loaded");
                Ok(())
            }
            Err(failure) => {
                report_failure(self.diagnostics.as_ref(), "initialize", &failure);
                Err(failure)
            }
        }
    }

    /// Loads extensions in order; returns the failures.
    pub fn load_services<I>(&self, extensions: I) -> Vec<ExtensionFailure>
    where
        I: IntoIterator<Item = Rc<dyn HostExtension>>,
    {
        extensions
            .into_iter()
            .filter_map(|extension| self.load_service(extension).err())
            .collect()
    }

    /// Attaches the host window's dispatcher. Calling it again re-subscribes;
    /// duplicate subscriptions are not filtered.
    pub fn subscribe_to_events(&self, frame: Rc<dyn EventDispatcher>) {
        if self.is_attached() {
            tracing::warn!("event dispatcher attached again; registries subscribe twice");
        }
        *self.event_dispatcher.borrow_mut() = Some(Rc::clone(&frame));
        self.resource_services.subscribe_to_events(frame.as_ref());
        self.project_services.subscribe_to_events(frame.as_ref());
    }

    /// Publishes a custom event through the attached dispatcher.
    pub fn send_event(&self, event_type: &str, data: &EventData) {
        let Some(dispatcher) = self.dispatcher() else {
            tracing::trace!(event_type, "send_event before attach ignored");
            return;
        };
        dispatcher.send_event(event_type, data);
    }

    /// Subscribes a custom callback on the attached dispatcher. Before attach
    /// the callback is dropped, not queued.
    ///
    /// Custom callbacks run outside the extension failure boundary: a panic
    /// in one unwinds through `send_event` and the callbacks after it for
    /// that event are not run.
    pub fn subscribe_to_event(&self, event_type: &str, callback: EventHandler) {
        let Some(dispatcher) = self.dispatcher() else {
            tracing::trace!(event_type, "subscribe_to_event before attach ignored");
            return;
        };
        dispatcher.subscribe_to_event(event_type, callback);
    }

    // Clone out so a handler can call back into the locator while the
    // dispatcher is delivering.
    fn dispatcher(&self) -> Option<Rc<dyn EventDispatcher>> {
        self.event_dispatcher.borrow().clone()
    }
}

impl Default for ServiceLocator {
    fn default() -> Self {
        Self::new(Rc::new(LogDiagnostics))
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/services/locator.rs"]
mod tests;
