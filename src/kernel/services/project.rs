use std::rc::Rc;

use crate::core::event::{
    parse_payload, EventData, LoadProjectEvent, CLOSE_PROJECT, LOAD_PROJECT_NOTIFICATION,
    PLAYER_START_REQUEST,
};
use crate::core::{Service, ServiceRegistry};

use super::fanout::{fan_out, DispatchReport};
use super::ports::{DiagnosticSink, EventDispatcher, ProjectHook, ProjectService};

/// Services interested in project lifecycle notifications.
pub struct ProjectServiceRegistry {
    services: ServiceRegistry<dyn ProjectService>,
    diagnostics: Rc<dyn DiagnosticSink>,
}

impl ProjectServiceRegistry {
    pub fn new(diagnostics: Rc<dyn DiagnosticSink>) -> Self {
        Self {
            services: ServiceRegistry::new(),
            diagnostics,
        }
    }

    pub fn register(&self, service: Rc<dyn ProjectService>) {
        tracing::debug!(service = service.name(), "project service registered");
        self.services.register(service);
    }

    pub fn registered_services(&self) -> Vec<Rc<dyn ProjectService>> {
        self.services.registered_services()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn subscribe_to_events(self: &Rc<Self>, dispatcher: &dyn EventDispatcher) {
        let registry = Rc::downgrade(self);
        dispatcher.subscribe_to_event(
            LOAD_PROJECT_NOTIFICATION,
            Box::new(move |data: &EventData| {
                let Some(registry) = registry.upgrade() else {
                    return;
                };
                match parse_payload::<LoadProjectEvent>(data) {
                    Ok(ev) => {
                        registry.project_loaded(&ev);
                    }
                    Err(e) => {
                        tracing::warn!(
                            event_type = LOAD_PROJECT_NOTIFICATION,
                            error = %e,
                            "malformed event payload"
                        );
                    }
                }
            }),
        );

        let registry = Rc::downgrade(self);
        dispatcher.subscribe_to_event(
            CLOSE_PROJECT,
            Box::new(move |_: &EventData| {
                if let Some(registry) = registry.upgrade() {
                    registry.project_unloaded();
                }
            }),
        );

        let registry = Rc::downgrade(self);
        dispatcher.subscribe_to_event(
            PLAYER_START_REQUEST,
            Box::new(move |_: &EventData| {
                if let Some(registry) = registry.upgrade() {
                    registry.player_started();
                }
            }),
        );
    }

    pub fn project_loaded(&self, ev: &LoadProjectEvent) -> DispatchReport {
        self.dispatch(ProjectHook::ProjectLoaded, |service| service.project_loaded(ev))
    }

    pub fn project_unloaded(&self) -> DispatchReport {
        self.dispatch(ProjectHook::ProjectUnloaded, |service| service.project_unloaded())
    }

    pub fn player_started(&self) -> DispatchReport {
        self.dispatch(ProjectHook::PlayerStarted, |service| service.player_started())
    }

    fn dispatch<C>(&self, hook: ProjectHook, call: C) -> DispatchReport
    where
        C: Fn(&dyn ProjectService) -> crate::core::service::Result<()>,
    {
        let services = self.services.registered_services();
        fan_out(
            hook.as_str(),
            &services,
            self.diagnostics.as_ref(),
            |service| service.project_hooks().contains(&hook),
            |service| call(service),
        )
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/services/project.rs"]
mod tests;
