use std::rc::{Rc, Weak};

use serde::de::DeserializeOwned;

use crate::core::event::{
    parse_payload, DeleteResourceEvent, EventData, RenameResourceEvent, SaveResourceEvent,
    DELETE_RESOURCE_NOTIFICATION, RENAME_RESOURCE_NOTIFICATION, SAVE_RESOURCE_NOTIFICATION,
};
use crate::core::{Service, ServiceRegistry};

use super::fanout::{fan_out, DispatchReport};
use super::ports::{DiagnosticSink, EventDispatcher, EventHandler, ResourceHook, ResourceService};

/// Services interested in resource save/delete/rename notifications.
pub struct ResourceServiceRegistry {
    services: ServiceRegistry<dyn ResourceService>,
    diagnostics: Rc<dyn DiagnosticSink>,
}

impl ResourceServiceRegistry {
    pub fn new(diagnostics: Rc<dyn DiagnosticSink>) -> Self {
        Self {
            services: ServiceRegistry::new(),
            diagnostics,
        }
    }

    pub fn register(&self, service: Rc<dyn ResourceService>) {
        tracing::debug!(service = service.name(), "resource service registered");
        self.services.register(service);
    }

    pub fn registered_services(&self) -> Vec<Rc<dyn ResourceService>> {
        self.services.registered_services()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn subscribe_to_events(self: &Rc<Self>, dispatcher: &dyn EventDispatcher) {
        let save = typed_handler(
            self,
            SAVE_RESOURCE_NOTIFICATION,
            |registry, ev: SaveResourceEvent| {
                registry.save_resource(&ev);
            },
        );
        dispatcher.subscribe_to_event(SAVE_RESOURCE_NOTIFICATION, save);

        let delete = typed_handler(
            self,
            DELETE_RESOURCE_NOTIFICATION,
            |registry, ev: DeleteResourceEvent| {
                registry.delete_resource(&ev);
            },
        );
        dispatcher.subscribe_to_event(DELETE_RESOURCE_NOTIFICATION, delete);

        let rename = typed_handler(
            self,
            RENAME_RESOURCE_NOTIFICATION,
            |registry, ev: RenameResourceEvent| {
                registry.rename_resource(&ev);
            },
        );
        dispatcher.subscribe_to_event(RENAME_RESOURCE_NOTIFICATION, rename);
    }

    pub fn save_resource(&self, ev: &SaveResourceEvent) -> DispatchReport {
        self.dispatch(ResourceHook::Save, |service| service.save(ev))
    }

    pub fn delete_resource(&self, ev: &DeleteResourceEvent) -> DispatchReport {
        self.dispatch(ResourceHook::Delete, |service| service.delete(ev))
    }

    pub fn rename_resource(&self, ev: &RenameResourceEvent) -> DispatchReport {
        self.dispatch(ResourceHook::Rename, |service| service.rename(ev))
    }

    fn dispatch<C>(&self, hook: ResourceHook, call: C) -> DispatchReport
    where
        C: Fn(&dyn ResourceService) -> crate::core::service::Result<()>,
    {
        let services = self.services.registered_services();
        fan_out(
            hook.as_str(),
            &services,
            self.diagnostics.as_ref(),
            |service| service.resource_hooks().contains(&hook),
            |service| call(service),
        )
    }
}

/// Bus handler that parses the payload and forwards it while the registry is
/// alive. Malformed payloads come from the host, not from an extension, so
/// they are logged and dropped.
fn typed_handler<T, F>(
    registry: &Rc<ResourceServiceRegistry>,
    event_type: &'static str,
    forward: F,
) -> EventHandler
where
    T: DeserializeOwned + 'static,
    F: Fn(&ResourceServiceRegistry, T) + 'static,
{
    let registry: Weak<ResourceServiceRegistry> = Rc::downgrade(registry);
    Box::new(move |data: &EventData| {
        let Some(registry) = registry.upgrade() else {
            return;
        };
        match parse_payload::<T>(data) {
            Ok(ev) => forward(&registry, ev),
            Err(e) => {
                tracing::warn!(event_type, error = %e, "malformed event payload");
            }
        }
    })
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/services/resource.rs"]
mod tests;
