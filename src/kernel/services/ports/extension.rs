//! Capability traits an extension can implement.
//!
//! A service declares the hooks it handles through `project_hooks` /
//! `resource_hooks`; registries only call declared hooks and report the rest
//! as skipped.

use std::rc::Rc;

use crate::core::event::{
    DeleteResourceEvent, LoadProjectEvent, RenameResourceEvent, SaveResourceEvent,
};
use crate::core::service::Result as ServiceResult;
use crate::core::Service;
use crate::kernel::services::locator::ServiceLocator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectHook {
    ProjectLoaded,
    ProjectUnloaded,
    PlayerStarted,
}

impl ProjectHook {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectHook::ProjectLoaded => "projectLoaded",
            ProjectHook::ProjectUnloaded => "projectUnloaded",
            ProjectHook::PlayerStarted => "playerStarted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceHook {
    Save,
    Delete,
    Rename,
}

impl ResourceHook {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceHook::Save => "save",
            ResourceHook::Delete => "delete",
            ResourceHook::Rename => "rename",
        }
    }
}

pub trait ProjectService: Service {
    fn project_hooks(&self) -> &'static [ProjectHook];

    fn project_loaded(&self, _ev: &LoadProjectEvent) -> ServiceResult<()> {
        Ok(())
    }

    fn project_unloaded(&self) -> ServiceResult<()> {
        Ok(())
    }

    fn player_started(&self) -> ServiceResult<()> {
        Ok(())
    }
}

pub trait ResourceService: Service {
    fn resource_hooks(&self) -> &'static [ResourceHook];

    fn save(&self, _ev: &SaveResourceEvent) -> ServiceResult<()> {
        Ok(())
    }

    fn delete(&self, _ev: &DeleteResourceEvent) -> ServiceResult<()> {
        Ok(())
    }

    fn rename(&self, _ev: &RenameResourceEvent) -> ServiceResult<()> {
        Ok(())
    }
}

/// Entry point of an extension module.
///
/// `initialize` runs once per `ServiceLocator::load_service` call; this is
/// where the extension registers itself (or helper services) into the
/// category registries.
pub trait HostExtension: Service {
    fn initialize(self: Rc<Self>, locator: &ServiceLocator) -> ServiceResult<()>;
}
