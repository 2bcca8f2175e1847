//! Headless extension host core.

pub mod services;

pub use services::{
    DispatchReport, EventBus, ExtensionFailure, ListenerOutcome, ProjectServiceRegistry,
    ResourceServiceRegistry, ServiceLocator,
};
