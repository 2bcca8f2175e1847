//! Extension services layer.
//!
//! - `ports`: contracts shared with extensions and the host window.
//! - `adapters`: OS specific implementations (paths, settings file, sinks).
//! - `project` / `resource`: category registries fanning out lifecycle events.
//! - `locator`: the composition root extensions receive.

pub mod adapters;
pub mod bus;
pub mod fanout;
pub mod locator;
pub mod ports;
pub mod project;
pub mod resource;

pub use bus::EventBus;
pub use fanout::{
    guarded_call, note_panic_backtrace, DispatchReport, ExtensionFailure, FailureKind,
    ListenerOutcome, ListenerReport, UNNAMED_SERVICE,
};
pub use locator::ServiceLocator;
pub use project::ProjectServiceRegistry;
pub use resource::ResourceServiceRegistry;
