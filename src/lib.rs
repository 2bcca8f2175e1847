//! hostext - service locator and event fan-out for editor host extensions
//!
//! Module layout:
//! - core: `Service`, `ServiceRegistry`, `ServiceError`, host event payloads
//! - kernel::services: event bus, category registries, locator, failure boundary
//! - kernel::services::ports: capability traits, dispatcher / diagnostic seams, settings
//! - kernel::services::adapters: diagnostic sinks, settings file, per-user dirs
//! - extensions: extensions shipped with the host

pub mod core;
pub mod extensions;
pub mod kernel;
