//! Core abstractions shared by the host and extensions:
//! - Service: named services and the ordered registry that stores them
//! - Event: event-type keys and typed lifecycle payloads

pub mod event;
pub mod service;

pub use event::{EventData, HostEvent};
pub use service::{Service, ServiceError, ServiceRegistry};
