use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Error type extension code returns from its hooks.
#[derive(Debug)]
pub enum ServiceError {
    InitializationFailed(String),
    Failed(String),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl ServiceError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    pub fn initialization_failed(msg: impl Into<String>) -> Self {
        Self::InitializationFailed(msg.into())
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::InitializationFailed(msg) => {
                write!(f, "Service initialization failed: {}", msg)
            }
            ServiceError::Failed(msg) => write!(f, "Service failed: {}", msg),
            ServiceError::Io(e) => write!(f, "I/O error: {}", e),
            ServiceError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Io(e) => Some(e),
            ServiceError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self {
        ServiceError::Io(e)
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Json(e)
    }
}

/// Anything an extension hands to the host. The name only shows up in
/// diagnostics.
pub trait Service: Any {
    fn name(&self) -> &str;
}

/// Ordered, append-only list of services of one capability category.
///
/// Registration order is dispatch order. Duplicates are kept. Readers get a
/// snapshot, so a service registered while a dispatch walks the list is first
/// seen by the next dispatch.
pub struct ServiceRegistry<T: ?Sized> {
    registered: RefCell<Vec<Rc<T>>>,
}

impl<T: ?Sized> ServiceRegistry<T> {
    pub fn new() -> Self {
        Self {
            registered: RefCell::new(Vec::new()),
        }
    }

    pub fn register(&self, service: Rc<T>) {
        self.registered.borrow_mut().push(service);
    }

    pub fn registered_services(&self) -> Vec<Rc<T>> {
        self.registered.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.registered.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.borrow().is_empty()
    }
}

impl<T: ?Sized> Default for ServiceRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/core/service.rs"]
mod tests;
