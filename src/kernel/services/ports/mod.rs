//! Service ports: traits + data contracts.

pub mod diagnostics;
pub mod dispatcher;
pub mod extension;
pub mod settings;

pub use diagnostics::{Diagnostic, DiagnosticSink, EXTENSION_ERROR_TITLE};
pub use dispatcher::{EventDispatcher, EventHandler};
pub use extension::{HostExtension, ProjectHook, ProjectService, ResourceHook, ResourceService};
pub use settings::{DiagnosticSettings, ExtensionSettings, HostSettings};
