//! Extensions shipped with the host.

pub mod typescript;

use std::rc::Rc;

use crate::core::Service;
use crate::kernel::services::ports::{ExtensionSettings, HostExtension};

pub use typescript::TypescriptLanguageExtension;

/// Built-in extensions allowed by `settings`, in load order.
pub fn builtin_extensions(settings: &ExtensionSettings) -> Vec<Rc<dyn HostExtension>> {
    if !settings.load_builtin {
        tracing::info!("built-in extensions disabled");
        return Vec::new();
    }

    let all: Vec<Rc<dyn HostExtension>> = vec![Rc::new(TypescriptLanguageExtension::new())];
    all.into_iter()
        .filter(|extension| {
            let enabled = settings.is_enabled(extension.name());
            if !enabled {
                tracing::info!(extension = extension.name(), "extension disabled by settings");
            }
            enabled
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/extensions/mod.rs"]
mod tests;
