//! Service adapters: OS/runtime specific implementations.

pub mod diagnostics;
pub mod dirs;
pub mod settings;

pub use diagnostics::{ConsoleDiagnostics, DiagnosticLog, LogDiagnostics};
pub use dirs::{ensure_log_dir, get_cache_dir, get_log_dir};
pub use settings::{
    ensure_settings_file, get_settings_path, load_settings, load_settings_from,
    write_default_settings,
};
