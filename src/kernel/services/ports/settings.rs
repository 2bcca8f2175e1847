use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSettings {
    #[serde(default = "default_log_filter", alias = "log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub extensions: ExtensionSettings,
    #[serde(default)]
    pub diagnostics: DiagnosticSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionSettings {
    #[serde(default = "default_true", alias = "load_builtin")]
    pub load_builtin: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled: Vec<String>,
}

impl ExtensionSettings {
    pub fn is_enabled(&self, name: &str) -> bool {
        !self.disabled.iter().any(|d| d == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSettings {
    #[serde(default = "default_true", alias = "echo_to_stderr")]
    pub echo_to_stderr: bool,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            extensions: ExtensionSettings::default(),
            diagnostics: DiagnosticSettings::default(),
        }
    }
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        Self {
            load_builtin: true,
            disabled: Vec::new(),
        }
    }
}

impl Default for DiagnosticSettings {
    fn default() -> Self {
        Self {
            echo_to_stderr: true,
        }
    }
}

fn default_log_filter() -> String {
    "hostext=info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;
