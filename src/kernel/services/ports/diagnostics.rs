pub const EXTENSION_ERROR_TITLE: &str = "Extension Error";

/// User-visible error report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub title: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn extension_error(extension: &str, detail: &str) -> Self {
        Self::new(
            EXTENSION_ERROR_TITLE,
            format!("Error detected in extension {extension}\n \n {detail}"),
        )
    }
}

/// Where caught extension failures are shown to the user.
pub trait DiagnosticSink {
    fn show_modal_error(&self, diagnostic: &Diagnostic);
}
