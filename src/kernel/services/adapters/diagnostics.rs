//! Diagnostic sinks.

use std::cell::RefCell;
use std::io::Write;

use crate::kernel::services::ports::{Diagnostic, DiagnosticSink};

/// Reports through tracing only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn show_modal_error(&self, diagnostic: &Diagnostic) {
        tracing::error!(title = %diagnostic.title, "{}", diagnostic.message);
    }
}

/// Boxed report on stderr for the headless host.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleDiagnostics {
    echo: bool,
}

impl ConsoleDiagnostics {
    pub fn new(echo: bool) -> Self {
        Self { echo }
    }
}

impl DiagnosticSink for ConsoleDiagnostics {
    fn show_modal_error(&self, diagnostic: &Diagnostic) {
        LogDiagnostics.show_modal_error(diagnostic);
        if !self.echo {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}", render_box(diagnostic));
    }
}

fn render_box(diagnostic: &Diagnostic) -> String {
    let width = diagnostic
        .message
        .lines()
        .map(|l| l.chars().count())
        .chain(std::iter::once(diagnostic.title.chars().count()))
        .max()
        .unwrap_or(0);
    let rule = "-".repeat(width + 4);
    let mut out = format!("+{rule}+\n|  {:<width$}  |\n+{rule}+\n", diagnostic.title);
    for line in diagnostic.message.lines() {
        out.push_str(&format!("|  {:<width$}  |\n", line));
    }
    out.push_str(&format!("+{rule}+"));
    out
}

/// Keeps every report in arrival order until taken.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: RefCell<Vec<Diagnostic>>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }

    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl DiagnosticSink for DiagnosticLog {
    fn show_modal_error(&self, diagnostic: &Diagnostic) {
        self.entries.borrow_mut().push(diagnostic.clone());
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/diagnostics.rs"]
mod tests;
