//! Guarded invocation of extension code.
//!
//! Every call into an extension goes through [`guarded_call`]: a returned
//! `Err` or an unwinding panic becomes an [`ExtensionFailure`] instead of
//! escaping into the host. [`fan_out`] applies this per listener and collects
//! the outcome of each one into a [`DispatchReport`].

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::error::Error;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::core::service::Result as ServiceResult;
use crate::core::Service;

use super::ports::{Diagnostic, DiagnosticSink};

/// Shown in place of a service name that could not be read.
pub const UNNAMED_SERVICE: &str = "<unnamed>";

thread_local! {
    static PANIC_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Captures the current stack for the next caught panic on this thread.
///
/// Meant to be called from a panic hook; `guarded_call` attaches the trace
/// to the resulting failure.
pub fn note_panic_backtrace() {
    let trace = Backtrace::force_capture().to_string();
    PANIC_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(trace));
}

fn take_panic_backtrace() -> Option<String> {
    PANIC_BACKTRACE.with(|slot| slot.borrow_mut().take())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Error,
    Panic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFailure {
    pub extension: String,
    pub kind: FailureKind,
    pub message: String,
    /// Message followed by the `source()` chain, one cause per line.
    pub detail: String,
}

impl ExtensionFailure {
    pub fn from_error(extension: &str, err: &(dyn Error + 'static)) -> Self {
        let message = err.to_string();
        let mut detail = message.clone();
        let mut source = err.source();
        while let Some(cause) = source {
            detail.push_str("\n caused by: ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }
        Self {
            extension: extension.to_string(),
            kind: FailureKind::Error,
            message,
            detail,
        }
    }

    pub fn from_panic(extension: &str, payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        let mut detail = format!("panicked: {message}");
        if let Some(trace) = take_panic_backtrace() {
            detail.push_str("\n backtrace:\n");
            detail.push_str(&trace);
        }
        Self {
            extension: extension.to_string(),
            kind: FailureKind::Panic,
            detail,
            message,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::extension_error(&self.extension, &self.detail)
    }
}

impl std::fmt::Display for ExtensionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "extension {} failed: {}", self.extension, self.message)
    }
}

impl Error for ExtensionFailure {}

/// Runs one call into extension code, catching errors and panics.
pub fn guarded_call<T, F>(extension: &str, call: F) -> Result<T, ExtensionFailure>
where
    F: FnOnce() -> ServiceResult<T>,
{
    take_panic_backtrace();
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(ExtensionFailure::from_error(extension, &err)),
        Err(payload) => Err(ExtensionFailure::from_panic(extension, payload)),
    }
}

/// Reads `Service::name`, which is extension code too.
pub(crate) fn service_name<S: Service + ?Sized>(service: &S) -> String {
    let name = panic::catch_unwind(AssertUnwindSafe(|| service.name().to_string()));
    take_panic_backtrace();
    name.unwrap_or_else(|_| {
        tracing::warn!("service name panicked");
        UNNAMED_SERVICE.to_string()
    })
}

/// Logs a caught failure and shows it through the sink.
pub(crate) fn report_failure(
    diagnostics: &dyn DiagnosticSink,
    hook: &str,
    failure: &ExtensionFailure,
) {
    tracing::error!(
        extension = %failure.extension,
        hook,
        kind = ?failure.kind,
        error = %failure.detail,
        "extension error"
    );
    diagnostics.show_modal_error(&failure.to_diagnostic());
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerOutcome {
    Delivered,
    Skipped,
    Failed(ExtensionFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerReport {
    pub service: String,
    pub outcome: ListenerOutcome,
}

/// Per-listener result of one fan-out, in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub hook: &'static str,
    pub listeners: Vec<ListenerReport>,
}

impl DispatchReport {
    pub fn delivered(&self) -> usize {
        self.count(|o| matches!(o, ListenerOutcome::Delivered))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ListenerOutcome::Skipped))
    }

    pub fn failures(&self) -> impl Iterator<Item = &ExtensionFailure> {
        self.listeners.iter().filter_map(|l| match &l.outcome {
            ListenerOutcome::Failed(failure) => Some(failure),
            _ => None,
        })
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn outcome_of(&self, service: &str) -> Option<&ListenerOutcome> {
        self.listeners
            .iter()
            .find(|l| l.service == service)
            .map(|l| &l.outcome)
    }

    fn count(&self, pred: impl Fn(&ListenerOutcome) -> bool) -> usize {
        self.listeners.iter().filter(|l| pred(&l.outcome)).count()
    }
}

/// Offers one notification to every service in `services`.
///
/// `interested` decides whether a service declared the hook; undeclared
/// services are skipped. The check runs inside the failure boundary along
/// with the hook itself. A failing listener produces exactly one diagnostic
/// and never stops the walk.
pub(crate) fn fan_out<S, I, C>(
    hook: &'static str,
    services: &[Rc<S>],
    diagnostics: &dyn DiagnosticSink,
    interested: I,
    call: C,
) -> DispatchReport
where
    S: Service + ?Sized,
    I: Fn(&S) -> bool,
    C: Fn(&S) -> ServiceResult<()>,
{
    let mut listeners = Vec::with_capacity(services.len());
    for service in services {
        let service: &S = service;
        let name = service_name(service);
        let delivered = guarded_call(&name, || {
            if !interested(service) {
                return Ok(false);
            }
            call(service).map(|()| true)
        });
        let outcome = match delivered {
            Ok(true) => ListenerOutcome::Delivered,
            Ok(false) => ListenerOutcome::Skipped,
            Err(failure) => {
                report_failure(diagnostics, hook, &failure);
                ListenerOutcome::Failed(failure)
            }
        };
        listeners.push(ListenerReport {
            service: name,
            outcome,
        });
    }

    let report = DispatchReport { hook, listeners };
    tracing::debug!(
        hook,
        delivered = report.delivered(),
        skipped = report.skipped(),
        failed = report.listeners.len() - report.delivered() - report.skipped(),
        "fan-out finished"
    );
    report
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/services/fanout.rs"]
mod tests;
