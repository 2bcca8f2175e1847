//! Command line and event script handling for the headless host.

use std::io::{self, BufRead};
use std::path::PathBuf;

use hostext::core::event::{EventData, HostEvent, CLOSE_PROJECT, LOAD_PROJECT_NOTIFICATION};
use hostext::kernel::services::ports::EventDispatcher;

pub const USAGE: &str =
    "usage: hostext [--project <dir>] [--script <file>] [--no-builtin] [--echo-log]";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub project: Option<PathBuf>,
    pub script: Option<PathBuf>,
    pub no_builtin: bool,
    pub echo_log: bool,
    pub help: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    MissingValue(&'static str),
    UnknownArgument(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::MissingValue(flag) => write!(f, "{flag} needs a value"),
            CliError::UnknownArgument(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

/// Parses everything after the program name. Both `--flag value` and
/// `--flag=value` are accepted.
pub fn parse_args<I>(args: I) -> Result<CliArgs, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--project=") {
            parsed.project = Some(PathBuf::from(value));
        } else if let Some(value) = arg.strip_prefix("--script=") {
            parsed.script = Some(PathBuf::from(value));
        } else {
            match arg.as_str() {
                "--project" => {
                    let value = args.next().ok_or(CliError::MissingValue("--project"))?;
                    parsed.project = Some(PathBuf::from(value));
                }
                "--script" => {
                    let value = args.next().ok_or(CliError::MissingValue("--script"))?;
                    parsed.script = Some(PathBuf::from(value));
                }
                "--no-builtin" => parsed.no_builtin = true,
                "--echo-log" => parsed.echo_log = true,
                "-h" | "--help" => parsed.help = true,
                _ => return Err(CliError::UnknownArgument(arg)),
            }
        }
    }
    Ok(parsed)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptEvent {
    pub event_type: String,
    pub data: EventData,
}

/// `<event-type> [json-payload]`. Blank lines and `#` comments give
/// `Ok(None)`; a missing payload is `null`.
pub fn parse_script_line(line: &str) -> Result<Option<ScriptEvent>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (event_type, payload) = match line.split_once(char::is_whitespace) {
        Some((event_type, rest)) => (event_type, rest.trim()),
        None => (line, ""),
    };
    let data = if payload.is_empty() {
        EventData::Null
    } else {
        serde_json::from_str(payload)?
    };
    Ok(Some(ScriptEvent {
        event_type: event_type.to_string(),
        data,
    }))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLine {
    pub line: usize,
    pub error: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    pub sent: usize,
    pub invalid: Vec<InvalidLine>,
    /// Whether a project is still open after the last event.
    pub project_open: bool,
}

/// Publishes every script event on `dispatcher` in order. Lines that do not
/// parse, or whose payload does not fit a known host event, are skipped.
pub fn replay<R: BufRead>(
    reader: R,
    dispatcher: &dyn EventDispatcher,
    project_open: bool,
) -> io::Result<ReplaySummary> {
    let mut summary = ReplaySummary {
        project_open,
        ..ReplaySummary::default()
    };

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let event = match parse_script_line(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                summary.invalid.push(invalid(line_no, e));
                continue;
            }
        };
        if let Err(e) = HostEvent::from_data(&event.event_type, &event.data) {
            summary.invalid.push(invalid(line_no, e));
            continue;
        }

        match event.event_type.as_str() {
            LOAD_PROJECT_NOTIFICATION => summary.project_open = true,
            CLOSE_PROJECT => summary.project_open = false,
            _ => {}
        }
        tracing::debug!(line = line_no, event_type = %event.event_type, "replaying event");
        dispatcher.send_event(&event.event_type, &event.data);
        summary.sent += 1;
    }

    Ok(summary)
}

fn invalid(line: usize, error: impl std::fmt::Display) -> InvalidLine {
    let error = error.to_string();
    tracing::warn!(line, error = %error, "invalid script line skipped");
    InvalidLine { line, error }
}

#[cfg(test)]
#[path = "../tests/unit/cli.rs"]
mod tests;
