use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;
use std::rc::Rc;

use hostext::core::event::{EventData, HostEvent, LoadProjectEvent, CLOSE_PROJECT};
use hostext::extensions::builtin_extensions;
use hostext::kernel::services::adapters::{ensure_settings_file, load_settings, ConsoleDiagnostics};
use hostext::kernel::services::ports::EventDispatcher;
use hostext::kernel::services::{EventBus, ServiceLocator};

mod cli;
mod logging;

use cli::{CliArgs, USAGE};

fn main() -> ExitCode {
    let args = match cli::parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("hostext: {e}\n{USAGE}");
            return ExitCode::from(2);
        }
    };
    if args.help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "host stopped");
            eprintln!("hostext: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> io::Result<()> {
    let settings_file = ensure_settings_file();
    let settings = load_settings();
    let logging = logging::init(&settings.log_filter, args.echo_log);
    if logging.is_none() {
        eprintln!("hostext: logging unavailable");
    }
    if let Err(e) = settings_file {
        tracing::warn!(error = %e, "settings file unavailable; using defaults");
    }

    let locator = ServiceLocator::new(Rc::new(ConsoleDiagnostics::new(
        settings.diagnostics.echo_to_stderr,
    )));
    let bus = Rc::new(EventBus::new());

    let mut extensions = settings.extensions.clone();
    if args.no_builtin {
        extensions.load_builtin = false;
    }
    let failures = locator.load_services(builtin_extensions(&extensions));
    locator.subscribe_to_events(bus.clone());
    tracing::info!(
        project_services = locator.project_services().len(),
        resource_services = locator.resource_services().len(),
        failed = failures.len(),
        "extensions loaded"
    );

    let mut project_open = false;
    if let Some(project) = &args.project {
        let path = project.canonicalize().unwrap_or_else(|_| project.clone());
        let ev = HostEvent::LoadProject(LoadProjectEvent {
            path: path.display().to_string(),
        });
        bus.send_event(ev.event_type(), &ev.to_data());
        project_open = true;
    }

    let summary = match &args.script {
        Some(path) => cli::replay(BufReader::new(File::open(path)?), &*bus, project_open)?,
        None => cli::replay(io::stdin().lock(), &*bus, project_open)?,
    };
    for invalid in &summary.invalid {
        eprintln!("hostext: line {}: {}", invalid.line, invalid.error);
    }

    if summary.project_open {
        bus.send_event(CLOSE_PROJECT, &EventData::Null);
    }

    tracing::info!(
        sent = summary.sent,
        invalid = summary.invalid.len(),
        "script finished"
    );
    if let Some(guard) = &logging {
        if args.echo_log {
            eprintln!("hostext: log written to {}", guard.log_dir().display());
        }
    }
    Ok(())
}
