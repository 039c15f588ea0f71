use std::process::ExitCode;

use colored::Colorize;

use hoist_config::GitConfigStore;
use hoist_push::report::render_outcome;
use hoist_push::{execute_push, prepare_push, run_push, PushExit, Reporter};
use hoist_transport::{GitTransport, PushOutcome, RefStatus, TransportError};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let store = GitConfigStore::open(&cli.directory)?;
    tracing::debug!(git_dir = %store.git_dir().display(), "opened repository");
    match cli.command {
        Command::Push(args) => cmd_push(&store, &args, cli.format).await,
        Command::Resolve(args) => cmd_resolve(&store, &args, cli.format),
    }
}

async fn cmd_push(store: &GitConfigStore, args: &PushArgs, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let options = args.to_options()?;
    let transport = GitTransport::new(store.git_dir());
    let mut reporter = TerminalReporter {
        verbosity: options.verbosity,
        show_outcomes: format == OutputFormat::Text,
    };

    let exit = match format {
        OutputFormat::Text => run_push(store, &transport, &mut reporter, &options).await,
        OutputFormat::Json => match execute_push(store, &transport, &mut reporter, &options).await {
            Ok(report) => {
                println!("{}", serde_json::to_string_pretty(&report)?);
                if report.is_success() {
                    PushExit::Success
                } else {
                    PushExit::Failure
                }
            }
            Err(err) => {
                reporter.fatal(&err.to_string());
                PushExit::Fatal
            }
        },
    };
    Ok(ExitCode::from(exit.code()))
}

fn cmd_resolve(store: &GitConfigStore, args: &PushArgs, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let options = args.to_options()?;
    let plan = match prepare_push(store, &options) {
        Ok(plan) => plan,
        Err(err) => {
            print_fatal(&err.to_string());
            return Ok(ExitCode::from(PushExit::Fatal.code()));
        }
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Text => {
            println!("Remote {}", plan.remote.name.bold());
            for url in plan.remote.push_endpoints() {
                println!("  {} {}", "url:".cyan(), url);
            }
            if plan.refspecs.is_empty() {
                println!("  {} (expanded by the transport: {})", "refspecs:".cyan(), plan.flags);
            }
            for refspec in &plan.refspecs {
                println!("  {} {}", "refspec:".cyan(), refspec.to_string().yellow());
            }
            println!("  {} {}", "flags:".cyan(), plan.flags);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_fatal(message: &str) {
    eprintln!("{} {}", "fatal:".red().bold(), message);
}

/// Writes push progress the way a terminal user expects it: ref summaries
/// on stderr, porcelain on stdout, advice as `hint:` lines.
struct TerminalReporter {
    verbosity: i32,
    show_outcomes: bool,
}

impl Reporter for TerminalReporter {
    fn pushing_to(&mut self, url: &str) {
        eprintln!("Pushing to {url}");
    }

    fn ref_outcomes(&mut self, url: &str, outcome: &PushOutcome, porcelain: bool) {
        if !self.show_outcomes {
            return;
        }
        if porcelain {
            for line in render_outcome(url, outcome, true, false) {
                println!("{line}");
            }
            return;
        }

        let shown: Vec<_> = outcome
            .updates
            .iter()
            .filter(|u| match self.verbosity {
                v if v < 0 => u.status.is_rejected(),
                0 => u.status != RefStatus::UpToDate,
                _ => true,
            })
            .collect();
        if shown.is_empty() {
            return;
        }
        eprintln!("To {url}");
        for update in shown {
            let line = update.summary();
            if update.status.is_rejected() {
                eprintln!("{}", line.red());
            } else {
                eprintln!("{line}");
            }
        }
    }

    fn transport_error(&mut self, _url: &str, error: &TransportError) {
        eprintln!("{} {}", "error:".red().bold(), error);
    }

    fn push_failed(&mut self, url: &str) {
        eprintln!("{} failed to push some refs to '{}'", "error:".red().bold(), url);
    }

    fn advice(&mut self, message: &str) {
        for line in message.lines() {
            eprintln!("{} {}", "hint:".yellow(), line);
        }
    }

    fn fatal(&mut self, message: &str) {
        print_fatal(message);
    }
}
