//! ccdebug - CC253x/CC254x debug interface tool
//!
//! Drives the two-wire debug port of TI CC253x/CC254x SoCs through a
//! pluggable line backend. With the default `sim` backend every command
//! runs against an in-memory target.

mod backends;
mod cli;
mod commands;

use ccdebug_core::{CcDebugger, DebuggerConfig, Timing};
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if let Commands::ListBackends = cli.command {
        list_backends();
        return Ok(());
    }

    let config = debugger_config(&cli);
    log::debug!("Timing: {:?}", config.timing);

    let lines = backends::open_backend(&cli.backend)?;
    let mut dbg = CcDebugger::new(lines, config);

    let result = match cli.command {
        Commands::Info => commands::run_info(&mut dbg),
        Commands::Status => commands::run_status(&mut dbg),
        Commands::Step { count } => commands::run_step(&mut dbg, count),
        Commands::Exec { bytes } => commands::run_exec(&mut dbg, &bytes),
        Commands::Erase { max_polls } => commands::run_erase(&mut dbg, max_polls),
        Commands::Resume => commands::run_resume(&mut dbg).map(|_| ()),
        Commands::ListBackends => Ok(()),
    };

    // Releases the lines and resumes the CPU if still halted
    dbg.activate(false);

    result.map_err(Into::into)
}

fn debugger_config(cli: &Cli) -> DebuggerConfig {
    let mut config =
        DebuggerConfig::default().with_timing(Timing::default().scaled(cli.timing_scale));
    if cli.no_poll_limit {
        config = config.with_ready_poll_limit(None);
    } else if let Some(limit) = cli.poll_limit {
        config = config.with_ready_poll_limit(Some(limit));
    }
    config
}

fn list_backends() {
    println!("Available backends:");
    for backend in backends::available_backends() {
        let aliases = if backend.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", backend.aliases.join(", "))
        };
        println!("  {:<12} {}{}", backend.name, backend.description, aliases);
    }
}
