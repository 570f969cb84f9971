//! CLI argument parsing

use crate::backends;
use clap::{Parser, Subcommand};

/// Generate dynamic help text for the backend argument
fn backend_help() -> String {
    format!(
        "Backend to use [available: {}]",
        backends::backend_names_short()
    )
}

#[derive(Parser)]
#[command(name = "ccdebug")]
#[command(author, version, about = "CC253x/CC254x debug interface tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short, long, default_value = "sim", global = true, help = backend_help())]
    pub backend: String,

    /// Multiply all protocol hold times (for long wires or level shifters)
    #[arg(long, default_value_t = 1, global = true)]
    pub timing_scale: u32,

    /// Maximum busy polls while waiting for the target
    #[arg(long, global = true, conflicts_with = "no_poll_limit")]
    pub poll_limit: Option<u32>,

    /// Wait for the target indefinitely
    #[arg(long, global = true)]
    pub no_poll_limit: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Identify the target and show its debug state
    Info,

    /// Show the decoded debug status
    Status,

    /// Single-step instructions
    Step {
        /// Number of instructions to step
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
    },

    /// Execute one instruction (1-3 bytes, hex)
    Exec {
        /// Instruction bytes, e.g. `74 5A` for MOV A,#0x5A
        #[arg(required = true, num_args = 1..=3)]
        bytes: Vec<String>,
    },

    /// Mass-erase flash and lock bits
    Erase {
        /// Status reads to wait for the erase to finish
        #[arg(long, default_value_t = 500)]
        max_polls: u32,
    },

    /// Resume the CPU and leave debug mode
    Resume,

    /// List available backends
    ListBackends,
}
