//! Command-line argument parsing for the `scanmem` binary (component C10).
//!
//! Replaces the upstream `getopt_long`-based option loop in `main.c` with a
//! `clap`-derived struct, following the same `#[derive(Parser)]` shape the
//! `huginn-proxy` front end uses for its own startup options.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive memory scanner")]
pub struct Args {
    /// Attach to this pid immediately on startup.
    #[arg(long)]
    pub pid: Option<i32>,

    /// Machine-readable output: progress lines and diagnostics are emitted
    /// in a stable, parseable format instead of human-facing text.
    #[arg(long)]
    pub backend: bool,

    /// Run a single command non-interactively, then exit. Used by the test
    /// suite and scriptable front ends that don't want a REPL.
    #[arg(long, value_name = "STR")]
    pub command: Option<String>,

    /// Raise the tracing filter level; repeatable (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
