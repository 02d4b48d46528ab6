//! Structured logging setup (component C9), replacing the original's
//! `show_error`/`show_info`/`show_debug`/`show_backtrace` family in
//! `show_message.c` with `tracing` spans and events.
//!
//! Interactive mode logs human-readable lines to stderr at the level
//! selected by `-v`/`--verbose`. Backend mode additionally drops ANSI color
//! and keeps every diagnostic on its own line, so a scripted frontend can
//! parse output deterministically.

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. `verbosity` follows the `-v`
/// repeat count (0 = warn, 1 = info, 2 = debug, 3+ = trace); `RUST_LOG`
/// overrides it when set, matching the teacher crate's `init_tracing`.
pub fn init(verbosity: u8, backend_mode: bool) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(!backend_mode)
        .init();
}
