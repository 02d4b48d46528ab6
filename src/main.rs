//! Binary entry point for the `scanmem` interactive memory scanner.
//!
//! Parses startup options, installs the `Ctrl-C` cancellation handler,
//! optionally attaches to a target pid, and either runs the stdin REPL or a
//! single non-interactive command. Exit codes: 0 for a clean exit, nonzero
//! only for failed argument parsing or initialization, per the original's
//! contract for `main()` in `main.c`.

use clap::Parser;
use scanmem::cli::args::Args;
use scanmem::cli::repl;
use scanmem::globals::Globals;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

static STOP_HANDLE: OnceLock<Arc<AtomicBool>> = OnceLock::new();

extern "C" fn handle_sigint(_signum: libc::c_int) {
    if let Some(flag) = STOP_HANDLE.get() {
        flag.store(true, Ordering::SeqCst);
    }
}

/// Route `SIGINT` to the stop-flag instead of the default terminate action,
/// so a long-running `set`/`watch` loop can be cancelled without killing the
/// attached target mid-write. Mirrors the original's `sighandler`.
fn install_signal_handler(flag: Arc<AtomicBool>) {
    let _ = STOP_HANDLE.set(flag);
    unsafe {
        libc::signal(libc::SIGINT, handle_sigint as *const () as libc::sighandler_t);
    }
}

fn main() {
    let args = Args::parse();

    scanmem::logging::init(args.verbose, args.backend);

    let mut globals = Globals::new();
    globals.options.backend_mode = args.backend;
    install_signal_handler(globals.stop_flag.clone());

    if let Some(pid) = args.pid {
        globals.set_pid(pid);
        if let Err(e) = globals.reset() {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }

    let exit_code = if let Some(command) = args.command.as_deref() {
        repl::run_once(&mut globals, command)
    } else {
        repl::run(&mut globals);
        0
    };
    std::process::exit(exit_code);
}
