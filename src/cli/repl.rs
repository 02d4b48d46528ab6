//! The interactive read-eval-print loop (component C10). Reads lines from
//! stdin and feeds each to [`commands::execute`] until `quit`/`exit` or EOF.
//! Replaces the original's GNU readline integration, explicitly out of
//! scope here: plain line-buffered stdin is enough for a scriptable core.

use crate::cli::commands::{self, Outcome};
use crate::globals::Globals;
use std::io::{self, BufRead, Write};

/// Run the interactive loop against `stdin`/`stdout`. In backend mode, the
/// prompt is suppressed and every response is printed on its own line so a
/// scripted frontend can read deterministically.
pub fn run(globals: &mut Globals) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if !globals.options.backend_mode {
            print!("> ");
            let _ = stdout.flush();
        }

        let mut line = String::new();
        let bytes_read = stdin.lock().read_line(&mut line);
        match bytes_read {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(_) => break,
        }

        match commands::execute(globals, &line) {
            Outcome::Continue(msg) => {
                if !msg.is_empty() {
                    println!("{msg}");
                }
            }
            Outcome::Quit => break,
        }
    }
}

/// Run exactly one command non-interactively (`--command STR`), for
/// scriptable front ends and the test suite. Returns the process exit code.
pub fn run_once(globals: &mut Globals, command: &str) -> i32 {
    match commands::execute(globals, command) {
        Outcome::Continue(msg) => {
            if !msg.is_empty() {
                println!("{msg}");
            }
            if msg.starts_with("error:") {
                1
            } else {
                0
            }
        }
        Outcome::Quit => 0,
    }
}
