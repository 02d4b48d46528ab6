//! The interactive front end (component C10): argument parsing, the command
//! table, and the stdin REPL loop built on top of the core.

pub mod args;
pub mod commands;
pub mod repl;
