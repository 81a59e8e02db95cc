//! # tagforge CLI
//!
//! Command-line front end for `tagforge-core`: bulk tag edits over image
//! datasets with sidecar tag files. Run `tagforge --help` for usage.

mod cli;
mod config;
mod dataset;
mod isolated;
mod session;
pub mod ui;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
