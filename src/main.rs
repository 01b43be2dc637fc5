// The binary compiles the library modules again; items and re-exports only the
// library API uses are unreachable from here
#![allow(dead_code, unused_imports)]

mod cmd;
mod config;
mod import;
mod input;
mod parser;
mod remap;
mod source;
mod store;
mod translate;

use clap::Parser;
use cmd::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cmd::run(cli) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
