//! Pilum CLI binary.

use clap::Parser;
use pilum::cli::{args::*, commands::*};
use std::process;

fn main() {
    let args = PilumArgs::parse();

    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
