//! mdexamples CLI: turn narrative markdown into runnable example bundles.
//!
//! Each document becomes a directory holding a commented snippet file,
//! a shell script and a links file.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
