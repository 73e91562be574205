use clap::Parser;
use tinyg_config::cli::Cli;
use tinyg_config::{commands, init_logging};

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first to get verbose flag
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    commands::run(&cli)
}
