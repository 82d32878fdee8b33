// src/bin/cli.rs
use dynamic_pricing::cli;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    cli::run()
}
