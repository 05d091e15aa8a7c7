#![cfg(not(tarpaulin_include))]

mod commands;
mod error;
mod util;
use argh::FromArgs;
use core::error::Error;

#[derive(FromArgs, Debug)]
/// Inspection tool for .basis texture files
struct TopLevel {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
enum Commands {
    Info(commands::info::InfoCmd),
    Sizes(commands::sizes::SizesCmd),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli: TopLevel = argh::from_env();

    match cli.command {
        Commands::Info(cmd) => {
            commands::info::handle_info_command(cmd)?;
        }
        Commands::Sizes(cmd) => {
            commands::sizes::handle_sizes_command(cmd)?;
        }
    }

    Ok(())
}
