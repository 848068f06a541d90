use chains_attest::{
    cli::{self, commands::Commands},
    error::Result,
};
use clap::Parser;

#[derive(Parser)]
#[command(name = cli::CLI_NAME, version = cli::CLI_VERSION, author, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Initialize logging
    chains_attest::init_logging()?;

    // Parse command line arguments
    let cli = Cli::parse();

    let result = cli::handlers::handle_command(cli.command);

    // Format and display any errors
    if let Err(ref e) = result {
        eprintln!("{}", cli::format_error(e));
    }

    result
}
