use anyhow::Result;
use butterfly_chsearch::cli::{init_logging, Cli};
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);
    cli.run()
}
