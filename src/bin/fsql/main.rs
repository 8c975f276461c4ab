//! fsql CLI
//!
//! Lists or loads the files of a partitioned table that match a set of filters.

use clap::Parser;

mod args;
mod run;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Logs go to stderr, so stdout only carries listings and tables
    run::init_logging(args.log_level)?;

    run::execute(args).await
}
