use clap::Parser;

use searchlauncher::cli::{self, Cli};

#[tokio::main]
async fn main() {
    searchlauncher::logging::init();

    if let Err(e) = cli::run(Cli::parse()).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
