use clap::Parser;
use std::process::ExitCode;
use stunting::cli::{self, Cli};
use stunting::config;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    config::init_tracing(&cli.log_level);

    match cli::run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
