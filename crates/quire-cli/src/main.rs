use clap::Parser;
use quire_cli::{CliArgs, QuireCli};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let cli = match QuireCli::from_args("quire", &args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("quire: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("quire: {e}");
            ExitCode::FAILURE
        }
    }
}
