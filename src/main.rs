use std::process::ExitCode;

use clap::Parser;
use gcodelens::{init_logging, render, render_error, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging is best-effort; the JSON result on stdout is what callers consume
    if let Err(e) = init_logging(cli.log_format) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let outcome = cli
        .execute()
        .and_then(|result| render(&result, cli.pretty).map_err(Into::into));

    match outcome {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Analysis failed: {e:#}");
            println!("{}", render_error(&e));
            ExitCode::FAILURE
        }
    }
}
