//! # Mariam POS Client Entry Point
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging, to stderr)
//! 2. Parse the command line
//! 3. Load config, open the local store, start the cart ledger
//! 4. Run the command, flush pending cart writes, exit

use clap::Parser;
use std::process::ExitCode;

use mariam_mobile::cli::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    mariam_mobile::init_tracing();

    let cli = Cli::parse();

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e.message);
            ExitCode::FAILURE
        }
    }
}
