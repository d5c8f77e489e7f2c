use std::io::{self, BufReader};
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

/// Incremental monotone-lattice decision engine over the Boolean lattice B^N.
#[derive(Parser, Debug)]
#[command(name = "lattice")]
struct Args {
    /// Dimension of the lattice (number of Boolean coordinates). Must be >= 1.
    n: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(2);
        }
    };

    if args.n == 0 {
        eprintln!("lattice: N must be at least 1");
        return ExitCode::from(2);
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    match lattice_cli::run(args.n, BufReader::new(stdin.lock()), stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "driver exited with error");
            ExitCode::FAILURE
        }
    }
}
