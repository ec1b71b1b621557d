use getfile_core::logging;
use std::io::Write;

mod cli;

use crate::cli::Cli;

fn main() {
    // Initialize logging as early as possible; fall back to stderr if the log file is unavailable.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    let code = match Cli::run_from_args() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("getfile error: {:#}", err);
            1
        }
    };
    let _ = std::io::stdout().flush();
    std::process::exit(code);
}
