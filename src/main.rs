//! incmake - minimal incremental make

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = incmake::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
