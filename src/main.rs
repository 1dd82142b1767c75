//! csvstore CLI entry point
//!
//! Delegates everything to the CLI module; prints errors to stderr and exits
//! non-zero on failure.

use csvstore::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
