//! studentdb entry point
//!
//! Parses arguments and dispatches to the CLI module. Any error, including a
//! store that cannot be opened, is printed to stderr and exits non-zero.

use studentdb::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
