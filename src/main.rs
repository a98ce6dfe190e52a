//! tokendoc binary

use std::process;
use tokendoc::{Cli, TokenDocError};

fn main() {
    let mut cli = Cli::new();

    match cli.run() {
        Ok(()) => {}
        Err(TokenDocError::Io(e)) => {
            eprintln!("IO Error: {}", e);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("tokendoc failed: {}", e);
            process::exit(1);
        }
    }
}
