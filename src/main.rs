//! crossgo - Go cross-compilation front-end
//!
//! Resolves a target (os, arch, ARM variant) into the environment, compiler
//! flags and linker flags a cgo cross build needs, then runs the build and
//! mirrors its exit code.
//!
//! ## Architecture
//!
//! ```text
//! tokens → options → build (BuildTarget → InvocationPlan) → exec::runner → exit code
//! ```

mod build;
mod cli;
mod config;
mod error;
mod exec;
mod options;
mod utils;

use clap::Parser;

use cli::Cli;
use error::CrossgoError;
use utils::terminal::print_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match cli.execute().await {
        Ok(code) => code,
        Err(err) => {
            match err.downcast_ref::<CrossgoError>() {
                Some(e) => e.display_with_hints(),
                None => print_error(&format!("{:#}", err)),
            }
            1
        }
    };

    std::process::exit(code);
}
