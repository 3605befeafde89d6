//! CLI argument parsing using clap derive macros
//!
//! clap only handles the tool's own flags. Build options use a looser
//! `key[=value]` grammar (`-arch=arm`, `--armv=7`, `--v`) that clap cannot
//! express, so they are collected verbatim and handed to [`OptionMap`].

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::build::{self, host, InvocationPlan};
use crate::config::{CrossgoConfig, MANIFEST_FILE};
use crate::error::hints;
use crate::exec::{self, runner};
use crate::options::OptionMap;
use crate::utils::terminal::{print_hint, print_info, print_step, print_warning};

/// crossgo - Go cross-compilation front-end
///
/// Derives GOOS/GOARCH/GOARM, cgo cross compilers and ARM compiler flags for
/// a target, then runs the Go build with live output.
#[derive(Parser, Debug)]
#[command(name = "crossgo")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "BUILD OPTIONS:\n  \
    --arch=<arch>       Target GOARCH [default: arm]\n  \
    --armv=<5|6|7>      ARM variant (GOARM)\n  \
    --os=<os>           Target GOOS [default: linux]\n  \
    --outputDir=<dir>   Output directory [default: build/]\n  \
    --cc=<bool>         Use cgo cross compilers [default: true]\n  \
    --ccgcc=<path>      C cross compiler\n  \
    --ccgxx=<path>      C++ cross compiler\n  \
    --bflags=<a,b>      Extra -X linker assignments\n  \
    --v                 Print the full command before running\n\n\
    Tool flags must come before the first build option.")]
pub struct Cli {
    /// Path to Crossgo.toml (searched upward from the working directory by default)
    #[arg(long, env = "CROSSGO_MANIFEST", value_name = "PATH")]
    pub manifest_path: Option<PathBuf>,

    /// Override the detected host architecture
    #[arg(long, value_name = "ARCH")]
    pub host_arch: Option<String>,

    /// Print the resolved command without running it
    #[arg(long)]
    pub dry_run: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Build options, e.g. --arch=arm --armv=7 --v
    #[arg(value_name = "OPTIONS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub options: Vec<String>,
}

impl Cli {
    /// Execute the build, returning the exit code to finish with
    pub async fn execute(self) -> Result<i32> {
        // Set up terminal colors
        if self.no_color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        let options = OptionMap::parse(&self.options);
        let (config, manifest_path) = CrossgoConfig::discover(self.manifest_path.as_deref())?;
        let host_arch = self
            .host_arch
            .as_deref()
            .map(host::normalize_arch)
            .unwrap_or_else(host::detect_arch);

        let plan = build::resolve(&options, &host_arch, &config)?;
        let verbose = plan.target.verbose;

        if verbose {
            match &manifest_path {
                Some(path) => print_info(&format!("Using {}", path.display())),
                None => print_info(&format!("No {} found, using defaults", MANIFEST_FILE)),
            }
            print_info(&format!("Host architecture: {}", host_arch));
            match plan.env_var("CC") {
                Some(cc) => print_info(&format!("cgo cross compiling with {}", cc)),
                None => print_info("cgo cross compilation disabled"),
            }
            print_info(&format!("Linker flags: {}", plan.ldflags));
            print_info(&format!("Output: {}", plan.output_path));
            for unknown in build::unknown_options(&options) {
                print_warning(&format!("Ignoring unknown option '{}'", unknown));
            }
        }

        print_step("Building", &format!("{}...", plan.output_name));
        if verbose || self.dry_run {
            println!("Command: {}", plan.command_line());
        }

        if self.dry_run {
            return Ok(0);
        }

        warn_missing_tools(&plan);

        let mut stdout = std::io::stdout();
        let outcome = runner::run(&plan.shell_command(), &mut stdout).await?;
        outcome.report(&mut stdout)?;

        Ok(outcome.exit_code())
    }
}

/// Warn about build tool or cross compiler missing from PATH.
///
/// The build still runs; the shell's exit code decides the outcome.
fn warn_missing_tools(plan: &InvocationPlan) {
    if let Some(program) = exec::program_of(&plan.tool) {
        if !exec::command_exists(program) {
            print_warning(&format!("`{}` not found on PATH", program));
            print_hint(hints::go());
        }
    }

    if !plan.cross_compile {
        return;
    }
    if let Some(cc) = plan.target.cc_path.as_deref() {
        if let Some(program) = exec::program_of(cc) {
            if !exec::command_exists(program) {
                print_warning(&format!("cross compiler `{}` not found on PATH", program));
                print_hint(&hints::cross_compiler(cc));
            }
        }
    }
}
