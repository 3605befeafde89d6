//! Error types and helpers for user-friendly error messages
//!
//! Only failures that happen locally get a typed error here. Problems with
//! the target itself (unknown architecture, missing sysroot, compile errors)
//! are left to the build tool, whose exit code is authoritative.

use thiserror::Error;

/// Custom error types with helpful context and suggestions
#[derive(Error, Debug)]
pub enum CrossgoError {
    /// Manifest errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },

    /// A `-X` assignment that `-ldflags` cannot carry
    #[error("Invalid linker assignment `{entry}`: {reason}")]
    Ldflag {
        entry: String,
        reason: String,
        hint: String,
    },

    /// The build process could not be started
    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
        hint: String,
    },
}

impl CrossgoError {
    /// Create a configuration error with source and hint
    pub fn config_error_with_hint(
        message: impl Into<String>,
        source: Option<anyhow::Error>,
        hint: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source,
            hint: Some(hint.into()),
        }
    }

    /// Create an error for an unquotable linker assignment
    pub fn invalid_ldflag(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Ldflag {
            entry: entry.into(),
            reason: reason.into(),
            hint: hints::ldflag().to_string(),
        }
    }

    /// Create a spawn failure error
    pub fn spawn_failure(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
            hint: hints::shell().to_string(),
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;

        eprintln!("\n{} {}", style("ERROR:").red().bold(), self);

        match self {
            CrossgoError::Config { source, hint, .. } => {
                if let Some(src) = source {
                    eprintln!("  {}", src);
                }
                if let Some(h) = hint {
                    eprintln!("\n{} {}", style("HINT:").yellow().bold(), h);
                }
            }
            CrossgoError::Ldflag { hint, .. } | CrossgoError::Spawn { hint, .. } => {
                eprintln!("\n{} {}", style("HINT:").yellow().bold(), hint);
            }
        }

        eprintln!();
    }
}

/// Common error hints
pub mod hints {
    /// Get hint for a missing Go toolchain
    pub fn go() -> &'static str {
        "Install Go from https://go.dev/dl/ or use your package manager:\n\
         • macOS: brew install go\n\
         • Ubuntu: sudo apt install golang-go\n\
         • Windows: winget install GoLang.Go\n\
         \n\
         Or point [build] tool in Crossgo.toml at the toolchain to use."
    }

    /// Get hint for a missing cross compiler
    pub fn cross_compiler(cc: &str) -> String {
        format!(
            "cgo cross builds need `{}` on PATH.\n\
             • Ubuntu (arm): sudo apt install gcc-arm-linux-gnueabihf g++-arm-linux-gnueabihf\n\
             • Or pass --ccgcc=<path> / --ccgxx=<path>\n\
             • Or disable cgo cross compilation with --cc=false",
            cc
        )
    }

    /// Get hint for invalid Crossgo.toml
    pub fn invalid_manifest() -> &'static str {
        "Crossgo.toml is invalid. Common issues:\n\
         • Invalid TOML syntax (check quotes, brackets, commas)\n\
         • Unknown section or key (allowed: [package], [build], [toolchains.<arch>])\n\
         • Empty package.name, package.main, build.tool or build.version_symbol"
    }

    /// Get hint for a malformed version symbol
    pub fn version_symbol() -> &'static str {
        "build.version_symbol is passed to the linker as -X '<symbol>=<arch>'.\n\
         It must name a package-level string variable, e.g. \"example.com/app/release.BuildArch\"."
    }

    /// Get hint for a linker assignment that cannot be quoted
    pub fn ldflag() -> &'static str {
        "Each -X assignment is passed as one -ldflags field, wrapped in ' or \".\n\
         A value may use one kind of quote, or both only when it has no whitespace."
    }

    /// Get hint for a missing shell
    pub fn shell() -> &'static str {
        "The build command is run through the system shell (sh on Unix, cmd on Windows).\n\
         Check that it is installed and reachable."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err = CrossgoError::config_error_with_hint("bad value", None, "fix it");
        assert_eq!(err.to_string(), "Configuration error: bad value");
    }

    #[test]
    fn test_spawn_error_carries_os_text() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory");
        let err = CrossgoError::spawn_failure("go build .", io);
        let message = err.to_string();
        assert!(message.contains("go build ."));
        assert!(message.contains("No such file or directory"));
    }

    #[test]
    fn test_ldflag_error_names_entry() {
        let err = CrossgoError::invalid_ldflag("main.A='x\" y", "mixes quotes");
        assert_eq!(
            err.to_string(),
            "Invalid linker assignment `main.A='x\" y`: mixes quotes"
        );
    }

    #[test]
    fn test_cross_compiler_hint_names_compiler() {
        assert!(hints::cross_compiler("arm-linux-gnueabihf-gcc").contains("arm-linux-gnueabihf-gcc"));
    }
}
