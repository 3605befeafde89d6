//! Invocation plan assembly
//!
//! The plan is the fully resolved build: child environment, linker flags,
//! output path, and the build tool command. It renders two ways:
//!
//! - [`InvocationPlan::command_line`] - `ENV=... go build ...`, for display
//! - [`InvocationPlan::shell_command`] - tool line plus an env list, for running
//!
//! Keeping the environment out of the executed line lets the same plan run
//! under `cmd` as well as `sh`.

use super::{flags, BuildTarget};
use crate::config::CrossgoConfig;
use crate::error::CrossgoError;
use crate::exec::runner::ShellCommand;

/// Fully resolved build invocation
#[derive(Debug, Clone)]
pub struct InvocationPlan {
    /// Target the plan was built from
    pub target: BuildTarget,
    /// Child environment assignments in application order
    pub env: Vec<(String, String)>,
    /// Value passed to `-ldflags`
    pub ldflags: String,
    /// Artifact file name, e.g. `reagent-linux-armv7`
    pub output_name: String,
    /// Output directory joined with the artifact name
    pub output_path: String,
    /// Build tool command
    pub tool: String,
    /// Arguments following the build tool
    pub args: Vec<String>,
    /// Whether cgo is enabled with the cross compilers
    pub cross_compile: bool,
}

impl InvocationPlan {
    /// Assemble the plan for `target` on a host of architecture `host_arch`
    pub fn new(
        target: BuildTarget,
        host_arch: &str,
        config: &CrossgoConfig,
    ) -> Result<Self, CrossgoError> {
        let cross_compile = target.needs_cross_compiler(host_arch);
        let env = build_env(&target, cross_compile);
        let ldflags = build_ldflags(&target, config)?;
        let output_name = output_name(&config.package.name, &target.os, &target.arch_id());
        let output_path = format!("{}{}", target.output_dir, output_name);

        let mut args = vec!["build".to_string(), "-v".to_string()];
        if config.build.force_rebuild {
            args.push("-a".to_string());
        }
        args.extend([
            "-o".to_string(),
            output_path.clone(),
            "-ldflags".to_string(),
            ldflags.clone(),
            config.package.main.clone(),
        ]);

        Ok(Self {
            target,
            env,
            ldflags,
            output_name,
            output_path,
            tool: config.build.tool.clone(),
            args,
            cross_compile,
        })
    }

    /// Value assigned to an environment variable, if the plan sets it
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Build tool invocation without environment assignments
    pub fn tool_command_line(&self) -> String {
        let mut parts = vec![self.tool.clone()];
        parts.extend(self.args.iter().map(|arg| quote(arg)));
        parts.join(" ")
    }

    /// Complete command line: environment assignments then the tool invocation
    pub fn command_line(&self) -> String {
        let mut parts: Vec<String> = self
            .env
            .iter()
            .map(|(key, value)| format!("{}={}", key, quote(value)))
            .collect();
        parts.push(self.tool_command_line());
        parts.join(" ")
    }

    /// Command for the runner, with the environment applied to the child
    pub fn shell_command(&self) -> ShellCommand {
        ShellCommand::new(self.tool_command_line()).with_envs(self.env.clone())
    }
}

/// Artifact file name: `<name>-<os>-<arch_id>`, `.exe` for Windows
pub fn output_name(name: &str, os: &str, arch_id: &str) -> String {
    let mut output = format!("{}-{}-{}", name, os, arch_id);
    if os == "windows" {
        output.push_str(".exe");
    }
    output
}

fn build_env(target: &BuildTarget, cross_compile: bool) -> Vec<(String, String)> {
    let mut env = vec![
        ("GOOS".to_string(), target.os.clone()),
        ("GOARCH".to_string(), target.arch.clone()),
    ];

    if cross_compile {
        env.push(("CGO_ENABLED".to_string(), "1".to_string()));
        if let Some(cc) = &target.cc_path {
            env.push(("CC".to_string(), cc.clone()));
        }
        if let Some(cxx) = &target.cxx_path {
            env.push(("CXX".to_string(), cxx.clone()));
        }
        if let Some(variant_flags) = target.arm_variant.and_then(flags::for_variant) {
            env.push(("CGO_CFLAGS".to_string(), variant_flags.cflags.to_string()));
            env.push(("CGO_CXXFLAGS".to_string(), variant_flags.cxxflags.to_string()));
        }
    }

    if let Some(variant) = target.arm_variant {
        env.push(("GOARM".to_string(), variant.to_string()));
    }

    env
}

fn build_ldflags(target: &BuildTarget, config: &CrossgoConfig) -> Result<String, CrossgoError> {
    let identity = format!("{}={}", config.build.version_symbol, target.arch_id());

    let mut parts = Vec::new();
    for entry in std::iter::once(&identity)
        .chain(config.build.ldflags.iter())
        .chain(target.extra_ldflags.iter())
    {
        parts.push(x_flag(entry)?);
    }

    if config.build.static_link {
        parts.push("-extldflags=-static".to_string());
    }

    Ok(parts.join(" "))
}

/// One `-X` assignment, quoted so `go build` reads it back as a single field.
///
/// The linker flag splitter knows bare fields and fields wrapped whole in `'`
/// or `"`, with no escapes inside.
fn x_flag(entry: &str) -> Result<String, CrossgoError> {
    if !entry.contains('\'') {
        return Ok(format!("-X '{}'", entry));
    }
    if !entry.contains('"') {
        return Ok(format!("-X \"{}\"", entry));
    }
    if entry.chars().any(char::is_whitespace) {
        return Err(CrossgoError::invalid_ldflag(
            entry,
            "contains both quote characters and whitespace",
        ));
    }
    if entry.starts_with(['\'', '"']) {
        return Err(CrossgoError::invalid_ldflag(
            entry,
            "starts with a quote but holds both quote characters",
        ));
    }
    Ok(format!("-X {}", entry))
}

/// Double-quote an argument for the shell when it needs it
fn quote(arg: &str) -> String {
    let needs_quotes = arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '$' | '`' | '\\' | '&' | '|' | ';' | '<' | '>'));
    if !needs_quotes {
        return arg.to_string();
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if matches!(c, '"' | '$' | '`' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
