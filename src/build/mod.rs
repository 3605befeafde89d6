//! Build configuration resolution
//!
//! Turns parsed build options into everything needed to run one cross build:
//!
//! ```text
//! OptionMap → BuildTarget (defaults applied) → InvocationPlan (env, ldflags, command)
//! ```
//!
//! ## Modules
//!
//! - `flags` - ARM variant → C/C++ compiler flag table
//! - `host` - host architecture detection in `GOARCH` spelling
//! - `plan` - environment, linker flags, output naming and command assembly
//!
//! Nothing here validates `arch` or `os`. Unsupported combinations go
//! straight to the build tool and fail there.

pub mod flags;
pub mod host;
pub mod plan;

pub use plan::InvocationPlan;

use crate::config::CrossgoConfig;
use crate::error::CrossgoError;
use crate::options::OptionMap;

/// Option keys read by the resolver; anything else is ignored
pub const KNOWN_OPTIONS: &[&str] = &[
    "arch", "armv", "bflags", "cc", "os", "outputDir", "v", "ccgcc", "ccgxx",
];

const DEFAULT_ARCH: &str = "arm";
const DEFAULT_OS: &str = "linux";

/// Built-in cross compilers, used when neither the options nor the manifest
/// name one for the target architecture
fn builtin_toolchain(arch: &str) -> Option<(&'static str, &'static str)> {
    match arch {
        "arm" => Some(("arm-linux-gnueabihf-gcc", "arm-linux-gnueabihf-g++")),
        _ => None,
    }
}

/// Resolved build target with all defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct BuildTarget {
    /// `GOARCH` value
    pub arch: String,
    /// `GOARM` value, only meaningful for `arch = "arm"`
    pub arm_variant: Option<u32>,
    /// `GOOS` value
    pub os: String,
    /// Output directory, always empty or ending with a separator
    pub output_dir: String,
    /// Print the full command before running it
    pub verbose: bool,
    /// Enable cgo with the cross compilers when building for another arch
    pub use_cross_compiler: bool,
    /// C cross compiler
    pub cc_path: Option<String>,
    /// C++ cross compiler
    pub cxx_path: Option<String>,
    /// Extra `-X` assignments from `--bflags` (comma-separated)
    pub extra_ldflags: Vec<String>,
}

impl BuildTarget {
    /// Apply defaults to the parsed options.
    ///
    /// Explicit options win over manifest values, which win over built-in
    /// defaults.
    pub fn from_options(options: &OptionMap, config: &CrossgoConfig) -> Self {
        let arch = options.text("arch").unwrap_or_else(|| DEFAULT_ARCH.to_string());

        let configured = config.toolchain(&arch);
        let builtin = builtin_toolchain(&arch);

        let cc_path = options
            .text("ccgcc")
            .or_else(|| configured.and_then(|t| t.cc.clone()))
            .or_else(|| builtin.map(|(cc, _)| cc.to_string()));
        let cxx_path = options
            .text("ccgxx")
            .or_else(|| configured.and_then(|t| t.cxx.clone()))
            .or_else(|| builtin.map(|(_, cxx)| cxx.to_string()));

        let output_dir = normalize_output_dir(
            options
                .text("outputDir")
                .unwrap_or_else(|| config.build.output_dir.clone()),
        );

        let extra_ldflags = options
            .text("bflags")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            arch,
            arm_variant: options.variant("armv"),
            os: options.text("os").unwrap_or_else(|| DEFAULT_OS.to_string()),
            output_dir,
            verbose: options.flag("v").unwrap_or(false),
            use_cross_compiler: options.flag("cc").unwrap_or(true),
            cc_path,
            cxx_path,
            extra_ldflags,
        }
    }

    /// Target identifier, e.g. `armv7` or `amd64`
    pub fn arch_id(&self) -> String {
        match self.arm_variant {
            Some(variant) => format!("{}v{}", self.arch, variant),
            None => self.arch.clone(),
        }
    }

    /// Whether cgo should be enabled with the cross compilers.
    ///
    /// `host_arch` is normalized before comparison (`x64` → `amd64`).
    pub fn needs_cross_compiler(&self, host_arch: &str) -> bool {
        self.use_cross_compiler
            && self.cc_path.is_some()
            && self.arch != host::normalize_arch(host_arch)
    }
}

/// Make sure a non-empty output directory ends with a separator
fn normalize_output_dir(mut dir: String) -> String {
    if !dir.is_empty() && !dir.ends_with('/') && !dir.ends_with('\\') {
        dir.push('/');
    }
    dir
}

/// Option keys present in `options` that the resolver does not read
pub fn unknown_options(options: &OptionMap) -> Vec<String> {
    options
        .iter()
        .filter(|(key, _)| !KNOWN_OPTIONS.contains(&key.as_str()))
        .map(|(key, value)| format!("{}={}", key, value))
        .collect()
}

/// Resolve parsed options into a ready-to-run invocation plan
pub fn resolve(
    options: &OptionMap,
    host_arch: &str,
    config: &CrossgoConfig,
) -> Result<InvocationPlan, CrossgoError> {
    let target = BuildTarget::from_options(options, config);
    InvocationPlan::new(target, host_arch, config)
}
