//! Crossgo.toml configuration parsing
//!
//! The manifest holds the project constants a build needs beyond what is
//! passed on the command line. Every section is optional; an absent manifest
//! is equivalent to an empty one.
//!
//! ```toml
//! [package]
//! name = "reagent"
//! main = "."
//!
//! [build]
//! tool = "go"
//! version_symbol = "reagent/system.BuildArch"
//! static_link = true
//! ldflags = ["reagent/system.Channel=stable"]
//!
//! [toolchains.arm64]
//! cc = "aarch64-linux-gnu-gcc"
//! cxx = "aarch64-linux-gnu-g++"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::{hints, CrossgoError};

/// Manifest file name searched for in the working directory and its parents
pub const MANIFEST_FILE: &str = "Crossgo.toml";

/// Root configuration from Crossgo.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrossgoConfig {
    /// Artifact metadata (also accepted as [project])
    #[serde(default, alias = "project")]
    pub package: PackageConfig,

    /// Build tool invocation settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Cross compilers keyed by target architecture
    #[serde(default)]
    pub toolchains: HashMap<String, ToolchainConfig>,
}

/// Artifact metadata from [package]
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Artifact base name, output is `<name>-<os>-<arch>`
    pub name: String,

    /// Package handed to the build tool as the final argument
    pub main: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: "reagent".to_string(),
            main: ".".to_string(),
        }
    }
}

/// Build tool settings from [build]
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build tool command (shell words allowed)
    pub tool: String,

    /// `importpath.name` that receives the target identifier via `-X`
    pub version_symbol: String,

    /// Link the C runtime statically (`-extldflags=-static`)
    pub static_link: bool,

    /// Pass `-a` to force rebuilding of all packages
    pub force_rebuild: bool,

    /// Default output directory
    pub output_dir: String,

    /// Extra `-X` assignments added to every build
    pub ldflags: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            tool: "go".to_string(),
            version_symbol: "reagent/system.BuildArch".to_string(),
            static_link: true,
            force_rebuild: true,
            output_dir: "build/".to_string(),
            ldflags: Vec::new(),
        }
    }
}

/// Cross compilers for one architecture from [toolchains.<arch>]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolchainConfig {
    /// C compiler
    pub cc: Option<String>,

    /// C++ compiler
    pub cxx: Option<String>,
}

impl CrossgoConfig {
    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        Ok(Self::parse(&content)?)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self, CrossgoError> {
        let config: Self = toml::from_str(content).map_err(|e| {
            CrossgoError::config_error_with_hint(
                format!("Failed to parse {}", MANIFEST_FILE),
                Some(e.into()),
                hints::invalid_manifest(),
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Find Crossgo.toml by searching up from `start`
    pub fn find_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(MANIFEST_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Load an explicit manifest, or discover one from the working directory.
    ///
    /// Returns the manifest path alongside the config; `None` when built-in
    /// defaults are in use.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            let config = Self::load_from_path(path)?;
            return Ok((config, Some(path.to_path_buf())));
        }

        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        match Self::find_config(&current_dir) {
            Some(path) => {
                let config = Self::load_from_path(&path)?;
                Ok((config, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    /// Cross compilers configured for `arch`, if any
    pub fn toolchain(&self, arch: &str) -> Option<&ToolchainConfig> {
        self.toolchains.get(arch)
    }

    fn validate(&self) -> Result<(), CrossgoError> {
        let required = [
            ("package.name", &self.package.name),
            ("package.main", &self.package.main),
            ("build.tool", &self.build.tool),
            ("build.version_symbol", &self.build.version_symbol),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CrossgoError::config_error_with_hint(
                    format!("{} must not be empty", field),
                    None,
                    hints::invalid_manifest(),
                ));
            }
        }

        if !self.build.version_symbol.contains('.') {
            return Err(CrossgoError::config_error_with_hint(
                format!(
                    "build.version_symbol '{}' is not of the form importpath.name",
                    self.build.version_symbol
                ),
                None,
                hints::version_symbol(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = CrossgoConfig::parse("").unwrap();
        assert_eq!(config.package.name, "reagent");
        assert_eq!(config.package.main, ".");
        assert_eq!(config.build.tool, "go");
        assert_eq!(config.build.version_symbol, "reagent/system.BuildArch");
        assert!(config.build.static_link);
        assert!(config.build.force_rebuild);
        assert_eq!(config.build.output_dir, "build/");
        assert!(config.toolchains.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[package]
name = "agent"
main = "./cmd/agent"

[build]
tool = "go1.22"
version_symbol = "example.com/agent/release.BuildArch"
static_link = false
force_rebuild = false
output_dir = "dist"
ldflags = ["example.com/agent/release.Channel=beta"]

[toolchains.arm64]
cc = "aarch64-linux-gnu-gcc"
cxx = "aarch64-linux-gnu-g++"
"#;

        let config = CrossgoConfig::parse(toml).unwrap();
        assert_eq!(config.package.name, "agent");
        assert_eq!(config.package.main, "./cmd/agent");
        assert_eq!(config.build.tool, "go1.22");
        assert!(!config.build.static_link);
        assert!(!config.build.force_rebuild);
        assert_eq!(config.build.output_dir, "dist");
        assert_eq!(config.build.ldflags.len(), 1);

        let arm64 = config.toolchain("arm64").unwrap();
        assert_eq!(arm64.cc.as_deref(), Some("aarch64-linux-gnu-gcc"));
        assert_eq!(arm64.cxx.as_deref(), Some("aarch64-linux-gnu-g++"));
        assert!(config.toolchain("arm").is_none());
    }

    #[test]
    fn test_project_alias() {
        let config = CrossgoConfig::parse("[project]\nname = \"tool\"\n").unwrap();
        assert_eq!(config.package.name, "tool");
    }

    #[test]
    fn test_parse_rejects_empty_name() {
        let err = CrossgoConfig::parse("[package]\nname = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("package.name"));
    }

    #[test]
    fn test_parse_rejects_bad_version_symbol() {
        let err = CrossgoConfig::parse("[build]\nversion_symbol = \"BuildArch\"\n").unwrap_err();
        assert!(err.to_string().contains("importpath.name"));
    }

    #[test]
    fn test_parse_rejects_invalid_toml() {
        let err = CrossgoConfig::parse("[package\nname = 1").unwrap_err();
        assert!(matches!(err, CrossgoError::Config { .. }));
    }

    #[test]
    fn test_find_config_searches_parents() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("cmd").join("agent");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join(MANIFEST_FILE), "").unwrap();

        let found = CrossgoConfig::find_config(&nested).unwrap();
        assert_eq!(found, temp.path().join(MANIFEST_FILE));
    }

    #[test]
    #[serial]
    fn test_discover_without_manifest_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(temp.path()).unwrap();

        let result = CrossgoConfig::discover(None);
        std::env::set_current_dir(original).unwrap();

        let (config, path) = result.unwrap();
        assert!(path.is_none());
        assert_eq!(config.package.name, "reagent");
    }

    #[test]
    #[serial]
    fn test_discover_finds_manifest_in_working_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(MANIFEST_FILE),
            "[package]\nname = \"found\"\n",
        )
        .unwrap();
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(temp.path()).unwrap();

        let result = CrossgoConfig::discover(None);
        std::env::set_current_dir(original).unwrap();

        let (config, path) = result.unwrap();
        assert!(path.is_some());
        assert_eq!(config.package.name, "found");
    }

    #[test]
    fn test_discover_explicit_path() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join("custom.toml");
        std::fs::write(&manifest, "[build]\ntool = \"gotip\"\n").unwrap();

        let (config, path) = CrossgoConfig::discover(Some(&manifest)).unwrap();
        assert_eq!(path.as_deref(), Some(manifest.as_path()));
        assert_eq!(config.build.tool, "gotip");
    }

    #[test]
    fn test_discover_missing_explicit_path_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(CrossgoConfig::discover(Some(&missing)).is_err());
    }
}
