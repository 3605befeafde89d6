//! Project configuration

pub mod crossgo_toml;

pub use crossgo_toml::{CrossgoConfig, MANIFEST_FILE};
