//! Host architecture detection
//!
//! Rust and Node-style host names differ from the names the Go toolchain
//! uses for `GOARCH`. Everything is compared in Go's vocabulary.

/// Normalize an architecture name to its `GOARCH` spelling
pub fn normalize_arch(arch: &str) -> String {
    match arch {
        "x64" | "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" | "i386" | "i686" | "ia32" => "386",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
    .to_string()
}

/// Architecture of the machine running the build, in `GOARCH` spelling
pub fn detect_arch() -> String {
    normalize_arch(std::env::consts::ARCH)
}
