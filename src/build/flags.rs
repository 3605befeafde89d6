//! ARM variant compiler flags
//!
//! Each `GOARM` level maps to the ISA/FPU/ABI combination the C and C++
//! cross compilers must target so cgo objects link against Go's output.

/// Compiler flag fragments for one ARM variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantFlags {
    /// Appended to `CGO_CFLAGS`
    pub cflags: &'static str,
    /// Appended to `CGO_CXXFLAGS`
    pub cxxflags: &'static str,
}

const ARMV5: VariantFlags = VariantFlags {
    cflags: "-march=armv5",
    cxxflags: "-march=armv5",
};

// GOARM=6 implies VFP with the hard-float calling convention.
const ARMV6: VariantFlags = VariantFlags {
    cflags: "-march=armv6 -mfpu=vfp -mfloat-abi=hard",
    cxxflags: "-march=armv6 -mfpu=vfp -mfloat-abi=hard",
};

const ARMV7: VariantFlags = VariantFlags {
    cflags: "-march=armv7-a -fPIC",
    cxxflags: "-march=armv7-a -fPIC",
};

/// Look up the flags for an ARM variant; `None` for variants without an entry
pub fn for_variant(variant: u32) -> Option<VariantFlags> {
    match variant {
        5 => Some(ARMV5),
        6 => Some(ARMV6),
        7 => Some(ARMV7),
        _ => None,
    }
}
