//! # **SIMD Module** - *Build-Time Alignment Selection*
//!
//! Picks the byte alignment that vector loads and stores need for the
//! instruction set this crate was compiled against.
//!
//! ## Behaviour
//! The choice is made once, at compile time, from `cfg(target_feature)`:
//!
//! | Build flags                   | [`SIMD_TYPE`]       | Alignment |
//! |-------------------------------|---------------------|-----------|
//! | `+avx` (or a CPU implying it) | [`SimdType::Avx`]   | 32        |
//! | `+sse` only                   | [`SimdType::Sse`]   | 16        |
//! | neither                       | [`SimdType::None`]  | 1         |
//!
//! There is no runtime CPU detection. A binary built with `+avx` and run on a
//! host without AVX will fault in the numeric code long before alignment
//! matters; keeping build flags and hardware in step is the caller's job.
//!
//! Enable the wider extension with e.g.
//! `RUSTFLAGS="-C target-feature=+avx"` or `-C target-cpu=native`.

use std::fmt::{Display, Formatter, Result};

/// Vector instruction set extension the build targets.
///
/// The discriminant is the alignment, in bytes, that the extension's
/// aligned load/store instructions require.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum SimdType {
    /// No known vector extension. Natural alignment only.
    None = 1,
    /// 128-bit registers (SSE).
    Sse = 16,
    /// 256-bit registers (AVX).
    Avx = 32,
}

impl SimdType {
    /// Alignment in bytes. Always a power of two.
    #[inline]
    pub const fn align(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            SimdType::None => "None",
            SimdType::Sse => "SSE",
            SimdType::Avx => "AVX",
        }
    }

    /// Whether `ptr` sits on this extension's alignment boundary.
    #[inline]
    pub fn is_aligned<T>(self, ptr: *const T) -> bool {
        ptr.addr() & (self.align() - 1) == 0
    }
}

impl Display for SimdType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.name())
    }
}

/// Extension selected for this build.
#[cfg(target_feature = "avx")]
pub const SIMD_TYPE: SimdType = SimdType::Avx;

/// Extension selected for this build.
#[cfg(all(target_feature = "sse", not(target_feature = "avx")))]
pub const SIMD_TYPE: SimdType = SimdType::Sse;

/// Extension selected for this build.
#[cfg(not(any(target_feature = "sse", target_feature = "avx")))]
pub const SIMD_TYPE: SimdType = SimdType::None;

/// Alignment, in bytes, every [`AlignedAllocator`](crate::AlignedAllocator)
/// block starts on for this build.
#[inline]
pub const fn default_align() -> usize {
    SIMD_TYPE.align()
}

/// Checks `ptr` against [`default_align`].
#[inline]
pub fn is_simd_aligned<T>(ptr: *const T) -> bool {
    SIMD_TYPE.is_aligned(ptr)
}
