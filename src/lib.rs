//! # simd-align
//!
//! SIMD-aligned allocation for numeric inner loops.
//!
//! ## Summary
//! [`AlignedAllocator<T>`] starts every block on the boundary the build's
//! vector extension needs: 32 bytes with AVX, 16 bytes with SSE, natural
//! alignment otherwise. [`AlignedVec<T>`] is a `Vec` backed by it, so kernels
//! can use aligned loads and stores on its buffer.
//!
//! The alignment is a compile-time constant ([`SIMD_TYPE`]). It follows the
//! target features the crate is compiled with, e.g.
//! `RUSTFLAGS="-C target-cpu=native"`, never the host CPU at runtime.

#![feature(allocator_api)]

pub mod aligned_alloc;
pub mod aligned_vec;
pub mod error;
pub mod simd;

pub use aligned_alloc::{AlignedAllocator, TypedAllocator};
pub use aligned_vec::AlignedVec;
pub use error::AlignError;
pub use simd::{default_align, is_simd_aligned, SimdType, SIMD_TYPE};
