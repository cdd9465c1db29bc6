//! # **AlignedVec** - *Vector with SIMD-Aligned Storage*
//!
//! Growable vector backed by [`AlignedAllocator`], so its buffer always starts
//! on the vector-register boundary selected for the build.
//!
//! Provides the same API as `Vec` and is safe to hand to aligned SIMD loads
//! (`_mm256_load_ps` and friends) once non-empty.

use std::borrow::{Borrow, BorrowMut};
use std::fmt::{Debug, Display, Formatter, Result};
use std::ops::{Deref, DerefMut};
use std::slice::{Iter, IterMut};
use std::vec::Vec;

#[cfg(feature = "parallel_proc")]
use rayon::iter::{IntoParallelRefIterator, IntoParallelRefMutIterator};

use crate::aligned_alloc::AlignedAllocator;
use crate::error::AlignError;
use crate::simd::is_simd_aligned;

/// # AlignedVec
///
/// SIMD-aligned vector for numeric inner loops.
///
/// ## Purpose
/// A drop-in replacement for `Vec` whose starting pointer is aligned to
/// 32 bytes on AVX builds and 16 bytes on SSE builds. Kernels can then use
/// aligned vector loads and stores on the first element without a peel loop.
///
/// ## Behaviour – Padding
/// Only the start of the buffer is aligned. Element `i` is aligned only when
/// `i * size_of::<T>()` is itself a multiple of the alignment, so kernels
/// walking in register-width strides stay aligned while odd offsets do not.
///
/// ## Notes
/// - All `Vec` APIs remain available through `Deref`; `.0` is the inner
///   `Vec<T, AlignedAllocator<T>>`.
/// - Converting from a plain `Vec<T>` copies into fresh aligned storage.
/// - An empty vector has not allocated; its pointer is dangling and should
///   not be handed to SIMD code.
#[repr(transparent)]
pub struct AlignedVec<T>(pub Vec<T, AlignedAllocator<T>>);

impl<T> AlignedVec<T> {
    #[inline]
    pub fn new() -> Self {
        Self(Vec::new_in(AlignedAllocator::new()))
    }

    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        Self(Vec::with_capacity_in(cap, AlignedAllocator::new()))
    }

    /// Like [`with_capacity`](Self::with_capacity), but reports failure
    /// instead of aborting.
    pub fn try_with_capacity(cap: usize) -> std::result::Result<Self, AlignError> {
        let alloc = AlignedAllocator::new();
        let ptr = alloc.try_allocate(cap).inspect_err(|e| {
            log::warn!("aligned reservation of {cap} elements failed: {e}");
        })?;
        // SAFETY: `ptr` holds `cap` uninitialised elements from the same allocator.
        let vec = unsafe { Vec::from_raw_parts_in(ptr.as_ptr(), 0, cap, alloc) };
        Ok(Self(vec))
    }

    /// Takes ownership of a raw allocation.
    ///
    /// # Safety
    /// - `ptr` must have been allocated by `AlignedAllocator<T>` with room
    ///   for exactly `capacity` elements.
    /// - The first `len` elements must be initialised, and `len <= capacity`.
    /// - The memory must not be aliased elsewhere.
    #[inline]
    pub unsafe fn from_raw_parts(ptr: *mut T, len: usize, capacity: usize) -> Self {
        debug_assert!(
            is_simd_aligned(ptr),
            "AlignedVec::from_raw_parts: pointer is not SIMD aligned"
        );

        let vec = unsafe { Vec::from_raw_parts_in(ptr, len, capacity, AlignedAllocator::new()) };
        Self(vec)
    }

    /// Whether the buffer start satisfies the build's SIMD alignment.
    ///
    /// Vectors that own no allocation report `true`.
    #[inline]
    pub fn is_aligned(&self) -> bool {
        self.0.capacity() == 0 || size_of::<T>() == 0 || is_simd_aligned(self.0.as_ptr())
    }
}

impl<T: Default + Clone> AlignedVec<T> {
    /// `len` default-valued elements, e.g. `AlignedVec::<f32>::with_len(32)`.
    #[inline]
    pub fn with_len(len: usize) -> Self {
        let mut v = Self::with_capacity(len);
        v.0.resize(len, T::default());
        v
    }
}

#[cfg(feature = "parallel_proc")]
impl<T: Sync + Send> AlignedVec<T> {
    #[inline]
    pub fn par_iter(&self) -> rayon::slice::Iter<'_, T> {
        self.0.as_slice().par_iter()
    }

    #[inline]
    pub fn par_iter_mut(&mut self) -> rayon::slice::IterMut<'_, T> {
        self.0.as_mut_slice().par_iter_mut()
    }
}

impl<T: Copy> AlignedVec<T> {
    #[inline]
    pub fn from_slice(slice: &[T]) -> Self {
        let mut v = Self::with_capacity(slice.len());
        // SAFETY: capacity covers `slice.len()` and the buffers are distinct.
        unsafe {
            std::ptr::copy_nonoverlapping(slice.as_ptr(), v.0.as_mut_ptr(), slice.len());
            v.0.set_len(slice.len());
        }
        v
    }
}

impl<T: Clone> AlignedVec<T> {
    #[inline]
    pub fn from_slice_clone(slice: &[T]) -> Self {
        let mut v = Self::with_capacity(slice.len());
        v.0.extend_from_slice(slice);
        v
    }
}

impl<T> Default for AlignedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for AlignedVec<T> {
    type Target = Vec<T, AlignedAllocator<T>>;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for AlignedVec<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: Clone> Clone for AlignedVec<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Debug> Debug for AlignedVec<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        self.0.fmt(f)
    }
}

impl<T: PartialEq> PartialEq for AlignedVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Display> Display for AlignedVec<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "[")?;
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item}")?;
        }
        write!(f, "]")
    }
}

impl<T> IntoIterator for AlignedVec<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T, AlignedAllocator<T>>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a AlignedVec<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut AlignedVec<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter_mut()
    }
}

impl<T> Extend<T> for AlignedVec<T> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl<T> FromIterator<T> for AlignedVec<T> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iterator = iter.into_iter();
        let (lower, _) = iterator.size_hint();
        let mut v = Vec::with_capacity_in(lower, AlignedAllocator::new());
        v.extend(iterator);
        Self(v)
    }
}

impl<T> From<Vec<T, AlignedAllocator<T>>> for AlignedVec<T> {
    #[inline]
    fn from(v: Vec<T, AlignedAllocator<T>>) -> Self {
        Self(v)
    }
}

impl<T> From<AlignedVec<T>> for Vec<T, AlignedAllocator<T>> {
    #[inline]
    fn from(v: AlignedVec<T>) -> Self {
        v.0
    }
}

impl<T> From<Vec<T>> for AlignedVec<T> {
    #[inline]
    fn from(v: Vec<T>) -> Self {
        let mut vec = Vec::with_capacity_in(v.len(), AlignedAllocator::new());
        vec.extend(v);
        Self(vec)
    }
}

impl<T: Clone> From<&[T]> for AlignedVec<T> {
    #[inline]
    fn from(s: &[T]) -> Self {
        Self::from_slice_clone(s)
    }
}

impl<T> AsRef<[T]> for AlignedVec<T> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.0.as_ref()
    }
}

impl<T> AsMut<[T]> for AlignedVec<T> {
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        self.0.as_mut()
    }
}

impl<T> Borrow<[T]> for AlignedVec<T> {
    #[inline]
    fn borrow(&self) -> &[T] {
        self.0.borrow()
    }
}

impl<T> BorrowMut<[T]> for AlignedVec<T> {
    #[inline]
    fn borrow_mut(&mut self) -> &mut [T] {
        self.0.borrow_mut()
    }
}

/// Builds an [`AlignedVec`] with `vec!` syntax.
#[macro_export]
macro_rules! aligned_vec {
    () => {
        $crate::AlignedVec::new()
    };

    ($elem:expr; $n:expr) => {{
        let n: usize = $n;
        let mut v = $crate::AlignedVec::with_capacity(n);
        v.0.resize(n, $elem);
        v
    }};

    ($($x:expr),+ $(,)?) => {
        ::core::iter::IntoIterator::into_iter([$($x),+]).collect::<$crate::AlignedVec<_>>()
    };
}
