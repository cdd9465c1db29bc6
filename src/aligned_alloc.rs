//! # **Aligned Allocator Module** - *SIMD-Aligned Element Allocator*
//!
//! Zero-sized allocator that starts every block on the vector-register
//! boundary chosen in [`crate::simd`] (32 bytes for AVX builds, 16 for SSE,
//! natural alignment otherwise).
//!
//! ## Interfaces
//! - **Typed**: [`AlignedAllocator::allocate`] / [`AlignedAllocator::deallocate`]
//!   hand out `NonNull<T>` for `count` elements.
//! - **Byte level**: the [`Allocator`] impl, so `Vec<T, AlignedAllocator<T>>`
//!   keeps the alignment through every grow and shrink.
//!
//! ## Layout rules
//! - Alignment is `max(default_align(), align_of::<T>())`; it is never lowered.
//! - The byte size is rounded up to a multiple of the alignment, on both the
//!   allocation and the release path, so the two always agree.
//! - Zero-byte requests never reach the system allocator. They yield a
//!   dangling pointer whose address equals the alignment.
//! - No size header is stored. Release recomputes the layout from the
//!   element count, which must therefore match the one used to allocate.
use core::alloc::{AllocError, Allocator, Layout};
use core::marker::PhantomData;
use core::ptr::{self, NonNull};
use std::alloc::{alloc, alloc_zeroed, dealloc, handle_alloc_error, realloc};
use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::error::AlignError;
use crate::simd::default_align;

/// Allocator that exposes the element type it hands out pointers to.
///
/// Generic container code uses `A::Value` to recover what an allocator
/// is parameterised for.
pub trait TypedAllocator: Allocator {
    type Value;
}

/// # AlignedAllocator
///
/// Stateless allocator that enforces SIMD alignment for `T` elements.
///
/// ## Behaviour
/// Carries no data. Every instance is interchangeable with every other,
/// whatever the element type: `==` is always `true`, so memory obtained
/// through one instance may be released through any other.
///
/// Failures are not retried and never fall back to unaligned memory.
/// [`allocate`](Self::allocate) aborts through [`handle_alloc_error`];
/// [`try_allocate`](Self::try_allocate) returns the [`AlignError`] instead.
pub struct AlignedAllocator<T = u8>(PhantomData<fn() -> T>);

impl<T> AlignedAllocator<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }

    /// Rebinds the allocator to another element type.
    #[inline]
    pub const fn cast<U>(&self) -> AlignedAllocator<U> {
        AlignedAllocator::new()
    }

    /// Alignment every non-empty `T` block starts on.
    #[inline]
    pub const fn alignment() -> usize {
        let natural = align_of::<T>();
        if natural > default_align() {
            natural
        } else {
            default_align()
        }
    }

    /// Allocates uninitialised storage for `count` elements.
    ///
    /// The returned pointer is aligned to [`Self::alignment`].
    ///
    /// # Panics
    /// Panics if `count * size_of::<T>()` overflows, and aborts through
    /// [`handle_alloc_error`] if the system allocator cannot serve the request.
    #[inline]
    pub fn allocate(&self, count: usize) -> NonNull<T> {
        let layout = match array_layout::<T>(count) {
            Ok(layout) => layout,
            Err(e) => panic!("{e}"),
        };
        if layout.size() == 0 {
            return dangling(layout);
        }
        let raw = unsafe { alloc(layout) };
        NonNull::new(raw.cast()).unwrap_or_else(|| handle_alloc_error(layout))
    }

    /// Fallible variant of [`allocate`](Self::allocate).
    pub fn try_allocate(&self, count: usize) -> Result<NonNull<T>, AlignError> {
        let layout = array_layout::<T>(count)?;
        if layout.size() == 0 {
            return Ok(dangling(layout));
        }
        let raw = unsafe { alloc(layout) };
        NonNull::new(raw.cast()).ok_or(AlignError::OutOfMemory {
            size: layout.size(),
            align: layout.align(),
        })
    }

    /// Releases a block obtained from `allocate` or `try_allocate`.
    ///
    /// # Safety
    /// - `ptr` must come from an `AlignedAllocator<T>` allocation of exactly
    ///   `count` elements.
    /// - It must not have been released already, and must not be used after.
    #[inline]
    pub unsafe fn deallocate(&self, ptr: NonNull<T>, count: usize) {
        let layout = array_layout::<T>(count);
        debug_assert!(
            layout.is_ok(),
            "deallocate: no block of {count} elements can have been allocated"
        );
        let Ok(layout) = layout else {
            return;
        };
        if layout.size() != 0 {
            unsafe { dealloc(ptr.as_ptr().cast(), layout) };
        }
    }
}

impl<T> TypedAllocator for AlignedAllocator<T> {
    type Value = T;
}

impl<T> Copy for AlignedAllocator<T> {}

impl<T> Clone for AlignedAllocator<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Default for AlignedAllocator<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for AlignedAllocator<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AlignedAllocator")
            .field("align", &Self::alignment())
            .finish()
    }
}

impl<T, U> PartialEq<AlignedAllocator<U>> for AlignedAllocator<T> {
    #[inline]
    fn eq(&self, _other: &AlignedAllocator<U>) -> bool {
        true
    }
}

impl<T> Eq for AlignedAllocator<T> {}

/// Layout for `count` elements of `T`, bumped to SIMD alignment and padded.
#[inline]
fn array_layout<T>(count: usize) -> Result<Layout, AlignError> {
    let layout = Layout::array::<T>(count).map_err(|_| AlignError::CapacityOverflow {
        count,
        elem_size: size_of::<T>(),
    })?;
    Ok(layout.align_to(default_align())?.pad_to_align())
}

/// Bumps alignment to at least `default_align()` and pads the size to it.
#[inline]
fn align_layout(layout: Layout) -> Result<Layout, AllocError> {
    layout
        .align_to(default_align())
        .map(|l| l.pad_to_align())
        .map_err(|_| AllocError)
}

#[inline]
fn dangling<T>(layout: Layout) -> NonNull<T> {
    // SAFETY: a layout's alignment is never zero.
    unsafe { NonNull::new_unchecked(ptr::without_provenance_mut(layout.align())) }
}

#[inline]
fn block(ptr: NonNull<u8>, len: usize) -> NonNull<[u8]> {
    NonNull::slice_from_raw_parts(ptr, len)
}

/// Allocates an already aligned layout.
#[inline]
fn alloc_block(layout: Layout, zeroed: bool) -> Result<NonNull<[u8]>, AllocError> {
    if layout.size() == 0 {
        return Ok(block(dangling(layout), 0));
    }
    let raw = unsafe {
        if zeroed {
            alloc_zeroed(layout)
        } else {
            alloc(layout)
        }
    };
    NonNull::new(raw)
        .map(|nn| block(nn, layout.size()))
        .ok_or(AllocError)
}

/// Releases an already aligned layout.
#[inline]
unsafe fn dealloc_block(ptr: NonNull<u8>, layout: Layout) {
    if layout.size() != 0 {
        unsafe { dealloc(ptr.as_ptr(), layout) };
    }
}

/// Moves a block to a new size, keeping SIMD alignment.
///
/// # Safety
/// Same contract as [`Allocator::grow`] / [`Allocator::shrink`].
unsafe fn reallocate(
    ptr: NonNull<u8>,
    old: Layout,
    new: Layout,
) -> Result<NonNull<[u8]>, AllocError> {
    let old = align_layout(old)?;
    let new = align_layout(new)?;
    if old.size() == 0 {
        return alloc_block(new, false);
    }
    if new.size() == 0 {
        unsafe { dealloc_block(ptr, old) };
        return Ok(block(dangling(new), 0));
    }
    if old.align() != new.align() {
        let fresh = alloc_block(new, false)?;
        unsafe {
            ptr::copy_nonoverlapping(
                ptr.as_ptr(),
                fresh.cast::<u8>().as_ptr(),
                old.size().min(new.size()),
            );
            dealloc_block(ptr, old);
        }
        return Ok(fresh);
    }
    let raw = unsafe { realloc(ptr.as_ptr(), old, new.size()) };
    NonNull::new(raw)
        .map(|nn| block(nn, new.size()))
        .ok_or(AllocError)
}

unsafe impl<T> Allocator for AlignedAllocator<T> {
    /// Allocates memory with at least SIMD alignment.
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        alloc_block(align_layout(layout)?, false)
    }

    /// Allocates zero-initialised memory with at least SIMD alignment.
    #[inline]
    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        alloc_block(align_layout(layout)?, true)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if let Ok(layout) = align_layout(layout) {
            unsafe { dealloc_block(ptr, layout) };
        }
    }

    #[inline]
    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<[u8]>, AllocError> {
        unsafe { reallocate(ptr, old, new) }
    }

    #[inline]
    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<[u8]>, AllocError> {
        unsafe { reallocate(ptr, old, new) }
    }

    /// Grows the allocation in place where possible and zero-fills the bytes
    /// past `old.size()`.
    unsafe fn grow_zeroed(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<[u8]>, AllocError> {
        debug_assert!(new.size() >= old.size());

        let grown = unsafe { reallocate(ptr, old, new)? };
        let tail = grown.len() - old.size();
        unsafe { grown.cast::<u8>().as_ptr().add(old.size()).write_bytes(0, tail) };
        Ok(grown)
    }
}
