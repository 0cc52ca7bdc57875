//! Heap-indirect storage.
//!
//! The storage itself is a single pointer. The pointer is guaranteed to have
//! been created with [`Box::into_raw`] from a `Box<R>` for the `R` the storage
//! was constructed with, which is what allows [`Heap::release`] to reconstruct
//! the `Box` and deallocate.

use alloc::boxed::Box;
use core::{mem::MaybeUninit, ptr::NonNull};

use crate::{storage::Storage, util::Erased};

/// Storage holding the address of a separately heap-allocated
/// representation.
///
/// Any representation type can be stored. Construction allocates once through
/// the global allocator; allocation failure is fatal and handled by
/// [`alloc::alloc::handle_alloc_error`].
#[allow(
    missing_copy_implementations,
    reason = "the pointer is owned, copying it would alias the allocation"
)]
#[repr(transparent)]
pub struct Heap {
    /// Pointer to the heap-allocated representation.
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer was created from a `Box<R>` for some `R` using
    ///    `Box::into_raw`.
    /// 2. Until [`Storage::release`] is called, the pointee is the same
    ///    allocation.
    ptr: NonNull<Erased>,
}

// SAFETY:
// 1. `read` and `read_mut` return the pointer created from `Box<R>`, which
//    points to an initialized, aligned `R`.
// 2. The allocation is owned by this storage, so the pointer stays valid for as
//    long as the storage exists.
// 3. Moving `Heap` moves the pointer, not the allocation.
// 4. `Heap` has no `Drop` implementation.
unsafe impl Storage for Heap {
    const NAME: &'static str = "heap";

    #[inline]
    fn can_hold<R>() -> bool {
        true
    }

    #[inline]
    fn construct<R, F>(init: F) -> Self
    where
        R: 'static,
        F: FnOnce() -> R,
    {
        let slot: Box<MaybeUninit<R>> = Box::new_uninit();
        let boxed: Box<R> = Box::write(slot, init());
        let ptr: *mut R = Box::into_raw(boxed);
        let ptr: *mut Erased = ptr.cast::<Erased>();

        // SAFETY: `Box::into_raw` returns a non-null pointer
        let ptr: NonNull<Erased> = unsafe { NonNull::new_unchecked(ptr) };

        Self { ptr }
    }

    #[inline]
    fn read(&self) -> NonNull<Erased> {
        self.ptr
    }

    #[inline]
    fn read_mut(&mut self) -> NonNull<Erased> {
        self.ptr
    }

    #[inline]
    unsafe fn release<R: 'static>(&mut self) {
        let ptr: *mut MaybeUninit<R> = self.ptr.cast::<MaybeUninit<R>>().as_ptr();

        // SAFETY: The pointer came from `Box::<R>::into_raw` (guaranteed by the
        // invariants of this type and the caller picking the right `R`), and
        // `MaybeUninit<R>` has the same layout as `R`. Since the `R` has already
        // been dropped or moved out, the box is dropped as uninitialized memory,
        // which only frees the allocation.
        let boxed: Box<MaybeUninit<R>> = unsafe { Box::from_raw(ptr) };
        core::mem::drop(boxed);
    }
}
