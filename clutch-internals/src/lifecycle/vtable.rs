//! Vtable for type-erased lifecycle operations.
//!
//! This module contains the [`LifecycleVtable`] which allows destroying and
//! cloning a representation after its concrete type `R` has been erased. The
//! vtable stores function pointers that dispatch to the correct typed
//! implementations.
//!
//! This module encapsulates the fields of [`LifecycleVtable`] so they cannot be
//! accessed directly. This visibility restriction guarantees the safety
//! invariant: **the vtable's type parameter must match the actual
//! representation stored next to it**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because vtables are created as `&'static`
//! references via [`LifecycleVtable::new`], which pairs the function pointers
//! with a specific type `R` at compile time.

use core::{any::TypeId, ptr::NonNull};

use crate::{storage::Storage, util::Erased};

/// Vtable for type-erased lifecycle operations.
///
/// Contains function pointers for destroying and cloning a representation
/// stored in a storage backend `S` without knowing its concrete type at
/// compile time.
///
/// # Safety Invariant
///
/// The fields `destroy` and `clone` are guaranteed to point to the functions
/// defined below instantiated with the representation type `R` and the storage
/// type `S` that were used to create this [`LifecycleVtable`].
pub(crate) struct LifecycleVtable<S> {
    /// Gets the [`TypeId`] of the representation type that was used to create
    /// this [`LifecycleVtable`].
    type_id: fn() -> TypeId,
    /// Gets the [`core::any::type_name`] of the representation type that was
    /// used to create this [`LifecycleVtable`].
    type_name: fn() -> &'static str,
    /// Drops the representation in the storage and releases the storage.
    destroy: unsafe fn(&mut S),
    /// Clones the representation behind the handle into fresh storage.
    clone: unsafe fn(NonNull<Erased>) -> S,
}

impl<S: Storage> LifecycleVtable<S> {
    /// Creates a new [`LifecycleVtable`] for the representation type `R` kept
    /// in the storage backend `S`.
    pub(crate) const fn new<R: Clone + 'static>() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<R>,
                type_name: core::any::type_name::<R>,
                destroy: destroy::<R, S>,
                clone: clone::<R, S>,
            }
        }
    }

    /// Gets the [`TypeId`] of the representation type that was used to create
    /// this [`LifecycleVtable`].
    #[inline]
    pub(crate) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Returns the function producing the [`TypeId`] of the representation
    /// type, for embedding into handles.
    #[inline]
    pub(crate) fn type_id_fn(&self) -> fn() -> TypeId {
        self.type_id
    }

    /// Gets the [`core::any::type_name`] of the representation type that was
    /// used to create this [`LifecycleVtable`].
    #[inline]
    pub(crate) fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Drops the representation held by `storage` and releases `storage`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`LifecycleVtable`] must be a vtable for the representation type
    ///    stored in `storage`.
    /// 2. The representation has not been dropped or moved out yet.
    /// 3. This method drops the representation and releases the storage, so
    ///    the caller must ensure that neither is used afterwards, other than
    ///    dropping the storage value itself.
    #[inline]
    pub(crate) unsafe fn destroy(&self, storage: &mut S) {
        // SAFETY: We know that `self.destroy` points to the function `destroy::<R, S>`
        // below. That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        // 3. Guaranteed by the caller
        unsafe {
            (self.destroy)(storage);
        }
    }

    /// Clones the representation pointed to by `handle` into a fresh storage
    /// of the same backend.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`LifecycleVtable`] must be a vtable for the representation type
    ///    behind `handle`.
    /// 2. `handle` points to a live representation that is valid for reads for
    ///    the duration of the call.
    #[inline]
    pub(crate) unsafe fn clone(&self, handle: NonNull<Erased>) -> S {
        // SAFETY: We know that `self.clone` points to the function `clone::<R, S>`
        // below. That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe { (self.clone)(handle) }
    }
}

/// Drops the `R` held by `storage` and releases `storage`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The type `R` matches the actual representation type stored in `storage`.
/// 2. The representation has not been dropped or moved out yet.
/// 3. Neither the representation nor the storage is used afterwards, other than
///    dropping the storage value itself.
unsafe fn destroy<R: 'static, S: Storage>(storage: &mut S) {
    let repr: *mut R = storage.read_mut().cast::<R>().as_ptr();

    // SAFETY: The pointer points to a live, properly aligned `R` that is valid for
    // writes, and it is never used again (guaranteed by the caller).
    unsafe { core::ptr::drop_in_place(repr) };

    // SAFETY:
    // 1. The storage was constructed for `R` (guaranteed by the caller)
    // 2. The `R` has just been dropped
    // 3. Guaranteed by the caller
    unsafe { storage.release::<R>() };
}

/// Clones the `R` pointed to by `handle` into a fresh storage.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The type `R` matches the actual representation type behind `handle`.
/// 2. `handle` points to a live `R` that is valid for reads for the duration of
///    the call.
unsafe fn clone<R: Clone + 'static, S: Storage>(handle: NonNull<Erased>) -> S {
    // SAFETY:
    // 1. Guaranteed by the caller
    // 2. Guaranteed by the caller
    let repr: &R = unsafe { handle.cast::<R>().as_ref() };
    S::construct(|| repr.clone())
}
