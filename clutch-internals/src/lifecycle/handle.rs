//! Untyped handles to a held representation.
//!
//! A handle is the only thing a capability thunk receives: an address with a
//! lifetime. Recovering the concrete type is `unsafe` and the caller's
//! responsibility; in debug builds the handle additionally remembers the
//! [`TypeId`] of the representation so that a mismatched cast is caught by an
//! assertion instead of silently reading garbage.

use core::{any::TypeId, marker::PhantomData, ptr::NonNull};

use crate::util::Erased;

/// A shared, lifetime-bound handle to an erased representation.
///
/// This is the untyped equivalent of `&'a R`. It is [`Copy`], and it is
/// neither [`Send`] nor [`Sync`] since the type of the representation is not
/// known.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct RawHandle<'a> {
    /// Pointer to the representation.
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer points to a live representation that is valid for reads
    ///    for the lifetime `'a`.
    /// 2. No mutable reference to the representation exists for the lifetime
    ///    `'a`.
    ptr: NonNull<Erased>,
    /// Returns the [`TypeId`] of the representation, for debug assertions.
    #[cfg(debug_assertions)]
    type_id: fn() -> TypeId,
    /// Marker for the borrow and for opting out of `Send`/`Sync`.
    _marker: PhantomData<&'a *const Erased>,
}

impl<'a> RawHandle<'a> {
    /// Creates a new [`RawHandle`].
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to a live representation that is valid for reads for the
    ///    lifetime `'a`, and no mutable reference to it exists during `'a`.
    /// 2. `type_id` returns the [`TypeId`] of that representation.
    #[inline]
    pub(crate) unsafe fn new(ptr: NonNull<Erased>, type_id: fn() -> TypeId) -> Self {
        #[cfg(not(debug_assertions))]
        let _ = type_id;

        Self {
            ptr,
            #[cfg(debug_assertions)]
            type_id,
            _marker: PhantomData,
        }
    }

    /// Returns the address of the representation.
    #[inline]
    #[must_use]
    pub fn as_ptr(self) -> NonNull<Erased> {
        self.ptr
    }

    /// Casts the handle back to a reference to the concrete representation.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `R` matches the actual representation type.
    ///
    /// In debug builds a mismatch panics.
    #[inline]
    #[must_use]
    #[track_caller]
    pub unsafe fn cast<R: 'static>(self) -> &'a R {
        #[cfg(debug_assertions)]
        debug_assert_eq!(
            (self.type_id)(),
            TypeId::of::<R>(),
            "handle cast to a type other than the representation type"
        );

        // SAFETY:
        // 1. The pointer is valid for reads for `'a` and no mutable reference exists
        //    (guaranteed by the invariants of this type)
        // 2. It points to an `R` (guaranteed by the caller)
        unsafe { self.ptr.cast::<R>().as_ref() }
    }
}

impl core::fmt::Debug for RawHandle<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("RawHandle").field(&self.ptr).finish()
    }
}

/// An exclusive, lifetime-bound handle to an erased representation.
///
/// This is the untyped equivalent of `&'a mut R`. It is neither [`Send`] nor
/// [`Sync`] since the type of the representation is not known.
#[repr(C)]
pub struct RawHandleMut<'a> {
    /// Pointer to the representation.
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer points to a live representation that is valid for reads
    ///    and writes for the lifetime `'a`.
    /// 2. No other reference to the representation exists for the lifetime
    ///    `'a`.
    ptr: NonNull<Erased>,
    /// Returns the [`TypeId`] of the representation, for debug assertions.
    #[cfg(debug_assertions)]
    type_id: fn() -> TypeId,
    /// Marker for the exclusive borrow and for opting out of `Send`/`Sync`.
    _marker: PhantomData<&'a mut *const Erased>,
}

impl<'a> RawHandleMut<'a> {
    /// Creates a new [`RawHandleMut`].
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to a live representation that is valid for reads and
    ///    writes for the lifetime `'a`, and no other reference to it exists
    ///    during `'a`.
    /// 2. `type_id` returns the [`TypeId`] of that representation.
    #[inline]
    pub(crate) unsafe fn new(ptr: NonNull<Erased>, type_id: fn() -> TypeId) -> Self {
        #[cfg(not(debug_assertions))]
        let _ = type_id;

        Self {
            ptr,
            #[cfg(debug_assertions)]
            type_id,
            _marker: PhantomData,
        }
    }

    /// Returns the address of the representation.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> NonNull<Erased> {
        self.ptr
    }

    /// Reborrows the handle for a shorter lifetime.
    #[inline]
    #[must_use]
    pub fn reborrow(&mut self) -> RawHandleMut<'_> {
        RawHandleMut {
            ptr: self.ptr,
            #[cfg(debug_assertions)]
            type_id: self.type_id,
            _marker: PhantomData,
        }
    }

    /// Returns a shared handle borrowing from this one.
    #[inline]
    #[must_use]
    pub fn as_ref(&self) -> RawHandle<'_> {
        RawHandle {
            ptr: self.ptr,
            #[cfg(debug_assertions)]
            type_id: self.type_id,
            _marker: PhantomData,
        }
    }

    /// Converts the handle into a shared handle for the full lifetime `'a`.
    #[inline]
    #[must_use]
    pub fn into_ref(self) -> RawHandle<'a> {
        RawHandle {
            ptr: self.ptr,
            #[cfg(debug_assertions)]
            type_id: self.type_id,
            _marker: PhantomData,
        }
    }

    /// Casts the handle back to a mutable reference to the concrete
    /// representation.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `R` matches the actual representation type.
    ///
    /// In debug builds a mismatch panics.
    #[inline]
    #[must_use]
    #[track_caller]
    pub unsafe fn cast<R: 'static>(self) -> &'a mut R {
        #[cfg(debug_assertions)]
        debug_assert_eq!(
            (self.type_id)(),
            TypeId::of::<R>(),
            "handle cast to a type other than the representation type"
        );

        // SAFETY:
        // 1. The pointer is valid for reads and writes for `'a` and no other
        //    reference exists (guaranteed by the invariants of this type)
        // 2. It points to an `R` (guaranteed by the caller)
        unsafe { self.ptr.cast::<R>().as_mut() }
    }
}

impl core::fmt::Debug for RawHandleMut<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("RawHandleMut").field(&self.ptr).finish()
    }
}
