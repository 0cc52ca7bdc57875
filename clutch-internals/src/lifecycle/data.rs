//! Module encapsulating the fields of [`ReprData`].
//!
//! The storage and the vtable are only ever created together, from the same
//! type `R`. Keeping the fields private to this module makes it impossible to
//! pair a storage with the vtable of a different type.

use core::mem::ManuallyDrop;

use crate::{
    lifecycle::{
        handle::{RawHandle, RawHandleMut},
        vtable::LifecycleVtable,
    },
    storage::Storage,
};

/// A live representation: the storage holding it and the vtable that knows
/// how to destroy and clone it.
///
/// Dropping a [`ReprData`] destroys the representation exactly once.
pub(super) struct ReprData<S: Storage> {
    /// The storage holding the representation.
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The storage was constructed with the representation type `R` that
    ///    `vtable` was created for.
    /// 2. The representation has not been dropped or moved out.
    storage: S,
    /// The vtable of the representation type.
    vtable: &'static LifecycleVtable<S>,
}

impl<S: Storage> ReprData<S> {
    /// Constructs a representation of type `R` in place from `init`.
    #[inline]
    pub(super) fn new<R, F>(init: F) -> Self
    where
        R: Clone + 'static,
        F: FnOnce() -> R,
    {
        let vtable = LifecycleVtable::<S>::new::<R>();
        let storage = S::construct(init);
        lifecycle_event!("construct", vtable, S);

        Self { storage, vtable }
    }

    /// Returns the vtable of the representation.
    #[inline]
    pub(super) fn vtable(&self) -> &'static LifecycleVtable<S> {
        self.vtable
    }

    /// Returns a shared handle to the representation.
    #[inline]
    pub(super) fn handle(&self) -> RawHandle<'_> {
        let ptr = self.storage.read();

        // SAFETY:
        // 1. The pointer comes from the storage and is valid for reads for as long
        //    as `self` is borrowed
        // 2. The vtable's type id is the one of the representation (guaranteed by the
        //    invariants of this type)
        unsafe { RawHandle::new(ptr, self.vtable.type_id_fn()) }
    }

    /// Returns an exclusive handle to the representation.
    #[inline]
    pub(super) fn handle_mut(&mut self) -> RawHandleMut<'_> {
        let ptr = self.storage.read_mut();

        // SAFETY:
        // 1. The pointer comes from the storage and is valid for reads and writes for
        //    as long as `self` is mutably borrowed
        // 2. The vtable's type id is the one of the representation (guaranteed by the
        //    invariants of this type)
        unsafe { RawHandleMut::new(ptr, self.vtable.type_id_fn()) }
    }

    /// Clones the representation into a new [`ReprData`] of the same backend.
    #[inline]
    pub(super) fn duplicate(&self) -> Self {
        // SAFETY:
        // 1. The vtable belongs to the representation in the storage (guaranteed by
        //    the invariants of this type)
        // 2. The representation is live and we hold a shared borrow of it
        let storage = unsafe { self.vtable.clone(self.storage.read()) };
        lifecycle_event!("clone", self.vtable, S);

        Self {
            storage,
            vtable: self.vtable,
        }
    }

    /// Moves the representation out of the storage and releases it.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `R` matches the representation type.
    #[inline]
    pub(super) unsafe fn into_inner<R: 'static>(self) -> R {
        let mut this = ManuallyDrop::new(self);
        let ptr = this.storage.read_mut().cast::<R>();

        // SAFETY: The representation is a live `R` (guaranteed by the caller and the
        // invariants of this type). Since `this` is never dropped, the value is
        // moved out exactly once.
        let repr: R = unsafe { ptr.as_ptr().read() };

        // SAFETY:
        // 1. The storage was constructed for `R`
        // 2. The `R` has just been moved out
        // 3. The storage is inside a `ManuallyDrop` and never used again
        unsafe { this.storage.release::<R>() };

        repr
    }
}

impl<S: Storage> Drop for ReprData<S> {
    fn drop(&mut self) {
        lifecycle_event!("destroy", self.vtable, S);

        // SAFETY:
        // 1. The vtable belongs to the representation in the storage (guaranteed by
        //    the invariants of this type)
        // 2. The representation is still live
        // 3. We are in the destructor, so neither is used again
        unsafe { self.vtable.destroy(&mut self.storage) }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{rc::Rc, string::String};
    use core::{any::TypeId, cell::Cell};

    use super::*;
    use crate::storage::{Heap, Inline};

    #[derive(Clone)]
    struct Counted(Rc<Cell<usize>>);

    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_repr_data_drop_destroys_once() {
        let drops = Rc::new(Cell::new(0));

        let data = ReprData::<Heap>::new(|| Counted(drops.clone()));
        assert_eq!(drops.get(), 0);
        drop(data);
        assert_eq!(drops.get(), 1);

        let data = ReprData::<Inline<8>>::new(|| Counted(drops.clone()));
        drop(data);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn test_repr_data_duplicate() {
        let data = ReprData::<Inline<32>>::new(|| String::from("dup"));
        let copy = data.duplicate();
        assert_eq!(copy.vtable().type_id(), TypeId::of::<String>());
        assert_ne!(data.handle().as_ptr(), copy.handle().as_ptr());

        // SAFETY: Both hold a `String`.
        let (a, b) = unsafe {
            (
                data.handle().cast::<String>(),
                copy.handle().cast::<String>(),
            )
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_repr_data_into_inner_skips_destroy() {
        let drops = Rc::new(Cell::new(0));
        let data = ReprData::<Heap>::new(|| Counted(drops.clone()));

        // SAFETY: The representation is a `Counted`.
        let value: Counted = unsafe { data.into_inner() };
        assert_eq!(drops.get(), 0);
        drop(value);
        assert_eq!(drops.get(), 1);
    }
}
