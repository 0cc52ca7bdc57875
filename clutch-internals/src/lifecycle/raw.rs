//! The erased container.
//!
//! [`RawErased`] is either *live* (holding exactly one representation in a
//! storage of type `S`, along with its vtable) or *empty* (after its value was
//! moved out or cleared). The empty state is an explicit tag rather than a
//! storage holding a sentinel, which means:
//!
//! - The destructor of a representation runs exactly once, when the
//!   [`ReprData`] owning it is dropped.
//! - Assigning a container to itself is impossible to get wrong: the borrow
//!   checker rejects `a.move_from(&mut a)`, and [`Clone::clone_from`] builds
//!   the copy before the old value is released.
//!
//! [`ReprData`]: super::data::ReprData

use core::{any::TypeId, marker::PhantomData};

use crate::{
    lifecycle::{
        data::ReprData,
        handle::{RawHandle, RawHandleMut},
    },
    storage::Storage,
};

/// A container owning at most one representation of an erased type, stored in
/// the backend `S`.
///
/// This type is neither [`Send`] nor [`Sync`]; thread safety is decided by the
/// typed wrapper, which knows what was put in.
pub struct RawErased<S: Storage> {
    /// The live representation, or [`None`] if the container is empty.
    live: Option<ReprData<S>>,
    /// Opts out of `Send` and `Sync`.
    _not_thread_safe: PhantomData<*const ()>,
}

impl<S: Storage> RawErased<S> {
    /// Creates a container holding `value`.
    #[inline]
    pub fn new<R: Clone + 'static>(value: R) -> Self {
        Self::new_with(move || value)
    }

    /// Creates a container holding the value produced by `init`, constructed
    /// directly in its final storage.
    #[inline]
    pub fn new_with<R, F>(init: F) -> Self
    where
        R: Clone + 'static,
        F: FnOnce() -> R,
    {
        Self {
            live: Some(ReprData::new(init)),
            _not_thread_safe: PhantomData,
        }
    }

    /// Creates an empty container.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            live: None,
            _not_thread_safe: PhantomData,
        }
    }

    /// Returns `true` if the container does not hold a representation.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live.is_none()
    }

    /// Returns the [`TypeId`] of the held representation.
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        self.live.as_ref().map(|data| data.vtable().type_id())
    }

    /// Returns the [`core::any::type_name`] of the held representation.
    #[inline]
    pub fn type_name(&self) -> Option<&'static str> {
        self.live.as_ref().map(|data| data.vtable().type_name())
    }

    /// Returns a shared handle to the held representation.
    #[inline]
    pub fn handle(&self) -> Option<RawHandle<'_>> {
        self.live.as_ref().map(ReprData::handle)
    }

    /// Returns an exclusive handle to the held representation.
    #[inline]
    pub fn handle_mut(&mut self) -> Option<RawHandleMut<'_>> {
        self.live.as_mut().map(ReprData::handle_mut)
    }

    /// Moves the representation out into a new container, leaving this one
    /// empty.
    ///
    /// Taking from an empty container returns an empty container.
    #[inline]
    pub fn take(&mut self) -> Self {
        if let Some(data) = &self.live {
            lifecycle_event!("move", data.vtable(), S);
        }

        Self {
            live: self.live.take(),
            _not_thread_safe: PhantomData,
        }
    }

    /// Destroys the held representation, leaving the container empty.
    ///
    /// Clearing an empty container does nothing.
    #[inline]
    pub fn clear(&mut self) {
        self.live = None;
    }

    /// Destroys the held representation, then moves the representation of
    /// `other` into this container, leaving `other` empty.
    ///
    /// If `other` is empty, this container ends up empty too.
    #[inline]
    pub fn move_from(&mut self, other: &mut Self) {
        *self = other.take();
    }

    /// Exchanges the representations (or emptiness) of two containers.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.live, &mut other.live);
    }

    /// Moves the representation out of the container.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The container is not empty.
    /// 2. The type `R` matches the held representation type.
    #[inline]
    pub unsafe fn into_inner_unchecked<R: 'static>(self) -> R {
        // SAFETY: The container is not empty (guaranteed by the caller)
        let data = unsafe { self.live.unwrap_unchecked() };

        // SAFETY:
        // 1. Guaranteed by the caller
        unsafe { data.into_inner::<R>() }
    }
}

impl<S: Storage> Default for RawErased<S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S: Storage> Clone for RawErased<S> {
    fn clone(&self) -> Self {
        Self {
            live: self.live.as_ref().map(ReprData::duplicate),
            _not_thread_safe: PhantomData,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        // The copy is complete before the old representation is destroyed, so a
        // panicking clone leaves `self` untouched.
        let fresh = source.clone();
        *self = fresh;
    }
}

impl<S: Storage> core::fmt::Debug for RawErased<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.type_name() {
            Some(type_name) => f
                .debug_struct("RawErased")
                .field("storage", &S::NAME)
                .field("repr", &type_name)
                .finish(),
            None => f
                .debug_struct("RawErased")
                .field("storage", &S::NAME)
                .field("repr", &format_args!("<empty>"))
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, rc::Rc, string::String, vec};
    use core::cell::Cell;

    use super::*;
    use crate::storage::{Heap, Inline};

    static_assertions::assert_not_impl_any!(RawErased<Heap>: Send, Sync);
    static_assertions::assert_not_impl_any!(RawErased<Inline<16>>: Send, Sync);

    #[derive(Clone)]
    struct Counted(Rc<Cell<usize>>);

    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_raw_erased_size() {
        // The empty tag fits in the niche of the vtable pointer
        assert_eq!(
            core::mem::size_of::<RawErased<Heap>>(),
            2 * core::mem::size_of::<usize>()
        );
        assert_eq!(
            core::mem::size_of::<RawErased<Inline<24>>>(),
            24 + core::mem::size_of::<usize>()
        );
    }

    #[test]
    fn test_raw_erased_state() {
        let mut erased = RawErased::<Heap>::new(vec![1_u8, 2, 3]);
        assert!(!erased.is_empty());
        assert_eq!(erased.type_id(), Some(TypeId::of::<alloc::vec::Vec<u8>>()));

        let taken = erased.take();
        assert!(erased.is_empty());
        assert!(!taken.is_empty());
        assert_eq!(erased.type_id(), None);
        assert_eq!(erased.type_name(), None);
        assert!(erased.handle().is_none());
        assert!(erased.handle_mut().is_none());

        let again = erased.take();
        assert!(again.is_empty());
    }

    #[test]
    fn test_raw_erased_drop_count() {
        let drops = Rc::new(Cell::new(0));

        let mut a = RawErased::<Inline<8>>::new(Counted(drops.clone()));
        let mut b = a.clone();
        assert_eq!(drops.get(), 0);

        b.move_from(&mut a);
        // The old value of `b` was destroyed
        assert_eq!(drops.get(), 1);
        assert!(a.is_empty());

        a.clear();
        a.clear();
        assert_eq!(drops.get(), 1);

        drop(a);
        drop(b);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn test_raw_erased_clone_from_self_copy() {
        let mut erased = RawErased::<Heap>::new(String::from("same"));
        let snapshot = erased.clone();
        erased.clone_from(&snapshot);

        let handle = erased.handle().map(|handle| handle.as_ptr());
        assert!(handle.is_some());
        // SAFETY: The representation is a `String`.
        let value = unsafe { erased.into_inner_unchecked::<String>() };
        assert_eq!(value, "same");
    }

    #[test]
    fn test_raw_erased_swap() {
        let mut a = RawErased::<Inline<32>>::new(String::from("a"));
        let mut b = RawErased::<Inline<32>>::empty();
        a.swap(&mut b);
        assert!(a.is_empty());
        assert_eq!(b.type_id(), Some(TypeId::of::<String>()));
    }

    #[test]
    fn test_raw_erased_debug() {
        let erased = RawErased::<Heap>::new(5_i64);
        assert_eq!(
            format!("{erased:?}"),
            r#"RawErased { storage: "heap", repr: "i64" }"#
        );
        let empty = RawErased::<Heap>::default();
        assert_eq!(
            format!("{empty:?}"),
            r#"RawErased { storage: "heap", repr: <empty> }"#
        );
    }
}
