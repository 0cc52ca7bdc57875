use core::any::TypeId;

use clutch_internals::RawErased;

use crate::{
    EmptyError, Handle, HandleMut,
    markers::{Local, ObjectMarkerFor},
    storage::Storage,
};

/// FIXME: Once rust-lang/rust#132922 gets resolved, we can make the `raw` field
/// an unsafe field and remove this module.
mod limit_field_access {
    use core::marker::PhantomData;

    use clutch_internals::RawErased;

    use crate::{
        markers::{Local, SendSync},
        storage::{Heap, Storage},
    };

    /// A container owning a value of a type that has been erased.
    ///
    /// [`Erased`] gives any `Clone + 'static` value (its *representation*)
    /// ordinary value semantics without trait objects: it can be cloned,
    /// moved out of, reassigned, swapped and dropped. The concrete type is
    /// only needed again to downcast.
    ///
    /// # Type Parameters
    ///
    /// - **Storage (`S`)**: Where the representation lives
    ///   - [`Heap`]: A separate allocation, any type fits (default)
    ///   - [`Inline`]: A buffer inside the container, no allocation
    /// - **Thread Safety (`T`)**: Whether the container can cross threads
    ///   - [`Local`]: Any representation, cannot be sent across threads
    ///     (default)
    ///   - [`SendSync`]: Only `Send + Sync` representations, can be sent
    ///     across threads
    ///
    /// # States
    ///
    /// A container is either *holding* a representation or *empty*. It only
    /// becomes empty when the value is explicitly moved out with
    /// [`take`](Erased::take) or [`move_from`](Erased::move_from), or dropped
    /// with [`clear`](Erased::clear). Accessing the representation of an empty
    /// container through [`handle`](Erased::handle) panics, while the `try_`
    /// and downcasting accessors report it.
    ///
    /// # Examples
    ///
    /// ```
    /// use clutch::prelude::*;
    ///
    /// let mut erased: Erased = Erased::new(vec![1, 2, 3]);
    /// let copy = erased.clone();
    ///
    /// erased.downcast_mut::<Vec<i32>>().unwrap().push(4);
    /// assert_eq!(erased.downcast_ref::<Vec<i32>>().unwrap().len(), 4);
    /// assert_eq!(copy.downcast_ref::<Vec<i32>>().unwrap().len(), 3);
    ///
    /// let moved = erased.take();
    /// assert!(erased.is_empty());
    /// assert_eq!(moved.downcast::<Vec<i32>>().unwrap(), [1, 2, 3, 4]);
    /// ```
    ///
    /// [`Inline`]: crate::storage::Inline
    pub struct Erased<S: Storage = Heap, ThreadSafety: 'static = Local> {
        /// # Safety
        ///
        /// The following safety invariants are guaranteed to be upheld as long
        /// as this struct exists:
        ///
        /// 1. `ThreadSafety` must either be `SendSync` or `Local`.
        /// 2. If `ThreadSafety = SendSync`: The representation held by the
        ///    container, if any, must be `Send + Sync`.
        raw: RawErased<S>,
        _thread_safety: PhantomData<ThreadSafety>,
    }

    impl<S: Storage, T> Erased<S, T> {
        /// Creates a new [`Erased`] from a [`RawErased`]
        ///
        /// # Safety
        ///
        /// The caller must ensure:
        ///
        /// 1. `T` must either be `SendSync` or `Local`.
        /// 2. If `T = SendSync`: The representation held by the container, if
        ///    any, must be `Send + Sync`.
        #[must_use]
        pub(crate) unsafe fn from_raw(raw: RawErased<S>) -> Self {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Guaranteed by the caller
            // 2. Guaranteed by the caller
            Self {
                raw,
                _thread_safety: PhantomData,
            }
        }

        /// Consumes the [`Erased`] and returns the inner [`RawErased`].
        #[must_use]
        pub(crate) fn into_raw(self) -> RawErased<S> {
            // SAFETY: We are destroying `self`, so we no longer
            // need to uphold any safety invariants.
            self.raw
        }

        /// Returns a shared reference to the inner [`RawErased`].
        #[must_use]
        pub(crate) fn as_raw(&self) -> &RawErased<S> {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Upheld as the type parameters do not change.
            // 2. A shared reference cannot replace the representation.
            &self.raw
        }

        /// Returns a mutable reference to the inner [`RawErased`].
        ///
        /// # Safety
        ///
        /// The caller must ensure:
        ///
        /// 1. If `T = SendSync`, no representation that is not `Send + Sync`
        ///    is placed into the container through this reference.
        #[must_use]
        pub(crate) unsafe fn as_raw_mut(&mut self) -> &mut RawErased<S> {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Upheld as the type parameters do not change.
            // 2. Guaranteed by the caller
            &mut self.raw
        }
    }

    // SAFETY: The representation is `Send + Sync` (guaranteed by the invariants of
    // the raw field), and the storage owns it exclusively.
    unsafe impl<S: Storage> Send for Erased<S, SendSync> {}

    // SAFETY: The representation is `Send + Sync` (guaranteed by the invariants of
    // the raw field). A shared reference to the container only gives out shared
    // references to the representation or clones of it. The storage may allow
    // mutation through those shared references, but only through the
    // representation's own interior mutability, which `Sync` makes thread-safe.
    unsafe impl<S: Storage> Sync for Erased<S, SendSync> {}
}

pub use limit_field_access::Erased;

impl<S: Storage, T> Erased<S, T> {
    /// Creates a container holding `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use clutch::prelude::*;
    ///
    /// let on_heap: Erased = Erased::new("hello".to_string());
    /// let inline: Erased<DefaultInline> = Erased::new(42_u32);
    /// assert!(on_heap.is::<String>());
    /// assert!(inline.is::<u32>());
    /// ```
    #[must_use]
    pub fn new<R>(value: R) -> Self
    where
        R: Clone + ObjectMarkerFor<T>,
    {
        let raw = RawErased::new(value);

        // SAFETY:
        // 1. `ObjectMarkerFor<T>` is only implemented for `T = Local` and
        //    `T = SendSync`
        // 2. If `T = SendSync`, then `R: ObjectMarkerFor<SendSync>` implies
        //    `R: Send + Sync`
        unsafe { Self::from_raw(raw) }
    }

    /// Creates a container holding the value produced by `init`, constructed
    /// directly in its final storage.
    ///
    /// For [`Heap`](crate::storage::Heap) the allocation happens before `init`
    /// runs and the value is written straight into it. If `init` panics,
    /// nothing is leaked.
    ///
    /// # Examples
    ///
    /// ```
    /// use clutch::prelude::*;
    ///
    /// let erased: Erased = Erased::new_with(|| [0_u8; 4096]);
    /// assert_eq!(erased.downcast_ref::<[u8; 4096]>().map(|bytes| bytes.len()), Some(4096));
    /// ```
    #[must_use]
    pub fn new_with<R, F>(init: F) -> Self
    where
        R: Clone + ObjectMarkerFor<T>,
        F: FnOnce() -> R,
    {
        let raw = RawErased::new_with(init);

        // SAFETY:
        // 1. `ObjectMarkerFor<T>` is only implemented for `T = Local` and
        //    `T = SendSync`
        // 2. If `T = SendSync`, then `R: ObjectMarkerFor<SendSync>` implies
        //    `R: Send + Sync`
        unsafe { Self::from_raw(raw) }
    }

    /// Returns `true` if the value of this container has been moved out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_raw().is_empty()
    }

    /// Returns the [`TypeId`] of the held representation, or [`None`] if the
    /// container is empty.
    #[must_use]
    pub fn type_id(&self) -> Option<TypeId> {
        self.as_raw().type_id()
    }

    /// Returns the [`core::any::type_name`] of the held representation, or
    /// [`None`] if the container is empty.
    ///
    /// The name is meant for diagnostics only.
    #[must_use]
    pub fn type_name(&self) -> Option<&'static str> {
        self.as_raw().type_name()
    }

    /// Returns `true` if the container holds a representation of type `R`.
    ///
    /// # Examples
    ///
    /// ```
    /// use clutch::prelude::*;
    ///
    /// let erased: Erased = Erased::new(1_i16);
    /// assert!(erased.is::<i16>());
    /// assert!(!erased.is::<i32>());
    /// ```
    #[must_use]
    pub fn is<R: 'static>(&self) -> bool {
        self.type_id() == Some(TypeId::of::<R>())
    }

    /// Returns a shared handle to the held representation.
    ///
    /// # Panics
    ///
    /// Panics if the container is empty. Use [`try_handle`](Self::try_handle)
    /// to handle that case.
    #[must_use]
    #[track_caller]
    pub fn handle(&self) -> Handle<'_> {
        match self.as_raw().handle() {
            Some(handle) => handle,
            None => empty_container_access(),
        }
    }

    /// Returns an exclusive handle to the held representation.
    ///
    /// # Panics
    ///
    /// Panics if the container is empty. Use
    /// [`try_handle_mut`](Self::try_handle_mut) to handle that case.
    #[must_use]
    #[track_caller]
    pub fn handle_mut(&mut self) -> HandleMut<'_> {
        // SAFETY:
        // 1. A handle cannot change the type of the representation, it can only
        //    mutate it in place
        let raw = unsafe { self.as_raw_mut() };
        match raw.handle_mut() {
            Some(handle) => handle,
            None => empty_container_access(),
        }
    }

    /// Returns a shared handle to the held representation, or [`EmptyError`]
    /// if the container is empty.
    pub fn try_handle(&self) -> Result<Handle<'_>, EmptyError> {
        self.as_raw().handle().ok_or(EmptyError)
    }

    /// Returns an exclusive handle to the held representation, or
    /// [`EmptyError`] if the container is empty.
    pub fn try_handle_mut(&mut self) -> Result<HandleMut<'_>, EmptyError> {
        // SAFETY:
        // 1. A handle cannot change the type of the representation, it can only
        //    mutate it in place
        let raw = unsafe { self.as_raw_mut() };
        raw.handle_mut().ok_or(EmptyError)
    }

    /// Returns a reference to the representation if it is of type `R`.
    ///
    /// Returns [`None`] if the container is empty or holds another type.
    #[must_use]
    pub fn downcast_ref<R: 'static>(&self) -> Option<&R> {
        if self.is::<R>() {
            // SAFETY:
            // 1. The container holds a representation of type `R`, as just checked
            Some(unsafe { self.downcast_ref_unchecked() })
        } else {
            None
        }
    }

    /// Returns a mutable reference to the representation if it is of type
    /// `R`.
    ///
    /// Returns [`None`] if the container is empty or holds another type.
    #[must_use]
    pub fn downcast_mut<R: 'static>(&mut self) -> Option<&mut R> {
        if self.is::<R>() {
            // SAFETY:
            // 1. The container holds a representation of type `R`, as just checked
            Some(unsafe { self.downcast_mut_unchecked() })
        } else {
            None
        }
    }

    /// Returns a reference to the representation without checking its type.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The container is not empty and holds a representation of type `R`.
    #[must_use]
    #[track_caller]
    pub unsafe fn downcast_ref_unchecked<R: 'static>(&self) -> &R {
        let handle = self.handle();

        // SAFETY:
        // 1. Guaranteed by the caller
        unsafe { handle.cast::<R>() }
    }

    /// Returns a mutable reference to the representation without checking
    /// its type.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The container is not empty and holds a representation of type `R`.
    #[must_use]
    #[track_caller]
    pub unsafe fn downcast_mut_unchecked<R: 'static>(&mut self) -> &mut R {
        let handle = self.handle_mut();

        // SAFETY:
        // 1. Guaranteed by the caller
        unsafe { handle.cast::<R>() }
    }

    /// Moves the representation out of the container if it is of type `R`.
    ///
    /// # Errors
    ///
    /// Returns the container unchanged if it is empty or holds another type.
    ///
    /// # Examples
    ///
    /// ```
    /// use clutch::prelude::*;
    ///
    /// let erased: Erased = Erased::new(3.5_f64);
    /// let erased = erased.downcast::<f32>().unwrap_err();
    /// assert_eq!(erased.downcast::<f64>().unwrap(), 3.5);
    /// ```
    pub fn downcast<R: 'static>(self) -> Result<R, Self> {
        if self.is::<R>() {
            // SAFETY:
            // 1. The container holds a representation of type `R`, as just checked
            Ok(unsafe { self.downcast_unchecked() })
        } else {
            Err(self)
        }
    }

    /// Moves the representation out of the container without checking its
    /// type.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The container is not empty and holds a representation of type `R`.
    #[must_use]
    pub unsafe fn downcast_unchecked<R: 'static>(self) -> R {
        let raw = self.into_raw();

        // SAFETY:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe { raw.into_inner_unchecked::<R>() }
    }

    /// Moves the value out into a new container, leaving this one empty.
    ///
    /// Taking from an empty container returns an empty container.
    ///
    /// # Examples
    ///
    /// ```
    /// use clutch::prelude::*;
    ///
    /// let mut source: Erased = Erased::new("moved".to_string());
    /// let target = source.take();
    /// assert!(source.is_empty());
    /// assert!(target.is::<String>());
    /// ```
    #[must_use = "the taken value is dropped immediately, use `clear` instead"]
    pub fn take(&mut self) -> Self {
        // SAFETY:
        // 1. Taking only removes the representation, it never places one
        let raw = unsafe { self.as_raw_mut() }.take();

        // SAFETY:
        // 1. `T` is unchanged
        // 2. The representation came from a container with the same marker
        unsafe { Self::from_raw(raw) }
    }

    /// Replaces the value of this container with the value of `other`,
    /// leaving `other` empty.
    ///
    /// The previous value of this container is destroyed. If `other` is empty,
    /// this container becomes empty as well.
    pub fn move_from(&mut self, other: &mut Self) {
        *self = other.take();
    }

    /// Replaces the value of this container with `value`.
    ///
    /// The previous value is destroyed.
    pub fn set<R>(&mut self, value: R)
    where
        R: Clone + ObjectMarkerFor<T>,
    {
        *self = Self::new(value);
    }

    /// Replaces the value of this container with the value produced by
    /// `init`.
    ///
    /// The new value is built before the previous one is destroyed, so if
    /// `init` panics the container keeps its previous value.
    pub fn emplace<R, F>(&mut self, init: F)
    where
        R: Clone + ObjectMarkerFor<T>,
        F: FnOnce() -> R,
    {
        *self = Self::new_with(init);
    }

    /// Exchanges the values of two containers, including their emptiness.
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Destroys the held value, leaving the container empty.
    ///
    /// Clearing an empty container does nothing.
    pub fn clear(&mut self) {
        // SAFETY:
        // 1. Clearing only removes the representation, it never places one
        let raw = unsafe { self.as_raw_mut() };
        raw.clear();
    }

    /// Converts the container into one with the [`Local`] thread-safety
    /// marker.
    #[must_use]
    pub fn into_local(self) -> Erased<S, Local> {
        let raw = self.into_raw();

        // SAFETY:
        // 1. `T = Local`
        // 2. `T` is not `SendSync`
        unsafe { Erased::from_raw(raw) }
    }
}

/// Panics with the message for accessing an empty container.
#[cold]
#[track_caller]
fn empty_container_access() -> ! {
    panic!("attempted to access the representation of an empty erased container")
}

impl<S: Storage, T> Clone for Erased<S, T> {
    fn clone(&self) -> Self {
        let raw = self.as_raw().clone();

        // SAFETY:
        // 1. `T` is unchanged
        // 2. The clone has the same type as the source representation
        unsafe { Self::from_raw(raw) }
    }

    fn clone_from(&mut self, source: &Self) {
        // SAFETY:
        // 1. The new representation has the same type as one from a container
        //    with the same marker
        let raw = unsafe { self.as_raw_mut() };
        raw.clone_from(source.as_raw());
    }
}

impl<S: Storage, T> core::fmt::Debug for Erased<S, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut debug = f.debug_struct("Erased");
        debug.field("storage", &S::NAME);
        match self.type_name() {
            Some(type_name) => debug.field("repr", &type_name),
            None => debug.field("repr", &format_args!("<empty>")),
        };
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, rc::Rc, string::String, vec::Vec};
    use core::cell::Cell;

    use super::*;
    use crate::{
        markers::SendSync,
        storage::{DefaultInline, Heap, Inline},
    };

    static_assertions::assert_impl_all!(Erased<Heap, SendSync>: Send, Sync);
    static_assertions::assert_impl_all!(Erased<DefaultInline, SendSync>: Send, Sync);
    static_assertions::assert_not_impl_any!(Erased<Heap, Local>: Send, Sync);
    static_assertions::assert_not_impl_any!(Erased<DefaultInline, Local>: Send, Sync);
    static_assertions::assert_not_impl_any!(Erased: Copy);

    #[test]
    fn test_erased_size() {
        assert_eq!(size_of::<Erased<Heap>>(), 2 * size_of::<usize>());
        assert_eq!(
            size_of::<Erased<DefaultInline, SendSync>>(),
            5 * size_of::<usize>()
        );
    }

    #[test]
    fn test_erased_empty_accessors() {
        let mut erased: Erased<Inline<8>> = Erased::new(9_u32);
        let moved = erased.take();
        assert!(erased.is_empty());
        assert_eq!(erased.type_id(), None);
        assert_eq!(erased.type_name(), None);
        assert!(!erased.is::<u32>());
        assert_eq!(erased.try_handle().unwrap_err(), EmptyError);
        assert_eq!(erased.try_handle_mut().unwrap_err(), EmptyError);
        assert_eq!(erased.downcast_ref::<u32>(), None);
        assert_eq!(moved.downcast_ref::<u32>(), Some(&9));

        let erased = erased.downcast::<u32>().unwrap_err();
        assert!(erased.is_empty());
    }

    #[test]
    #[should_panic(expected = "attempted to access the representation of an empty erased container")]
    fn test_erased_handle_panics_when_empty() {
        let mut erased: Erased = Erased::new(1_u8);
        let _moved = erased.take();
        let _ = erased.handle();
    }

    #[test]
    fn test_erased_set_and_emplace() {
        let drops = Rc::new(Cell::new(0));

        #[derive(Clone)]
        struct Noisy(Rc<Cell<usize>>);

        impl Drop for Noisy {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let mut erased: Erased = Erased::new(Noisy(drops.clone()));
        erased.set(String::from("replaced"));
        assert_eq!(drops.get(), 1);
        assert_eq!(erased.downcast_ref::<String>().map(String::as_str), Some("replaced"));

        erased.emplace(|| Vec::from([1_u8, 2]));
        assert_eq!(erased.downcast_ref::<Vec<u8>>().map(Vec::len), Some(2));

        // Replacing an empty container works too
        erased.clear();
        erased.emplace(|| Noisy(drops.clone()));
        assert!(erased.is::<Noisy>());
        drop(erased);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn test_erased_swap_and_move_from() {
        let mut a: Erased<DefaultInline> = Erased::new(1_u16);
        let mut b: Erased<DefaultInline> = Erased::new(String::from("b"));
        a.swap(&mut b);
        assert!(a.is::<String>());
        assert!(b.is::<u16>());

        b.move_from(&mut a);
        assert!(a.is_empty());
        assert!(b.is::<String>());
    }

    #[test]
    fn test_erased_into_local() {
        let erased: Erased<Heap, SendSync> = Erased::new(5_u8);
        let local: Erased<Heap, Local> = erased.into_local();
        assert_eq!(local.downcast::<u8>().ok(), Some(5));
    }

    #[test]
    fn test_erased_debug() {
        let mut erased: Erased<DefaultInline> = Erased::new(2_i32);
        assert_eq!(
            format!("{erased:?}"),
            r#"Erased { storage: "inline", repr: "i32" }"#
        );
        erased.clear();
        assert_eq!(
            format!("{erased:?}"),
            r#"Erased { storage: "inline", repr: <empty> }"#
        );
    }
}
