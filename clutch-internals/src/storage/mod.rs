//! Storage backends for erased representations.
//!
//! A storage backend owns the raw bytes of one representation and knows how to
//! place it, how to hand out an untyped pointer to it and how to give its
//! memory back. It does **not** know how to drop or clone the representation;
//! that is the job of the lifecycle vtable, which is generated with full type
//! knowledge and drives the backend through the [`Storage`] trait.
//!
//! Two backends are provided:
//!
//! - [`Heap`]: exactly one pointer wide. The representation lives in its own
//!   heap allocation, so any type can be stored.
//! - [`Inline`]: a buffer of `SIZE` bytes aligned to `ALIGN`. The
//!   representation lives inside the buffer and no allocation ever happens.
//!   Types that are too large or too strictly aligned are rejected at compile
//!   time.

mod heap;
mod inline;

use core::ptr::NonNull;

pub use elain::{Align, Alignment};

pub use self::{heap::Heap, inline::Inline};
use crate::util::Erased;

/// Module preventing implementations of [`Storage`] outside of this crate.
mod sealed {
    use elain::{Align, Alignment};

    /// Sealing supertrait of [`Storage`](super::Storage).
    pub trait Sealed {}

    impl Sealed for super::Heap {}
    impl<const SIZE: usize, const ALIGN: usize> Sealed for super::Inline<SIZE, ALIGN> where
        Align<ALIGN>: Alignment
    {
    }
}

/// A place where exactly one erased representation can live.
///
/// A storage value is created already holding a representation (there is no
/// "empty storage"); whether a container currently holds anything is tracked
/// outside of the storage bytes.
///
/// # Safety
///
/// Implementors guarantee that, for a storage created by
/// [`construct::<R>`](Storage::construct) and until
/// [`release::<R>`](Storage::release) is called:
///
/// 1. [`read`](Storage::read) and [`read_mut`](Storage::read_mut) return a
///    pointer to an initialized `R`, properly aligned for `R`.
/// 2. The pointer returned by [`read`](Storage::read) is valid for reads for as
///    long as the storage is borrowed, and the pointer returned by
///    [`read_mut`](Storage::read_mut) is additionally valid for writes for as
///    long as the storage is mutably borrowed.
/// 3. Moving the storage value moves the representation with it: a pointer
///    obtained after the move points to the same (moved) `R`.
/// 4. Dropping a storage value without calling `release` never drops the `R`
///    (it may leak memory).
///
/// This trait is sealed and only implemented for [`Heap`] and [`Inline`].
pub unsafe trait Storage: sealed::Sealed + Sized + 'static {
    /// Human-readable name of the backend, used in diagnostics.
    const NAME: &'static str;

    /// Returns whether a representation of type `R` can be placed in this
    /// backend.
    fn can_hold<R>() -> bool;

    /// Creates a new storage holding the value produced by `init`.
    ///
    /// The value is written directly into its final location: for [`Heap`] the
    /// allocation happens before `init` runs. If `init` panics, nothing is
    /// retained.
    ///
    /// Backends that cannot hold `R` reject the call at compile time.
    fn construct<R, F>(init: F) -> Self
    where
        R: 'static,
        F: FnOnce() -> R;

    /// Returns a pointer to the held representation, valid for reads.
    fn read(&self) -> NonNull<Erased>;

    /// Returns a pointer to the held representation, valid for reads and
    /// writes.
    fn read_mut(&mut self) -> NonNull<Erased>;

    /// Gives back the memory of the representation without dropping it.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This storage was created by [`Storage::construct`] with the same type
    ///    `R`.
    /// 2. The `R` in the storage has already been dropped or moved out.
    /// 3. The storage is not used again afterwards, other than being dropped.
    unsafe fn release<R: 'static>(&mut self);
}
