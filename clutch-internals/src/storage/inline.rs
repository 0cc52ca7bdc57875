//! Inline (small-buffer) storage.

use core::{cell::UnsafeCell, mem::MaybeUninit, ptr::NonNull};

use elain::{Align, Alignment};

use crate::{storage::Storage, util::Erased};

/// Storage holding the representation directly inside a buffer of `SIZE`
/// bytes aligned to `ALIGN`.
///
/// No allocation ever happens. A representation `R` can only be placed here
/// if `size_of::<R>() <= SIZE` **and** `align_of::<R>() <= ALIGN`; both are
/// checked at compile time when [`Storage::construct`] is instantiated.
///
/// Bytes of the buffer past the end of the representation are unspecified and
/// never read.
///
/// The buffer sits in an [`UnsafeCell`], so a representation with interior
/// mutability can be mutated through a pointer obtained from a shared borrow.
/// As a result `Inline` is not [`Sync`]; thread safety is decided by the typed
/// wrapper.
#[allow(
    missing_copy_implementations,
    reason = "the buffer owns a representation, copying it would duplicate the value"
)]
#[repr(C)]
pub struct Inline<const SIZE: usize, const ALIGN: usize = 8>
where
    Align<ALIGN>: Alignment,
{
    /// Zero-sized field raising the alignment of the buffer to `ALIGN`.
    _align: [Align<ALIGN>; 0],
    /// The bytes of the representation, starting at offset 0.
    bytes: UnsafeCell<[MaybeUninit<u8>; SIZE]>,
}

impl<const SIZE: usize, const ALIGN: usize> Inline<SIZE, ALIGN>
where
    Align<ALIGN>: Alignment,
{
    /// The number of bytes available to a representation.
    pub const CAPACITY: usize = SIZE;

    /// The alignment guaranteed for a representation.
    pub const ALIGNMENT: usize = ALIGN;

    /// Returns whether a representation of type `R` fits in this buffer, both
    /// by size and by alignment.
    #[must_use]
    pub const fn fits<R>() -> bool {
        size_of::<R>() <= SIZE && align_of::<R>() <= ALIGN
    }
}

// SAFETY:
// 1. `construct` writes the `R` at offset 0 of the buffer, which is aligned to
//    `ALIGN >= align_of::<R>()` and at least `size_of::<R>()` bytes long.
// 2. `read`/`read_mut` derive the pointer from the `UnsafeCell` around the
//    buffer, borrowed shared/mutably, so it is valid for exactly as long as
//    that borrow. Going through the cell keeps writes by interior mutability
//    of the representation valid even for the pointer from `read`.
// 3. Moving the storage moves the bytes of the `R`, and Rust values can always
//    be moved by copying their bytes.
// 4. `Inline` has no `Drop` implementation and `MaybeUninit` never drops.
unsafe impl<const SIZE: usize, const ALIGN: usize> Storage for Inline<SIZE, ALIGN>
where
    Align<ALIGN>: Alignment,
{
    const NAME: &'static str = "inline";

    #[inline]
    fn can_hold<R>() -> bool {
        Self::fits::<R>()
    }

    #[inline]
    fn construct<R, F>(init: F) -> Self
    where
        R: 'static,
        F: FnOnce() -> R,
    {
        const {
            assert!(
                size_of::<R>() <= SIZE,
                "the representation is too large for this inline storage"
            );
            assert!(
                align_of::<R>() <= ALIGN,
                "the representation is more strictly aligned than this inline storage"
            );
        }

        let mut this = Self {
            _align: [],
            bytes: UnsafeCell::new([MaybeUninit::uninit(); SIZE]),
        };
        let slot: *mut R = this.read_mut().cast::<R>().as_ptr();

        // SAFETY: The buffer starts at offset 0 of a `#[repr(C)]` struct aligned
        // to `ALIGN`, and the checks above guarantee that it is large enough and
        // sufficiently aligned for `R`. The slot is uninitialized, so nothing is
        // overwritten without being dropped.
        unsafe { slot.write(init()) };

        this
    }

    #[inline]
    fn read(&self) -> NonNull<Erased> {
        let ptr: *mut Erased = self.bytes.get().cast::<Erased>();

        // SAFETY: `UnsafeCell::get` returns a pointer derived from a reference,
        // which is never null
        unsafe { NonNull::new_unchecked(ptr) }
    }

    #[inline]
    fn read_mut(&mut self) -> NonNull<Erased> {
        NonNull::from(self.bytes.get_mut()).cast::<Erased>()
    }

    #[inline]
    unsafe fn release<R: 'static>(&mut self) {}
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;

    static_assertions::assert_not_impl_any!(Inline<16>: Sync);

    #[repr(align(32))]
    struct Aligned32 {
        _value: u8,
    }

    #[test]
    fn test_inline_layout() {
        assert_eq!(core::mem::size_of::<Inline<24>>(), 24);
        assert_eq!(core::mem::align_of::<Inline<24>>(), 8);
        assert_eq!(core::mem::size_of::<Inline<16, 16>>(), 16);
        assert_eq!(core::mem::align_of::<Inline<16, 16>>(), 16);
        assert_eq!(core::mem::size_of::<Inline<0>>(), 0);
        assert_eq!(Inline::<48, 4>::CAPACITY, 48);
        assert_eq!(Inline::<48, 4>::ALIGNMENT, 4);
    }

    #[test]
    fn test_inline_fits() {
        assert!(Inline::<8>::fits::<u64>());
        assert!(Inline::<8>::fits::<()>());
        assert!(!Inline::<4>::fits::<u64>());
        assert!(Inline::<{ core::mem::size_of::<String>() }>::fits::<String>());

        // Large enough, but not aligned strictly enough
        assert!(!Inline::<64, 8>::fits::<Aligned32>());
        assert!(Inline::<64, 32>::fits::<Aligned32>());
        assert!(Inline::<64, 32>::can_hold::<Aligned32>());

        // The tail of the buffer is simply unused
        assert!(Inline::<64>::fits::<u8>());
    }

    #[test]
    fn test_inline_construct_in_buffer() {
        let mut storage = Inline::<32>::construct(|| String::from("inline"));
        let buffer_start = NonNull::from(&storage).cast::<Erased>();
        assert_eq!(storage.read(), buffer_start);

        // SAFETY: The storage was constructed with a `String`.
        let value: &mut String = unsafe { storage.read_mut().cast::<String>().as_mut() };
        value.push('!');

        // SAFETY: The storage was constructed with a `String`; reading moves it out.
        let value: String = unsafe { storage.read().cast::<String>().as_ptr().read() };
        assert_eq!(value, "inline!");

        // SAFETY: The `String` has been moved out above.
        unsafe { storage.release::<String>() };
    }

    #[test]
    fn test_inline_interior_mutability_through_read() {
        use core::cell::Cell;

        let storage = Inline::<16>::construct(|| Cell::new(1_u32));
        // SAFETY: The storage was constructed with a `Cell<u32>`.
        let cell: &Cell<u32> = unsafe { storage.read().cast::<Cell<u32>>().as_ref() };
        cell.set(cell.get() + 1);

        // SAFETY: The storage was constructed with a `Cell<u32>`.
        let again: &Cell<u32> = unsafe { storage.read().cast::<Cell<u32>>().as_ref() };
        again.set(again.get() * 10);
        assert_eq!(cell.get(), 20);
    }

    #[test]
    fn test_inline_alignment_respected() {
        let storage = Inline::<64, 32>::construct(|| Aligned32 { _value: 7 });
        let address = storage.read().as_ptr() as usize;
        assert_eq!(address % 32, 0);
    }

    #[test]
    fn test_inline_move_moves_value() {
        let storage = Inline::<16>::construct(|| 0xdead_beef_u64);
        let moved = storage;
        // SAFETY: The storage was constructed with a `u64`.
        let value: u64 = unsafe { moved.read().cast::<u64>().as_ptr().read() };
        assert_eq!(value, 0xdead_beef);
    }
}
