//! Storage backends deciding where a representation lives.
//!
//! - [`Heap`]: one pointer to a separate heap allocation. Any type fits and
//!   the representation never moves once placed.
//! - [`Inline<SIZE, ALIGN>`](Inline): a buffer of `SIZE` bytes aligned to
//!   `ALIGN`, embedded in the container. No allocation ever happens, and types
//!   that are too large or too strictly aligned are rejected at compile time:
//!
//! ```compile_fail
//! use clutch::{Erased, storage::Inline};
//!
//! // A `[u64; 4]` needs 32 bytes
//! let erased: Erased<Inline<16>> = Erased::new([0_u64; 4]);
//! ```
//!
//! ```compile_fail
//! use clutch::{Erased, storage::Inline};
//!
//! #[derive(Clone)]
//! #[repr(align(16))]
//! struct Wide(u8);
//!
//! // Plenty of room, but the buffer is only 8-aligned
//! let erased: Erased<Inline<64>> = Erased::new(Wide(0));
//! ```
//!
//! The alignment of an [`Inline`] buffer is expressed with [`Align`], and must
//! be a power of two:
//!
//! ```
//! use clutch::{Erased, storage::Inline};
//!
//! #[derive(Clone)]
//! #[repr(align(16))]
//! struct Wide(u8);
//!
//! let erased: Erased<Inline<64, 16>> = Erased::new(Wide(7));
//! assert_eq!(erased.downcast_ref::<Wide>().map(|wide| wide.0), Some(7));
//! ```

pub use clutch_internals::storage::{Align, Alignment, Heap, Inline, Storage};

/// An [`Inline`] buffer the size of four pointers, with the default alignment.
///
/// This is large enough for most small values: integers, `String`, `Vec`, `Rc`
/// and `Box` all fit.
pub type DefaultInline = Inline<{ 4 * size_of::<usize>() }>;

#[cfg(test)]
mod tests {
    use alloc::{rc::Rc, string::String, vec::Vec};

    use super::*;

    #[test]
    fn test_default_inline_fits_common_types() {
        assert!(DefaultInline::fits::<String>());
        assert!(DefaultInline::fits::<Vec<u8>>());
        assert!(DefaultInline::fits::<Rc<str>>());
        assert!(DefaultInline::fits::<u64>());
        assert!(!DefaultInline::fits::<[usize; 5]>());
        assert_eq!(DefaultInline::CAPACITY, 4 * size_of::<usize>());
        assert_eq!(DefaultInline::ALIGNMENT, 8);
    }
}
