//! Internal utility types.

/// Marker type used in place of a representation whose type has been erased.
///
/// Pointers to erased representations are spelled `NonNull<Erased>`. The
/// marker is never stored anywhere; it only exists so that such pointers
/// cannot be confused with pointers to a real type.
///
/// Using a distinct marker type (rather than `()` or `u8`) makes the intent
/// clearer in type signatures and error messages.
#[derive(Clone, Copy, Debug)]
pub struct Erased {
    /// Prevents construction outside of this crate.
    _private: (),
}
