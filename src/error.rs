/// Error returned when accessing the representation of an empty container.
///
/// A container only becomes empty after its value was moved out, for instance
/// with [`Erased::take`](crate::Erased::take).
///
/// # Examples
///
/// ```
/// use clutch::prelude::*;
///
/// let mut erased: Erased = Erased::new(1_u8);
/// let _moved = erased.take();
///
/// let error: EmptyError = erased.try_handle().unwrap_err();
/// assert_eq!(
///     error.to_string(),
///     "the erased container is empty because its value was moved out"
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, derive_more::Display, derive_more::Error)]
#[display("the erased container is empty because its value was moved out")]
pub struct EmptyError;
