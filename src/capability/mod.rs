//! Erasing methods and free functions into flat function pointers.
//!
//! A *capability thunk* is a plain `unsafe fn` that takes an untyped
//! [`Handle`] (or [`HandleMut`]) plus the operation's own arguments, recovers
//! the concrete receiver behind the handle and calls one specific operation on
//! it. The concrete receiver type is fixed when the thunk is created, so
//! calling a thunk never involves a trait object.
//!
//! Three adaptors create thunks:
//!
//! | Adaptor | Accepts | Produces |
//! |---|---|---|
//! | [`erase_ref`] | `Fn(&Recv, A...) -> Ret` | `unsafe fn(Handle<'_>, A...) -> Ret` |
//! | [`erase_mut`] | `Fn(&mut Recv, A...) -> Ret` | `unsafe fn(HandleMut<'_>, A...) -> Ret` |
//! | [`erase_owned`] | `Fn(Recv, A...) -> Ret`, `Recv: Clone` | `unsafe fn(Handle<'_>, A...) -> Ret` |
//!
//! Method paths such as `Cat::talk` and free functions such as `fn
//! describe(cat: &Cat)` are both accepted by [`erase_ref`]; `erase_owned`
//! passes a clone of the receiver to functions that take it by value. Up to
//! six arguments besides the receiver are supported.
//!
//! The operation must be zero-sized: a function item or a closure that
//! captures nothing. This is checked at compile time, so a thunk carries no
//! state beyond its own address:
//!
//! ```compile_fail
//! use clutch::capability::erase_ref;
//!
//! let suffix = String::from("!");
//! // Captures `suffix`, so it is not zero-sized
//! let thunk = erase_ref::<String, fn() -> String, _>(move |s: &String| s.clone() + &suffix);
//! ```
//!
//! The signature parameter is written as a function pointer type over the
//! arguments that follow the receiver. It selects the arity and must be spelled
//! out at the call site.
//!
//! # Examples
//!
//! ```
//! use clutch::{Erased, capability::{erase_mut, erase_ref}};
//!
//! #[derive(Clone)]
//! struct Counter(u32);
//!
//! impl Counter {
//!     fn get(&self) -> u32 {
//!         self.0
//!     }
//!
//!     fn add(&mut self, amount: u32) {
//!         self.0 += amount;
//!     }
//! }
//!
//! let get = erase_ref::<Counter, fn() -> u32, _>(Counter::get);
//! let add = erase_mut::<Counter, fn(u32), _>(Counter::add);
//!
//! let mut erased: Erased = Erased::new(Counter(1));
//! // SAFETY: The container holds a `Counter`.
//! unsafe {
//!     add(erased.handle_mut(), 41);
//!     assert_eq!(get(erased.handle()), 42);
//! }
//! ```
//!
//! For grouping several thunks with a container, see
//! [`capability_table!`](crate::capability_table).
//!
//! [`Handle`]: crate::Handle
//! [`HandleMut`]: crate::HandleMut

mod impls;

use core::ptr::NonNull;

/// Module holding the token that keeps the adaptor traits' methods private.
mod private {
    /// Proof that a thunk is being created through one of the public adaptors.
    #[derive(Clone, Copy)]
    pub struct Token(pub(super) ());
}

/// An operation taking its receiver by shared reference, which can be erased
/// into a thunk taking a [`Handle`](crate::Handle).
///
/// `Sig` is a function pointer type over the arguments following the receiver,
/// for example `fn(u32) -> String`. This trait is implemented for every
/// suitable `Fn`, and cannot be meaningfully implemented outside this crate.
pub trait EraseRef<Recv, Sig>: Copy + 'static {
    /// The erased function pointer type.
    type Thunk: Copy;

    #[doc(hidden)]
    fn thunk(token: private::Token) -> Self::Thunk;
}

/// An operation taking its receiver by mutable reference, which can be erased
/// into a thunk taking a [`HandleMut`](crate::HandleMut).
///
/// See [`EraseRef`] for the meaning of `Sig`.
pub trait EraseMut<Recv, Sig>: Copy + 'static {
    /// The erased function pointer type.
    type Thunk: Copy;

    #[doc(hidden)]
    fn thunk(token: private::Token) -> Self::Thunk;
}

/// An operation taking its receiver by value, which can be erased into a
/// thunk taking a [`Handle`](crate::Handle). The receiver is cloned out of the
/// handle on every call.
///
/// See [`EraseRef`] for the meaning of `Sig`.
pub trait EraseOwned<Recv, Sig>: Copy + 'static {
    /// The erased function pointer type.
    type Thunk: Copy;

    #[doc(hidden)]
    fn thunk(token: private::Token) -> Self::Thunk;
}

/// Erases an operation taking `&Recv` into a thunk taking a
/// [`Handle`](crate::Handle).
///
/// `f` must be zero-sized; this is checked at compile time.
///
/// # Examples
///
/// ```
/// use clutch::{Erased, capability::erase_ref};
///
/// #[derive(Clone)]
/// struct Dog;
///
/// fn greet(_dog: &Dog, name: &'static str) -> String {
///     format!("Vau, {name}")
/// }
///
/// let thunk = erase_ref::<Dog, fn(&'static str) -> String, _>(greet);
/// let erased: Erased = Erased::new(Dog);
///
/// // SAFETY: The container holds a `Dog`.
/// assert_eq!(unsafe { thunk(erased.handle(), "Rex") }, "Vau, Rex");
/// ```
#[must_use]
pub fn erase_ref<Recv, Sig, F>(f: F) -> F::Thunk
where
    F: EraseRef<Recv, Sig>,
{
    assert_zero_sized(f);
    F::thunk(private::Token(()))
}

/// Erases an operation taking `&mut Recv` into a thunk taking a
/// [`HandleMut`](crate::HandleMut).
///
/// `f` must be zero-sized; this is checked at compile time.
#[must_use]
pub fn erase_mut<Recv, Sig, F>(f: F) -> F::Thunk
where
    F: EraseMut<Recv, Sig>,
{
    assert_zero_sized(f);
    F::thunk(private::Token(()))
}

/// Erases an operation taking `Recv` by value into a thunk taking a
/// [`Handle`](crate::Handle).
///
/// Every call of the thunk clones the receiver and passes the clone, leaving
/// the held representation untouched.
///
/// `f` must be zero-sized; this is checked at compile time.
///
/// # Examples
///
/// ```
/// use clutch::{Erased, capability::erase_owned};
///
/// #[derive(Clone)]
/// struct Tag(String);
///
/// fn into_label(tag: Tag, prefix: char) -> String {
///     format!("{prefix}{}", tag.0)
/// }
///
/// let thunk = erase_owned::<Tag, fn(char) -> String, _>(into_label);
/// let erased: Erased = Erased::new(Tag("v1".to_string()));
///
/// // SAFETY: The container holds a `Tag`.
/// assert_eq!(unsafe { thunk(erased.handle(), '#') }, "#v1");
/// assert!(erased.is::<Tag>());
/// ```
#[must_use]
pub fn erase_owned<Recv, Sig, F>(f: F) -> F::Thunk
where
    F: EraseOwned<Recv, Sig>,
{
    assert_zero_sized(f);
    F::thunk(private::Token(()))
}

/// Rejects operations that carry state, at compile time.
#[inline(always)]
fn assert_zero_sized<F>(_f: F) {
    const {
        assert!(
            size_of::<F>() == 0,
            "erased operations must be zero-sized: use a function item or a non-capturing closure"
        );
    }
}

/// Produces a value of the zero-sized operation type `F`.
///
/// Only called from thunks created by one of the adaptors, which received a
/// value of type `F`. That value proves the type is inhabited, and function
/// items and closures carry no invariant beyond that.
#[inline(always)]
fn conjure<F: Copy>() -> F {
    const {
        assert!(
            size_of::<F>() == 0,
            "erased operations must be zero-sized: use a function item or a non-capturing closure"
        );
    }
    let ptr: *const F = NonNull::<F>::dangling().as_ptr();

    // SAFETY: `F` is zero-sized, so any non-null, aligned pointer is valid for
    // reads of it, and `F` is inhabited since a value of it was passed to the
    // adaptor that created the calling thunk.
    unsafe { ptr.read() }
}
