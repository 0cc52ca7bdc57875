//! Marker types and traits for defining thread-safety semantics.
//!
//! These markers appear as the last type parameter of [`Erased<S,
//! T>`](crate::Erased) and of tables generated by
//! [`capability_table!`](crate::capability_table). They encode at compile
//! time whether the held representation may cross thread boundaries.
//!
//! # Design Philosophy
//!
//! The constraint encoded by a marker is enforced at construction time. It is
//! impossible to construct an `Erased<_, SendSync>` holding a representation
//! that is not `Send + Sync`, which means you can trust that an `Erased<_,
//! SendSync>` truly is `Send + Sync` even though the concrete type has been
//! forgotten.
//!
//! # Thread Safety Markers
//!
//! - [`Local`]: The container may hold non-thread-safe data (like `Rc` or raw
//!   pointers) and cannot be sent between threads. This is the default, since
//!   the container itself is a single-threaded value.
//! - [`SendSync`]: The held representation is `Send + Sync`, allowing the
//!   container to cross thread boundaries.
//!
//! # Examples
//!
//! ```
//! use std::rc::Rc;
//!
//! use clutch::prelude::*;
//!
//! // Thread-safe container holding a String (String is Send + Sync)
//! let thread_safe: Erased<Heap, markers::SendSync> = Erased::new("hello".to_string());
//!
//! // Can be sent to another thread
//! std::thread::spawn(move || {
//!     assert_eq!(thread_safe.downcast_ref::<String>().unwrap(), "hello");
//! })
//! .join()
//! .unwrap();
//!
//! // Local container with an Rc (Rc is !Send + !Sync)
//! let local: Erased<Heap, markers::Local> = Erased::new(Rc::new(5_u32));
//! // local cannot be sent to another thread - won't compile
//! # let _ = local;
//! ```

/// Marker type indicating that a container and its representation are `Send +
/// Sync`.
///
/// # Examples
///
/// ```
/// use std::thread;
///
/// use clutch::prelude::*;
///
/// let erased: Erased<DefaultInline, markers::SendSync> = Erased::new(42_u64);
///
/// thread::spawn(move || {
///     assert_eq!(erased.downcast_ref::<u64>(), Some(&42));
/// })
/// .join()
/// .unwrap();
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct SendSync;

/// Marker type indicating that a container is not `Send` or `Sync`.
///
/// This marker is used when the representation may be thread-local data that
/// cannot be safely sent between threads or shared across threads. Common
/// examples include `Rc`, raw pointers, or types that explicitly opt out of
/// `Send`/`Sync`.
///
/// # Converting to Local
///
/// A thread-safe container can always be converted to a local one using
/// [`into_local`](crate::Erased::into_local).
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
///
/// use clutch::prelude::*;
///
/// let erased: Erased<Heap, markers::Local> = Erased::new(Rc::new("local"));
///
/// // This container cannot be sent to another thread
/// // std::thread::spawn(move || {
/// //     drop(erased); // ❌ Won't compile
/// // });
/// # let _ = erased;
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Local;

/// Marker trait combining a representation type with a thread-safety marker.
///
/// `R: ObjectMarkerFor<T>` holds for every `R` when `T` is [`Local`], and for
/// `R: Send + Sync` when `T` is [`SendSync`].
///
/// # Enforcement at Construction
///
/// This trait is used as a bound on every constructor. You cannot create an
/// `Erased<_, SendSync>` unless the representation is `ObjectMarkerFor<SendSync>`,
/// which requires it to be `Send + Sync`:
///
/// ```compile_fail
/// use std::rc::Rc;
/// use clutch::prelude::*;
///
/// // This won't compile because Rc is not Send + Sync
/// let erased: Erased<Heap, markers::SendSync> = Erased::new(Rc::new(1_u8));
/// ```
///
/// Use [`Local`] instead for non-thread-safe data:
///
/// ```
/// use std::rc::Rc;
///
/// use clutch::prelude::*;
///
/// let erased: Erased<Heap, markers::Local> = Erased::new(Rc::new(1_u8));
/// # let _ = erased;
/// ```
pub trait ObjectMarkerFor<T>: Sized + 'static {}

impl<O: Sized + 'static> ObjectMarkerFor<Local> for O {}

impl<O: Sized + 'static> ObjectMarkerFor<SendSync> for O where O: Send + Sync {}
