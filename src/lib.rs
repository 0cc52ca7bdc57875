#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Extra checks on nightly
#![cfg_attr(nightly_extra_checks, feature(rustdoc_missing_doc_code_examples))]
#![cfg_attr(nightly_extra_checks, forbid(rustdoc::missing_doc_code_examples))]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Value-semantic polymorphism without trait objects.
//!
//! ## Overview
//!
//! This crate provides a container, [`Erased`], that owns a value of any
//! concrete type (its *representation*) and gives it ordinary value semantics:
//! it can be cloned, moved out of, reassigned, swapped and dropped, all without
//! the container knowing the concrete type after construction. Instead of a
//! compiler-generated `dyn Trait` vtable, the container carries a small
//! hand-built table of plain function pointers for destroying and cloning the
//! representation.
//!
//! On top of that, [`capability`] turns ordinary methods and free functions
//! into flat `unsafe fn` thunks that take an untyped [`Handle`]. Pairing an
//! [`Erased`] with a few such thunks gives you a polymorphic value with exactly
//! the operations you picked, and the [`capability_table!`] macro writes that
//! pairing for you.
//!
//! ## Quick Example
//!
//! ```
//! use clutch::prelude::*;
//!
//! trait Talk {
//!     fn talk(&self) -> String;
//! }
//!
//! #[derive(Clone)]
//! struct Cat;
//!
//! impl Talk for Cat {
//!     fn talk(&self) -> String {
//!         "Meow".to_string()
//!     }
//! }
//!
//! #[derive(Clone)]
//! struct Dog {
//!     name: String,
//! }
//!
//! impl Talk for Dog {
//!     fn talk(&self) -> String {
//!         format!("Vau, says {}", self.name)
//!     }
//! }
//!
//! capability_table! {
//!     /// Anything that can talk.
//!     pub struct Animal: Talk {
//!         fn talk(&self) -> String;
//!     }
//! }
//!
//! let mut animal: Animal = Animal::new(Cat);
//! assert_eq!(animal.talk(), "Meow");
//!
//! let copy = animal.clone();
//! animal.set(Dog {
//!     name: "Rex".to_string(),
//! });
//! assert_eq!(animal.talk(), "Vau, says Rex");
//! assert_eq!(copy.talk(), "Meow");
//! ```
//!
//! ## Core Concepts
//!
//! An [`Erased<S, T>`](Erased) is either *holding* a representation or
//! *empty*. It only becomes empty when its value is explicitly moved out with
//! [`take`](Erased::take), [`move_from`](Erased::move_from) or cleared with
//! [`clear`](Erased::clear). The destructor of a representation runs exactly
//! once, no matter how the container is moved around, and dropping an empty
//! container does nothing.
//!
//! The first type parameter selects where the representation lives:
//!
//! - [`Heap`](storage::Heap) (the default) stores one pointer to a separate
//!   allocation, so any type fits and moving the container never moves the
//!   representation.
//! - [`Inline<SIZE, ALIGN>`](storage::Inline) stores the representation in a
//!   buffer inside the container. Types that don't fit are rejected at compile
//!   time.
//!
//! The second type parameter is a thread-safety marker from [`markers`]:
//! [`Local`](markers::Local) (the default) accepts anything, while
//! [`SendSync`](markers::SendSync) only accepts `Send + Sync` representations
//! and in exchange makes the container `Send + Sync`.
//!
//! ## Accessing the Representation
//!
//! Because the concrete type is forgotten, access goes through one of:
//!
//! - [`handle`](Erased::handle) / [`handle_mut`](Erased::handle_mut), which
//!   return an untyped [`Handle`] / [`HandleMut`] for use with capability
//!   thunks. These panic on an empty container;
//!   [`try_handle`](Erased::try_handle) returns an [`EmptyError`] instead.
//! - Checked downcasts such as [`downcast_ref`](Erased::downcast_ref), which
//!   compare [`TypeId`](core::any::TypeId)s.
//!
//! ## Logging
//!
//! With the `tracing` feature enabled, every lifecycle transition
//! (`construct`, `clone`, `move`, `destroy`) emits a `TRACE` event with the
//! target `clutch::lifecycle`.
//!
//! ## Architecture
//!
//! The library is split into two crates:
//!
//! - **`clutch`**: High-level, typed API and the capability adaptors
//! - **`clutch-internals`**: Low-level storage backends, the lifecycle vtable
//!   and the raw container. This crate contains all the `unsafe` lifecycle
//!   code and is not meant to be used directly.

extern crate alloc;

#[macro_use]
mod macros;

pub mod capability;
pub mod markers;
pub mod prelude;
pub mod storage;

mod erased;
mod error;

pub use clutch_internals::{RawHandle as Handle, RawHandleMut as HandleMut};

pub use self::{erased::Erased, error::EmptyError};

// Not public API. Referenced by macro-generated code.
#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    pub use core::{
        clone::Clone,
        fmt::{Debug, Formatter, Result as FmtResult},
        marker::PhantomData,
    };
}
