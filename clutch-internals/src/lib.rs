#![no_std]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`clutch`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased data structures and unsafe
//! operations that power the [`clutch`] library: a container that owns a value
//! of any concrete *representation* type and manages its lifecycle (clone,
//! move, destroy) through a hand-built vtable of plain function pointers
//! instead of `dyn Trait`.
//!
//! **This crate is an implementation detail.** No semantic versioning guarantees
//! are provided. Users should depend on the [`clutch`] crate, not this one.
//!
//! # Architecture
//!
//! - **[`storage`]**: Where the bytes of a representation live
//!   - [`Storage`]: Sealed backend contract (`construct`, `read`, `release`)
//!   - [`Heap`]: One pointer to a separately allocated representation
//!   - [`Inline`]: A fixed-capacity, fixed-alignment buffer holding the
//!     representation in place
//!
//! - **[`lifecycle`]**: The erased container itself
//!   - [`RawErased`]: Owns one storage plus its vtable, or nothing at all
//!   - [`RawHandle`]/[`RawHandleMut`]: Untyped, lifetime-bound access to the
//!     held representation
//!   - [`LifecycleVtable`]: `destroy`/`clone` function pointers generated once
//!     per representation and storage type
//!
//! # Safety Strategy
//!
//! Once a representation has been placed in storage, its type is forgotten.
//! Every later operation goes through function pointers that were
//! instantiated for that exact type at construction time, so the invariant
//! that must never break is: **the vtable always matches the representation
//! in the storage**.
//!
//! This crate maintains that through:
//!
//! - **Module-based encapsulation**: The storage and vtable are only ever set
//!   together, in one constructor, and their fields are private to a single
//!   module
//! - **An explicit empty tag**: A container whose value was moved out is
//!   `None` rather than a storage holding a sentinel, so the destructor of a
//!   representation can only ever run once
//! - **Documented vtable contracts**: Each vtable method specifies exactly when
//!   it can be safely called
//!
//! [`clutch`]: https://docs.rs/clutch/latest/clutch/
//! [`Storage`]: storage::Storage
//! [`Heap`]: storage::Heap
//! [`Inline`]: storage::Inline
//! [`LifecycleVtable`]: lifecycle::vtable::LifecycleVtable

extern crate alloc;

#[macro_use]
mod trace;

mod lifecycle;
pub mod storage;
mod util;

pub use lifecycle::{RawErased, RawHandle, RawHandleMut};
pub use util::Erased;
