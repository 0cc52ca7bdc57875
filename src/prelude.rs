//! Commonly used items for convenient importing.
//!
//! The prelude module re-exports the most frequently used types and macros
//! from the clutch library. This allows you to import everything you need with
//! a single use statement.
//!
//! # Usage
//!
//! ```rust
//! use clutch::prelude::*;
//!
//! let erased: Erased<DefaultInline, markers::SendSync> = Erased::new(7_u32);
//! assert_eq!(erased.downcast_ref::<u32>(), Some(&7));
//! ```
//!
//! # What's Included
//!
//! - **[`Erased`]**: The type-erased value container
//! - **[`Handle`]** and **[`HandleMut`]**: Untyped access to the held value
//! - **[`EmptyError`]**: Returned when accessing a moved-from container
//! - **[`Heap`]**, **[`Inline`]** and **[`DefaultInline`]**: Storage backends
//! - **[`capability_table!`]**: Macro for pairing a container with erased
//!   operations
//! - **[`markers`]**: Thread-safety markers

pub use crate::{
    EmptyError, Erased, Handle, HandleMut, capability_table, markers,
    storage::{DefaultInline, Heap, Inline},
};
