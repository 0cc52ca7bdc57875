//! Module containing the erased container and its lifecycle vtable

mod data;
mod handle;
mod raw;
pub(crate) mod vtable;

pub use self::{
    handle::{RawHandle, RawHandleMut},
    raw::RawErased,
};
