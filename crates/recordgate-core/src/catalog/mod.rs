//! Record type metadata.
//!
//! The enhancer branches on per-type flags (public, abstract parent, defines
//! searches, ...) through the [`TypeDescriptor`] trait and resolves
//! descriptors through a [`TypeProvider`].

mod catalog;
mod descriptor;

pub use catalog::{TypeCatalog, TypeProvider};
pub use descriptor::{RecordTypeDef, TypeDescriptor};
