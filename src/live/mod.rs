//! Live-value side of the type model
//!
//! [`Reflect`] describes a Rust type at runtime; [`LiveType`] exposes that
//! description through the same [`Type`](crate::types::Type) interface as the
//! statically-derived descriptors.

mod adapter;
mod rtype;

pub use adapter::{type_of, LiveType};
pub use rtype::{FieldInfo, RShape, RType, RTypeFn, Reflect};
