//! typemold
//!
//! Builds a navigable model of the type declarations in a Go source unit
//! without compiling it. Statically-derived descriptors and descriptors taken
//! from live Rust values share one interface, [`Type`].

pub mod describe;
pub mod frontend;
pub mod live;
pub mod resolve;
pub mod types;

mod load;
mod utils;

pub use live::{type_of, LiveType, Reflect};
pub use load::{build_file, load_file, load_str, load_types};
pub use resolve::Builder;
pub use types::{
    Identity, Kind, Method, Origin, PrimitiveRegistry, StaticType, StructField, StructTag, Type,
    TypeGraph, TypeMap, TypeRef,
};
pub use utils::{Error, ErrorClass, Result, Span};
