//! Type descriptors and the capability interface they share
//!
//! [`Type`] is implemented by handles into a statically-built [`TypeGraph`]
//! and by the live adapter ([`crate::live::LiveType`]), so code walking a type
//! never needs to know where the description came from.

mod descriptor;
mod graph;
mod kind;
mod lookup;
mod primitive;

use std::fmt;
use std::sync::Arc;

use crate::utils::{Error, Result};

pub use descriptor::{Descriptor, FieldDesc, NodeId, Resolved, Shape};
pub use graph::{StaticType, TypeGraph, TypeMap};
pub use kind::Kind;
pub use primitive::PrimitiveRegistry;

/// Shared handle to any [`Type`]
pub type TypeRef = Arc<dyn Type>;

/// Where a descriptor's information came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Built from declaration syntax
    Static,
    /// Introspected from a runtime value
    Live,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Static => f.write_str("statically-derived"),
            Origin::Live => f.write_str("live"),
        }
    }
}

/// Identity of a descriptor. Equal identities mean the same descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Identity {
    /// A node of one particular graph; `graph` is the graph's address
    Static { graph: usize, node: NodeId },
    /// A runtime type
    Live(std::any::TypeId),
}

/// A struct field tag, kept as raw text and never decoded
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StructTag(String);

impl StructTag {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single field of a struct type
#[derive(Debug, Clone)]
pub struct StructField {
    /// Declared name; for embedded fields, the name of the embedded type
    pub name: String,
    /// Namespace of an unexported field, empty for exported ones
    pub pkg_path: String,
    pub ty: TypeRef,
    pub tag: StructTag,
    /// Byte offset within the struct; only live descriptors know it
    pub offset: Option<usize>,
    /// Index path from the struct the lookup started at
    pub index: Vec<usize>,
    /// Embedded field
    pub anonymous: bool,
}

impl StructField {
    pub fn is_exported(&self) -> bool {
        self.pkg_path.is_empty()
    }
}

/// Go exports names that start with an upper-case letter
pub fn is_exported(name: &str) -> bool {
    name.chars().next().map_or(false, char::is_uppercase)
}

/// Package path of a field or method called `name`: empty when exported,
/// the declaring package otherwise
pub(crate) fn member_pkg(name: &str, pkg: &str) -> String {
    if is_exported(name) {
        String::new()
    } else {
        pkg.to_string()
    }
}

/// A method in a type's method set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub pkg_path: String,
    pub index: usize,
}

/// The capability interface shared by every descriptor.
///
/// Shape accessors (`elem`, `key`, `len`, `num_field`, `field*`) fail with
/// [`Error::NotApplicable`](crate::Error::NotApplicable) when the kind does
/// not have that shape. Layout, comparison and method-set queries fail with
/// [`Error::Unsupported`](crate::Error::Unsupported) where the origin cannot
/// answer them.
pub trait Type: fmt::Debug + fmt::Display + Send + Sync {
    /// The specific kind of this type
    fn kind(&self) -> Kind;

    /// The type's name within its namespace, empty for unnamed types
    fn name(&self) -> &str;

    /// `namespace/Name`, empty for unnamed and built-in types
    fn pkg_path(&self) -> String;

    fn identity(&self) -> Identity;

    fn origin(&self) -> Origin;

    /// Bytes needed to store a value of this type
    fn size(&self) -> Result<usize>;

    /// Alignment in bytes of a value of this type
    fn align(&self) -> Result<usize>;

    /// Alignment in bytes of this type when used as a struct field
    fn field_align(&self) -> Result<usize>;

    /// Size in bits of a numeric type
    fn bits(&self) -> Result<usize>;

    fn comparable(&self) -> Result<bool>;

    fn assignable_to(&self, u: &dyn Type) -> Result<bool>;

    fn convertible_to(&self, u: &dyn Type) -> Result<bool>;

    /// Whether this type implements the interface type `u`
    fn implements(&self, u: &dyn Type) -> Result<bool>;

    fn num_method(&self) -> Result<usize>;

    fn method(&self, i: usize) -> Result<Method>;

    fn method_by_name(&self, name: &str) -> Result<Option<Method>>;

    /// Element type of a pointer, array, slice or map
    fn elem(&self) -> Result<TypeRef>;

    /// Key type of a map
    fn key(&self) -> Result<TypeRef>;

    /// Length of an array
    fn len(&self) -> Result<usize>;

    fn num_field(&self) -> Result<usize>;

    /// Parameter count of a function type. No kind models functions, so
    /// this never applies.
    fn num_in(&self) -> Result<usize> {
        Err(Error::NotApplicable { method: "num_in", kind: self.kind() })
    }

    /// Result count of a function type; never applies, like [`Type::num_in`]
    fn num_out(&self) -> Result<usize> {
        Err(Error::NotApplicable { method: "num_out", kind: self.kind() })
    }

    /// The `i`th field of a struct, in declaration order
    fn field(&self, i: usize) -> Result<StructField>;

    /// The nested field reached by following `index`, stepping through
    /// pointers to embedded structs
    fn field_by_index(&self, index: &[usize]) -> Result<StructField> {
        lookup::field_by_index(self, index)
    }

    /// The field called `name`, including fields promoted from embedded
    /// structs. `Ok(None)` when there is no such field or it is ambiguous.
    fn field_by_name(&self, name: &str) -> Result<Option<StructField>> {
        self.field_by_name_func(&|candidate| candidate == name)
    }

    /// Like [`Type::field_by_name`] with a predicate over field names
    fn field_by_name_func(&self, matches: &dyn Fn(&str) -> bool) -> Result<Option<StructField>> {
        lookup::field_by_name_func(self, matches)
    }
}

impl<'a> PartialEq for dyn Type + 'a {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl<'a> Eq for dyn Type + 'a {}
