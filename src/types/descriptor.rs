//! Finished descriptors stored in a [`TypeGraph`](super::TypeGraph)

use std::fmt;

use crate::live::LiveType;

use super::{Kind, StructTag};

/// Index of a descriptor within its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a type reference inside a descriptor points at
#[derive(Debug, Clone)]
pub enum Resolved {
    /// Another descriptor of the same graph
    Node(NodeId),
    /// A built-in from the primitive registry
    Primitive(LiveType),
}

/// A statically-derived type: its declared name (empty if unnamed) and shape
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub name: String,
    /// Namespace of the declaring unit
    pub pkg: String,
    pub shape: Shape,
}

impl Descriptor {
    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Variant-specific contents of a descriptor
#[derive(Debug, Clone)]
pub enum Shape {
    /// `type New Existing`; kind and shape come from the target
    Alias { target: Resolved },
    Pointer { elem: Resolved },
    Array { elem: Resolved, len: usize },
    Slice { elem: Resolved },
    Map { key: Resolved, elem: Resolved },
    Struct { fields: Vec<FieldDesc> },
    /// Method sets are not extracted
    Interface,
}

impl Shape {
    /// Kind of this shape; `None` for an alias, whose kind is its target's
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Shape::Alias { .. } => None,
            Shape::Pointer { .. } => Some(Kind::Ptr),
            Shape::Array { .. } => Some(Kind::Array),
            Shape::Slice { .. } => Some(Kind::Slice),
            Shape::Map { .. } => Some(Kind::Map),
            Shape::Struct { .. } => Some(Kind::Struct),
            Shape::Interface => Some(Kind::Interface),
        }
    }

    /// Types this shape holds by value, without pointer, slice or map indirection
    pub fn value_edges(&self) -> Vec<&Resolved> {
        match self {
            Shape::Alias { target } => vec![target],
            Shape::Array { elem, .. } => vec![elem],
            Shape::Struct { fields } => fields.iter().map(|f| &f.ty).collect(),
            Shape::Pointer { .. } | Shape::Slice { .. } | Shape::Map { .. } | Shape::Interface => {
                Vec::new()
            }
        }
    }
}

/// A struct field as declared
#[derive(Debug, Clone)]
pub struct FieldDesc {
    pub name: String,
    /// Namespace for unexported names, empty otherwise
    pub pkg_path: String,
    pub ty: Resolved,
    pub tag: StructTag,
    pub anonymous: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_edges_skip_indirection() {
        let ptr = Shape::Pointer { elem: Resolved::Node(NodeId(0)) };
        assert!(ptr.value_edges().is_empty());

        let arr = Shape::Array { elem: Resolved::Node(NodeId(1)), len: 2 };
        assert_eq!(arr.value_edges().len(), 1);
        assert_eq!(arr.kind(), Some(Kind::Array));

        let alias = Shape::Alias { target: Resolved::Node(NodeId(2)) };
        assert_eq!(alias.kind(), None);
    }
}
