//! The finished type graph and handles into it

use std::collections::{btree_map, BTreeMap};
use std::fmt;
use std::sync::Arc;

use crate::live::LiveType;
use crate::utils::{Error, Result};

use super::{
    Descriptor, Identity, Kind, Method, NodeId, Origin, Resolved, Shape, StructField, Type,
    TypeRef,
};

/// Every descriptor built from one declaration unit.
///
/// Nodes refer to each other by [`NodeId`], so recursive declarations need no
/// shared mutable ownership. A graph is immutable once built.
#[derive(Debug)]
pub struct TypeGraph {
    package: String,
    nodes: Vec<Descriptor>,
    named: BTreeMap<String, NodeId>,
    unnamed: Vec<NodeId>,
}

impl TypeGraph {
    pub(crate) fn new(
        package: String,
        nodes: Vec<Descriptor>,
        named: BTreeMap<String, NodeId>,
        unnamed: Vec<NodeId>,
    ) -> Self {
        Self { package, nodes, named, unnamed }
    }

    /// Namespace of the declaring unit
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn descriptor(&self, id: NodeId) -> Option<&Descriptor> {
        self.nodes.get(id.0)
    }

    /// Id of a declared type
    pub fn named(&self, name: &str) -> Option<NodeId> {
        self.named.get(name).copied()
    }

    /// Declared types in name order
    pub fn named_ids(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.named.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Anonymous types, in the order they were materialized
    pub fn unnamed(&self) -> &[NodeId] {
        &self.unnamed
    }

    pub fn handle(self: &Arc<Self>, id: NodeId) -> Option<StaticType> {
        (id.0 < self.nodes.len()).then(|| StaticType { graph: Arc::clone(self), id })
    }

    pub fn lookup(self: &Arc<Self>, name: &str) -> Option<StaticType> {
        self.named(name).and_then(|id| self.handle(id))
    }
}

/// What an alias chain finally points at
enum Underlying<'a> {
    Shape(&'a Shape),
    Primitive(&'a LiveType),
}

/// A statically-derived type: a node of a [`TypeGraph`]
#[derive(Clone)]
pub struct StaticType {
    graph: Arc<TypeGraph>,
    id: NodeId,
}

impl StaticType {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn graph(&self) -> &Arc<TypeGraph> {
        &self.graph
    }

    fn desc(&self) -> &Descriptor {
        &self.graph.nodes[self.id.0]
    }

    fn wrap(&self, resolved: &Resolved) -> TypeRef {
        match resolved {
            Resolved::Node(id) => Arc::new(StaticType { graph: Arc::clone(&self.graph), id: *id }),
            Resolved::Primitive(live) => Arc::new(live.clone()),
        }
    }

    /// Follows alias targets. Built graphs never contain alias cycles; the
    /// walk is still bounded by the node count.
    fn underlying(&self) -> Underlying<'_> {
        let mut shape = &self.desc().shape;
        for _ in 0..self.graph.nodes.len() {
            match shape {
                Shape::Alias { target: Resolved::Node(id) } => shape = &self.graph.nodes[id.0].shape,
                Shape::Alias { target: Resolved::Primitive(live) } => {
                    return Underlying::Primitive(live)
                }
                _ => break,
            }
        }
        Underlying::Shape(shape)
    }

    fn not_applicable(&self, method: &'static str) -> Error {
        Error::NotApplicable { method, kind: self.kind() }
    }

    fn render_resolved(&self, resolved: &Resolved, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match resolved {
            Resolved::Node(id) => fmt::Display::fmt(&StaticType { graph: Arc::clone(&self.graph), id: *id }, f),
            Resolved::Primitive(live) => fmt::Display::fmt(live, f),
        }
    }
}

fn unsupported<T>(method: &'static str) -> Result<T> {
    Err(Error::Unsupported { method, origin: Origin::Static })
}

impl Type for StaticType {
    fn kind(&self) -> Kind {
        match self.underlying() {
            Underlying::Shape(shape) => shape.kind().unwrap_or(Kind::Interface),
            Underlying::Primitive(live) => live.kind(),
        }
    }

    fn name(&self) -> &str {
        &self.desc().name
    }

    fn pkg_path(&self) -> String {
        let desc = self.desc();
        if desc.is_named() {
            format!("{}/{}", desc.pkg, desc.name)
        } else {
            String::new()
        }
    }

    fn identity(&self) -> Identity {
        Identity::Static { graph: Arc::as_ptr(&self.graph) as usize, node: self.id }
    }

    fn origin(&self) -> Origin {
        Origin::Static
    }

    fn size(&self) -> Result<usize> {
        unsupported("size")
    }

    fn align(&self) -> Result<usize> {
        unsupported("align")
    }

    fn field_align(&self) -> Result<usize> {
        unsupported("field_align")
    }

    fn bits(&self) -> Result<usize> {
        unsupported("bits")
    }

    fn comparable(&self) -> Result<bool> {
        unsupported("comparable")
    }

    fn assignable_to(&self, _u: &dyn Type) -> Result<bool> {
        unsupported("assignable_to")
    }

    fn convertible_to(&self, _u: &dyn Type) -> Result<bool> {
        unsupported("convertible_to")
    }

    fn implements(&self, _u: &dyn Type) -> Result<bool> {
        unsupported("implements")
    }

    fn num_method(&self) -> Result<usize> {
        unsupported("num_method")
    }

    fn method(&self, _i: usize) -> Result<Method> {
        unsupported("method")
    }

    fn method_by_name(&self, _name: &str) -> Result<Option<Method>> {
        unsupported("method_by_name")
    }

    fn elem(&self) -> Result<TypeRef> {
        match self.underlying() {
            Underlying::Shape(
                Shape::Pointer { elem }
                | Shape::Array { elem, .. }
                | Shape::Slice { elem }
                | Shape::Map { elem, .. },
            ) => Ok(self.wrap(elem)),
            Underlying::Primitive(live) => live.elem(),
            Underlying::Shape(_) => Err(self.not_applicable("elem")),
        }
    }

    fn key(&self) -> Result<TypeRef> {
        match self.underlying() {
            Underlying::Shape(Shape::Map { key, .. }) => Ok(self.wrap(key)),
            Underlying::Primitive(live) => live.key(),
            Underlying::Shape(_) => Err(self.not_applicable("key")),
        }
    }

    fn len(&self) -> Result<usize> {
        match self.underlying() {
            Underlying::Shape(Shape::Array { len, .. }) => Ok(*len),
            Underlying::Primitive(live) => live.len(),
            Underlying::Shape(_) => Err(self.not_applicable("len")),
        }
    }

    fn num_field(&self) -> Result<usize> {
        match self.underlying() {
            Underlying::Shape(Shape::Struct { fields }) => Ok(fields.len()),
            Underlying::Primitive(live) => live.num_field(),
            Underlying::Shape(_) => Err(self.not_applicable("num_field")),
        }
    }

    fn field(&self, i: usize) -> Result<StructField> {
        match self.underlying() {
            Underlying::Shape(Shape::Struct { fields }) => {
                let field = fields
                    .get(i)
                    .ok_or(Error::IndexOutOfRange { index: i, count: fields.len() })?;
                Ok(StructField {
                    name: field.name.clone(),
                    pkg_path: field.pkg_path.clone(),
                    ty: self.wrap(&field.ty),
                    tag: field.tag.clone(),
                    offset: None,
                    index: vec![i],
                    anonymous: field.anonymous,
                })
            }
            Underlying::Primitive(live) => live.field(i),
            Underlying::Shape(_) => Err(self.not_applicable("field")),
        }
    }
}

impl fmt::Display for StaticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let desc = self.desc();
        if desc.is_named() {
            return write!(f, "{}.{}", desc.pkg, desc.name);
        }
        match &desc.shape {
            Shape::Alias { target } => self.render_resolved(target, f),
            Shape::Pointer { elem } => {
                f.write_str("*")?;
                self.render_resolved(elem, f)
            }
            Shape::Array { elem, len } => {
                write!(f, "[{}]", len)?;
                self.render_resolved(elem, f)
            }
            Shape::Slice { elem } => {
                f.write_str("[]")?;
                self.render_resolved(elem, f)
            }
            Shape::Map { key, elem } => {
                f.write_str("map[")?;
                self.render_resolved(key, f)?;
                f.write_str("]")?;
                self.render_resolved(elem, f)
            }
            Shape::Struct { fields } if fields.is_empty() => f.write_str("struct {}"),
            Shape::Struct { fields } => {
                f.write_str("struct {")?;
                for (i, field) in fields.iter().enumerate() {
                    f.write_str(if i == 0 { " " } else { "; " })?;
                    if !field.anonymous {
                        write!(f, "{} ", field.name)?;
                    }
                    self.render_resolved(&field.ty, f)?;
                    if !field.tag.is_empty() {
                        write!(f, " {}", field.tag)?;
                    }
                }
                f.write_str(" }")
            }
            Shape::Interface => f.write_str("interface {}"),
        }
    }
}

impl fmt::Debug for StaticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticType")
            .field("id", &self.id)
            .field("name", &self.desc().name)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Declared type name to descriptor, the result of loading one unit
#[derive(Debug, Clone)]
pub struct TypeMap {
    graph: Arc<TypeGraph>,
    types: BTreeMap<String, TypeRef>,
}

impl TypeMap {
    pub fn new(graph: Arc<TypeGraph>) -> Self {
        let types = graph
            .named
            .iter()
            .map(|(name, id)| {
                let ty: TypeRef = Arc::new(StaticType { graph: Arc::clone(&graph), id: *id });
                (name.clone(), ty)
            })
            .collect();
        Self { graph, types }
    }

    pub fn get(&self, name: &str) -> Option<&TypeRef> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, TypeRef> {
        self.types.iter()
    }

    pub fn graph(&self) -> &Arc<TypeGraph> {
        &self.graph
    }
}

impl<'a> IntoIterator for &'a TypeMap {
    type Item = (&'a String, &'a TypeRef);
    type IntoIter = btree_map::Iter<'a, String, TypeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldDesc, StructTag};
    use pretty_assertions::assert_eq;

    fn int() -> Resolved {
        Resolved::Primitive(LiveType::of_type::<isize>())
    }

    fn field(name: &str, ty: Resolved, tag: &str) -> FieldDesc {
        FieldDesc {
            name: name.to_string(),
            pkg_path: String::new(),
            ty,
            tag: StructTag::new(tag),
            anonymous: false,
        }
    }

    /// type Node struct { Value int; Next *Node }; type Count int;
    /// type Grid [2][]Node
    fn sample() -> Arc<TypeGraph> {
        let nodes = vec![
            Descriptor {
                name: "Node".to_string(),
                pkg: "demo".to_string(),
                shape: Shape::Struct {
                    fields: vec![
                        field("Value", int(), "`json:\"value\"`"),
                        field("Next", Resolved::Node(NodeId(1)), ""),
                    ],
                },
            },
            Descriptor {
                name: String::new(),
                pkg: "demo".to_string(),
                shape: Shape::Pointer { elem: Resolved::Node(NodeId(0)) },
            },
            Descriptor {
                name: "Count".to_string(),
                pkg: "demo".to_string(),
                shape: Shape::Alias { target: int() },
            },
            Descriptor {
                name: String::new(),
                pkg: "demo".to_string(),
                shape: Shape::Slice { elem: Resolved::Node(NodeId(0)) },
            },
            Descriptor {
                name: "Grid".to_string(),
                pkg: "demo".to_string(),
                shape: Shape::Array { elem: Resolved::Node(NodeId(3)), len: 2 },
            },
        ];
        let named = [("Node", 0), ("Count", 2), ("Grid", 4)]
            .into_iter()
            .map(|(name, id)| (name.to_string(), NodeId(id)))
            .collect();
        Arc::new(TypeGraph::new("demo".to_string(), nodes, named, vec![NodeId(1), NodeId(3)]))
    }

    #[test]
    fn test_self_reference_shares_identity() {
        let graph = sample();
        let node = graph.lookup("Node").unwrap();
        let next = node.field(1).unwrap();
        assert_eq!(next.ty.kind(), Kind::Ptr);
        let target = next.ty.elem().unwrap();
        assert_eq!(target.identity(), node.identity());
        assert_eq!(node.pkg_path(), "demo/Node");
    }

    #[test]
    fn test_rendering() {
        let graph = sample();
        assert_eq!(graph.lookup("Node").unwrap().to_string(), "demo.Node");
        assert_eq!(graph.handle(NodeId(1)).unwrap().to_string(), "*demo.Node");
        assert_eq!(graph.handle(NodeId(3)).unwrap().to_string(), "[]demo.Node");

        let anon = Arc::new(TypeGraph::new(
            "demo".to_string(),
            vec![Descriptor {
                name: String::new(),
                pkg: "demo".to_string(),
                shape: Shape::Struct {
                    fields: vec![field("A", int(), ""), field("B", int(), "`x:\"1\"`")],
                },
            }],
            BTreeMap::new(),
            vec![NodeId(0)],
        ));
        assert_eq!(anon.handle(NodeId(0)).unwrap().to_string(), "struct { A int; B int `x:\"1\"` }");
    }

    #[test]
    fn test_alias_delegates_kind() {
        let graph = sample();
        let count = graph.lookup("Count").unwrap();
        assert_eq!(count.kind(), Kind::Int);
        assert_eq!(count.name(), "Count");
        assert_eq!(count.to_string(), "demo.Count");
        assert!(matches!(count.elem(), Err(Error::NotApplicable { method: "elem", kind: Kind::Int })));
    }

    #[test]
    fn test_static_capability_errors() {
        let graph = sample();
        let grid = graph.lookup("Grid").unwrap();
        assert_eq!(grid.len().unwrap(), 2);
        assert_eq!(grid.elem().unwrap().kind(), Kind::Slice);
        assert!(matches!(grid.size(), Err(Error::Unsupported { method: "size", origin: Origin::Static })));
        assert!(matches!(grid.key(), Err(Error::NotApplicable { method: "key", kind: Kind::Array })));
        assert!(matches!(grid.num_in(), Err(Error::NotApplicable { method: "num_in", kind: Kind::Array })));
        assert!(matches!(grid.num_out(), Err(Error::NotApplicable { method: "num_out", kind: Kind::Array })));

        let node = graph.lookup("Node").unwrap();
        assert!(matches!(node.field(2), Err(Error::IndexOutOfRange { index: 2, count: 2 })));
        let value = node.field(0).unwrap();
        assert_eq!(value.tag.as_str(), "`json:\"value\"`");
        assert_eq!(value.offset, None);
    }

    #[test]
    fn test_type_map() {
        let map = TypeMap::new(sample());
        assert_eq!(map.len(), 3);
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["Count", "Grid", "Node"]);
        assert!(map.contains("Node"));
        assert!(map.get("Missing").is_none());
        assert_eq!((&map).into_iter().count(), 3);
    }
}
