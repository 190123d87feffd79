//! Two-phase type resolution
//!
//! Phase 1 ([`Builder::register`]) creates a skeleton for every declared name,
//! so that any declaration may refer to any other regardless of order.
//! Phase 2 ([`Builder::build`]) populates each skeleton by resolving its
//! syntax against the complete symbol table. Anonymous type expressions met
//! along the way are built on the spot.

mod cycle;
mod skeleton;

pub use skeleton::{make_skeleton, Skeleton, Syntax};

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use log::{debug, trace};

use crate::frontend::ast::{ArrayLen, Ident, LitKind, SourceFile, TypeExpr};
use crate::types::{member_pkg, Descriptor, FieldDesc, NodeId, PrimitiveRegistry, Resolved, Shape, StructTag, TypeGraph};
use crate::utils::{Error, Result, Span};

#[derive(Debug)]
enum NodeState {
    Pending(Syntax),
    InProgress,
    Done(Shape),
}

#[derive(Debug)]
struct Node {
    name: String,
    pkg: String,
    span: Span,
    state: NodeState,
}

/// Builds the [`TypeGraph`] of one declaration unit
#[derive(Debug)]
pub struct Builder {
    package: String,
    /// Every name an identifier may resolve to
    symbols: HashMap<String, Resolved>,
    /// Declared names only
    named: BTreeMap<String, NodeId>,
    nodes: Vec<Node>,
    unnamed: Vec<NodeId>,
}

impl Builder {
    pub fn new(package: impl Into<String>, registry: Arc<PrimitiveRegistry>) -> Self {
        let symbols = registry
            .iter()
            .map(|(name, ty)| (name.to_string(), Resolved::Primitive(*ty)))
            .collect();
        Self {
            package: package.into(),
            symbols,
            named: BTreeMap::new(),
            nodes: Vec::new(),
            unnamed: Vec::new(),
        }
    }

    /// Phase 1: register a skeleton for every type declared in `file`.
    /// Declarations shadow built-ins of the same name. Blank declarations
    /// are checked for syntax and then dropped.
    pub fn register(&mut self, file: &SourceFile) -> Result<()> {
        for spec in file.type_specs() {
            let name = &spec.name.name;
            if spec.name.is_blank() {
                make_skeleton(&spec.ty, name, &self.package)?;
                trace!("skip blank declaration at {}", spec.name.span);
                continue;
            }
            if self.named.contains_key(name) {
                return Err(Error::DuplicateType { name: name.clone(), span: spec.name.span });
            }
            let skeleton = make_skeleton(&spec.ty, name, &self.package)?;
            trace!("register {} as {}", name, skeleton.syntax.describe());
            let id = self.push(skeleton);
            self.symbols.insert(name.clone(), Resolved::Node(id));
            self.named.insert(name.clone(), id);
        }
        Ok(())
    }

    /// Phase 2: populate every registered skeleton and check the result
    pub fn build(mut self) -> Result<TypeGraph> {
        let ids: Vec<NodeId> = self.named.values().copied().collect();
        for id in ids {
            self.populate(id)?;
        }
        debug!(
            "built package {}: {} named, {} anonymous",
            self.package,
            self.named.len(),
            self.unnamed.len()
        );

        let Builder { package, named, nodes, unnamed, .. } = self;
        let nodes = nodes
            .into_iter()
            .map(|node| match node.state {
                NodeState::Done(shape) => Ok(Descriptor { name: node.name, pkg: node.pkg, shape }),
                NodeState::Pending(_) | NodeState::InProgress => Err(Error::Unpopulated { name: node.name }),
            })
            .collect::<Result<Vec<_>>>()?;
        cycle::check_value_cycles(&nodes, &named)?;
        Ok(TypeGraph::new(package, nodes, named, unnamed))
    }

    fn push(&mut self, skeleton: Skeleton) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: skeleton.name,
            pkg: skeleton.pkg,
            span: skeleton.span,
            state: NodeState::Pending(skeleton.syntax),
        });
        id
    }

    fn lookup_ident(&self, ident: &Ident) -> Result<Resolved> {
        self.symbols.get(&ident.name).cloned().ok_or_else(|| Error::UnknownType {
            name: ident.name.clone(),
            span: ident.span,
        })
    }

    /// Resolve a type expression. Identifiers resolve through the symbol
    /// table; any other shape becomes a new anonymous descriptor.
    pub fn resolve(&mut self, expr: &TypeExpr) -> Result<Resolved> {
        match expr {
            TypeExpr::Paren(inner, _) => self.resolve(inner),
            TypeExpr::Ident(ident) => self.lookup_ident(ident),
            TypeExpr::Qualified { package, name } => Err(Error::QualifiedReference {
                package: package.name.clone(),
                name: name.name.clone(),
                span: expr.span(),
            }),
            _ => {
                let skeleton = make_skeleton(expr, "", &self.package)?;
                let id = self.push(skeleton);
                self.populate(id)?;
                self.unnamed.push(id);
                Ok(Resolved::Node(id))
            }
        }
    }

    fn populate(&mut self, id: NodeId) -> Result<()> {
        let syntax = match std::mem::replace(&mut self.nodes[id.0].state, NodeState::InProgress) {
            NodeState::Pending(syntax) => syntax,
            state => {
                self.nodes[id.0].state = state;
                return Ok(());
            }
        };
        trace!("populate {} {}", self.nodes[id.0].span, syntax.describe());

        let shape = match syntax {
            Syntax::Alias(ident) => Shape::Alias { target: self.lookup_ident(&ident)? },
            Syntax::Pointer(elem) => Shape::Pointer { elem: self.resolve(&elem)? },
            Syntax::Array { len, elem } => {
                let elem = self.resolve(&elem)?;
                Shape::Array { elem, len: array_len(&len)? }
            }
            Syntax::Slice(elem) => Shape::Slice { elem: self.resolve(&elem)? },
            Syntax::Map { key, value } => {
                let key = self.resolve(&key)?;
                Shape::Map { key, elem: self.resolve(&value)? }
            }
            Syntax::Struct(st) => {
                let mut fields = Vec::with_capacity(st.fields.len());
                for decl in &st.fields {
                    let ty = self.resolve(&decl.ty)?;
                    let tag = decl
                        .tag
                        .as_ref()
                        .map(|tag| StructTag::new(tag.text.clone()))
                        .unwrap_or_default();
                    if decl.is_embedded() {
                        let name = self.embedded_name(&ty);
                        fields.push(FieldDesc {
                            pkg_path: member_pkg(&name, &self.package),
                            name,
                            ty,
                            tag,
                            anonymous: true,
                        });
                        continue;
                    }
                    for ident in &decl.names {
                        fields.push(FieldDesc {
                            name: ident.name.clone(),
                            pkg_path: member_pkg(&ident.name, &self.package),
                            ty: ty.clone(),
                            tag: tag.clone(),
                            anonymous: false,
                        });
                    }
                }
                Shape::Struct { fields }
            }
            Syntax::Interface(_) => Shape::Interface,
        };

        self.nodes[id.0].state = NodeState::Done(shape);
        Ok(())
    }

    /// Name of an embedded field: the embedded type's name, seen through
    /// one level of pointer
    fn embedded_name(&self, ty: &Resolved) -> String {
        match ty {
            Resolved::Primitive(live) => live.rtype().name().to_string(),
            Resolved::Node(id) => {
                let node = &self.nodes[id.0];
                match &node.state {
                    NodeState::Done(Shape::Pointer { elem }) if node.name.is_empty() => match elem {
                        Resolved::Primitive(live) => live.rtype().name().to_string(),
                        Resolved::Node(elem) => self.nodes[elem.0].name.clone(),
                    },
                    _ => node.name.clone(),
                }
            }
        }
    }
}

/// Length of an array type; only integer literals are accepted
fn array_len(len: &ArrayLen) -> Result<usize> {
    match len {
        ArrayLen::Literal { kind: LitKind::Int, text, span } => {
            parse_int_literal(text).ok_or_else(|| Error::InvalidArrayLength {
                literal: text.clone(),
                span: *span,
            })
        }
        ArrayLen::Literal { text, span, .. } | ArrayLen::Expr { text, span } => {
            Err(Error::UnsupportedArrayLength { found: text.clone(), span: *span })
        }
        ArrayLen::Ellipsis(span) => Err(Error::UnsupportedArrayLength { found: "...".to_string(), span: *span }),
    }
}

fn parse_int_literal(text: &str) -> Option<usize> {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };
    if body.is_empty() {
        return None;
    }
    usize::from_str_radix(body, radix).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Parser;
    use crate::types::{Kind, Type, TypeMap};
    use crate::ErrorClass;
    use pretty_assertions::assert_eq;

    fn build(src: &str) -> Result<TypeMap> {
        let file = Parser::new(src)?.parse_file()?;
        let mut builder = Builder::new(file.package.name.clone(), PrimitiveRegistry::shared());
        builder.register(&file)?;
        Ok(TypeMap::new(Arc::new(builder.build()?)))
    }

    fn summary(types: &TypeMap) -> Vec<(String, String, Kind)> {
        types
            .iter()
            .map(|(name, ty)| (name.clone(), ty.to_string(), ty.kind()))
            .collect()
    }

    #[test]
    fn test_declaration_order_is_irrelevant() {
        let forward = build("package p\ntype A *B\ntype B struct { Next A; C []B }\n").unwrap();
        let backward = build("package p\ntype B struct { Next A; C []B }\ntype A *B\n").unwrap();
        assert_eq!(summary(&forward), summary(&backward));
        let field = forward.get("B").unwrap().field(1).unwrap();
        assert_eq!(field.ty.to_string(), "[]p.B");
    }

    #[test]
    fn test_self_reference_through_pointer() {
        let types = build("package p\ntype Node struct { Value int; Next *Node }").unwrap();
        let node = types.get("Node").unwrap();
        let next = node.field(1).unwrap();
        assert_eq!(next.name, "Next");
        assert_eq!(next.ty.kind(), Kind::Ptr);
        assert_eq!(next.ty.elem().unwrap().identity(), node.identity());
        assert_eq!(node.field(0).unwrap().ty.kind(), Kind::Int);
    }

    #[test]
    fn test_array_lengths() {
        let types = build(
            "package p\ntype (\nArr [3]int\nHex [0x10]byte\nOct [0o17]byte\nOld [017]byte\nBin [0b101]byte\nBig [1_000]byte\n)",
        )
        .unwrap();
        let arr = types.get("Arr").unwrap();
        assert_eq!(arr.kind(), Kind::Array);
        assert_eq!(arr.len().unwrap(), 3);
        assert_eq!(arr.elem().unwrap().kind(), Kind::Int);
        assert_eq!(types.get("Hex").unwrap().len().unwrap(), 16);
        assert_eq!(types.get("Oct").unwrap().len().unwrap(), 15);
        assert_eq!(types.get("Old").unwrap().len().unwrap(), 15);
        assert_eq!(types.get("Bin").unwrap().len().unwrap(), 5);
        assert_eq!(types.get("Big").unwrap().len().unwrap(), 1000);
    }

    #[test]
    fn test_array_length_errors() {
        let err = build("package p\nconst n = 3\ntype Bad [n]int").unwrap_err();
        assert!(matches!(&err, Error::UnsupportedArrayLength { found, .. } if found == "n"));
        assert_eq!(err.class(), ErrorClass::Unresolvable);

        assert!(matches!(build("package p\ntype A [...]int"), Err(Error::UnsupportedArrayLength { .. })));
        assert!(matches!(build("package p\ntype A [2*3]int"), Err(Error::UnsupportedArrayLength { .. })));
        assert!(matches!(build("package p\ntype A [1.5]int"), Err(Error::UnsupportedArrayLength { .. })));
        assert!(matches!(
            build("package p\ntype A [99999999999999999999999]int"),
            Err(Error::InvalidArrayLength { .. })
        ));
    }

    #[test]
    fn test_unknown_and_qualified_references() {
        let err = build("package p\ntype X Unknown").unwrap_err();
        assert!(matches!(&err, Error::UnknownType { name, .. } if name == "Unknown"));

        let err = build("package p\ntype S struct { R io.Reader }").unwrap_err();
        assert!(matches!(&err, Error::QualifiedReference { package, name, .. } if package == "io" && name == "Reader"));

        let err = build("package p\ntype F func()").unwrap_err();
        assert!(matches!(err, Error::UnexpectedSyntax { found: "function type", .. }));

        let err = build("package p\ntype S struct { C chan int }").unwrap_err();
        assert!(matches!(err, Error::UnexpectedSyntax { found: "channel type", .. }));
    }

    #[test]
    fn test_embedded_fields() {
        let types = build(
            "package p\ntype Inner struct { X int }\ntype Wrapper struct { Inner }\ntype Ptr struct { *Inner; error }",
        )
        .unwrap();
        let wrapper = types.get("Wrapper").unwrap();
        let inner = wrapper.field(0).unwrap();
        assert_eq!(inner.name, "Inner");
        assert!(inner.anonymous);
        assert_eq!(inner.ty.identity(), types.get("Inner").unwrap().identity());

        let ptr = types.get("Ptr").unwrap();
        let embedded = ptr.field(0).unwrap();
        assert_eq!(embedded.name, "Inner");
        assert_eq!(embedded.ty.kind(), Kind::Ptr);
        let err = ptr.field(1).unwrap();
        assert_eq!(err.name, "error");
        assert_eq!(err.pkg_path, "p");
        assert_eq!(err.ty.kind(), Kind::Interface);
    }

    #[test]
    fn test_maps_tags_and_names() {
        let types = build(
            "package p\ntype M map[string]int\ntype S struct {\n  A, B int `json:\"a\"`\n  c string \"plain\"\n}",
        )
        .unwrap();
        let m = types.get("M").unwrap();
        assert_eq!(m.kind(), Kind::Map);
        assert_eq!(m.key().unwrap().kind(), Kind::String);
        assert_eq!(m.elem().unwrap().kind(), Kind::Int);

        let s = types.get("S").unwrap();
        assert_eq!(s.num_field().unwrap(), 3);
        let (a, b, c) = (s.field(0).unwrap(), s.field(1).unwrap(), s.field(2).unwrap());
        assert_eq!(a.tag.as_str(), "`json:\"a\"`");
        assert_eq!(b.tag.as_str(), "`json:\"a\"`");
        assert_eq!(b.index, vec![1]);
        assert_eq!(c.tag.as_str(), "\"plain\"");
        assert_eq!(a.pkg_path, "");
        assert_eq!(c.pkg_path, "p");
    }

    #[test]
    fn test_anonymous_types_are_distinct() {
        let file = Parser::new("package p\ntype S struct { A []int; B []int; C map[string]*int }")
            .unwrap()
            .parse_file()
            .unwrap();
        let mut builder = Builder::new("p", PrimitiveRegistry::shared());
        builder.register(&file).unwrap();
        let graph = Arc::new(builder.build().unwrap());
        assert_eq!(graph.unnamed().len(), 4);

        let s = graph.lookup("S").unwrap();
        let (a, b) = (s.field(0).unwrap().ty, s.field(1).unwrap().ty);
        assert_eq!(a.to_string(), b.to_string());
        assert_ne!(a.identity(), b.identity());
        assert_eq!(s.field(2).unwrap().ty.to_string(), "map[string]*int");
    }

    #[test]
    fn test_aliases_delegate_to_target() {
        let types = build("package p\ntype ID int64\ntype Ref = ID\ntype Point struct { X int }\ntype P2 Point").unwrap();
        let id = types.get("ID").unwrap();
        assert_eq!(id.kind(), Kind::Int64);
        assert_eq!(id.to_string(), "p.ID");
        assert_eq!(id.pkg_path(), "p/ID");
        assert_eq!(types.get("Ref").unwrap().kind(), Kind::Int64);

        let p2 = types.get("P2").unwrap();
        assert_eq!(p2.kind(), Kind::Struct);
        assert_eq!(p2.field(0).unwrap().name, "X");
        assert!(matches!(p2.size(), Err(Error::Unsupported { method: "size", .. })));
    }

    #[test]
    fn test_duplicates_and_shadowing() {
        let err = build("package p\ntype A int\ntype A string").unwrap_err();
        assert!(matches!(&err, Error::DuplicateType { name, .. } if name == "A"));

        let types = build("package p\ntype string struct{}\ntype Name string").unwrap();
        assert_eq!(types.get("Name").unwrap().kind(), Kind::Struct);
    }

    #[test]
    fn test_blank_declarations_are_ignored() {
        let types = build("package p\ntype _ int\ntype _ string\ntype A int").unwrap();
        assert_eq!(types.len(), 1);
        assert!(!types.contains("_"));
        assert_eq!(types.get("A").unwrap().kind(), Kind::Int);

        let err = build("package p\ntype _ int\ntype B _").unwrap_err();
        assert!(matches!(&err, Error::UnknownType { name, .. } if name == "_"));

        let err = build("package p\ntype _ func()").unwrap_err();
        assert!(matches!(err, Error::UnexpectedSyntax { found: "function type", .. }));
    }

    #[test]
    fn test_value_cycles_are_rejected() {
        let err = build("package p\ntype A struct { B B }\ntype B struct { A [2]A }").unwrap_err();
        assert_eq!(err.to_string(), "invalid recursive type A: A -> B -> A");

        let err = build("package p\ntype Self struct { Self }").unwrap_err();
        assert!(matches!(err, Error::RecursiveValueType { .. }));

        assert!(matches!(build("package p\ntype X Y\ntype Y X"), Err(Error::RecursiveValueType { .. })));

        build("package p\ntype A struct { B *B; C []A; M map[string]A }\ntype B struct { A A }").unwrap();
    }

    #[test]
    fn test_interfaces_and_empty_structs() {
        let types = build("package p\ntype Shape interface { Area() float64 }\ntype E struct{}\ntype H struct { X struct{}; Y interface{} }")
            .unwrap();
        assert_eq!(types.get("Shape").unwrap().kind(), Kind::Interface);
        assert_eq!(types.get("E").unwrap().num_field().unwrap(), 0);
        let h = types.get("H").unwrap();
        assert_eq!(h.field(0).unwrap().ty.to_string(), "struct {}");
        assert_eq!(h.field(1).unwrap().ty.to_string(), "interface {}");
        assert!(matches!(
            types.get("Shape").unwrap().num_method(),
            Err(Error::Unsupported { method: "num_method", .. })
        ));
    }

    #[test]
    fn test_parse_int_literal() {
        assert_eq!(parse_int_literal("0"), Some(0));
        assert_eq!(parse_int_literal("0X1F"), Some(31));
        assert_eq!(parse_int_literal("0x"), None);
        assert_eq!(parse_int_literal("09"), None);
    }
}
