//! Skeletons: descriptors whose variant is known but whose contents are not

use crate::frontend::ast::{ArrayLen, Ident, InterfaceType, StructType, TypeExpr};
use crate::utils::{Error, Result, Span};

/// A type whose shape has been classified but not yet resolved
#[derive(Debug, Clone)]
pub struct Skeleton {
    /// Empty for anonymous types
    pub name: String,
    pub pkg: String,
    pub span: Span,
    pub syntax: Syntax,
}

/// The syntax a skeleton keeps until it is populated
#[derive(Debug, Clone)]
pub enum Syntax {
    Alias(Ident),
    Pointer(TypeExpr),
    Array { len: ArrayLen, elem: TypeExpr },
    Slice(TypeExpr),
    Map { key: TypeExpr, value: TypeExpr },
    Struct(StructType),
    Interface(InterfaceType),
}

impl Syntax {
    pub fn describe(&self) -> &'static str {
        match self {
            Syntax::Alias(_) => "alias",
            Syntax::Pointer(_) => "pointer",
            Syntax::Array { .. } => "array",
            Syntax::Slice(_) => "slice",
            Syntax::Map { .. } => "map",
            Syntax::Struct(_) => "struct",
            Syntax::Interface(_) => "interface",
        }
    }
}

/// Classify `expr` into a skeleton named `name` in namespace `pkg`
pub fn make_skeleton(expr: &TypeExpr, name: &str, pkg: &str) -> Result<Skeleton> {
    let syntax = match expr {
        TypeExpr::Paren(inner, _) => return make_skeleton(inner, name, pkg),
        TypeExpr::Ident(ident) => Syntax::Alias(ident.clone()),
        TypeExpr::Qualified { package, name: member } => {
            return Err(Error::QualifiedReference {
                package: package.name.clone(),
                name: member.name.clone(),
                span: expr.span(),
            })
        }
        TypeExpr::Pointer(elem, _) => Syntax::Pointer((**elem).clone()),
        TypeExpr::Array { len, elem, .. } => Syntax::Array { len: len.clone(), elem: (**elem).clone() },
        TypeExpr::Slice(elem, _) => Syntax::Slice((**elem).clone()),
        TypeExpr::Map { key, value, .. } => Syntax::Map {
            key: (**key).clone(),
            value: (**value).clone(),
        },
        TypeExpr::Struct(st) => Syntax::Struct(st.clone()),
        TypeExpr::Interface(it) => Syntax::Interface(it.clone()),
        TypeExpr::Chan { .. } | TypeExpr::Func(_) => {
            return Err(Error::UnexpectedSyntax { found: expr.describe(), span: expr.span() })
        }
    };
    Ok(Skeleton {
        name: name.to_string(),
        pkg: pkg.to_string(),
        span: expr.span(),
        syntax,
    })
}
