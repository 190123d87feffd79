//! Declaration tree for one Go source unit
//!
//! Only what the type builder consumes is modeled in detail. Function
//! signatures, method signatures and non-type declarations are recorded by
//! span only.

use crate::utils::Span;

/// A parsed source unit
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Name from the `package` clause; the namespace of every declared type
    pub package: Ident,
    pub decls: Vec<Decl>,
}

impl SourceFile {
    /// All type specs in declaration order
    pub fn type_specs(&self) -> impl Iterator<Item = &TypeSpec> {
        self.decls.iter().flat_map(|decl| match decl {
            Decl::Type(group) => group.specs.as_slice(),
            Decl::Other { .. } => &[][..],
        })
    }
}

/// Top-level declarations
#[derive(Debug, Clone)]
pub enum Decl {
    /// `type T ...` or `type ( ... )`
    Type(TypeDecl),
    /// `import`, `func`, `var` or `const`, skipped by the parser
    Other { keyword: &'static str, span: Span },
}

/// A `type` declaration, possibly grouped
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub specs: Vec<TypeSpec>,
    pub span: Span,
}

/// One `Name Type` or `Name = Type` binding
#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub name: Ident,
    /// Declared with `=`
    pub alias: bool,
    pub ty: TypeExpr,
    pub span: Span,
}

/// An identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self { name: name.into(), span }
    }

    /// The blank identifier `_`
    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

/// Type expressions
#[derive(Debug, Clone)]
pub enum TypeExpr {
    /// `T`
    Ident(Ident),
    /// `pkg.T`
    Qualified { package: Ident, name: Ident },
    /// `(T)`
    Paren(Box<TypeExpr>, Span),
    /// `*T`
    Pointer(Box<TypeExpr>, Span),
    /// `[N]T`
    Array {
        len: ArrayLen,
        elem: Box<TypeExpr>,
        span: Span,
    },
    /// `[]T`
    Slice(Box<TypeExpr>, Span),
    /// `map[K]V`
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
        span: Span,
    },
    /// `chan T`, `chan<- T`, `<-chan T`
    Chan {
        dir: ChanDir,
        elem: Box<TypeExpr>,
        span: Span,
    },
    /// `func(...) ...`; the signature is skipped
    Func(Span),
    /// `struct { ... }`
    Struct(StructType),
    /// `interface { ... }`
    Interface(InterfaceType),
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Ident(ident) => ident.span,
            TypeExpr::Qualified { package, name } => package.span.merge(&name.span),
            TypeExpr::Paren(_, span)
            | TypeExpr::Pointer(_, span)
            | TypeExpr::Slice(_, span)
            | TypeExpr::Func(span) => *span,
            TypeExpr::Array { span, .. }
            | TypeExpr::Map { span, .. }
            | TypeExpr::Chan { span, .. } => *span,
            TypeExpr::Struct(st) => st.span,
            TypeExpr::Interface(it) => it.span,
        }
    }

    /// Short description of the expression's shape, for diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            TypeExpr::Ident(_) => "identifier",
            TypeExpr::Qualified { .. } => "qualified identifier",
            TypeExpr::Paren(..) => "parenthesized type",
            TypeExpr::Pointer(..) => "pointer type",
            TypeExpr::Array { .. } => "array type",
            TypeExpr::Slice(..) => "slice type",
            TypeExpr::Map { .. } => "map type",
            TypeExpr::Chan { .. } => "channel type",
            TypeExpr::Func(_) => "function type",
            TypeExpr::Struct(_) => "struct type",
            TypeExpr::Interface(_) => "interface type",
        }
    }
}

/// Length of an array type, as written
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayLen {
    /// A single literal token
    Literal { kind: LitKind, text: String, span: Span },
    /// `[...]T`
    Ellipsis(Span),
    /// Anything else; `text` is the expression's tokens joined by spaces
    Expr { text: String, span: Span },
}

/// Literal token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

/// Channel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// `struct { ... }`
#[derive(Debug, Clone)]
pub struct StructType {
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

/// One line of a struct body
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Empty for an embedded field
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub tag: Option<Tag>,
    pub span: Span,
}

impl FieldDecl {
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

/// A field tag, kept exactly as written including its quotes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub text: String,
    pub span: Span,
}

/// `interface { ... }`
#[derive(Debug, Clone)]
pub struct InterfaceType {
    pub elems: Vec<InterfaceElem>,
    pub span: Span,
}

/// One line of an interface body
#[derive(Debug, Clone)]
pub enum InterfaceElem {
    /// A method; its signature is skipped
    Method(Ident),
    /// An embedded interface or a type-set union such as `~int | string`
    Embedded(Vec<TypeTerm>),
}

#[derive(Debug, Clone)]
pub struct TypeTerm {
    pub tilde: bool,
    pub ty: TypeExpr,
}
