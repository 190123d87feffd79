//! Token definitions for Go declaration syntax

use std::fmt;

use crate::utils::Span;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn eof(span: Span) -> Self {
        Self { kind: TokenKind::Eof, span }
    }
}

/// Token kinds
///
/// Literals keep their source text verbatim, quotes and prefixes included.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ============ Keywords ============
    /// package
    Package,
    /// import
    Import,
    /// type
    Type,
    /// struct
    Struct,
    /// interface
    Interface,
    /// map
    Map,
    /// chan
    Chan,
    /// func
    Func,
    /// var
    Var,
    /// const
    Const,

    // ============ Identifiers and Literals ============
    /// Identifier (type name, field name, package name, ...)
    Ident(String),
    /// Integer literal (`42`, `0x2A`, `0o52`, `052`, `0b101010`, `4_2`)
    Int(String),
    /// Floating-point literal
    Float(String),
    /// Imaginary literal (`2i`)
    Imag(String),
    /// Rune literal (`'a'`)
    Char(String),
    /// Interpreted (`"..."`) or raw (`` `...` ``) string literal
    String(String),

    // ============ Operators ============
    /// *
    Star,
    /// .
    Dot,
    /// ...
    Ellipsis,
    /// =
    Assign,
    /// <-
    Arrow,
    /// ~
    Tilde,
    /// |
    Pipe,
    /// Any other operator; only ever skipped
    Operator(&'static str),

    // ============ Delimiters ============
    /// (
    LParen,
    /// )
    RParen,
    /// {
    LBrace,
    /// }
    RBrace,
    /// [
    LBracket,
    /// ]
    RBracket,
    /// ,
    Comma,
    /// :
    Colon,
    /// `;`, explicit or inserted at a line break
    Semicolon,

    // ============ Special ============
    /// End of file
    Eof,
}

impl TokenKind {
    /// Try to convert an identifier to a keyword
    ///
    /// Only the keywords that can start or shape a declaration are
    /// distinguished; the rest only occur inside function bodies, which the
    /// parser skips, and lex as identifiers.
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "package" => Some(TokenKind::Package),
            "import" => Some(TokenKind::Import),
            "type" => Some(TokenKind::Type),
            "struct" => Some(TokenKind::Struct),
            "interface" => Some(TokenKind::Interface),
            "map" => Some(TokenKind::Map),
            "chan" => Some(TokenKind::Chan),
            "func" => Some(TokenKind::Func),
            "var" => Some(TokenKind::Var),
            "const" => Some(TokenKind::Const),
            _ => None,
        }
    }

    /// The token as it appears in source
    pub fn lexeme(&self) -> String {
        match self {
            TokenKind::Ident(text)
            | TokenKind::Int(text)
            | TokenKind::Float(text)
            | TokenKind::Imag(text)
            | TokenKind::Char(text)
            | TokenKind::String(text) => text.clone(),
            TokenKind::Operator(op) => (*op).to_string(),
            TokenKind::Eof => String::new(),
            other => other.to_string().trim_matches('\'').to_string(),
        }
    }

    /// Whether a line break after this token terminates the statement
    pub fn ends_line(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Imag(_)
                | TokenKind::Char(_)
                | TokenKind::String(_)
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::Operator("++")
                | TokenKind::Operator("--")
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Package => f.write_str("package"),
            TokenKind::Import => f.write_str("import"),
            TokenKind::Type => f.write_str("type"),
            TokenKind::Struct => f.write_str("struct"),
            TokenKind::Interface => f.write_str("interface"),
            TokenKind::Map => f.write_str("map"),
            TokenKind::Chan => f.write_str("chan"),
            TokenKind::Func => f.write_str("func"),
            TokenKind::Var => f.write_str("var"),
            TokenKind::Const => f.write_str("const"),
            TokenKind::Ident(name) => write!(f, "identifier {}", name),
            TokenKind::Int(text)
            | TokenKind::Float(text)
            | TokenKind::Imag(text)
            | TokenKind::Char(text)
            | TokenKind::String(text) => write!(f, "literal {}", text),
            TokenKind::Star => f.write_str("'*'"),
            TokenKind::Dot => f.write_str("'.'"),
            TokenKind::Ellipsis => f.write_str("'...'"),
            TokenKind::Assign => f.write_str("'='"),
            TokenKind::Arrow => f.write_str("'<-'"),
            TokenKind::Tilde => f.write_str("'~'"),
            TokenKind::Pipe => f.write_str("'|'"),
            TokenKind::Operator(op) => write!(f, "'{}'", op),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::LBrace => f.write_str("'{'"),
            TokenKind::RBrace => f.write_str("'}'"),
            TokenKind::LBracket => f.write_str("'['"),
            TokenKind::RBracket => f.write_str("']'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::Semicolon => f.write_str("';'"),
            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}
