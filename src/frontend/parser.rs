//! Parser for Go declaration syntax
//!
//! Recursive descent over the token stream. Type declarations are parsed in
//! full; every other top-level declaration is skipped by scanning to the
//! semicolon that ends it at bracket depth zero.

use crate::frontend::ast::*;
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Result, Span};

/// The parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a new parser by tokenizing `source`
    pub fn new(source: &str) -> Result<Self> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self::from_tokens(tokens))
    }

    /// Create a parser from pre-tokenized input
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let span = tokens.last().map(|t| t.span).unwrap_or_default();
            tokens.push(Token::eof(span));
        }
        Self { tokens, pos: 0 }
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> &Token {
        // from_tokens guarantees a trailing Eof, and advance never passes it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_kind(&self) -> &TokenKind {
        let next = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[next].kind
    }

    /// `[P C` or `[P,` after a type name opens a type parameter list,
    /// not an array length
    fn at_type_params(&self) -> bool {
        let nth = |n: usize| &self.tokens[(self.pos + n).min(self.tokens.len() - 1)].kind;
        matches!(nth(0), TokenKind::LBracket)
            && matches!(nth(1), TokenKind::Ident(_))
            && matches!(
                nth(2),
                TokenKind::Ident(_) | TokenKind::Comma | TokenKind::Interface | TokenKind::Tilde
            )
    }

    fn previous_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn unexpected(&self, expected: &str) -> Error {
        Error::UnexpectedToken {
            expected: expected.to_string(),
            got: self.current_kind().to_string(),
            span: self.current().span,
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&expected.to_string()))
        }
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_semicolons(&mut self) {
        while self.consume(&TokenKind::Semicolon) {}
    }

    /// A declaration or body line must end in `;` or right before `close`
    fn expect_terminator(&mut self, close: &TokenKind) -> Result<()> {
        if self.consume(&TokenKind::Semicolon) || self.check(close) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("';' or {}", close)))
        }
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                let ident = Ident::new(name.clone(), self.current().span);
                self.advance();
                Ok(ident)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Skip a bracketed group starting at the current opening token
    fn skip_balanced(&mut self) -> Result<Span> {
        let start = self.current().span;
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                }
                TokenKind::Eof => return Err(self.unexpected("closing bracket")),
                _ => {}
            }
            self.advance();
            if depth == 0 {
                return Ok(start.merge(&self.previous_span()));
            }
        }
    }

    // ==================== Parsing Methods ====================

    /// Parse a complete source unit
    pub fn parse_file(&mut self) -> Result<SourceFile> {
        self.skip_semicolons();
        if !self.consume(&TokenKind::Package) {
            return Err(Error::MissingPackageClause);
        }
        let package = self.parse_ident()?;
        self.expect_terminator(&TokenKind::Eof)?;

        let mut decls = Vec::new();
        loop {
            self.skip_semicolons();
            if self.is_at_end() {
                break;
            }
            decls.push(self.parse_decl()?);
            self.expect_terminator(&TokenKind::Eof)?;
        }

        Ok(SourceFile { package, decls })
    }

    /// Parse a top-level declaration
    fn parse_decl(&mut self) -> Result<Decl> {
        let keyword = match self.current_kind() {
            TokenKind::Type => return Ok(Decl::Type(self.parse_type_decl()?)),
            TokenKind::Import => "import",
            TokenKind::Func => "func",
            TokenKind::Var => "var",
            TokenKind::Const => "const",
            _ => return Err(self.unexpected("declaration (type, import, func, var, const)")),
        };
        let span = self.skip_decl()?;
        Ok(Decl::Other { keyword, span })
    }

    /// Skip a declaration up to its terminating semicolon
    fn skip_decl(&mut self) -> Result<Span> {
        let start = self.advance().span;
        loop {
            match self.current_kind() {
                TokenKind::Semicolon | TokenKind::Eof => break,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                    self.skip_balanced()?;
                }
                _ => {
                    self.advance();
                }
            }
        }
        Ok(start.merge(&self.previous_span()))
    }

    /// Parse `type Spec` or `type ( Spec; ... )`
    fn parse_type_decl(&mut self) -> Result<TypeDecl> {
        let start = self.expect(TokenKind::Type)?.span;
        let mut specs = Vec::new();

        if self.consume(&TokenKind::LParen) {
            loop {
                self.skip_semicolons();
                if self.check(&TokenKind::RParen) {
                    break;
                }
                specs.push(self.parse_type_spec()?);
                self.expect_terminator(&TokenKind::RParen)?;
            }
            self.expect(TokenKind::RParen)?;
        } else {
            specs.push(self.parse_type_spec()?);
        }

        Ok(TypeDecl {
            specs,
            span: start.merge(&self.previous_span()),
        })
    }

    fn parse_type_spec(&mut self) -> Result<TypeSpec> {
        let name = self.parse_ident()?;
        if self.at_type_params() {
            return Err(self.unexpected("type (type parameters are not supported)"));
        }
        let alias = self.consume(&TokenKind::Assign);
        let ty = self.parse_type()?;
        Ok(TypeSpec {
            span: name.span.merge(&ty.span()),
            name,
            alias,
            ty,
        })
    }

    /// Parse a type expression
    pub fn parse_type(&mut self) -> Result<TypeExpr> {
        let start = self.current().span;
        match self.current_kind() {
            TokenKind::Ident(_) => self.parse_type_name(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect(TokenKind::RParen)?;
                Ok(TypeExpr::Paren(Box::new(inner), start.merge(&self.previous_span())))
            }
            TokenKind::Star => {
                self.advance();
                let inner = self.parse_type()?;
                Ok(TypeExpr::Pointer(Box::new(inner), start.merge(&self.previous_span())))
            }
            TokenKind::LBracket => self.parse_array_or_slice(),
            TokenKind::Map => {
                self.advance();
                self.expect(TokenKind::LBracket)?;
                let key = self.parse_type()?;
                self.expect(TokenKind::RBracket)?;
                let value = self.parse_type()?;
                Ok(TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                    span: start.merge(&self.previous_span()),
                })
            }
            TokenKind::Chan => {
                self.advance();
                let dir = if self.consume(&TokenKind::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                self.finish_chan(dir, start)
            }
            TokenKind::Arrow => {
                self.advance();
                self.expect(TokenKind::Chan)?;
                self.finish_chan(ChanDir::Recv, start)
            }
            TokenKind::Func => {
                self.advance();
                self.skip_signature()?;
                Ok(TypeExpr::Func(start.merge(&self.previous_span())))
            }
            TokenKind::Struct => Ok(TypeExpr::Struct(self.parse_struct()?)),
            TokenKind::Interface => Ok(TypeExpr::Interface(self.parse_interface()?)),
            _ => Err(self.unexpected("type")),
        }
    }

    /// `T` or `pkg.T`
    fn parse_type_name(&mut self) -> Result<TypeExpr> {
        let first = self.parse_ident()?;
        if self.consume(&TokenKind::Dot) {
            let name = self.parse_ident()?;
            return Ok(TypeExpr::Qualified { package: first, name });
        }
        Ok(TypeExpr::Ident(first))
    }

    fn finish_chan(&mut self, dir: ChanDir, start: Span) -> Result<TypeExpr> {
        let elem = self.parse_type()?;
        Ok(TypeExpr::Chan {
            dir,
            elem: Box::new(elem),
            span: start.merge(&self.previous_span()),
        })
    }

    fn parse_array_or_slice(&mut self) -> Result<TypeExpr> {
        let start = self.expect(TokenKind::LBracket)?.span;

        if self.consume(&TokenKind::RBracket) {
            let elem = self.parse_type()?;
            return Ok(TypeExpr::Slice(Box::new(elem), start.merge(&self.previous_span())));
        }

        let len = self.parse_array_len()?;
        self.expect(TokenKind::RBracket)?;
        let elem = self.parse_type()?;
        Ok(TypeExpr::Array {
            len,
            elem: Box::new(elem),
            span: start.merge(&self.previous_span()),
        })
    }

    /// Collect the tokens of an array length up to the closing `]`
    fn parse_array_len(&mut self) -> Result<ArrayLen> {
        let start = self.current().span;
        let mut parts: Vec<Token> = Vec::new();
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::RBracket if depth == 0 => break,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                }
                TokenKind::Eof | TokenKind::Semicolon => return Err(self.unexpected("']'")),
                _ => {}
            }
            parts.push(self.advance());
        }

        let span = match parts.last() {
            Some(last) => start.merge(&last.span),
            None => return Err(self.unexpected("array length")),
        };
        let len = match parts.as_slice() {
            [single] => match &single.kind {
                TokenKind::Int(text) => ArrayLen::Literal { kind: LitKind::Int, text: text.clone(), span },
                TokenKind::Float(text) => ArrayLen::Literal { kind: LitKind::Float, text: text.clone(), span },
                TokenKind::Imag(text) => ArrayLen::Literal { kind: LitKind::Imag, text: text.clone(), span },
                TokenKind::Char(text) => ArrayLen::Literal { kind: LitKind::Char, text: text.clone(), span },
                TokenKind::String(text) => ArrayLen::Literal { kind: LitKind::String, text: text.clone(), span },
                TokenKind::Ellipsis => ArrayLen::Ellipsis(span),
                other => ArrayLen::Expr { text: other.lexeme(), span },
            },
            _ => ArrayLen::Expr {
                text: parts.iter().map(|t| t.kind.lexeme()).collect::<Vec<_>>().join(" "),
                span,
            },
        };
        Ok(len)
    }

    /// Skip `(params) result` after `func` or a method name
    fn skip_signature(&mut self) -> Result<()> {
        if !self.check(&TokenKind::LParen) {
            return Err(self.unexpected("'('"));
        }
        self.skip_balanced()?;

        match self.current_kind() {
            TokenKind::LParen => {
                self.skip_balanced()?;
            }
            TokenKind::Ident(_)
            | TokenKind::Star
            | TokenKind::LBracket
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Arrow
            | TokenKind::Func
            | TokenKind::Struct
            | TokenKind::Interface => {
                self.parse_type()?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Parse `struct { ... }`
    fn parse_struct(&mut self) -> Result<StructType> {
        let start = self.expect(TokenKind::Struct)?.span;
        self.expect(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        loop {
            self.skip_semicolons();
            if self.check(&TokenKind::RBrace) {
                break;
            }
            fields.push(self.parse_field_decl()?);
            self.expect_terminator(&TokenKind::RBrace)?;
        }
        self.expect(TokenKind::RBrace)?;

        Ok(StructType {
            fields,
            span: start.merge(&self.previous_span()),
        })
    }

    fn parse_field_decl(&mut self) -> Result<FieldDecl> {
        let start = self.current().span;

        let embedded = match (self.current_kind(), self.peek_kind()) {
            (TokenKind::Star, _) => true,
            (TokenKind::Ident(_), TokenKind::Dot)
            | (TokenKind::Ident(_), TokenKind::Semicolon)
            | (TokenKind::Ident(_), TokenKind::RBrace)
            | (TokenKind::Ident(_), TokenKind::String(_)) => true,
            (TokenKind::Ident(_), _) => false,
            _ => return Err(self.unexpected("field name or embedded type")),
        };

        let mut names = Vec::new();
        if !embedded {
            names.push(self.parse_ident()?);
            while self.consume(&TokenKind::Comma) {
                names.push(self.parse_ident()?);
            }
        }
        let ty = self.parse_type()?;

        let tag = match self.current_kind() {
            TokenKind::String(text) => {
                let tag = Tag { text: text.clone(), span: self.current().span };
                self.advance();
                Some(tag)
            }
            _ => None,
        };

        Ok(FieldDecl {
            names,
            ty,
            tag,
            span: start.merge(&self.previous_span()),
        })
    }

    /// Parse `interface { ... }`
    fn parse_interface(&mut self) -> Result<InterfaceType> {
        let start = self.expect(TokenKind::Interface)?.span;
        self.expect(TokenKind::LBrace)?;

        let mut elems = Vec::new();
        loop {
            self.skip_semicolons();
            if self.check(&TokenKind::RBrace) {
                break;
            }
            let elem = match (self.current_kind(), self.peek_kind()) {
                (TokenKind::Ident(_), TokenKind::LParen) => {
                    let name = self.parse_ident()?;
                    self.skip_signature()?;
                    InterfaceElem::Method(name)
                }
                _ => InterfaceElem::Embedded(self.parse_type_terms()?),
            };
            elems.push(elem);
            self.expect_terminator(&TokenKind::RBrace)?;
        }
        self.expect(TokenKind::RBrace)?;

        Ok(InterfaceType {
            elems,
            span: start.merge(&self.previous_span()),
        })
    }

    /// `~T | U | ...`
    fn parse_type_terms(&mut self) -> Result<Vec<TypeTerm>> {
        let mut terms = Vec::new();
        loop {
            let tilde = self.consume(&TokenKind::Tilde);
            let ty = self.parse_type()?;
            terms.push(TypeTerm { tilde, ty });
            if !self.consume(&TokenKind::Pipe) {
                return Ok(terms);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Result<SourceFile> {
        Parser::new(source)?.parse_file()
    }

    fn only_spec(file: &SourceFile) -> &TypeSpec {
        let specs: Vec<_> = file.type_specs().collect();
        assert_eq!(specs.len(), 1);
        specs[0]
    }

    #[test]
    fn test_package_clause() {
        let file = parse("package shapes\n").unwrap();
        assert_eq!(file.package.name, "shapes");
        assert!(file.decls.is_empty());
    }

    #[test]
    fn test_missing_package_clause() {
        assert_eq!(parse("type T int").unwrap_err(), Error::MissingPackageClause);
    }

    #[test]
    fn test_grouped_declarations() {
        let file = parse(
            "package p\n\
             type (\n\
                 A int\n\
                 B = string\n\
                 C []A\n\
             )\n",
        )
        .unwrap();
        let specs: Vec<_> = file.type_specs().collect();
        let names: Vec<_> = specs.iter().map(|s| s.name.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(!specs[0].alias);
        assert!(specs[1].alias);
        assert!(matches!(specs[2].ty, TypeExpr::Slice(..)));
    }

    #[test]
    fn test_other_declarations_are_skipped() {
        let file = parse(
            r#"package p

import (
    "fmt"
    "strings"
)

const Max = 10

var lookup = map[string]int{"a": 1}

func (p *Point) String() string {
    if p == nil {
        return "nil"
    }
    return fmt.Sprintf("%d", p.X)
}

type Point struct{ X int }
"#,
        )
        .unwrap();
        let keywords: Vec<_> = file
            .decls
            .iter()
            .map(|d| match d {
                Decl::Type(_) => "type",
                Decl::Other { keyword, .. } => *keyword,
            })
            .collect();
        assert_eq!(keywords, vec!["import", "const", "var", "func", "type"]);
        assert_eq!(only_spec(&file).name.name, "Point");
    }

    #[test]
    fn test_struct_fields() {
        let file = parse(
            "package p\n\
             type T struct {\n\
                 A, B int `json:\"a\"`\n\
                 *Inner\n\
                 io.Reader\n\
                 Base \"base\"\n\
                 f func(int) (string, error)\n\
             }\n",
        )
        .unwrap();
        let TypeExpr::Struct(st) = &only_spec(&file).ty else {
            panic!("expected struct");
        };
        assert_eq!(st.fields.len(), 5);

        let names: Vec<_> = st.fields[0].names.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(st.fields[0].tag.as_ref().map(|t| t.text.as_str()), Some("`json:\"a\"`"));

        assert!(st.fields[1].is_embedded());
        assert!(matches!(st.fields[1].ty, TypeExpr::Pointer(..)));
        assert!(st.fields[2].is_embedded());
        assert!(matches!(st.fields[2].ty, TypeExpr::Qualified { .. }));
        assert!(st.fields[3].is_embedded());
        assert_eq!(st.fields[3].tag.as_ref().map(|t| t.text.as_str()), Some("\"base\""));
        assert!(matches!(st.fields[4].ty, TypeExpr::Func(_)));
    }

    #[test]
    fn test_single_line_struct() {
        let file = parse("package p; type T struct { Value int; Next *T }").unwrap();
        let TypeExpr::Struct(st) = &only_spec(&file).ty else {
            panic!("expected struct");
        };
        assert_eq!(st.fields.len(), 2);
    }

    #[test]
    fn test_array_lengths() {
        let file = parse("package p\ntype (\nA [3]int\nB [n]int\nC [...]int\nD [2*N]int\n)").unwrap();
        let lens: Vec<_> = file
            .type_specs()
            .map(|s| match &s.ty {
                TypeExpr::Array { len, .. } => len.clone(),
                other => panic!("expected array, got {:?}", other),
            })
            .collect();
        assert!(matches!(&lens[0], ArrayLen::Literal { kind: LitKind::Int, text, .. } if text == "3"));
        assert!(matches!(&lens[1], ArrayLen::Expr { text, .. } if text == "n"));
        assert!(matches!(&lens[2], ArrayLen::Ellipsis(_)));
        assert!(matches!(&lens[3], ArrayLen::Expr { text, .. } if text == "2 * N"));
    }

    #[test]
    fn test_maps_channels_and_parens() {
        let file = parse(
            "package p\n\
             type (\n\
                 M map[string][]*int\n\
                 S chan<- int\n\
                 R <-chan int\n\
                 P (*int)\n\
             )\n",
        )
        .unwrap();
        let specs: Vec<_> = file.type_specs().collect();
        assert!(matches!(&specs[0].ty, TypeExpr::Map { value, .. } if matches!(**value, TypeExpr::Slice(..))));
        assert!(matches!(specs[1].ty, TypeExpr::Chan { dir: ChanDir::Send, .. }));
        assert!(matches!(specs[2].ty, TypeExpr::Chan { dir: ChanDir::Recv, .. }));
        assert!(matches!(&specs[3].ty, TypeExpr::Paren(inner, _) if matches!(**inner, TypeExpr::Pointer(..))));
    }

    #[test]
    fn test_interface_elements() {
        let file = parse(
            "package p\n\
             type Shape interface {\n\
                 fmt.Stringer\n\
                 Area() float64\n\
                 Scale(f float64) (Shape, error)\n\
                 ~int | string\n\
             }\n",
        )
        .unwrap();
        let TypeExpr::Interface(it) = &only_spec(&file).ty else {
            panic!("expected interface");
        };
        assert_eq!(it.elems.len(), 4);
        assert!(matches!(&it.elems[1], InterfaceElem::Method(name) if name.name == "Area"));
        assert!(matches!(&it.elems[2], InterfaceElem::Method(name) if name.name == "Scale"));
        assert!(matches!(&it.elems[3], InterfaceElem::Embedded(terms) if terms.len() == 2 && terms[0].tilde));
    }

    #[test]
    fn test_malformed_struct() {
        let err = parse("package p\ntype T struct { A int B }").unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. }));
    }

    #[test]
    fn test_type_parameters_rejected() {
        let err = parse("package p\ntype List[T any] []T").unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { ref expected, .. } if expected.contains("type parameters")));
        assert!(parse("package p\ntype Pair[K comparable, V any] struct{}").is_err());
        assert!(parse("package p\ntype A [N]int").is_ok());
    }

    #[test]
    fn test_unclosed_group() {
        let err = parse("package p\ntype (\nA int\n").unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. }));
    }
}
