//! Lexer for Go declaration syntax
//!
//! Converts source text into a stream of tokens, inserting semicolons at line
//! breaks the way the Go grammar does: a newline ends the line when the last
//! token was an identifier, a literal, `)`, `]`, `}`, `++` or `--`.

use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Result, Span};

/// Operators in longest-first order
const OPERATORS: &[&str] = &[
    "...", "<<=", ">>=", "&^=", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^", "+", "-", "*", "/", "%", "&", "|",
    "^", "<", ">", "=", "!", "(", ")", "[", "]", "{", "}", ",", ";", ".", ":", "~",
];

const BOM: char = '\u{feff}';

/// Saved position at the start of a token
#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    offset: usize,
    line: u32,
    column: u32,
}

/// The lexer state
pub struct Lexer {
    /// Source code as characters
    source: Vec<char>,
    /// Current position in `source`
    pos: usize,
    /// Byte offset of `pos`
    offset: usize,
    line: u32,
    column: u32,
    /// Start of the current token
    start: Mark,
    /// Whether the previous token allows semicolon insertion
    insert_semicolon: bool,
    /// Set once the end-of-file token has been produced
    finished: bool,
}

impl Lexer {
    /// Create a new lexer for the given source code. A byte order mark at
    /// the very start is skipped; offsets still count its bytes.
    pub fn new(source: &str) -> Self {
        let (pos, offset) = if source.starts_with(BOM) { (1, BOM.len_utf8()) } else { (0, 0) };
        let start = Mark { pos, offset, line: 1, column: 1 };
        Self {
            source: source.chars().collect(),
            pos,
            offset,
            line: 1,
            column: 1,
            start,
            insert_semicolon: false,
            finished: false,
        }
    }

    /// Get the current character without advancing
    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    /// Get the next character without advancing
    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    /// Advance to the next character
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn mark(&mut self) {
        self.start = Mark {
            pos: self.pos,
            offset: self.offset,
            line: self.line,
            column: self.column,
        };
    }

    /// Create a span from the token start to the current position
    fn make_span(&self) -> Span {
        Span::new(self.start.offset, self.offset, self.start.line, self.start.column)
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    /// Source text of the current token
    fn text(&self) -> String {
        self.source[self.start.pos..self.pos].iter().collect()
    }

    /// Skip whitespace and comments.
    ///
    /// Returns the span of a line break that terminates the current line, if
    /// one was crossed while semicolon insertion is armed.
    fn skip_trivia(&mut self) -> Option<Span> {
        while let Some(c) = self.peek() {
            match c {
                '\n' => {
                    self.mark();
                    self.advance();
                    if self.insert_semicolon {
                        return Some(self.make_span());
                    }
                }
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '/' if self.peek_next() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                '/' if self.peek_next() == Some('*') => {
                    self.mark();
                    self.advance();
                    self.advance();
                    let mut crossed_line = false;
                    loop {
                        match (self.peek(), self.peek_next()) {
                            (Some('*'), Some('/')) => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            (Some(c), _) => {
                                crossed_line |= c == '\n';
                                self.advance();
                            }
                            (None, _) => break,
                        }
                    }
                    // A block comment spanning lines acts like a newline.
                    if crossed_line && self.insert_semicolon {
                        return Some(self.make_span());
                    }
                }
                _ => break,
            }
        }
        None
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = self.text();
        let kind = TokenKind::keyword_from_str(&text).unwrap_or(TokenKind::Ident(text));
        self.make_token(kind)
    }

    fn eat_digits(&mut self, is_digit: fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if is_digit(c) || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn eat_exponent(&mut self, markers: [char; 2]) -> bool {
        if !matches!(self.peek(), Some(c) if markers.contains(&c)) {
            return false;
        }
        self.advance();
        if matches!(self.peek(), Some('+') | Some('-')) {
            self.advance();
        }
        self.eat_digits(|c| c.is_ascii_digit());
        true
    }

    /// Read a number literal; the text is kept as written
    fn read_number(&mut self) -> Token {
        let mut is_float = false;
        let prefix = match (self.peek(), self.peek_next()) {
            (Some('0'), Some(p)) if "xXbBoO".contains(p) => Some(p.to_ascii_lowercase()),
            _ => None,
        };

        match prefix {
            Some('x') => {
                self.advance();
                self.advance();
                self.eat_digits(|c| c.is_ascii_hexdigit());
                if self.peek() == Some('.') {
                    is_float = true;
                    self.advance();
                    self.eat_digits(|c| c.is_ascii_hexdigit());
                }
                is_float |= self.eat_exponent(['p', 'P']);
            }
            Some(_) => {
                self.advance();
                self.advance();
                self.eat_digits(|c| c.is_ascii_hexdigit());
            }
            None => {
                self.eat_digits(|c| c.is_ascii_digit());
                if self.peek() == Some('.') {
                    is_float = true;
                    self.advance();
                    self.eat_digits(|c| c.is_ascii_digit());
                }
                is_float |= self.eat_exponent(['e', 'E']);
            }
        }

        let kind = if self.peek() == Some('i') {
            self.advance();
            TokenKind::Imag(self.text())
        } else if is_float {
            TokenKind::Float(self.text())
        } else {
            TokenKind::Int(self.text())
        };
        self.make_token(kind)
    }

    /// Read an interpreted string or rune literal up to `quote`
    fn read_quoted(&mut self, quote: char, what: &'static str) -> Result<Token> {
        self.advance(); // opening quote
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if self.peek().map_or(true, |c| c == '\n') {
                        return Err(Error::UnterminatedLiteral { what, span: self.make_span() });
                    }
                    self.advance();
                }
                Some('\n') | None => {
                    return Err(Error::UnterminatedLiteral { what, span: self.make_span() });
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        let text = self.text();
        let kind = if quote == '"' {
            TokenKind::String(text)
        } else {
            TokenKind::Char(text)
        };
        Ok(self.make_token(kind))
    }

    /// Read a raw string literal; raw strings may span lines
    fn read_raw_string(&mut self) -> Result<Token> {
        self.advance(); // opening backquote
        loop {
            match self.advance() {
                Some('`') => break,
                Some(_) => {}
                None => {
                    return Err(Error::UnterminatedLiteral {
                        what: "raw string",
                        span: self.make_span(),
                    })
                }
            }
        }
        Ok(self.make_token(TokenKind::String(self.text())))
    }

    fn read_operator(&mut self) -> Result<Token> {
        let rest = &self.source[self.pos..];
        let op = OPERATORS.iter().copied().find(|op| {
            let len = op.chars().count();
            rest.len() >= len && op.chars().zip(rest).all(|(a, b)| a == *b)
        });

        let Some(op) = op else {
            let ch = self.peek().unwrap_or('\0');
            self.advance();
            return Err(Error::InvalidCharacter { ch, span: self.make_span() });
        };
        for _ in op.chars() {
            self.advance();
        }

        let kind = match op {
            "*" => TokenKind::Star,
            "." => TokenKind::Dot,
            "..." => TokenKind::Ellipsis,
            "=" => TokenKind::Assign,
            "<-" => TokenKind::Arrow,
            "~" => TokenKind::Tilde,
            "|" => TokenKind::Pipe,
            "(" => TokenKind::LParen,
            ")" => TokenKind::RParen,
            "{" => TokenKind::LBrace,
            "}" => TokenKind::RBrace,
            "[" => TokenKind::LBracket,
            "]" => TokenKind::RBracket,
            "," => TokenKind::Comma,
            ":" => TokenKind::Colon,
            ";" => TokenKind::Semicolon,
            other => TokenKind::Operator(other),
        };
        Ok(self.make_token(kind))
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token> {
        if let Some(span) = self.skip_trivia() {
            self.insert_semicolon = false;
            return Ok(Token::new(TokenKind::Semicolon, span));
        }
        self.mark();

        if self.is_at_end() {
            if self.insert_semicolon {
                self.insert_semicolon = false;
                return Ok(self.make_token(TokenKind::Semicolon));
            }
            self.finished = true;
            return Ok(Token::eof(self.make_span()));
        }

        let c = self.peek().unwrap_or('\0');
        let token = if c.is_alphabetic() || c == '_' {
            self.read_identifier()
        } else if c.is_ascii_digit()
            || (c == '.' && self.peek_next().map_or(false, |n| n.is_ascii_digit()))
        {
            self.read_number()
        } else if c == '"' {
            self.read_quoted('"', "string")?
        } else if c == '\'' {
            self.read_quoted('\'', "rune")?
        } else if c == '`' {
            self.read_raw_string()?
        } else {
            self.read_operator()?
        };

        self.insert_semicolon = token.kind.ends_line();
        Ok(token)
    }

    /// Tokenize the entire source and return all tokens, ending with `Eof`
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while !self.finished {
            tokens.push(self.next_token()?);
        }
        Ok(tokens)
    }
}
