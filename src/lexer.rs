use miette::SourceSpan;

use crate::error::{CalcError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind<'a> {
    Number(f64),
    Name(&'a str),
    Let,
    Quit,
    Print,
    LeftParen,
    RightParen,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equal,
}

impl TokenKind<'_> {
    /// The single input character this kind is spelled with, if it has one.
    pub fn symbol(&self) -> Option<char> {
        match self {
            TokenKind::Number(_) | TokenKind::Name(_) | TokenKind::Let => None,
            TokenKind::Quit => Some('q'),
            TokenKind::Print => Some(';'),
            TokenKind::LeftParen => Some('('),
            TokenKind::RightParen => Some(')'),
            TokenKind::Plus => Some('+'),
            TokenKind::Minus => Some('-'),
            TokenKind::Star => Some('*'),
            TokenKind::Slash => Some('/'),
            TokenKind::Percent => Some('%'),
            TokenKind::Equal => Some('='),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a> {
    pub slice: &'a str,
    pub offset: usize,
    pub kind: TokenKind<'a>,
}

impl Token<'_> {
    pub fn span(&self) -> SourceSpan {
        (self.offset, self.slice.len()).into()
    }
}

impl<'a> std::fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slice)
    }
}

/// Turns one line of text into tokens on demand.
///
/// A single token can be handed back with [`TokenStream::putback`]; it is
/// returned by the next [`TokenStream::get`] before any more input is read.
#[derive(Debug)]
pub struct TokenStream<'a> {
    source: &'a str,
    rest: &'a str,
    byte: usize,
    buffer: Option<Token<'a>>,
}

impl<'a> TokenStream<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            source: input,
            rest: input,
            byte: 0,
            buffer: None,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Byte offset of the next token the stream will hand out.
    pub fn offset(&self) -> usize {
        self.buffer.map_or(self.byte, |token| token.offset)
    }

    /// Zero-width span at the current position, used when input ran out.
    pub fn end_span(&self) -> SourceSpan {
        (self.offset(), 0).into()
    }

    /// True once nothing but whitespace is left and the buffer is empty.
    pub fn is_exhausted(&self) -> bool {
        self.buffer.is_none() && self.rest.trim_start().is_empty()
    }

    pub fn get(&mut self) -> Result<Option<Token<'a>>> {
        if let Some(token) = self.buffer.take() {
            return Ok(Some(token));
        }

        let trimmed = self.rest.trim_start();
        self.byte += self.rest.len() - trimmed.len();
        self.rest = trimmed;

        let offset = self.byte;
        let Some(c) = self.rest.chars().next() else {
            return Ok(None);
        };

        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            ';' => TokenKind::Print,
            'q' => TokenKind::Quit,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => TokenKind::Equal,
            '0'..='9' | '.' => return self.number().map(Some),
            c if c.is_ascii_alphabetic() => return Ok(Some(self.word())),
            _ => {
                self.advance(c.len_utf8());
                return Err(CalcError::BadToken {
                    span: (offset, c.len_utf8()).into(),
                });
            }
        };

        let slice = self.advance(c.len_utf8());
        Ok(Some(Token {
            slice,
            offset,
            kind,
        }))
    }

    pub fn putback(&mut self, token: Token<'a>) -> Result<()> {
        if self.buffer.is_some() {
            return Err(CalcError::BufferFull);
        }
        self.buffer = Some(token);
        Ok(())
    }

    /// Skips input up to and including the next occurrence of `kind`.
    ///
    /// A buffered token of that kind is dropped on its own and nothing else is
    /// read. Kinds without a single-character spelling skip to the end.
    pub fn ignore(&mut self, kind: TokenKind<'_>) {
        if let Some(token) = self.buffer.take() {
            if token.kind == kind {
                return;
            }
        }

        let skip = kind
            .symbol()
            .and_then(|target| self.rest.find(target).map(|at| at + target.len_utf8()))
            .unwrap_or(self.rest.len());
        self.advance(skip);
    }

    // Digits with at most one `.`; there is no exponent part, so `2e3` is
    // the number 2 followed by the name `e3`.
    fn number(&mut self) -> Result<Token<'a>> {
        let offset = self.byte;
        let mut seen_dot = false;
        let end = self
            .rest
            .find(|c: char| match c {
                '0'..='9' => false,
                '.' if !seen_dot => {
                    seen_dot = true;
                    false
                }
                _ => true,
            })
            .unwrap_or(self.rest.len());
        let literal = self.advance(end);

        match literal.parse::<f64>() {
            Ok(n) => Ok(Token {
                slice: literal,
                offset,
                kind: TokenKind::Number(n),
            }),
            Err(_) => Err(CalcError::BadToken {
                span: (offset, literal.len()).into(),
            }),
        }
    }

    fn word(&mut self) -> Token<'a> {
        let offset = self.byte;
        let end = self
            .rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(self.rest.len());
        let literal = self.advance(end);

        let kind = match literal {
            "let" => TokenKind::Let,
            _ => TokenKind::Name(literal),
        };

        Token {
            slice: literal,
            offset,
            kind,
        }
    }

    fn advance(&mut self, len: usize) -> &'a str {
        let (head, tail) = self.rest.split_at(len);
        self.rest = tail;
        self.byte += len;
        head
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.get().transpose()
    }
}
