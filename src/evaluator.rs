use crate::{
    env::SymbolTable,
    error::{CalcError, Result},
    lexer::{Token, TokenKind, TokenStream},
};

/// How many `(` and unary `-` may be open at once.
pub const MAX_DEPTH: usize = 256;

/// What a single statement evaluated to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statement<'a> {
    /// `let name = expression`; the value is already stored.
    Declaration { name: &'a str, value: f64 },
    Expression(f64),
    Quit,
    /// Only `;` (or nothing) was left in the input.
    End,
}

/// Recursive-descent evaluator over a [`TokenStream`].
///
/// Grammar, tightest binding first:
///
/// ```text
/// primary    := "(" expression ")" | number | "-" primary | name
/// term       := primary { ("*" | "/" | "%") primary }
/// expression := term { ("+" | "-" | "*" | "/" | "%") term }
/// ```
///
/// Each level reads one token past what it owns and puts it back for the
/// level above.
pub struct Evaluator<'s, 'a> {
    stream: &'s mut TokenStream<'a>,
    symbols: &'s mut SymbolTable,
    depth: usize,
}

impl<'s, 'a> Evaluator<'s, 'a> {
    pub fn new(stream: &'s mut TokenStream<'a>, symbols: &'s mut SymbolTable) -> Self {
        Self {
            stream,
            symbols,
            depth: 0,
        }
    }

    /// Evaluates the next statement, skipping any leading `;`.
    pub fn statement(&mut self) -> Result<Statement<'a>> {
        let mut next = self.stream.get()?;
        while let Some(Token {
            kind: TokenKind::Print,
            ..
        }) = next
        {
            next = self.stream.get()?;
        }

        let Some(token) = next else {
            return Ok(Statement::End);
        };

        match token.kind {
            TokenKind::Quit => Ok(Statement::Quit),
            TokenKind::Let => self.declaration(),
            _ => {
                self.stream.putback(token)?;
                Ok(Statement::Expression(self.expression()?))
            }
        }
    }

    fn declaration(&mut self) -> Result<Statement<'a>> {
        let name = match self.stream.get()? {
            Some(Token {
                kind: TokenKind::Name(name),
                ..
            }) => name,
            Some(token) => return Err(CalcError::NameExpectedInDeclaration { span: token.span() }),
            None => {
                return Err(CalcError::NameExpectedInDeclaration {
                    span: self.stream.end_span(),
                })
            }
        };

        match self.stream.get()? {
            Some(Token {
                kind: TokenKind::Equal,
                ..
            }) => {}
            Some(token) => {
                return Err(CalcError::MissingEquals {
                    name: name.to_string(),
                    span: token.span(),
                })
            }
            None => {
                return Err(CalcError::MissingEquals {
                    name: name.to_string(),
                    span: self.stream.end_span(),
                })
            }
        }

        let value = self.expression()?;
        self.symbols.define(name, value);
        Ok(Statement::Declaration { name, value })
    }

    pub fn expression(&mut self) -> Result<f64> {
        let mut left = self.term()?;
        loop {
            let Some(token) = self.stream.get()? else {
                return Ok(left);
            };
            match token.kind {
                // `term` normally swallows `*`, `/` and `%`; a stray one still
                // applies to the running total.
                TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Percent => {
                    let right = self.term()?;
                    left = self.apply(left, token, right)?;
                }
                _ => {
                    self.stream.putback(token)?;
                    return Ok(left);
                }
            }
        }
    }

    pub fn term(&mut self) -> Result<f64> {
        let mut left = self.primary()?;
        loop {
            let Some(token) = self.stream.get()? else {
                return Ok(left);
            };
            match token.kind {
                TokenKind::Star | TokenKind::Slash | TokenKind::Percent => {
                    let right = self.primary()?;
                    left = self.apply(left, token, right)?;
                }
                _ => {
                    self.stream.putback(token)?;
                    return Ok(left);
                }
            }
        }
    }

    pub fn primary(&mut self) -> Result<f64> {
        let Some(token) = self.stream.get()? else {
            return Err(CalcError::PrimaryExpected {
                span: self.stream.end_span(),
            });
        };

        match token.kind {
            TokenKind::LeftParen => {
                self.enter(token)?;
                let value = self.parenthesized();
                self.depth -= 1;
                value
            }
            TokenKind::Number(n) => Ok(n),
            TokenKind::Minus => {
                self.enter(token)?;
                let value = self.primary();
                self.depth -= 1;
                Ok(-value?)
            }
            TokenKind::Name(name) => {
                self.symbols
                    .lookup(name)
                    .ok_or_else(|| CalcError::UndefinedVariable {
                        name: name.to_string(),
                        span: token.span(),
                    })
            }
            _ => Err(CalcError::PrimaryExpected { span: token.span() }),
        }
    }

    fn parenthesized(&mut self) -> Result<f64> {
        let value = self.expression()?;
        match self.stream.get()? {
            Some(Token {
                kind: TokenKind::RightParen,
                ..
            }) => Ok(value),
            Some(token) => Err(CalcError::ExpectedCloseParen { span: token.span() }),
            None => Err(CalcError::ExpectedCloseParen {
                span: self.stream.end_span(),
            }),
        }
    }

    fn enter(&mut self, token: Token<'a>) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(CalcError::NestingTooDeep {
                limit: MAX_DEPTH,
                span: token.span(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Combines `left` and `right` with the operator in `op`. An exact zero
    /// right operand is rejected for `/` and `%`.
    fn apply(&self, left: f64, op: Token<'a>, right: f64) -> Result<f64> {
        match op.kind {
            TokenKind::Slash | TokenKind::Percent if right == 0.0 => Err(CalcError::DivideByZero {
                span: (op.offset, self.stream.offset().saturating_sub(op.offset)).into(),
            }),
            TokenKind::Plus => Ok(left + right),
            TokenKind::Minus => Ok(left - right),
            TokenKind::Star => Ok(left * right),
            TokenKind::Slash => Ok(left / right),
            // f64 `%` truncates, so the sign follows the dividend
            TokenKind::Percent => Ok(left % right),
            other => unreachable!("{other:?} is not an arithmetic operator"),
        }
    }
}
