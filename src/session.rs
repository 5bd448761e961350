use std::fmt;
use std::io::Write;

use miette::IntoDiagnostic;

use crate::{
    env::SymbolTable,
    error::CalcError,
    evaluator::{Evaluator, Statement},
    lexer::{TokenKind, TokenStream},
};

pub const BANNER: &str = "Enter an expression: ";
pub const PROMPT: &str = "> ";
pub const RESULT: &str = "= ";

/// Significant digits shown for a result.
const PRECISION: usize = 6;

/// Shows a result the way C's `%g` does: six significant digits, trailing
/// zeros dropped, and scientific notation for exponents below -4 or at
/// least six.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct General(pub f64);

impl fmt::Display for General {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if value.is_nan() {
            return f.write_str("nan");
        }
        if value.is_infinite() {
            return f.write_str(if value < 0.0 { "-inf" } else { "inf" });
        }
        if value == 0.0 {
            return f.write_str(if value.is_sign_negative() { "-0" } else { "0" });
        }

        // rounding to the shown precision can bump the exponent
        let scientific = format!("{:.*e}", PRECISION - 1, value);
        let (mantissa, exponent) = scientific.split_once('e').ok_or(fmt::Error)?;
        let exponent: i32 = exponent.parse().map_err(|_| fmt::Error)?;

        if exponent < -4 || exponent >= PRECISION as i32 {
            let sign = if exponent < 0 { '-' } else { '+' };
            write!(f, "{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs())
        } else {
            let decimals = (PRECISION as i32 - 1 - exponent) as usize;
            let fixed = format!("{value:.decimals$}");
            f.write_str(trim_fraction(&fixed))
        }
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// How a call to [`Session::run`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Every statement in the line was evaluated.
    Exhausted,
    /// A `q` was read.
    Quit,
    /// A statement failed; the error has already been written out.
    Failed(CalcError),
}

/// Runs statements from a line of input, writing prompts and results to `out`
/// and error messages to `err`.
///
/// Variables declared in one [`Session::run`] stay visible to later ones.
pub struct Session<W, E> {
    symbols: SymbolTable,
    out: W,
    err: E,
    fancy: bool,
}

impl<W: Write, E: Write> Session<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self {
            symbols: SymbolTable::new(),
            out,
            err,
            fancy: false,
        }
    }

    /// Render errors as annotated reports instead of a bare message line.
    pub fn fancy(mut self, fancy: bool) -> Self {
        self.fancy = fancy;
        self
    }

    pub fn into_writers(self) -> (W, E) {
        (self.out, self.err)
    }

    /// Evaluates statements from `line` until it runs out, a `q` is read, or
    /// a statement fails. Nothing after a failed statement is evaluated.
    ///
    /// Write failures and internal errors come back as `Err`; those are not
    /// written to the error sink.
    pub fn run(&mut self, line: &str) -> miette::Result<Outcome> {
        let mut stream = TokenStream::new(line);

        while !stream.is_exhausted() {
            write!(self.out, "{PROMPT}").into_diagnostic()?;
            self.out.flush().into_diagnostic()?;

            let statement = Evaluator::new(&mut stream, &mut self.symbols).statement();
            match statement {
                Ok(Statement::Quit) => return Ok(Outcome::Quit),
                Ok(Statement::End) => break,
                Ok(Statement::Declaration { name, value }) => {
                    writeln!(self.out, "{RESULT}{name} = {}", General(value)).into_diagnostic()?;
                }
                Ok(Statement::Expression(value)) => {
                    writeln!(self.out, "{RESULT}{}", General(value)).into_diagnostic()?;
                }
                Err(err) if err.is_internal() => {
                    return Err(miette::Report::new(err)
                        .with_source_code(line.to_string())
                        .wrap_err("internal error: evaluation aborted"));
                }
                Err(err) => {
                    self.report(&err, stream.source()).into_diagnostic()?;
                    stream.ignore(TokenKind::Print);
                    return Ok(Outcome::Failed(err));
                }
            }
        }

        Ok(Outcome::Exhausted)
    }

    fn report(&mut self, err: &CalcError, source: &str) -> std::io::Result<()> {
        if self.fancy {
            let report = miette::Report::new(err.clone()).with_source_code(source.to_string());
            writeln!(self.err, "{report:?}")
        } else {
            writeln!(self.err, "{err}")
        }
    }
}
