use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CalcError>;

/// Everything that can go wrong while reading or evaluating a statement.
///
/// The `Display` text is the bare message printed by the session; the spans
/// and help text only show up when the error is rendered as a report.
#[derive(Diagnostic, Debug, Error, Clone, PartialEq)]
pub enum CalcError {
    #[error("Bad token")]
    #[diagnostic(
        code(tokcalc::bad_token),
        help("expected a number, a name, `let`, or one of ( ) ; q + - * / % =")
    )]
    BadToken {
        #[label("this input")]
        span: SourceSpan,
    },

    #[error("putback() into a full buffer")]
    #[diagnostic(code(tokcalc::buffer_full))]
    BufferFull,

    #[error("')' expected")]
    #[diagnostic(code(tokcalc::expected_close_paren))]
    ExpectedCloseParen {
        #[label("expected `)` here")]
        span: SourceSpan,
    },

    #[error("primary expected")]
    #[diagnostic(
        code(tokcalc::primary_expected),
        help("a primary is a number, a name, `-` followed by a primary, or a parenthesized expression")
    )]
    PrimaryExpected {
        #[label("here")]
        span: SourceSpan,
    },

    #[error("Undefined variable: {name}")]
    #[diagnostic(
        code(tokcalc::undefined_variable),
        help("declare it first with `let`")
    )]
    UndefinedVariable {
        name: String,
        #[label("not declared")]
        span: SourceSpan,
    },

    #[error("divide by zero")]
    #[diagnostic(code(tokcalc::divide_by_zero))]
    DivideByZero {
        #[label("divisor is zero")]
        span: SourceSpan,
    },

    #[error("Name expected in declaration")]
    #[diagnostic(code(tokcalc::name_expected))]
    NameExpectedInDeclaration {
        #[label("expected a name")]
        span: SourceSpan,
    },

    #[error("= missing in declaration of {name}")]
    #[diagnostic(code(tokcalc::missing_equals))]
    MissingEquals {
        name: String,
        #[label("expected `=`")]
        span: SourceSpan,
    },

    #[error("expression nests more than {limit} levels deep")]
    #[diagnostic(code(tokcalc::nesting_too_deep))]
    NestingTooDeep {
        limit: usize,
        #[label("one level too many")]
        span: SourceSpan,
    },
}

impl CalcError {
    /// Errors that end the whole program instead of being reported as a
    /// failed statement.
    pub fn is_internal(&self) -> bool {
        matches!(self, CalcError::NestingTooDeep { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let span = SourceSpan::from((0, 1));

        assert_eq!(CalcError::BadToken { span }.to_string(), "Bad token");
        assert_eq!(CalcError::BufferFull.to_string(), "putback() into a full buffer");
        assert_eq!(CalcError::ExpectedCloseParen { span }.to_string(), "')' expected");
        assert_eq!(CalcError::PrimaryExpected { span }.to_string(), "primary expected");
        assert_eq!(CalcError::DivideByZero { span }.to_string(), "divide by zero");
        assert_eq!(
            CalcError::NameExpectedInDeclaration { span }.to_string(),
            "Name expected in declaration"
        );
    }

    #[test]
    fn test_messages_carry_names() {
        let span = SourceSpan::from((4, 3));

        let undefined = CalcError::UndefinedVariable {
            name: "foo".to_string(),
            span,
        };
        assert_eq!(undefined.to_string(), "Undefined variable: foo");

        let missing = CalcError::MissingEquals {
            name: "x".to_string(),
            span,
        };
        assert_eq!(missing.to_string(), "= missing in declaration of x");
    }

    #[test]
    fn test_diagnostic_codes() {
        let err = CalcError::DivideByZero {
            span: SourceSpan::from((2, 3)),
        };
        assert_eq!(
            err.code().map(|code| code.to_string()),
            Some("tokcalc::divide_by_zero".to_string())
        );

        let labels: Vec<_> = err.labels().into_iter().flatten().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 2);
        assert_eq!(labels[0].len(), 3);
    }

    #[test]
    fn test_only_nesting_is_internal() {
        let span = SourceSpan::from((0, 1));

        assert!(CalcError::NestingTooDeep { limit: 256, span }.is_internal());
        assert!(!CalcError::BufferFull.is_internal());
        assert!(!CalcError::DivideByZero { span }.is_internal());
        assert_eq!(
            CalcError::NestingTooDeep { limit: 256, span }.to_string(),
            "expression nests more than 256 levels deep"
        );
    }
}
