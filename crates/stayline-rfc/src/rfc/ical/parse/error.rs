//! Positioned errors raised while reading a calendar document.

use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// What went wrong, and where. Lines and columns are 1-based and refer to
/// the unfolded document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {line}, column {column}{}", suffix(.context.as_deref()))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
    pub context: Option<String>,
}

impl ParseError {
    #[must_use]
    pub const fn new(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            line,
            column,
            context: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

fn suffix(context: Option<&str>) -> String {
    context.map(|c| format!(": {c}")).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("missing property name")]
    MissingPropertyName,
    #[error("invalid property name")]
    InvalidPropertyName,
    #[error("missing colon separator")]
    MissingColon,
    #[error("invalid parameter")]
    InvalidParameter,
    #[error("unclosed quoted string")]
    UnclosedQuote,
    #[error("invalid date")]
    InvalidDate,
    #[error("invalid time")]
    InvalidTime,
    #[error("invalid date-time")]
    InvalidDateTime,
    #[error("invalid integer")]
    InvalidInteger,
    #[error("missing BEGIN:VCALENDAR")]
    MissingBegin,
    #[error("missing END line")]
    MissingEnd,
    #[error("mismatched BEGIN/END")]
    MismatchedComponent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position_and_context() {
        let err = ParseError::new(ParseErrorKind::MissingEnd, 12, 1).with_context("missing END:VEVENT");
        assert_eq!(
            err.to_string(),
            "missing END line at line 12, column 1: missing END:VEVENT"
        );
    }

    #[test]
    fn display_without_context() {
        let err = ParseError::new(ParseErrorKind::MissingColon, 3, 9);
        assert_eq!(err.to_string(), "missing colon separator at line 3, column 9");
    }
}
