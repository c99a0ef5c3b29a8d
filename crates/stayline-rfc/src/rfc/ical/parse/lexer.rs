//! Unfolding and tokenizing of content lines.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{ContentLine, Parameter};

/// ## Summary
/// Splits a document into logical lines, numbered by their first physical
/// line (1-based).
///
/// CRLF and bare LF are both accepted. A line starting with a space or tab
/// continues the previous one, minus that single character.
#[must_use]
pub fn split_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();

    for (index, raw) in input.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let (continues, text) = match line.strip_prefix([' ', '\t']) {
            Some(rest) => (true, rest),
            // Some channel managers wrap long values without the leading space.
            None => (!line.contains(':'), line),
        };

        match lines.last_mut() {
            Some((_, previous)) if continues => previous.push_str(text),
            _ => lines.push((index + 1, text.to_string())),
        }
    }

    lines
}

/// Position inside one logical line.
struct Cursor<'a> {
    line: &'a str,
    pos: usize,
    line_num: usize,
}

impl<'a> Cursor<'a> {
    const fn new(line: &'a str, line_num: usize) -> Self {
        Self {
            line,
            pos: 0,
            line_num,
        }
    }

    fn peek(&self) -> Option<char> {
        self.line[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&keep) {
            self.bump();
        }
        &self.line[start..self.pos]
    }

    fn error_at(&self, kind: ParseErrorKind, pos: usize) -> ParseError {
        ParseError::new(kind, self.line_num, pos + 1)
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        self.error_at(kind, self.pos)
    }

    fn rest(&self) -> &'a str {
        &self.line[self.pos..]
    }
}

/// ## Summary
/// Splits `name *(";" param) ":" value` into its parts. The value is kept
/// raw; unescaping depends on its type.
///
/// ## Errors
/// Returns an error for an empty or invalid name, a malformed parameter or a
/// missing colon.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let mut cursor = Cursor::new(line, line_num);

    let name = cursor.take_while(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    match cursor.peek() {
        Some(';' | ':') if name.is_empty() => {
            return Err(cursor.error_at(ParseErrorKind::MissingPropertyName, 0));
        }
        Some(';' | ':') => {}
        Some(_) => return Err(cursor.error(ParseErrorKind::InvalidPropertyName)),
        None => return Err(cursor.error_at(ParseErrorKind::MissingColon, line.len().saturating_sub(1))),
    }

    let mut params = Vec::new();
    loop {
        let at = cursor.pos;
        match cursor.bump() {
            Some(':') => break,
            Some(';') => params.push(parse_parameter(&mut cursor)?),
            Some(c) => {
                return Err(cursor
                    .error_at(ParseErrorKind::InvalidParameter, at)
                    .with_context(format!("unexpected character '{c}'")));
            }
            None => {
                return Err(cursor.error_at(ParseErrorKind::MissingColon, line.len().saturating_sub(1)));
            }
        }
    }

    Ok(ContentLine {
        name: name.to_ascii_uppercase(),
        params,
        raw_value: cursor.rest().to_string(),
    })
}

/// Reads `NAME=value *("," value)`, leaving the terminator unread.
fn parse_parameter(cursor: &mut Cursor<'_>) -> ParseResult<Parameter> {
    let name = cursor.take_while(|c| c.is_ascii_alphanumeric() || c == '-');
    if name.is_empty() || cursor.peek() != Some('=') {
        return Err(cursor.error(ParseErrorKind::InvalidParameter));
    }
    cursor.bump();

    let mut values = vec![parse_param_value(cursor)?];
    while cursor.peek() == Some(',') {
        cursor.bump();
        values.push(parse_param_value(cursor)?);
    }

    Ok(Parameter::with_values(name, values))
}

/// Reads one parameter value. Quoted values may contain separators and
/// use caret escapes (`^^`, `^n`, `^'`).
fn parse_param_value(cursor: &mut Cursor<'_>) -> ParseResult<String> {
    match cursor.peek() {
        None => Err(cursor.error(ParseErrorKind::InvalidParameter)),
        Some('"') => {
            let start = cursor.pos;
            cursor.bump();
            let mut value = String::new();
            while let Some(c) = cursor.bump() {
                match c {
                    '"' => return Ok(value),
                    '^' => {
                        let decoded = match cursor.peek() {
                            Some('^') => Some('^'),
                            Some('n') => Some('\n'),
                            Some('\'') => Some('"'),
                            _ => None,
                        };
                        if decoded.is_some() {
                            cursor.bump();
                        }
                        value.push(decoded.unwrap_or('^'));
                    }
                    other => value.push(other),
                }
            }
            Err(cursor.error_at(ParseErrorKind::UnclosedQuote, start))
        }
        Some(_) => Ok(cursor
            .take_while(|c| !matches!(c, ',' | ';' | ':'))
            .to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_unfolds_continuations() {
        let input = "DESCRIPTION:This is a long description\r\n that continues here\r\nUID:1\r\n";
        let lines = split_lines(input);
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            (
                1,
                "DESCRIPTION:This is a long descriptionthat continues here".to_string()
            )
        );
        assert_eq!(lines[1], (3, "UID:1".to_string()));
    }

    #[test]
    fn split_lines_accepts_bare_lf_and_tabs() {
        let input = "SUMMARY:First\n\tSecond\nUID:x";
        let lines = split_lines(input);
        assert_eq!(lines[0].1, "SUMMARY:FirstSecond");
        assert_eq!(lines[1].1, "UID:x");
    }

    #[test]
    fn parse_simple_line() {
        let result = parse_content_line("SUMMARY:Reserved", 1).unwrap();
        assert_eq!(result.name, "SUMMARY");
        assert!(result.params.is_empty());
        assert_eq!(result.raw_value, "Reserved");
    }

    #[test]
    fn parse_line_with_params() {
        let result = parse_content_line("DTSTART;VALUE=DATE:20250110", 1).unwrap();
        assert_eq!(result.name, "DTSTART");
        assert_eq!(result.value_type(), Some("DATE"));
        assert_eq!(result.raw_value, "20250110");
    }

    #[test]
    fn parse_line_with_quoted_param() {
        let line = "ATTENDEE;CN=\"Doe, Jane\";ROLE=CHAIR:mailto:jane@example.com";
        let result = parse_content_line(line, 1).unwrap();
        assert_eq!(result.get_param_value("CN"), Some("Doe, Jane"));
        assert_eq!(result.get_param_value("ROLE"), Some("CHAIR"));
        assert_eq!(result.raw_value, "mailto:jane@example.com");
    }

    #[test]
    fn parse_line_with_empty_value() {
        let result = parse_content_line("DESCRIPTION;LANGUAGE=en:", 1).unwrap();
        assert_eq!(result.raw_value, "");
    }

    #[test]
    fn parse_line_caret_encoding() {
        let result = parse_content_line("X-NOTE;X-P=\"a^nb^'c^^\":v", 1).unwrap();
        assert_eq!(result.get_param_value("X-P"), Some("a\nb\"c^"));
    }

    #[test]
    fn parse_line_errors() {
        assert_eq!(
            parse_content_line(":value", 4).unwrap_err().kind,
            ParseErrorKind::MissingPropertyName
        );
        assert_eq!(
            parse_content_line("SUM MARY:x", 1).unwrap_err().kind,
            ParseErrorKind::InvalidPropertyName
        );
        assert_eq!(
            parse_content_line("X;CN=\"open:value", 1).unwrap_err().kind,
            ParseErrorKind::UnclosedQuote
        );
    }
}
