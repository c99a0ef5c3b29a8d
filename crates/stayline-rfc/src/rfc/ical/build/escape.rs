//! Escaping of TEXT values and parameter values on output.

/// ## Summary
/// Escapes a TEXT value. Carriage returns are dropped so a CRLF inside a
/// reason becomes a single `\n`.
#[must_use]
pub fn escape_text(s: &str) -> String {
    s.chars()
        .filter(|&c| c != '\r')
        .fold(String::with_capacity(s.len()), |mut out, c| {
            match c {
                '\\' | ',' | ';' => {
                    out.push('\\');
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                _ => out.push(c),
            }
            out
        })
}

/// ## Summary
/// Quotes a parameter value when it contains a separator, a quote or a
/// newline, caret-encoding what a quoted string cannot hold.
#[must_use]
pub fn escape_param_value(s: &str) -> String {
    if !s.contains([':', ';', ',', '"', '\n']) {
        return s.to_string();
    }

    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '^' => quoted.push_str("^^"),
            '\n' => quoted.push_str("^n"),
            '"' => quoted.push_str("^'"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_text_basic() {
        assert_eq!(escape_text("Airbnb, guest"), "Airbnb\\, guest");
        assert_eq!(escape_text("line1\r\nline2"), "line1\\nline2");
        assert_eq!(escape_text("back\\slash"), "back\\\\slash");
        assert_eq!(escape_text("semi;colon"), "semi\\;colon");
    }

    #[test]
    fn escape_param_value_quoting() {
        assert_eq!(escape_param_value("Asia/Bangkok"), "Asia/Bangkok");
        assert_eq!(escape_param_value("Doe, Jane"), "\"Doe, Jane\"");
        assert_eq!(escape_param_value("Line1\nLine2"), "\"Line1^nLine2\"");
        assert_eq!(escape_param_value("Has\"quote"), "\"Has^'quote\"");
    }
}
