//! Line folding at 75 octets.

const MAX_LINE_OCTETS: usize = 75;

/// Longest prefix of `rest` within `limit` bytes that ends on a character
/// boundary, never empty.
fn chunk_end(rest: &str, limit: usize) -> usize {
    let end = (0..=rest.len().min(limit))
        .rev()
        .find(|&i| rest.is_char_boundary(i))
        .unwrap_or(0);
    if end > 0 {
        end
    } else {
        rest.chars().next().map_or(rest.len(), char::len_utf8)
    }
}

/// ## Summary
/// Folds a content line into CRLF-terminated physical lines of at most 75
/// octets. Continuations start with a space, which counts towards their
/// length, and UTF-8 sequences are kept whole.
#[must_use]
pub fn fold_line(line: &str) -> String {
    let mut folded = String::with_capacity(line.len() + 3 * (line.len() / MAX_LINE_OCTETS + 1));
    let mut rest = line;
    let mut limit = MAX_LINE_OCTETS;

    loop {
        let end = chunk_end(rest, limit);
        folded.push_str(&rest[..end]);
        folded.push_str("\r\n");
        rest = &rest[end..];
        if rest.is_empty() {
            return folded;
        }
        folded.push(' ');
        limit = MAX_LINE_OCTETS - 1;
    }
}
