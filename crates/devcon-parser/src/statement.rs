//! Statement splitting.
//!
//! Input is split on `;` unless the separator is escaped (`\;`) or sits inside
//! an open `"` quotation. Two modes are provided:
//!
//! - [`split_statements`]: the execution view. Top-level `\;` escapes are
//!   reduced to `;`, leading spaces are trimmed, empty statements dropped.
//! - [`split_statements_raw`]: the bookkeeping view. Statements are verbatim
//!   slices of the input (escapes intact) with their byte offsets, and empty
//!   statements are kept so the final one always reflects where the user is
//!   typing.

use crate::cursor::Cursor;

/// Statement separator.
pub const SEPARATOR: char = ';';

/// A verbatim statement slice and where it starts in the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawStatement<'src> {
    /// Statement text with escapes and quotes untouched, leading spaces trimmed.
    pub text: &'src str,
    /// Byte offset of `text` within the input.
    pub offset: usize,
}

/// Split input into executable statements.
///
/// ```
/// use devcon_parser::split_statements;
///
/// assert_eq!(split_statements("help; echo \\;"), vec!["help", "echo ;"]);
/// ```
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn split_statements(input: &str) -> Vec<String> {
    split_statements_raw(input)
        .into_iter()
        .map(|raw| unescape_separators(raw.text))
        .filter(|statement| !statement.is_empty())
        .collect()
}

/// Split input into verbatim statements with offsets.
///
/// Always returns at least one statement; a trailing separator yields a final
/// empty statement positioned at the end of the input.
pub fn split_statements_raw(input: &str) -> Vec<RawStatement<'_>> {
    let mut statements = Vec::new();
    let mut cursor = Cursor::new(input);
    let mut in_quote = false;
    let mut start = 0;

    while let Some(ch) = cursor.advance() {
        match ch {
            '\\' => {
                // The escaped character never toggles quotes or splits.
                cursor.advance();
            }
            '"' => in_quote = !in_quote,
            SEPARATOR if !in_quote => {
                let end = cursor.offset() - SEPARATOR.len_utf8();
                statements.push(raw_statement(input, start, end));
                start = cursor.offset();
            }
            _ => {}
        }
    }
    statements.push(raw_statement(input, start, input.len()));
    statements
}

fn raw_statement(input: &str, start: usize, end: usize) -> RawStatement<'_> {
    let slice = &input[start..end];
    let text = slice.trim_start_matches(' ');
    RawStatement {
        text,
        offset: start + (slice.len() - text.len()),
    }
}

/// Reduce top-level `\;` escapes to `;`.
///
/// Escapes inside quotes, and every other escape sequence, are left for the
/// word splitter.
fn unescape_separators(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut cursor = Cursor::new(raw);
    let mut in_quote = false;

    while let Some(ch) = cursor.advance() {
        match ch {
            '\\' => match cursor.advance() {
                Some(SEPARATOR) if !in_quote => out.push(SEPARATOR),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            '"' => {
                in_quote = !in_quote;
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_separator_round_trips() {
        for input in ["help", "echo hello world", "x \"quoted\" y", "a\\b"] {
            assert_eq!(split_statements(input), vec![input.to_string()]);
        }
    }

    #[test]
    fn splits_respecting_quotes_and_escapes() {
        let input = "phrase;echo \"semicolon is ;\";echo \"escape with \\;\";echo \\;;";
        assert_eq!(
            split_statements(input),
            vec![
                "phrase",
                "echo \"semicolon is ;\"",
                "echo \"escape with \\;\"",
                "echo ;",
            ]
        );
    }

    #[test]
    fn trims_leading_spaces_and_drops_empty() {
        assert_eq!(
            split_statements("  a ;; ;   b"),
            vec!["a ".to_string(), "b".to_string()]
        );
        assert!(split_statements("").is_empty());
        assert!(split_statements(" ; ;").is_empty());
    }

    #[test]
    fn escaped_backslash_before_separator_splits() {
        assert_eq!(split_statements("a\\\\;b"), vec!["a\\\\", "b"]);
    }

    #[test]
    fn escaped_quote_does_not_open_quotation() {
        assert_eq!(split_statements("echo \\\";b"), vec!["echo \\\"", "b"]);
    }

    #[test]
    fn raw_keeps_escapes_and_offsets() {
        let raw = split_statements_raw("help;  echo \\;x");
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0], RawStatement { text: "help", offset: 0 });
        assert_eq!(
            raw[1],
            RawStatement {
                text: "echo \\;x",
                offset: 7,
            }
        );
    }

    #[test]
    fn raw_keeps_trailing_empty_statement() {
        let raw = split_statements_raw("help;");
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[1], RawStatement { text: "", offset: 5 });
    }

    #[test]
    fn unterminated_quote_swallows_separators() {
        assert_eq!(split_statements("echo \"a;b"), vec!["echo \"a;b"]);
    }
}
