//! Word splitting.
//!
//! A statement is split on spaces that are neither escaped nor inside quotes.
//!
//! ## Escapes
//!
//! | Sequence | Result |
//! |----------|--------|
//! | `\"`     | a literal `"` that does not toggle quoting |
//! | `\\`     | a literal `\` |
//! | `\ `     | a literal space that does not split |
//! | `\x`     | kept verbatim as `\x` |
//!
//! Any word that was ever inside quotes is *literal*: it is only ever
//! interpreted as a string. An explicit `""` yields an empty literal word.

use crate::cursor::Cursor;

/// One word of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// Word text. Quotes and escapes are removed unless the word came from
    /// [`Words::verbatim`].
    pub text: String,
    /// Whether any part of the word was quoted.
    pub literal: bool,
    /// Byte offset of the word's first character within the statement.
    pub start: usize,
    /// Byte offset one past the word's last character within the statement.
    pub end: usize,
}

/// Lazily yields the words of a statement.
pub struct Words<'src> {
    cursor: Cursor<'src>,
    remove_special_syntax: bool,
}

impl<'src> Words<'src> {
    /// Iterate words with quotes and escapes removed.
    pub fn new(statement: &'src str) -> Self {
        Self {
            cursor: Cursor::new(statement),
            remove_special_syntax: true,
        }
    }

    /// Iterate words whose text is the verbatim source span.
    pub fn verbatim(statement: &'src str) -> Self {
        Self {
            cursor: Cursor::new(statement),
            remove_special_syntax: false,
        }
    }

    /// The unconsumed part of the statement, starting at the delimiter that
    /// ended the last yielded word.
    pub fn remainder(&self) -> &'src str {
        self.cursor.rest()
    }

    fn skip_delimiters(&mut self) {
        while self.cursor.peek() == Some(' ') {
            self.cursor.advance();
        }
    }
}

impl Iterator for Words<'_> {
    type Item = Word;

    fn next(&mut self) -> Option<Word> {
        self.skip_delimiters();
        if self.cursor.is_eof() {
            return None;
        }

        let start = self.cursor.offset();
        let mut text = String::new();
        let mut literal = false;
        let mut in_quote = false;

        while let Some(ch) = self.cursor.peek() {
            match ch {
                ' ' if !in_quote => break,
                '\\' => {
                    self.cursor.advance();
                    match self.cursor.advance() {
                        Some(next @ ('"' | '\\' | ' ')) => text.push(next),
                        Some(next) => {
                            text.push('\\');
                            text.push(next);
                        }
                        None => text.push('\\'),
                    }
                }
                '"' => {
                    self.cursor.advance();
                    in_quote = !in_quote;
                    literal = true;
                }
                _ => {
                    self.cursor.advance();
                    text.push(ch);
                }
            }
        }

        if !self.remove_special_syntax {
            text = self.cursor.slice_from(start).to_string();
        }
        Some(Word {
            text,
            literal,
            start,
            end: self.cursor.offset(),
        })
    }
}

/// Split a statement into words with quotes and escapes removed.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn split_words(statement: &str) -> Vec<Word> {
    Words::new(statement).collect()
}

/// Split a statement into words, keeping each word's verbatim source text.
pub fn split_words_verbatim(statement: &str) -> Vec<Word> {
    Words::verbatim(statement).collect()
}

/// Split off the leading word of a statement.
///
/// Returns the word and everything after it, starting at the delimiter.
pub fn split_leading_word(statement: &str) -> Option<(Word, &str)> {
    let mut words = Words::new(statement);
    let word = words.next()?;
    Some((word, words.remainder()))
}

/// Whether the statement ends in a delimiter after its last word, meaning the
/// user has started a new, still empty word.
pub fn ends_with_delimiter(statement: &str, words: &[Word]) -> bool {
    match words.last() {
        Some(last) => last.end < statement.len(),
        None => false,
    }
}
