//! Tokenizer for console input.
//!
//! Console input is a line of one or more *statements* separated by `;`. Each
//! statement is a sequence of *words* separated by spaces. Double quotes group
//! words and mark them literal; a backslash escapes the next character.
//!
//! # Example
//!
//! ```
//! use devcon_parser::{split_statements, split_words};
//!
//! let statements = split_statements("greet \"Ada Lovelace\"; help");
//! assert_eq!(statements.len(), 2);
//!
//! let words = split_words(&statements[0]);
//! assert_eq!(words[1].text, "Ada Lovelace");
//! assert!(words[1].literal);
//! ```

mod cursor;
mod statement;
mod word;

pub use statement::{RawStatement, SEPARATOR, split_statements, split_statements_raw};
pub use word::{
    Word, Words, ends_with_delimiter, split_leading_word, split_words, split_words_verbatim,
};
