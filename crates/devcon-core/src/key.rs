//! Key cleansing shared by command keys and alias keys.
//!
//! Every key is stored and compared in its cleansed form:
//!
//! - lowercased
//! - spaces become underscores
//! - any character outside `[a-z0-9_]` is deleted
//!
//! The rule is idempotent, so cleansing an already clean key is a no-op.

/// Cleanse a raw key into its canonical form.
///
/// ```
/// use devcon_core::cleanse_key;
///
/// assert_eq!(cleanse_key("KEY NAME 123"), "key_name_123");
/// assert_eq!(cleanse_key("k#e$y-_&na=m+e?"), "key_name");
/// ```
pub fn cleanse_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    for ch in raw.chars().flat_map(char::to_lowercase) {
        match ch {
            ' ' => key.push('_'),
            'a'..='z' | '0'..='9' | '_' => key.push(ch),
            _ => {}
        }
    }
    key
}

/// Check whether a key is already in cleansed form.
#[inline]
pub fn is_cleansed(key: &str) -> bool {
    key.bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}
