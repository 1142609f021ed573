//! Scalar text: when strings need quotes, and how each scalar prints.

use std::borrow::Cow;

use pdx_tokenizer::is_unquoted_char;
use pdx_tree::ScalarValue;

/// Check if a string can be written without quotes.
///
/// A bare string is valid when it is not empty and every character may
/// appear in an unquoted token (no whitespace, `"`, `#`, `<`, `=`, `>`,
/// `{` or `}`).
pub fn can_be_bare(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_unquoted_char)
}

/// Source text of a scalar.
///
/// Strings are quoted when `force_quote` is set on the string or passed in,
/// or when they cannot be bare. Quoted strings are not escaped; the format
/// has no escape sequences.
pub fn scalar_text(value: &ScalarValue, force_quote: bool) -> Cow<'_, str> {
    match value {
        ScalarValue::String(t) => {
            if t.force_quote || force_quote || !can_be_bare(&t.value) {
                Cow::Owned(format!("\"{}\"", t.value))
            } else {
                Cow::Borrowed(&t.value)
            }
        }
        ScalarValue::Number(n) => Cow::Borrowed(n.text()),
        ScalarValue::Date(d) => Cow::Owned(d.to_string()),
    }
}
