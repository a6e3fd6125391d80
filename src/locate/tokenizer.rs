//! Word tokenization with character offsets.
//!
//! Tokens carry case-folded text but point back into the original,
//! untransformed string. Offsets are character (not byte) indices.

/// A word token extracted from a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Case-folded token text
    pub text: String,
    /// Character offset of the first char (inclusive)
    pub start: usize,
    /// Character offset past the last char (exclusive)
    pub end: usize,
}

/// Whether a char belongs to a word
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Fold a single char to lowercase without changing the char count.
///
/// Chars whose lowercase form expands to several chars are kept as-is,
/// so offsets computed on folded text stay valid for the original.
pub fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Case-fold a whole string, one char at a time
pub fn fold(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

/// Split text into word tokens.
///
/// Every maximal run of word chars becomes one token. Punctuation and
/// whitespace are dropped. Empty input yields no tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut start = 0;
    let mut len = 0;

    for (idx, c) in text.chars().enumerate() {
        if is_word_char(c) {
            if current.is_empty() {
                start = idx;
            }
            current.push(fold_char(c));
        } else if !current.is_empty() {
            tokens.push(Token {
                text: std::mem::take(&mut current),
                start,
                end: idx,
            });
        }
        len = idx + 1;
    }

    if !current.is_empty() {
        tokens.push(Token {
            text: current,
            start,
            end: len,
        });
    }

    tokens
}

/// Tokenize and keep only the folded words
pub fn words(text: &str) -> Vec<String> {
    tokenize(text).into_iter().map(|t| t.text).collect()
}
