//! The bigram key type

use crate::error::{BigramError, ErrorCode, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// An ordered pair of adjacent tokens
///
/// Ordering is lexicographic on `(first, second)`, which is also the
/// tie-break order used when ranking bigrams by count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bigram {
    first: Arc<str>,
    second: Arc<str>,
}

impl Bigram {
    /// Build a bigram from two tokens, rejecting empty tokens and NUL sentinels
    pub fn new(first: impl AsRef<str>, second: impl AsRef<str>) -> Result<Self> {
        let first = first.as_ref();
        let second = second.as_ref();
        check_token(first)?;
        check_token(second)?;
        Ok(Self::from_shared(Arc::from(first), Arc::from(second)))
    }

    /// Tokens are already validated by the caller
    pub(crate) fn from_shared(first: Arc<str>, second: Arc<str>) -> Self {
        Self { first, second }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }
}

fn check_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(BigramError::tokenize(
            ErrorCode::TOKENIZE_EMPTY_TOKEN,
            "bigram token is empty",
        ));
    }
    if token.contains('\0') {
        return Err(BigramError::tokenize(
            ErrorCode::TOKENIZE_SENTINEL,
            "bigram token contains a NUL sentinel",
        ));
    }
    Ok(())
}

impl fmt::Display for Bigram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first, self.second)
    }
}

impl Serialize for Bigram {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = Bigram::new("the", "cat").unwrap();
        let b = Bigram::new(String::from("the"), String::from("cat")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Bigram::new("cat", "the").unwrap());
    }

    #[test]
    fn test_lexicographic_order() {
        let mut bigrams = vec![
            Bigram::new("the", "cat").unwrap(),
            Bigram::new("cat", "sat").unwrap(),
            Bigram::new("cat", "ran").unwrap(),
        ];
        bigrams.sort();
        let rendered: Vec<String> = bigrams.iter().map(|b| b.to_string()).collect();
        assert_eq!(rendered, vec!["cat ran", "cat sat", "the cat"]);
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        let err = Bigram::new("a\0", "b").unwrap_err();
        assert_eq!(err.code(), ErrorCode::TOKENIZE_SENTINEL);
        let err = Bigram::new("a", "").unwrap_err();
        assert_eq!(err.code(), ErrorCode::TOKENIZE_EMPTY_TOKEN);
    }

    #[test]
    fn test_serializes_as_display_string() {
        let bigram = Bigram::new("eat", "pizza").unwrap();
        assert_eq!(serde_json::to_string(&bigram).unwrap(), "\"eat pizza\"");
    }
}
