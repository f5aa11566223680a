//! Record tokenization into bigram sequences
//!
//! Tokenizers are pure functions from one raw record to its ordered bigrams.
//! A record that cannot be tokenized yields a `Tokenize` error which the
//! driver treats as a skipped record.

use crate::aggregation::Bigram;
use crate::error::{BigramError, ErrorCode, Result};
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Default maximum record size in bytes
pub const DEFAULT_MAX_RECORD_BYTES: usize = 1024 * 1024;

static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("Invalid word pattern"));

/// Turns one raw record into the bigrams of its adjacent tokens
pub trait Tokenizer: Send + Sync {
    fn bigrams(&self, record: &[u8]) -> Result<Vec<Bigram>>;
}

/// Splits records into `\w+` word tokens
#[derive(Debug, Clone)]
pub struct WordTokenizer {
    pattern: Regex,
    lowercase: bool,
    max_record_bytes: usize,
}

impl WordTokenizer {
    pub fn new() -> Self {
        Self {
            pattern: WORD_PATTERN.clone(),
            lowercase: true,
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
        }
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn with_max_record_bytes(mut self, max_record_bytes: usize) -> Self {
        self.max_record_bytes = max_record_bytes;
        self
    }

    /// Tokens of a decoded record, in order
    pub fn tokens(&self, text: &str) -> Vec<Arc<str>> {
        let text = if self.lowercase {
            std::borrow::Cow::Owned(text.to_lowercase())
        } else {
            std::borrow::Cow::Borrowed(text)
        };
        self.pattern
            .find_iter(&text)
            .map(|m| Arc::from(m.as_str()))
            .collect()
    }
}

impl Default for WordTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for WordTokenizer {
    fn bigrams(&self, record: &[u8]) -> Result<Vec<Bigram>> {
        if record.len() > self.max_record_bytes {
            return Err(BigramError::tokenize(
                ErrorCode::TOKENIZE_RECORD_TOO_LARGE,
                format!(
                    "record is {} bytes, limit is {}",
                    record.len(),
                    self.max_record_bytes
                ),
            ));
        }
        if record.contains(&0) {
            return Err(BigramError::tokenize(
                ErrorCode::TOKENIZE_SENTINEL,
                "record contains a NUL byte",
            ));
        }
        let text = std::str::from_utf8(record).map_err(|e| {
            BigramError::tokenize(
                ErrorCode::TOKENIZE_INVALID_UTF8,
                format!("invalid UTF-8 at byte {}", e.valid_up_to()),
            )
        })?;

        let tokens = self.tokens(text);
        Ok(tokens
            .windows(2)
            .map(|pair| Bigram::from_shared(Arc::clone(&pair[0]), Arc::clone(&pair[1])))
            .collect())
    }
}
