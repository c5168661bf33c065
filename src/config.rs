//! Recognizer configuration.
//!
//! Implementations are chosen from a closed set of variants at startup, so an
//! unknown text builder is a deserialization error rather than a lookup
//! failure at first use.
//!
//! ```
//! use entity_trie::{RecognizerConfig, TextBuilderKind};
//!
//! let config: RecognizerConfig =
//!     serde_json::from_str(r#"{ "max_tokens": 3, "text_builder": { "kind": "concat" } }"#).unwrap();
//! assert_eq!(config.max_tokens, 3);
//! assert_eq!(config.text_builder, TextBuilderKind::Concat);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::token::Token;

/// Default window size in tokens.
pub const DEFAULT_MAX_TOKENS: usize = 5;

/// Builds a dictionary candidate key from a run of window tokens.
pub trait TextBuilder: Send + Sync {
    /// Appends the key for `tokens` to `out`.
    fn build(&self, tokens: &[Token], out: &mut String);
}

impl<F> TextBuilder for F
where
    F: Fn(&[Token], &mut String) + Send + Sync,
{
    fn build(&self, tokens: &[Token], out: &mut String) {
        self(tokens, out)
    }
}

/// Joins token texts with a fixed separator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Joiner {
    separator: String,
}

impl Joiner {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    /// Single ASCII space between texts.
    pub fn space() -> Self {
        Self::new(" ")
    }

    /// No separator.
    pub fn concat() -> Self {
        Self::new("")
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }
}

impl Default for Joiner {
    fn default() -> Self {
        Self::space()
    }
}

impl TextBuilder for Joiner {
    fn build(&self, tokens: &[Token], out: &mut String) {
        for (i, token) in tokens.iter().enumerate() {
            if i > 0 {
                out.push_str(&self.separator);
            }
            out.push_str(token.text());
        }
    }
}

/// Text builder policies selectable from configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextBuilderKind {
    /// Join with a single space.
    #[default]
    Space,
    /// Concatenate texts directly.
    Concat,
    /// Join with a custom separator.
    Separator { value: String },
}

impl TextBuilderKind {
    pub fn into_builder(self) -> Box<dyn TextBuilder> {
        match self {
            TextBuilderKind::Space => Box::new(Joiner::space()),
            TextBuilderKind::Concat => Box::new(Joiner::concat()),
            TextBuilderKind::Separator { value } => Box::new(Joiner::new(value)),
        }
    }
}

/// Plain-value settings for a recognizer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Longest span, in tokens, that can be recognized as one entity.
    pub max_tokens: usize,
    pub text_builder: TextBuilderKind,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            text_builder: TextBuilderKind::default(),
        }
    }
}

impl RecognizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(Error::InvalidMaxTokens(self.max_tokens));
        }
        Ok(())
    }
}
