//! Tokens flowing through the recognition pipeline.

use std::collections::BTreeMap;
use std::fmt;

use smallvec::SmallVec;

/// Metadata key under which entity tokens carry their identifiers.
pub const ENTITY_IDS: &str = "entity_ids";

/// The type tag of a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Regular word
    #[default]
    Word,
    /// Span recognized as a dictionary entity
    Entity,
    /// Any other tag assigned upstream
    Other(String),
}

impl TokenType {
    pub fn as_str(&self) -> &str {
        match self {
            TokenType::Word => "word",
            TokenType::Entity => "entity",
            TokenType::Other(tag) => tag,
        }
    }
}

impl From<&str> for TokenType {
    fn from(tag: &str) -> Self {
        match tag {
            "word" => TokenType::Word,
            "entity" => TokenType::Entity,
            other => TokenType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multi-valued, string-keyed token metadata.
///
/// Values under one key keep insertion order and may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    fields: BTreeMap<String, SmallVec<[String; 1]>>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` under `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(key.into()).or_default().push(value.into());
    }

    /// All values under `key`; empty if the key is absent.
    pub fn get(&self, key: &str) -> &[String] {
        self.fields.get(key).map(|values| values.as_slice()).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A unit of text with a type tag and metadata.
///
/// Tokens are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    text: String,
    token_type: TokenType,
    metadata: Metadata,
}

impl Token {
    /// Create a new token of type [`TokenType::Word`].
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            token_type: TokenType::Word,
            metadata: Metadata::new(),
        }
    }

    /// Create an entity token carrying `ids` under [`ENTITY_IDS`].
    pub fn entity<I, S>(text: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut metadata = Metadata::new();
        for id in ids {
            metadata.add(ENTITY_IDS, id);
        }
        Self {
            text: text.into(),
            token_type: TokenType::Entity,
            metadata,
        }
    }

    /// Set token type
    pub fn with_type(mut self, token_type: impl Into<TokenType>) -> Self {
        self.token_type = token_type.into();
        self
    }

    /// Add a metadata value
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.add(key, value);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn token_type(&self) -> &TokenType {
        &self.token_type
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn is_entity(&self) -> bool {
        self.token_type == TokenType::Entity
    }

    /// Identifiers attached by the recognizer; empty for non-entity tokens.
    pub fn entity_ids(&self) -> &[String] {
        self.metadata.get(ENTITY_IDS)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
