//! # entity-trie
//!
//! Dictionary entity recognition over token streams.
//!
//! The dictionary is a PATRICIA trie ([`PatriciaTrie`]) mapping literal
//! phrases to entity identifier sets. A [`Recognizer`] slides a bounded
//! window over an upstream token stream and replaces the longest phrase it
//! finds at each position with a single entity token.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use entity_trie::{tokens, EntityDictionary, RecognizerBuilder, Token};
//!
//! let dict = EntityDictionary::from_pairs([
//!     ("New York City", "id1"),
//!     ("New York", "id2"),
//! ])
//! .unwrap();
//!
//! let input = ["New", "York", "City"].map(Token::new);
//! let mut recognizer = RecognizerBuilder::new()
//!     .dictionary(Arc::new(dict))
//!     .max_tokens(3)
//!     .build(tokens(input))
//!     .unwrap();
//!
//! let token = recognizer.next().unwrap().unwrap();
//! assert_eq!(token.text(), "New York City");
//! assert_eq!(token.entity_ids(), ["id1"]);
//! assert!(recognizer.next().is_none());
//! ```

pub mod config;
pub mod dictionary;
pub mod error;
pub mod recognizer;
pub mod token;
pub mod trie;

pub use config::{Joiner, RecognizerConfig, TextBuilder, TextBuilderKind, DEFAULT_MAX_TOKENS};
pub use dictionary::{read_pairs, DictionaryBuilder, EntityDictionary, EntityIds};
pub use error::{Error, Result};
pub use recognizer::{tokens, Match, Recognizer, RecognizerBuilder};
pub use token::{Metadata, Token, TokenType, ENTITY_IDS};
pub use trie::{
    BitIndex, ByteKeyAnalyzer, Decision, KeyAnalyzer, PatriciaTrie, StringKeyAnalyzer,
    Utf16KeyAnalyzer,
};
