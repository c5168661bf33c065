//! Sliding-window longest-match entity recognition.
//!
//! A [`Recognizer`] pulls tokens from an upstream source into a window of at
//! most `max_tokens` tokens. Each call to `next` then tries the window's
//! leading spans against the dictionary, longest first:
//!
//! 1. fill the window until it is full or the source is exhausted
//! 2. for `len` from the window size down to 1, build the candidate key for
//!    the first `len` tokens and look it up
//! 3. on the first hit, replace those tokens with one entity token
//! 4. with no hit, pass the first token through unchanged
//!
//! The window is anchored at its first token every call, so the longest hit
//! always wins and no further tie-break is needed.
//!
//! The source is any iterator of `Result<Token, E>`; its errors are handed
//! back unchanged and the recognizer is itself such an iterator, so stages
//! compose.
//!
//! ```
//! use std::sync::Arc;
//! use entity_trie::{tokens, EntityDictionary, RecognizerBuilder, Token};
//!
//! let dict = Arc::new(EntityDictionary::from_pairs([("Lime Wire", "org1")]).unwrap());
//! let input = ["Lime", "Wire", "is", "great"].map(Token::new);
//!
//! let output: Vec<Token> = RecognizerBuilder::new()
//!     .dictionary(dict)
//!     .max_tokens(3)
//!     .build(tokens(input))
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(output[0], Token::entity("Lime Wire", ["org1"]));
//! assert_eq!(output.len(), 3);
//! ```

mod window;

use std::convert::Infallible;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::{Joiner, RecognizerConfig, TextBuilder, DEFAULT_MAX_TOKENS};
use crate::dictionary::{EntityDictionary, EntityIds};
use crate::error::{Error, Result};
use crate::token::Token;

use self::window::Window;

/// Wraps an infallible token sequence as a recognizer source.
pub fn tokens<I>(tokens: I) -> impl Iterator<Item = std::result::Result<Token, Infallible>>
where
    I: IntoIterator<Item = Token>,
{
    tokens.into_iter().map(Ok)
}

/// The winning span of one recognition step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Candidate key that hit the dictionary.
    pub key: String,
    /// Identifiers stored under `key`.
    pub ids: EntityIds,
    /// Number of window tokens the span covers.
    pub len: usize,
}

impl Match {
    pub fn into_token(self) -> Token {
        Token::entity(self.key, self.ids)
    }
}

/// Assembles a fully configured [`Recognizer`].
pub struct RecognizerBuilder {
    dictionary: Option<Arc<EntityDictionary>>,
    max_tokens: usize,
    text_builder: Box<dyn TextBuilder>,
}

impl Default for RecognizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecognizerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognizerBuilder")
            .field("has_dictionary", &self.dictionary.is_some())
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl RecognizerBuilder {
    pub fn new() -> Self {
        Self {
            dictionary: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            text_builder: Box::new(Joiner::space()),
        }
    }

    /// Starts from configured window size and text builder. The dictionary
    /// still has to be supplied.
    pub fn from_config(config: &RecognizerConfig) -> Self {
        Self {
            dictionary: None,
            max_tokens: config.max_tokens,
            text_builder: config.text_builder.clone().into_builder(),
        }
    }

    pub fn dictionary(mut self, dictionary: impl Into<Arc<EntityDictionary>>) -> Self {
        self.dictionary = Some(dictionary.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn text_builder(mut self, text_builder: impl TextBuilder + 'static) -> Self {
        self.text_builder = Box::new(text_builder);
        self
    }

    /// Binds the configuration to an upstream `source`.
    pub fn build<S, E>(self, source: S) -> Result<Recognizer<S>>
    where
        S: Iterator<Item = std::result::Result<Token, E>>,
    {
        let dictionary = self.dictionary.ok_or(Error::MissingDictionary)?;
        if self.max_tokens == 0 {
            return Err(Error::InvalidMaxTokens(self.max_tokens));
        }
        debug!(
            max_tokens = self.max_tokens,
            phrases = dictionary.len(),
            "entity recognizer ready"
        );
        Ok(Recognizer {
            source,
            exhausted: false,
            dictionary,
            text_builder: self.text_builder,
            window: Window::new(self.max_tokens),
            candidate: String::new(),
        })
    }
}

/// A token stream that replaces dictionary phrases with entity tokens.
///
/// Built by [`RecognizerBuilder`]. Holds at most `max_tokens` tokens.
pub struct Recognizer<S> {
    source: S,
    exhausted: bool,
    dictionary: Arc<EntityDictionary>,
    text_builder: Box<dyn TextBuilder>,
    window: Window,
    /// Reused candidate key buffer.
    candidate: String,
}

impl<S> fmt::Debug for Recognizer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recognizer")
            .field("max_tokens", &self.window.capacity())
            .field("buffered", &self.window.len())
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

impl<S> Recognizer<S> {
    pub fn max_tokens(&self) -> usize {
        self.window.capacity()
    }

    pub fn dictionary(&self) -> &Arc<EntityDictionary> {
        &self.dictionary
    }

    /// Gives back the upstream source, dropping any buffered tokens.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Longest leading window span with a dictionary hit.
    fn longest_match(&mut self) -> Option<Match> {
        for len in (1..=self.window.len()).rev() {
            self.candidate.clear();
            self.text_builder
                .build(self.window.front(len), &mut self.candidate);
            if let Some(ids) = self.dictionary.get(&self.candidate) {
                return Some(Match {
                    key: self.candidate.clone(),
                    ids: ids.clone(),
                    len,
                });
            }
        }
        None
    }
}

impl<S, E> Recognizer<S>
where
    S: Iterator<Item = std::result::Result<Token, E>>,
{
    fn fill(&mut self) -> std::result::Result<(), E> {
        while !self.exhausted && !self.window.is_full() {
            match self.source.next() {
                Some(Ok(token)) => self.window.push(token),
                Some(Err(e)) => return Err(e),
                None => self.exhausted = true,
            }
        }
        Ok(())
    }
}

impl<S, E> Iterator for Recognizer<S>
where
    S: Iterator<Item = std::result::Result<Token, E>>,
{
    type Item = std::result::Result<Token, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(e) = self.fill() {
            return Some(Err(e));
        }
        if self.window.is_empty() {
            return None;
        }

        if let Some(m) = self.longest_match() {
            trace!(entity = %m.key, span = m.len, ids = m.ids.len(), "entity matched");
            self.window.consume(m.len);
            return Some(Ok(m.into_token()));
        }

        self.window.pop_front().map(Ok)
    }
}

impl<S, E> FusedIterator for Recognizer<S> where S: Iterator<Item = std::result::Result<Token, E>> {}
