//! The entity dictionary: literal phrases mapped to entity identifier sets.
//!
//! A dictionary is loaded once through [`DictionaryBuilder`] from a sequence of
//! `(phrase, identifier)` pairs. Repeated phrases accumulate identifiers
//! rather than overwrite them. [`DictionaryBuilder::build`] freezes the result
//! into a read-only [`EntityDictionary`].
//!
//! ```
//! use entity_trie::EntityDictionary;
//!
//! let dict = EntityDictionary::from_pairs([
//!     ("New York", "Q60"),
//!     ("New York", "Q1384"),
//!     ("Boston", "Q100"),
//! ])
//! .unwrap();
//!
//! assert_eq!(dict.len(), 2);
//! assert_eq!(dict.get("New York").unwrap().len(), 2);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::io::BufRead;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::trie::{PatriciaTrie, Utf16KeyAnalyzer};

/// Identifiers a literal phrase may resolve to.
pub type EntityIds = BTreeSet<String>;

/// Phrases are keyed by their UTF-16 code units so each lookup encodes the
/// probe once.
type PhraseTrie = PatriciaTrie<Vec<u16>, Phrase, Utf16KeyAnalyzer>;

/// Lookup keys up to this many code units stay on the stack.
type Units = SmallVec<[u16; 32]>;

#[derive(Debug, Clone)]
struct Phrase {
    text: String,
    ids: EntityIds,
}

fn encode(phrase: &str) -> Units {
    phrase.encode_utf16().collect()
}

/// Accumulates `(phrase, identifier)` pairs into a dictionary.
#[derive(Debug, Default)]
pub struct DictionaryBuilder {
    trie: PhraseTrie,
    pairs: usize,
}

impl DictionaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` to the identifier set of `phrase`, creating the set on first
    /// sight. Phrases are matched exactly, case as given.
    ///
    /// Phrases may not be empty or contain NUL, which the trie cannot tell
    /// apart from the end of a key.
    pub fn add(&mut self, phrase: impl Into<String>, id: impl Into<String>) -> Result<()> {
        let phrase = phrase.into();
        if phrase.is_empty() {
            return Err(Error::EmptyPhrase);
        }
        if phrase.contains('\0') {
            return Err(Error::NulInPhrase(phrase));
        }
        let id = id.into();
        self.pairs += 1;

        let key: Vec<u16> = phrase.encode_utf16().collect();
        match self.trie.get_mut(&key) {
            Some(entry) => {
                if !entry.ids.insert(id) {
                    trace!(%phrase, "duplicate identifier for phrase");
                }
            }
            None => {
                let ids = EntityIds::from([id]);
                self.trie.insert(key, Phrase { text: phrase, ids });
            }
        }
        Ok(())
    }

    /// Adds every pair from `pairs`, stopping at the first invalid one.
    pub fn extend<I, P, S>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<String>,
        S: Into<String>,
    {
        for (phrase, id) in pairs {
            self.add(phrase, id)?;
        }
        Ok(())
    }

    /// Adds every pair read from `phrase<TAB>identifier` lines.
    /// See [`read_pairs`].
    pub fn load_lines<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for pair in read_pairs(reader) {
            let (phrase, id) = pair?;
            self.add(phrase, id)?;
        }
        Ok(())
    }

    /// Number of distinct phrases so far.
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    /// Freezes the builder into a read-only dictionary.
    pub fn build(self) -> EntityDictionary {
        debug!(
            phrases = self.trie.len(),
            pairs = self.pairs,
            "entity dictionary built"
        );
        EntityDictionary {
            trie: self.trie,
            pairs: self.pairs,
        }
    }
}

/// A read-only mapping from literal phrases to entity identifier sets.
///
/// Immutable after construction, so it can be shared freely between
/// recognizers (typically behind an `Arc`).
#[derive(Clone, Default)]
pub struct EntityDictionary {
    trie: PhraseTrie,
    pairs: usize,
}

impl fmt::Debug for EntityDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl EntityDictionary {
    pub fn builder() -> DictionaryBuilder {
        DictionaryBuilder::new()
    }

    /// Loads a dictionary from `(phrase, identifier)` pairs in one step.
    pub fn from_pairs<I, P, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<String>,
        S: Into<String>,
    {
        let mut builder = DictionaryBuilder::new();
        builder.extend(pairs)?;
        Ok(builder.build())
    }

    /// Identifiers of exactly `phrase`.
    pub fn get(&self, phrase: &str) -> Option<&EntityIds> {
        // The trie pads keys with zeros, so "Foo\0" lands on "Foo".
        self.trie
            .get(&encode(phrase))
            .filter(|entry| entry.text == phrase)
            .map(|entry| &entry.ids)
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.get(phrase).is_some()
    }

    /// Entries whose phrase starts with `prefix`, in phrase order.
    pub fn prefixed_by<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a EntityIds)> + 'a {
        self.trie
            .iter_from(&encode(prefix))
            .map(|(_, entry)| (entry.text.as_str(), &entry.ids))
            .take_while(move |(text, _)| text.starts_with(prefix))
    }

    /// Every entry in phrase (UTF-16) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityIds)> + '_ {
        self.trie.iter().map(|(_, entry)| (entry.text.as_str(), &entry.ids))
    }

    /// Number of distinct phrases.
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    /// Number of pairs consumed while loading, duplicates included.
    pub fn pair_count(&self) -> usize {
        self.pairs
    }
}

/// Parses `phrase<TAB>identifier` lines.
///
/// Empty lines and lines starting with `#` are skipped. Surrounding
/// whitespace is trimmed from both fields, and a line left without a phrase
/// or an identifier is malformed.
pub fn read_pairs<R: BufRead>(reader: R) -> impl Iterator<Item = Result<(String, String)>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(i, line)| match line {
            Err(e) => Some(Err(Error::Io(e))),
            Ok(line) => parse_line(i + 1, line).transpose(),
        })
}

fn parse_line(number: usize, line: String) -> Result<Option<(String, String)>> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let fields = trimmed
        .split_once('\t')
        .map(|(phrase, id)| (phrase.trim(), id.trim()));
    match fields {
        Some((phrase, id)) if !phrase.is_empty() && !id.is_empty() => {
            Ok(Some((phrase.to_string(), id.to_string())))
        }
        _ => Err(Error::MalformedLine {
            line: number,
            content: line,
        }),
    }
}
