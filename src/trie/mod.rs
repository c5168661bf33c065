//! PATRICIA trie over bit-addressable keys.
//!
//! Branch nodes only store the bit position they discriminate on; entries
//! store full keys (needed for verification anyway). Both live in arenas and
//! are joined by a tagged `Link`:
//!
//! - `Down(branch)`: descend to a branch testing a strictly later bit
//! - `Terminal(entry)`: the walk ends at a stored entry
//!
//! Every branch has exactly two links, so there are no null children. A trie
//! with `n` entries holds `n - 1` branches. For any two stored keys, the
//! branch where their paths split tests their first differing bit.

mod analyzer;
mod cursor;

pub use analyzer::{BitIndex, ByteKeyAnalyzer, KeyAnalyzer, StringKeyAnalyzer, Utf16KeyAnalyzer};
pub use cursor::Decision;

use std::borrow::Borrow;
use std::fmt;

// =============================================================================
// Arena types
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Link {
    Down(usize),
    Terminal(usize),
}

#[derive(Clone, Debug)]
struct Branch {
    /// Discriminator bit index.
    bit: usize,
    /// `[bit clear, bit set]`
    children: [Link; 2],
}

#[derive(Clone, Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Location of a link: the root pointer or one side of a branch.
#[derive(Clone, Copy, Debug)]
enum Slot {
    Root,
    Child(usize, usize),
}

/// Path information for unlinking a stored entry.
#[derive(Clone, Copy, Debug)]
struct Location {
    entry: usize,
    /// `(branch, side of the entry, slot holding the branch)`
    parent: Option<(usize, usize, Slot)>,
}

// =============================================================================
// PatriciaTrie
// =============================================================================

/// An ordered map from bit-sequence keys to values.
///
/// `K` is the owned key stored in the trie; lookups borrow it as the
/// analyzer's `Key` type, so a `PatriciaTrie<String, V>` is queried with
/// `&str`.
///
/// Keys that differ only by trailing zero elements (NUL characters, 0x00
/// bytes) are indistinguishable at the bit level and map to the same entry.
#[derive(Clone)]
pub struct PatriciaTrie<K, V, A = StringKeyAnalyzer> {
    analyzer: A,
    branches: Vec<Option<Branch>>,
    entries: Vec<Option<Entry<K, V>>>,
    free_branches: Vec<usize>,
    free_entries: Vec<usize>,
    root: Option<Link>,
    count: usize,
}

impl<K, V, A: Default> PatriciaTrie<K, V, A> {
    pub fn new() -> Self {
        Self::with_analyzer(A::default())
    }
}

impl<K, V, A: Default> Default for PatriciaTrie<K, V, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, A> PatriciaTrie<K, V, A> {
    pub fn with_analyzer(analyzer: A) -> Self {
        Self {
            analyzer,
            branches: Vec::new(),
            entries: Vec::new(),
            free_branches: Vec::new(),
            free_entries: Vec::new(),
            root: None,
            count: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    pub fn clear(&mut self) {
        self.branches.clear();
        self.entries.clear();
        self.free_branches.clear();
        self.free_entries.clear();
        self.root = None;
        self.count = 0;
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> Iter<'_, K, V, A> {
        Iter {
            trie: self,
            stack: self.root.into_iter().collect(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Smallest entry in key order.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.root.map(|link| self.edge_entry(link, 0))
    }

    /// Largest entry in key order.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.root.map(|link| self.edge_entry(link, 1))
    }

    fn edge_entry(&self, mut link: Link, side: usize) -> (&K, &V) {
        loop {
            match link {
                Link::Down(b) => link = self.branch(b).children[side],
                Link::Terminal(e) => {
                    let entry = self.entry(e);
                    return (&entry.key, &entry.value);
                }
            }
        }
    }

    // =========================================================================
    // Arena access
    // =========================================================================

    #[inline]
    fn branch(&self, id: usize) -> &Branch {
        match self.branches.get(id) {
            Some(Some(branch)) => branch,
            _ => panic!("dangling branch link {id}"),
        }
    }

    #[inline]
    fn branch_mut(&mut self, id: usize) -> &mut Branch {
        match self.branches.get_mut(id) {
            Some(Some(branch)) => branch,
            _ => panic!("dangling branch link {id}"),
        }
    }

    #[inline]
    fn entry(&self, id: usize) -> &Entry<K, V> {
        match self.entries.get(id) {
            Some(Some(entry)) => entry,
            _ => panic!("dangling terminal link {id}"),
        }
    }

    #[inline]
    fn entry_mut(&mut self, id: usize) -> &mut Entry<K, V> {
        match self.entries.get_mut(id) {
            Some(Some(entry)) => entry,
            _ => panic!("dangling terminal link {id}"),
        }
    }

    fn alloc_branch(&mut self, branch: Branch) -> usize {
        match self.free_branches.pop() {
            Some(id) => {
                self.branches[id] = Some(branch);
                id
            }
            None => {
                self.branches.push(Some(branch));
                self.branches.len() - 1
            }
        }
    }

    fn alloc_entry(&mut self, key: K, value: V) -> usize {
        let entry = Some(Entry { key, value });
        match self.free_entries.pop() {
            Some(id) => {
                self.entries[id] = entry;
                id
            }
            None => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
        }
    }

    fn set_link(&mut self, slot: Slot, link: Link) {
        match slot {
            Slot::Root => self.root = Some(link),
            Slot::Child(b, side) => self.branch_mut(b).children[side] = link,
        }
    }

    /// Detaches a located entry, collapsing its parent branch into the sibling.
    fn unlink(&mut self, loc: Location) -> V {
        match loc.parent {
            None => self.root = None,
            Some((b, side, slot)) => {
                let sibling = self.branch(b).children[1 - side];
                self.set_link(slot, sibling);
                self.branches[b] = None;
                self.free_branches.push(b);
            }
        }

        let entry = match self.entries[loc.entry].take() {
            Some(entry) => entry,
            None => panic!("dangling terminal link {}", loc.entry),
        };
        self.free_entries.push(loc.entry);
        self.count -= 1;
        if self.count == 0 {
            self.clear();
        }
        entry.value
    }
}

impl<K, V, A> PatriciaTrie<K, V, A>
where
    A: KeyAnalyzer,
    K: Borrow<A::Key>,
{
    /// Follows `key`'s bits from `link` down to a terminal.
    fn descend(&self, mut link: Link, key: &A::Key, length: usize) -> usize {
        loop {
            match link {
                Link::Terminal(e) => return e,
                Link::Down(b) => {
                    let branch = self.branch(b);
                    let side = self.analyzer.is_bit_set(key, branch.bit, length) as usize;
                    link = branch.children[side];
                }
            }
        }
    }

    fn compare_stored(&self, entry: usize, key: &A::Key, length: usize) -> BitIndex {
        let stored = self.entry(entry).key.borrow();
        self.analyzer
            .bit_index(key, 0, length, stored, 0, self.analyzer.length(stored))
    }

    /// Finds the entry equal to `key`, if any.
    fn find(&self, key: &A::Key) -> Option<usize> {
        let root = self.root?;
        let length = self.analyzer.length(key);
        let e = self.descend(root, key, length);
        self.compare_stored(e, key, length).is_equal().then_some(e)
    }

    fn locate(&self, key: &A::Key) -> Option<Location> {
        let length = self.analyzer.length(key);
        let mut link = self.root?;
        let mut slot = Slot::Root;
        let mut parent = None;
        let entry = loop {
            match link {
                Link::Terminal(e) => break e,
                Link::Down(b) => {
                    let branch = self.branch(b);
                    let side = self.analyzer.is_bit_set(key, branch.bit, length) as usize;
                    parent = Some((b, side, slot));
                    slot = Slot::Child(b, side);
                    link = branch.children[side];
                }
            }
        };
        self.compare_stored(entry, key, length)
            .is_equal()
            .then_some(Location { entry, parent })
    }

    pub fn get(&self, key: &A::Key) -> Option<&V> {
        self.find(key).map(|e| &self.entry(e).value)
    }

    pub fn get_mut(&mut self, key: &A::Key) -> Option<&mut V> {
        let e = self.find(key)?;
        Some(&mut self.entry_mut(e).value)
    }

    pub fn contains_key(&self, key: &A::Key) -> bool {
        self.find(key).is_some()
    }

    /// Inserts `value` under `key`, returning the replaced value if the key
    /// was already present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let Some(root) = self.root else {
            let e = self.alloc_entry(key, value);
            self.root = Some(Link::Terminal(e));
            self.count = 1;
            return None;
        };

        let length = self.analyzer.length(key.borrow());
        let nearest = self.descend(root, key.borrow(), length);
        let diff = match self.compare_stored(nearest, key.borrow(), length) {
            BitIndex::Differs(bit) => bit,
            BitIndex::Equal | BitIndex::AllNull => {
                return Some(std::mem::replace(&mut self.entry_mut(nearest).value, value));
            }
        };

        // Splice the new branch above the first link testing a later bit.
        let mut slot = Slot::Root;
        let mut link = root;
        while let Link::Down(b) = link {
            let branch = self.branch(b);
            debug_assert_ne!(branch.bit, diff, "split bit already discriminated on path");
            if branch.bit > diff {
                break;
            }
            let side = self.analyzer.is_bit_set(key.borrow(), branch.bit, length) as usize;
            slot = Slot::Child(b, side);
            link = branch.children[side];
        }

        let side = self.analyzer.is_bit_set(key.borrow(), diff, length) as usize;
        let e = self.alloc_entry(key, value);
        let mut children = [link, link];
        children[side] = Link::Terminal(e);
        let b = self.alloc_branch(Branch { bit: diff, children });
        self.set_link(slot, Link::Down(b));
        self.count += 1;
        None
    }

    pub fn remove(&mut self, key: &A::Key) -> Option<V> {
        let loc = self.locate(key)?;
        Some(self.unlink(loc))
    }

    /// The stored entry sharing the longest bit prefix with `key`.
    pub fn nearest(&self, key: &A::Key) -> Option<(&K, &V)> {
        let root = self.root?;
        let e = self.descend(root, key, self.analyzer.length(key));
        let entry = self.entry(e);
        Some((&entry.key, &entry.value))
    }

    /// Iterates, in key order, every entry whose key starts with `prefix`.
    /// Yields nothing when no key has the prefix.
    pub fn prefixed_by<'a>(&'a self, prefix: &'a A::Key) -> Prefixed<'a, K, V, A> {
        let length = self.analyzer.length(prefix);
        let mut start = self.root;
        while let Some(Link::Down(b)) = start {
            let branch = self.branch(b);
            if branch.bit >= length {
                break;
            }
            let side = self.analyzer.is_bit_set(prefix, branch.bit, length) as usize;
            start = Some(branch.children[side]);
        }

        // Every key below `start` agrees on the first `length` bits, so a
        // single probe decides whether the subtree is worth walking.
        let stack = match start {
            Some(link) => {
                let (probe, _) = self.edge_entry(link, 0);
                let shares_bits = self
                    .analyzer
                    .bit_index(prefix, 0, length, probe.borrow(), 0, length)
                    .is_equal();
                if shares_bits {
                    vec![link]
                } else {
                    Vec::new()
                }
            }
            None => Vec::new(),
        };

        Prefixed {
            inner: Iter { trie: self, stack },
            prefix,
            length,
        }
    }

    /// Iterates entries in key order, starting at the first key not less
    /// than `key`.
    pub fn iter_from(&self, key: &A::Key) -> Iter<'_, K, V, A> {
        Iter {
            trie: self,
            stack: self.seek(key),
        }
    }

    /// Builds an in-order traversal stack positioned at the ceiling of `key`.
    fn seek(&self, key: &A::Key) -> Vec<Link> {
        let mut stack = Vec::new();
        let Some(root) = self.root else {
            return stack;
        };

        let length = self.analyzer.length(key);
        let nearest = self.descend(root, key, length);
        let diff = match self.compare_stored(nearest, key, length) {
            BitIndex::Differs(bit) => Some(bit),
            BitIndex::Equal | BitIndex::AllNull => None,
        };

        let mut link = root;
        while let Link::Down(b) = link {
            let branch = self.branch(b);
            if diff.is_some_and(|d| branch.bit > d) {
                break;
            }
            let side = self.analyzer.is_bit_set(key, branch.bit, length) as usize;
            if side == 0 {
                stack.push(branch.children[1]);
            }
            link = branch.children[side];
        }

        // `link` now roots every key sharing `key`'s first `diff` bits. They
        // all sort after `key` when its bit at `diff` is clear.
        match diff {
            Some(d) if self.analyzer.is_bit_set(key, d, length) => {}
            _ => stack.push(link),
        }
        stack
    }
}

impl<K, V, A> FromIterator<(K, V)> for PatriciaTrie<K, V, A>
where
    A: KeyAnalyzer + Default,
    K: Borrow<A::Key>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

impl<K, V, A> Extend<(K, V)> for PatriciaTrie<K, V, A>
where
    A: KeyAnalyzer,
    K: Borrow<A::Key>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, A> fmt::Debug for PatriciaTrie<K, V, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, A> IntoIterator for &'a PatriciaTrie<K, V, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Iterators
// =============================================================================

pub struct Iter<'a, K, V, A> {
    trie: &'a PatriciaTrie<K, V, A>,
    stack: Vec<Link>,
}

impl<'a, K, V, A> Iterator for Iter<'a, K, V, A> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(link) = self.stack.pop() {
            match link {
                Link::Terminal(e) => {
                    let entry = self.trie.entry(e);
                    return Some((&entry.key, &entry.value));
                }
                Link::Down(b) => {
                    let [clear, set] = self.trie.branch(b).children;
                    self.stack.push(set);
                    self.stack.push(clear);
                }
            }
        }
        None
    }
}

/// Iterator returned by [`PatriciaTrie::prefixed_by`].
pub struct Prefixed<'a, K, V, A: KeyAnalyzer> {
    inner: Iter<'a, K, V, A>,
    prefix: &'a A::Key,
    length: usize,
}

impl<'a, K, V, A> Iterator for Prefixed<'a, K, V, A>
where
    A: KeyAnalyzer,
    K: Borrow<A::Key>,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let trie = self.inner.trie;
        let (prefix, length) = (self.prefix, self.length);
        self.inner
            .by_ref()
            .find(|(k, _)| trie.analyzer.is_prefix(prefix, 0, length, (*k).borrow()))
    }
}


#[cfg(test)]
mod proptests;
