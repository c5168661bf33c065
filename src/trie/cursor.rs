//! Cursor-driven traversal.
//!
//! A cursor is called once per visited entry and steers the walk with a
//! [`Decision`]. Entries can be removed mid-walk; removal never allocates, so
//! the pending traversal stack stays valid.

use std::borrow::Borrow;

use super::{Link, PatriciaTrie};
use crate::trie::KeyAnalyzer;

/// What a cursor wants after seeing an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Move on to the next entry.
    Continue,
    /// Stop here; the current entry is returned to the caller.
    Exit,
    /// Remove the current entry and move on.
    Remove,
}

impl<K, V, A> PatriciaTrie<K, V, A>
where
    A: KeyAnalyzer,
    K: Borrow<A::Key>,
{
    /// Walks entries in key order starting at the first key not less than
    /// `key`, until the cursor exits or the trie is exhausted.
    ///
    /// Returns the entry the cursor exited on.
    pub fn select<F>(&mut self, key: &A::Key, cursor: F) -> Option<(&K, &V)>
    where
        F: FnMut(&K, &V) -> Decision,
    {
        let stack = self.seek(key);
        self.walk(stack, cursor)
    }

    /// Walks every entry in key order. See [`select`](Self::select).
    pub fn traverse<F>(&mut self, cursor: F) -> Option<(&K, &V)>
    where
        F: FnMut(&K, &V) -> Decision,
    {
        let stack = self.root.into_iter().collect();
        self.walk(stack, cursor)
    }

    fn walk<F>(&mut self, mut stack: Vec<Link>, mut cursor: F) -> Option<(&K, &V)>
    where
        F: FnMut(&K, &V) -> Decision,
    {
        let mut exit = None;
        while let Some(link) = stack.pop() {
            let e = match link {
                Link::Terminal(e) => e,
                Link::Down(b) => {
                    let [clear, set] = self.branch(b).children;
                    stack.push(set);
                    stack.push(clear);
                    continue;
                }
            };

            let entry = self.entry(e);
            match cursor(&entry.key, &entry.value) {
                Decision::Continue => {}
                Decision::Exit => {
                    exit = Some(e);
                    break;
                }
                Decision::Remove => {
                    let loc = self.locate(entry.key.borrow());
                    match loc {
                        Some(loc) if loc.entry == e => {
                            self.unlink(loc);
                        }
                        _ => panic!("terminal link {e} not reachable by its own key"),
                    }
                }
            }
        }

        exit.map(|e| {
            let entry = self.entry(e);
            (&entry.key, &entry.value)
        })
    }
}
