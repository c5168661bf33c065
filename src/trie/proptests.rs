use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

/// Checks the structural invariants of a trie:
/// - discriminator bits strictly increase along every path
/// - each branch's two sides first differ at exactly its bit
/// - live arena slots match the entry count (`n` entries, `n - 1` branches)
fn validate_trie<K, V, A>(t: &PatriciaTrie<K, V, A>)
where
    A: KeyAnalyzer,
    K: Borrow<A::Key>,
{
    let live_entries = t.entries.iter().filter(|e| e.is_some()).count();
    let live_branches = t.branches.iter().filter(|b| b.is_some()).count();
    assert_eq!(live_entries, t.len(), "live entries must match len");
    assert_eq!(
        live_branches,
        t.len().saturating_sub(1),
        "a trie with n entries has n - 1 branches"
    );

    let mut stack: Vec<(Link, Option<usize>)> = t.root.into_iter().map(|l| (l, None)).collect();
    let mut terminals = 0usize;
    while let Some((link, parent_bit)) = stack.pop() {
        match link {
            Link::Terminal(_) => terminals += 1,
            Link::Down(b) => {
                let branch = t.branch(b);
                if let Some(pb) = parent_bit {
                    assert!(branch.bit > pb, "bits must increase downward");
                }

                let (clear, _) = t.edge_entry(branch.children[0], 0);
                let (set, _) = t.edge_entry(branch.children[1], 0);
                let clear: &A::Key = clear.borrow();
                let set: &A::Key = set.borrow();
                let bi = t.analyzer.bit_index(
                    clear,
                    0,
                    t.analyzer.length(clear),
                    set,
                    0,
                    t.analyzer.length(set),
                );
                assert_eq!(bi, BitIndex::Differs(branch.bit), "branch bit is the first difference");

                stack.extend(branch.children.iter().map(|&c| (c, Some(branch.bit))));
            }
        }
    }
    assert_eq!(terminals, t.len(), "reachable terminals must match len");
}

#[derive(Clone, Debug)]
enum Op {
    Insert(Vec<u8>, u64),
    Remove(Vec<u8>),
    Get(Vec<u8>),
    Prefix(Vec<u8>),
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // Keys that differ only by trailing 0x00 bytes are not distinguishable at
    // the bit level, so keep 0x00 out. A small alphabet forces shared prefixes.
    prop::collection::vec(1u8..=6, 0..=10)
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        50 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        25 => key.clone().prop_map(Op::Remove),
        20 => key.clone().prop_map(Op::Get),
        5 => prop::collection::vec(1u8..=6, 0..=3).prop_map(Op::Prefix),
    ];
    prop::collection::vec(op, 0..=500)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut t: PatriciaTrie<Vec<u8>, u64, ByteKeyAnalyzer> = PatriciaTrie::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let old_t = t.insert(key.clone(), value);
                    let old_m = m.insert(key, value);
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Remove(key) => {
                    let old_t = t.remove(&key);
                    let old_m = m.remove(key.as_slice());
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key).copied(), m.get(key.as_slice()).copied());
                    prop_assert_eq!(t.contains_key(&key), m.contains_key(key.as_slice()));
                }
                Op::Prefix(prefix) => {
                    let got: Vec<Vec<u8>> = t.prefixed_by(&prefix).map(|(k, _)| k.clone()).collect();
                    let expected: Vec<Vec<u8>> =
                        m.keys().filter(|k| k.starts_with(&prefix)).cloned().collect();
                    prop_assert_eq!(got, expected);
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_trie(&t);
        let got: Vec<(Vec<u8>, u64)> = t.iter().map(|(k, v)| (k.clone(), *v)).collect();
        let expected: Vec<(Vec<u8>, u64)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_iter_from_matches_range(
        keys in prop::collection::vec(key_strategy(), 0..=64),
        probe in key_strategy(),
    ) {
        let t: PatriciaTrie<Vec<u8>, (), ByteKeyAnalyzer> =
            keys.iter().map(|k| (k.clone(), ())).collect();
        let m: BTreeMap<Vec<u8>, ()> = keys.into_iter().map(|k| (k, ())).collect();

        let got: Vec<Vec<u8>> = t.iter_from(&probe).map(|(k, _)| k.clone()).collect();
        let expected: Vec<Vec<u8>> = m.range(probe..).map(|(k, _)| k.clone()).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_string_keys_sort_like_utf16(keys in prop::collection::vec("[a-zA-Z ]{0,8}", 0..=64)) {
        let t: PatriciaTrie<String, ()> = keys.iter().map(|k| (k.clone(), ())).collect();
        validate_trie(&t);

        let mut expected: Vec<String> = keys;
        expected.sort();
        expected.dedup();
        let got: Vec<String> = t.keys().cloned().collect();
        prop_assert_eq!(got, expected);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

fn small_key_set() -> Vec<String> {
    ["L", "La", "Lake", "Lax", "Lovely", "M"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys = small_key_set();

    for_each_permutation(&keys, |perm| {
        let mut t: PatriciaTrie<String, u64> = PatriciaTrie::new();
        let mut m: BTreeMap<String, u64> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            let v = i as u64;
            assert_eq!(t.insert(k.clone(), v), m.insert(k, v));
        }

        validate_trie(&t);
        let got: Vec<(String, u64)> = t.iter().map(|(k, v)| (k.clone(), *v)).collect();
        let expected: Vec<(String, u64)> = m.into_iter().collect();
        assert_eq!(got, expected);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys = small_key_set();

    // Insert in a fixed order, then remove in all permutations.
    let mut base_trie: PatriciaTrie<String, u64> = PatriciaTrie::new();
    let mut base_map: BTreeMap<String, u64> = BTreeMap::new();
    for (i, k) in keys.iter().enumerate() {
        let v = i as u64;
        assert_eq!(base_trie.insert(k.clone(), v), base_map.insert(k.clone(), v));
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base_trie.clone();
        let mut m = base_map.clone();

        for k in perm {
            assert_eq!(t.remove(&k), m.remove(&k));
            assert_eq!(t.len(), m.len());
            validate_trie(&t);
            let prefixed: Vec<&String> = t.prefixed_by("La").map(|(k, _)| k).collect();
            let expected: Vec<&String> = m.keys().filter(|k| k.starts_with("La")).collect();
            assert_eq!(prefixed, expected);
        }
        assert_eq!(t.len(), 0);
        assert!(t.root.is_none());
    });
}
