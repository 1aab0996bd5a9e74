//! Reversed-path trie backing [`super::FunctionRegistry::find_ending_with`].
//!
//! Each registered QN is stored with its dotted components reversed, keyed
//! component-by-component rather than character-by-character. A suffix query
//! reverses its own components and descends the same way; every QN reachable
//! from the terminal node is a candidate, collected in insertion order.
//!
//! Children are kept in a `Mutex<Vec<(String, TrieNode)>>` rather than a
//! `DashMap`, since `DashMap`'s iteration order follows hash-bucket
//! placement, not insertion order — `collect` below must return candidates
//! in the order they were registered.

use crate::qualifiedname::Qn;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct TrieNode {
    children: Mutex<Vec<(String, TrieNode)>>,
    /// Full QNs terminating exactly at this node, in insertion order.
    terminals: Mutex<Vec<Qn>>,
}

impl TrieNode {
    fn insert(&self, remaining: &[compact_str::CompactString], full: &Qn) {
        if let Some((head, rest)) = remaining.split_first() {
            #[allow(clippy::unwrap_used)]
            let mut children = self.children.lock().unwrap();
            let idx = match children.iter().position(|(name, _)| name == head.as_str()) {
                Some(idx) => idx,
                None => {
                    children.push((head.to_string(), TrieNode::default()));
                    children.len() - 1
                }
            };
            let child = &children[idx].1;
            child.insert(rest, full);
        } else {
            #[allow(clippy::unwrap_used)]
            self.terminals.lock().unwrap().push(full.clone());
        }
    }

    /// Looks up the child named `name`, if any, running `f` on it while
    /// holding the lock only long enough to read the reference.
    fn with_child<R>(&self, name: &str, f: impl FnOnce(&TrieNode) -> R) -> Option<R> {
        #[allow(clippy::unwrap_used)]
        let children = self.children.lock().unwrap();
        children.iter().find(|(child_name, _)| child_name == name).map(|(_, node)| f(node))
    }

    /// Collects every QN registered at or below this node, in insertion
    /// order across the subtree (terminals at this node first, then each
    /// child subtree in the order children were first created).
    fn collect(&self, out: &mut Vec<Qn>) {
        #[allow(clippy::unwrap_used)]
        out.extend(self.terminals.lock().unwrap().iter().cloned());
        #[allow(clippy::unwrap_used)]
        for (_, child) in self.children.lock().unwrap().iter() {
            child.collect(out);
        }
    }
}

/// A trie over reversed QN components, supporting dotted-suffix queries.
#[derive(Debug, Default)]
pub struct SuffixTrie {
    root: TrieNode,
}

impl SuffixTrie {
    /// Indexes `qn` under its reversed component path.
    pub fn insert(&self, qn: &Qn) {
        let reversed: smallvec::SmallVec<[compact_str::CompactString; 6]> =
            qn.components().iter().rev().cloned().collect();
        self.root.insert(&reversed, qn);
    }

    /// Returns every indexed QN whose dotted-path suffix equals `tail`.
    #[must_use]
    pub fn find_ending_with(&self, tail: &str) -> Vec<Qn> {
        let tail_qn = Qn::parse(tail);
        let reversed_tail: Vec<String> = tail_qn
            .components()
            .iter()
            .rev()
            .map(std::string::ToString::to_string)
            .collect();

        Self::find_at(&self.root, &reversed_tail)
    }

    fn find_at(node: &TrieNode, remaining: &[String]) -> Vec<Qn> {
        if let Some((head, rest)) = remaining.split_first() {
            node.with_child(head, |child| Self::find_at(child, rest)).unwrap_or_default()
        } else {
            let mut out = Vec::new();
            node.collect(&mut out);
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_exact_and_suffix_matches() {
        let trie = SuffixTrie::default();
        trie.insert(&Qn::parse("project.m.Repo.find_by_id"));
        trie.insert(&Qn::parse("project.other.Thing.find_by_id"));
        trie.insert(&Qn::parse("project.m.helper"));

        let mut all = trie.find_ending_with("find_by_id");
        all.sort();
        assert_eq!(all.len(), 2);

        let narrowed = trie.find_ending_with("Repo.find_by_id");
        assert_eq!(narrowed, vec![Qn::parse("project.m.Repo.find_by_id")]);

        assert!(trie.find_ending_with("nonexistent").is_empty());
    }

    #[test]
    fn insertion_order_is_preserved_within_a_subtree() {
        let trie = SuffixTrie::default();
        trie.insert(&Qn::parse("project.a.util"));
        trie.insert(&Qn::parse("project.b.util"));
        trie.insert(&Qn::parse("project.c.util"));
        let matches = trie.find_ending_with("util");
        assert_eq!(
            matches,
            vec![
                Qn::parse("project.a.util"),
                Qn::parse("project.b.util"),
                Qn::parse("project.c.util"),
            ]
        );
    }
}
