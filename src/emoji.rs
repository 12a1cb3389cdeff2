//! Greedy longest-match emoji state machine.
//!
//! The trie is arena-backed: every node lives in one `Vec` and is referenced
//! by index, with child edges kept as small sorted `(cp, index)` lists.
//! U+FE0F never becomes an edge. Inserting a fully-qualified sequence records
//! it as an `fe0f` flag on the node reached by the preceding code point, and
//! matching may absorb exactly one FE0F at such a node without advancing.

use crate::code_points::{CodePoint, CP_FE0F};
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeIdx(u32);

impl NodeIdx {
    #[inline]
    fn get(self) -> usize {
        self.0 as usize
    }
}

#[derive(Default)]
struct TrieNode {
    /// Sorted by code point so lookup can binary search.
    children: SmallVec<[(CodePoint, NodeIdx); 4]>,
    /// One optional FE0F may appear after the edge leading here.
    fe0f: bool,
    /// Index into the canonical sequence list when a sequence ends here.
    terminal: Option<u32>,
}

pub(crate) struct EmojiTrie {
    nodes: Vec<TrieNode>,
    canonical: Vec<Vec<CodePoint>>,
}

pub(crate) struct EmojiMatch<'a> {
    /// The fully-qualified sequence stored at the winning terminal.
    pub emoji: &'a [CodePoint],
    /// How many input code points the match consumed.
    pub len: usize,
}

impl EmojiTrie {
    pub fn new(sequences: &[Vec<CodePoint>]) -> Self {
        let mut trie = Self {
            nodes: vec![TrieNode::default()],
            canonical: Vec::with_capacity(sequences.len()),
        };
        for seq in sequences {
            trie.insert(seq);
        }
        trie
    }

    fn alloc(&mut self) -> NodeIdx {
        let idx = self.nodes.len();
        self.nodes.push(TrieNode::default());
        NodeIdx(idx as u32)
    }

    fn get_or_create_child(&mut self, parent: NodeIdx, cp: CodePoint) -> NodeIdx {
        match self.nodes[parent.get()]
            .children
            .binary_search_by_key(&cp, |&(c, _)| c)
        {
            Ok(pos) => self.nodes[parent.get()].children[pos].1,
            Err(pos) => {
                let child = self.alloc();
                self.nodes[parent.get()].children.insert(pos, (cp, child));
                child
            }
        }
    }

    fn child(&self, node: NodeIdx, cp: CodePoint) -> Option<NodeIdx> {
        let children = &self.nodes[node.get()].children;
        children
            .binary_search_by_key(&cp, |&(c, _)| c)
            .ok()
            .map(|pos| children[pos].1)
    }

    fn insert(&mut self, seq: &[CodePoint]) {
        let mut node = NodeIdx(0);
        for &cp in seq {
            if cp == CP_FE0F {
                self.nodes[node.get()].fe0f = true;
            } else {
                node = self.get_or_create_child(node, cp);
            }
        }
        if self.nodes[node.get()].terminal.is_none() {
            let id = self.canonical.len() as u32;
            self.canonical.push(seq.to_vec());
            self.nodes[node.get()].terminal = Some(id);
        }
    }

    /// Longest emoji match starting at `cps[0]`, if any.
    pub fn match_at(&self, cps: &[CodePoint]) -> Option<EmojiMatch<'_>> {
        let mut node = NodeIdx(0);
        let mut fe0f_spent = false;
        let mut consumed = 0usize;
        let mut best: Option<(u32, usize)> = None;
        for &cp in cps {
            if cp == CP_FE0F && self.nodes[node.get()].fe0f && !fe0f_spent {
                fe0f_spent = true;
            } else if let Some(next) = self.child(node, cp) {
                node = next;
                fe0f_spent = false;
            } else {
                break;
            }
            consumed += 1;
            if let Some(id) = self.nodes[node.get()].terminal {
                best = Some((id, consumed));
            }
        }
        best.map(|(id, len)| EmojiMatch {
            emoji: &self.canonical[id as usize],
            len,
        })
    }
}
