use crate::error::{TfResult, TypeForgeError};
use crate::geometry::KeyLayout;
use crate::lexicon::Lexicon;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub type NodeId = usize;

pub const ROOT: NodeId = 0;

#[derive(Debug, Clone)]
pub struct TrieNode {
    /// `None` only for the root.
    pub ch: Option<char>,
    /// Index of `ch` in the key layout.
    pub key: Option<usize>,
    /// Non-owning link towards the root (arena index).
    pub parent: Option<NodeId>,
    pub children: HashMap<char, NodeId>,
    /// Lexicon entries whose input form ends here.
    pub entries: Vec<usize>,
    pub depth: usize,
    /// `dp[n]`: best log-probability of having consumed `n` touches and reached this node.
    pub dp: Vec<f64>,
}

impl TrieNode {
    fn new(ch: Option<char>, key: Option<usize>, parent: Option<NodeId>, depth: usize, row_len: usize) -> Self {
        Self {
            ch,
            key,
            parent,
            children: HashMap::new(),
            entries: Vec::new(),
            depth,
            dp: vec![f64::NEG_INFINITY; row_len],
        }
    }

    pub fn is_terminal(&self) -> bool {
        !self.entries.is_empty()
    }
}

/// Prefix tree over lexicon input forms, stored as an arena.
#[derive(Debug, Clone)]
pub struct PrefixTrie {
    nodes: Vec<TrieNode>,
    levels: Vec<Vec<NodeId>>,
    lexicon: Arc<Lexicon>,
}

impl PrefixTrie {
    /// `row_len` is the number of DP cells per node (max touches + 1).
    pub fn build(lexicon: Arc<Lexicon>, layout: &KeyLayout, row_len: usize) -> TfResult<Self> {
        let mut nodes = vec![TrieNode::new(None, None, None, 0, row_len)];

        for (idx, entry) in lexicon.entries().iter().enumerate() {
            let mut cur = ROOT;
            for ch in entry.input.chars() {
                let next = match nodes[cur].children.get(&ch) {
                    Some(&id) => id,
                    None => {
                        let key = layout.key_index(ch).ok_or_else(|| TypeForgeError::MissingKey {
                            word: entry.input.clone(),
                            ch,
                        })?;
                        let id = nodes.len();
                        let depth = nodes[cur].depth + 1;
                        nodes.push(TrieNode::new(Some(ch), Some(key), Some(cur), depth, row_len));
                        nodes[cur].children.insert(ch, id);
                        id
                    }
                };
                cur = next;
            }
            nodes[cur].entries.push(idx);
        }

        let max_depth = nodes.iter().map(|n| n.depth).max().unwrap_or(0);
        let mut levels = vec![Vec::new(); max_depth + 1];
        for (id, node) in nodes.iter().enumerate() {
            levels[node.depth].push(id);
        }

        debug!(
            "Trie: {} nodes, depth {}, {} entries",
            nodes.len(),
            max_depth,
            lexicon.len()
        );

        Ok(Self {
            nodes,
            levels,
            lexicon,
        })
    }

    pub fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id]
    }

    #[inline(always)]
    pub fn dp(&self, id: NodeId, n: usize) -> f64 {
        self.nodes[id].dp[n]
    }

    #[inline(always)]
    pub fn set_dp(&mut self, id: NodeId, n: usize, value: f64) {
        self.nodes[id].dp[n] = value;
    }

    /// Node ids of the given depth; parents always live one level up.
    pub fn level(&self, depth: usize) -> &[NodeId] {
        self.levels.get(depth).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn max_depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn row_len(&self) -> usize {
        self.nodes[ROOT].dp.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn lexicon(&self) -> &Arc<Lexicon> {
        &self.lexicon
    }

    pub fn find(&self, word: &str) -> Option<NodeId> {
        let mut cur = ROOT;
        for ch in word.chars() {
            cur = *self.nodes[cur].children.get(&ch)?;
        }
        Some(cur)
    }
}
