use super::touch_model::{ElasticModel, TouchModel};
use crate::candidates::CandidateList;
use crate::config::Config;
use crate::error::TfResult;
use crate::geometry::{KeyLayout, Point2};
use crate::lexicon::Lexicon;
use crate::trie::{PrefixTrie, ROOT};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Incremental tap decoder: each new touch fills one more DP column over the
/// prefix trie, visiting only the depths inside the band.
#[derive(Debug, Clone)]
pub struct TapPredictor {
    layout: Arc<KeyLayout>,
    touch: TouchModel,
    elastic: ElasticModel,
    trie: PrefixTrie,
    inputs: Vec<Point2>,
    lp: Vec<Vec<f64>>,
    literal: String,
    ranked: CandidateList,
    capacity: usize,
}

impl TapPredictor {
    pub fn new(layout: Arc<KeyLayout>, lexicon: Arc<Lexicon>, config: &Config) -> TfResult<Self> {
        let row_len = config.touch.max_input_length + 1;
        let start = Instant::now();
        let trie = PrefixTrie::build(lexicon, &layout, row_len)?;
        debug!("Tap predictor ready in {:?}", start.elapsed());

        let mut predictor = Self {
            touch: TouchModel::new(&config.touch, &layout),
            elastic: ElasticModel::new(&config.touch),
            layout,
            trie,
            inputs: Vec::new(),
            lp: Vec::new(),
            literal: String::new(),
            ranked: CandidateList::new(config.decoder.candidates),
            capacity: config.decoder.candidates,
        };
        predictor.fill_column(0);
        Ok(predictor)
    }

    /// Appends one resolved touch and returns the best word so far.
    pub fn predict(&mut self, touch: Point2) -> String {
        if let Some(ch) = self.layout.nearest_key(touch) {
            self.literal.push(ch);
        }
        self.inputs.push(touch);
        let n = self.inputs.len();

        if n >= self.trie.row_len() {
            if n == self.trie.row_len() {
                warn!(
                    "Touch sequence exceeds {} samples; falling back to the literal string",
                    self.trie.row_len() - 1
                );
            }
            self.ranked.clear();
            return self.best_word();
        }

        self.lp.push(self.touch.row(touch, &self.layout));
        self.fill_column(n);
        self.collect(n);
        self.best_word()
    }

    fn fill_column(&mut self, n: usize) {
        let k = self.elastic.bandwidth;
        let lo = n.saturating_sub(k);
        let hi = (n + k).min(self.trie.max_depth());

        for depth in lo..=hi {
            for i in 0..self.trie.level(depth).len() {
                let id = self.trie.level(depth)[i];
                let value = {
                    let node = self.trie.node(id);
                    match (node.parent, node.key) {
                        (Some(pid), Some(key)) => {
                            let parent = self.trie.node(pid);
                            let grand = parent.parent.map(|g| self.trie.node(g).dp.as_slice());
                            self.elastic.cell(
                                n,
                                key,
                                parent.key,
                                &self.lp,
                                &node.dp,
                                &parent.dp,
                                grand,
                            )
                        }
                        _ => self.elastic.root_cell(n, &node.dp),
                    }
                };
                self.trie.set_dp(id, n, value);
            }
        }
    }

    fn collect(&mut self, n: usize) {
        let k = self.elastic.bandwidth;
        let lo = n.saturating_sub(k).max(1);
        let hi = (n + k).min(self.trie.max_depth());
        let lexicon = Arc::clone(self.trie.lexicon());

        self.ranked.clear();
        for depth in lo..=hi {
            for &id in self.trie.level(depth) {
                let node = self.trie.node(id);
                let dp = node.dp[n];
                if node.entries.is_empty() || dp == f64::NEG_INFINITY {
                    continue;
                }
                for &idx in &node.entries {
                    let entry = &lexicon.entries()[idx];
                    self.ranked.insert(&entry.output, dp + entry.ln_weight());
                }
            }
        }
    }

    /// Statistically best word, or the literal keys when nothing matches.
    pub fn best_word(&self) -> String {
        match self.ranked.best() {
            Some(c) => c.word.clone(),
            None => self.literal.clone(),
        }
    }

    /// Display list: the literal string first, then ranked words.
    pub fn candidates(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.capacity);
        if !self.literal.is_empty() {
            out.push(self.literal.clone());
        }
        for c in self.ranked.iter() {
            if out.len() >= self.capacity {
                break;
            }
            if c.word != self.literal {
                out.push(c.word.clone());
            }
        }
        out
    }

    pub fn ranked(&self) -> &CandidateList {
        &self.ranked
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn inputs(&self) -> &[Point2] {
        &self.inputs
    }

    pub fn trie(&self) -> &PrefixTrie {
        &self.trie
    }

    pub fn clear(&mut self) {
        // Only levels reachable by the band were ever written.
        let touched = (self.inputs.len() + self.elastic.bandwidth).min(self.trie.max_depth());
        for depth in 0..=touched {
            for i in 0..self.trie.level(depth).len() {
                let id = self.trie.level(depth)[i];
                for n in 0..self.trie.row_len() {
                    self.trie.set_dp(id, n, f64::NEG_INFINITY);
                }
            }
        }
        self.inputs.clear();
        self.lp.clear();
        self.literal.clear();
        self.ranked.clear();
        self.fill_column(0);
        debug_assert_eq!(self.trie.dp(ROOT, 0), 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predictor(words: &[(&str, f64)]) -> (TapPredictor, Arc<KeyLayout>) {
        let layout = Arc::new(KeyLayout::qwerty(0.02));
        let lex = Arc::new(Lexicon::from_entries(words.iter().copied()).unwrap());
        let p = TapPredictor::new(layout.clone(), lex, &Config::default()).unwrap();
        (p, layout)
    }

    #[test]
    fn test_exact_taps_rank_by_frequency_and_distance() {
        let (mut p, layout) = predictor(&[("cat", 100.0), ("bat", 80.0), ("cot", 10.0)]);
        for ch in "cat".chars() {
            p.predict(layout.anchor(ch).unwrap());
        }
        assert_eq!(p.ranked().words(), vec!["cat", "bat", "cot"]);
        assert_eq!(p.literal(), "cat");
        assert_eq!(p.candidates(), vec!["cat", "bat", "cot"]);
    }

    #[test]
    fn test_omitted_letter_still_found() {
        let (mut p, layout) = predictor(&[("hello", 50.0), ("held", 40.0)]);
        for ch in "helo".chars() {
            p.predict(layout.anchor(ch).unwrap());
        }
        assert_eq!(p.best_word(), "hello");
    }

    #[test]
    fn test_clear_restores_initial_column() {
        let (mut p, layout) = predictor(&[("on", 5.0), ("no", 5.0)]);
        p.predict(layout.anchor('o').unwrap());
        p.clear();
        assert!(p.inputs().is_empty());
        assert!(p.ranked().is_empty());
        let o = p.trie().find("o").unwrap();
        assert_eq!(p.trie().dp(o, 1), f64::NEG_INFINITY);
        p.predict(layout.anchor('n').unwrap());
        p.predict(layout.anchor('o').unwrap());
        assert_eq!(p.best_word(), "no");
    }
}
