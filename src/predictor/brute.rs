use super::touch_model::{ElasticModel, TouchModel};
use crate::candidates::CandidateList;
use crate::config::Config;
use crate::error::{TfResult, TypeForgeError};
use crate::geometry::{KeyLayout, Point2};
use crate::lexicon::Lexicon;
use std::sync::Arc;
use tracing::debug;

/// Bounds within this distance of the list minimum are never used to abort.
const BOUND_EPS: f64 = 1e-9;

/// Reference tap decoder that re-scores every lexicon word from scratch on
/// each touch. Same recurrence and band as [`super::TapPredictor`], no trie.
#[derive(Debug, Clone)]
pub struct BruteForceTapPredictor {
    layout: Arc<KeyLayout>,
    lexicon: Arc<Lexicon>,
    keys: Vec<Vec<usize>>,
    touch: TouchModel,
    elastic: ElasticModel,
    max_input_length: usize,
    inputs: Vec<Point2>,
    lp: Vec<Vec<f64>>,
    literal: String,
    ranked: CandidateList,
    aborted: usize,
}

impl BruteForceTapPredictor {
    pub fn new(layout: Arc<KeyLayout>, lexicon: Arc<Lexicon>, config: &Config) -> TfResult<Self> {
        let keys = lexicon
            .entries()
            .iter()
            .map(|e| {
                e.input
                    .chars()
                    .map(|ch| {
                        layout.key_index(ch).ok_or_else(|| TypeForgeError::MissingKey {
                            word: e.input.clone(),
                            ch,
                        })
                    })
                    .collect::<TfResult<Vec<_>>>()
            })
            .collect::<TfResult<Vec<_>>>()?;

        Ok(Self {
            touch: TouchModel::new(&config.touch, &layout),
            elastic: ElasticModel::new(&config.touch),
            max_input_length: config.touch.max_input_length,
            layout,
            lexicon,
            keys,
            inputs: Vec::new(),
            lp: Vec::new(),
            literal: String::new(),
            ranked: CandidateList::new(config.decoder.candidates),
            aborted: 0,
        })
    }

    pub fn predict(&mut self, touch: Point2) -> String {
        if let Some(ch) = self.layout.nearest_key(touch) {
            self.literal.push(ch);
        }
        self.inputs.push(touch);
        self.ranked.clear();
        if self.inputs.len() > self.max_input_length {
            return self.best_word();
        }
        self.lp.push(self.touch.row(touch, &self.layout));

        let mut aborted = 0;
        for (idx, entry) in self.lexicon.entries().iter().enumerate() {
            let ln_w = entry.ln_weight();
            match self.score(&self.keys[idx], ln_w, self.ranked.threshold()) {
                Some(score) => {
                    self.ranked.insert(&entry.output, score + ln_w);
                }
                None => aborted += 1,
            }
        }
        self.aborted = aborted;
        debug!("Brute force: {} of {} words skipped", aborted, self.keys.len());
        self.best_word()
    }

    /// Alignment score of `keys` against all inputs, or `None` when the word
    /// is out of band or provably cannot beat `threshold`.
    fn score(&self, keys: &[usize], ln_w: f64, threshold: Option<f64>) -> Option<f64> {
        let n_inputs = self.lp.len();
        let len = keys.len();
        let k = self.elastic.bandwidth;
        let ceiling = self.elastic.per_sample_ceiling(&self.touch);

        let mut table = vec![vec![f64::NEG_INFINITY; n_inputs + 1]; len + 1];
        let mut col_best = vec![f64::NEG_INFINITY; n_inputs + 1];

        for n in 0..=n_inputs {
            let lo = n.saturating_sub(k);
            let hi = (n + k).min(len);
            for d in lo..=hi {
                let value = if d == 0 {
                    self.elastic.root_cell(n, &table[0])
                } else {
                    let (parent_key, grand) = if d >= 2 {
                        (Some(keys[d - 2]), Some(table[d - 2].as_slice()))
                    } else {
                        (None, None)
                    };
                    self.elastic
                        .cell(n, keys[d - 1], parent_key, &self.lp, &table[d], &table[d - 1], grand)
                };
                table[d][n] = value;
                col_best[n] = col_best[n].max(value);
            }

            if let Some(th) = threshold {
                if n < n_inputs {
                    let left = (n_inputs - n) as f64;
                    let mut bound = col_best[n] + left * ceiling;
                    if n >= 1 {
                        // a transposition can step over column n
                        bound = bound.max(col_best[n - 1] + (left + 1.0) * ceiling);
                    }
                    if bound + ln_w < th - BOUND_EPS {
                        return None;
                    }
                }
            }
        }

        let score = table[len][n_inputs];
        (score > f64::NEG_INFINITY).then_some(score)
    }

    pub fn best_word(&self) -> String {
        match self.ranked.best() {
            Some(c) => c.word.clone(),
            None => self.literal.clone(),
        }
    }

    pub fn ranked(&self) -> &CandidateList {
        &self.ranked
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// Words rejected by the band or the early-exit bound on the last touch.
    pub fn aborted(&self) -> usize {
        self.aborted
    }

    pub fn clear(&mut self) {
        self.inputs.clear();
        self.lp.clear();
        self.literal.clear();
        self.ranked.clear();
        self.aborted = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::TapPredictor;

    #[test]
    fn test_agrees_with_trie_on_exact_taps() {
        let layout = Arc::new(KeyLayout::qwerty(0.02));
        let lex = Arc::new(
            Lexicon::from_entries([
                ("the", 500.0),
                ("then", 120.0),
                ("they", 200.0),
                ("tree", 40.0),
                ("three", 60.0),
                ("there", 150.0),
                ("her", 90.0),
            ])
            .unwrap(),
        );
        let config = Config::default();
        let mut brute = BruteForceTapPredictor::new(layout.clone(), lex.clone(), &config).unwrap();
        let mut trie = TapPredictor::new(layout.clone(), lex, &config).unwrap();

        for ch in "threr".chars() {
            let p = layout.anchor(ch).unwrap();
            assert_eq!(brute.predict(p), trie.predict(p));
            let a = brute.ranked().best().unwrap().score;
            let b = trie.ranked().best().unwrap().score;
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_hopeless_words_exit_early() {
        let layout = Arc::new(KeyLayout::qwerty(0.02));
        let lex = Arc::new(
            Lexicon::from_entries([("qqqq", 1.0), ("mmmm", 1.0), ("pppp", 1.0)]).unwrap(),
        );
        let config = Config {
            decoder: crate::config::DecoderParams {
                candidates: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut brute = BruteForceTapPredictor::new(layout.clone(), lex, &config).unwrap();
        let q = layout.anchor('q').unwrap();
        for _ in 0..4 {
            brute.predict(q);
        }
        assert_eq!(brute.best_word(), "qqqq");
        assert_eq!(brute.aborted(), 2);
    }
}
