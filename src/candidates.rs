/// A ranked word suggestion. Higher scores are better.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub word: String,
    pub score: f64,
}

/// Bounded top-N list kept in descending score order.
///
/// Equal scores keep their insertion order (the later one ranks lower), and a
/// full list only accepts a score strictly above its current minimum, which is
/// then evicted. A word appears at most once, with its best score.
#[derive(Debug, Clone)]
pub struct CandidateList {
    capacity: usize,
    items: Vec<Candidate>,
}

impl CandidateList {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::with_capacity(capacity + 1),
        }
    }

    pub fn insert(&mut self, word: &str, score: f64) -> bool {
        if self.capacity == 0 || score.is_nan() {
            return false;
        }

        if let Some(pos) = self.items.iter().position(|c| c.word == word) {
            if self.items[pos].score >= score {
                return false;
            }
            self.items.remove(pos);
        }

        if let Some(min) = self.threshold() {
            if score <= min {
                return false;
            }
        }

        let at = self.items.partition_point(|c| c.score >= score);
        self.items.insert(
            at,
            Candidate {
                word: word.to_string(),
                score,
            },
        );
        self.items.truncate(self.capacity);
        true
    }

    /// The score a newcomer has to beat, once the list is full.
    #[inline]
    pub fn threshold(&self) -> Option<f64> {
        if self.is_full() {
            self.items.last().map(|c| c.score)
        } else {
            None
        }
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn best(&self) -> Option<&Candidate> {
        self.items.first()
    }

    pub fn get(&self, idx: usize) -> Option<&Candidate> {
        self.items.get(idx)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.items.iter()
    }

    pub fn words(&self) -> Vec<String> {
        self.items.iter().map(|c| c.word.clone()).collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
