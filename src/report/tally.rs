use std::collections::HashMap;

/// Counter that remembers first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    counts: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl Tally {
    pub fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.counts.len());
                self.counts.push((key.to_string(), 1));
            }
        }
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count-descending; equal counts keep first-seen order.
    pub fn into_sorted(self) -> Vec<(String, usize)> {
        let mut counts = self.counts;
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    /// The `n` most common keys, ordered like [`Tally::into_sorted`].
    pub fn top(&self, n: usize) -> Vec<(String, usize)> {
        let mut sorted = self.clone().into_sorted();
        sorted.truncate(n);
        sorted
    }
}
