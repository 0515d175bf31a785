use std::collections::HashMap;

/// Word table built from a tokenised corpus.
///
/// Indices follow first appearance, so the saved vector file lists words in
/// corpus order.
#[derive(Debug, Default)]
pub(crate) struct Vocabulary {
    words: Vec<String>,
    counts: Vec<u64>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    pub(crate) fn build<'a>(tokens: impl IntoIterator<Item = &'a str>, min_count: usize) -> Self {
        let mut words: Vec<String> = Vec::new();
        let mut counts: Vec<u64> = Vec::new();
        let mut seen: HashMap<&'a str, usize> = HashMap::new();

        for token in tokens {
            match seen.get(token) {
                Some(&i) => counts[i] += 1,
                None => {
                    seen.insert(token, words.len());
                    words.push(token.to_string());
                    counts.push(1);
                }
            }
        }

        let mut vocab = Self::default();
        for (word, count) in words.into_iter().zip(counts) {
            if count as usize >= min_count {
                vocab.index.insert(word.clone(), vocab.words.len());
                vocab.words.push(word);
                vocab.counts.push(count);
            }
        }
        vocab
    }

    pub(crate) fn len(&self) -> usize {
        self.words.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub(crate) fn get(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    pub(crate) fn word(&self, idx: usize) -> &str {
        &self.words[idx]
    }

    pub(crate) fn count(&self, idx: usize) -> u64 {
        self.counts[idx]
    }

    pub(crate) fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Cumulative unigram^0.75 weights for negative sampling
    pub(crate) fn noise_distribution(&self) -> Vec<f64> {
        let mut acc = 0.0;
        self.counts
            .iter()
            .map(|&c| {
                acc += (c as f64).powf(0.75);
                acc
            })
            .collect()
    }
}
