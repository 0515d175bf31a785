//! CBOW word2vec with negative sampling.
//!
//! Single-threaded and allocation-light: weights live in two flat
//! `vocab * dim` buffers. Sentences are corpus lines; a context window never
//! crosses a line break.

mod config;
mod vocabulary;

pub use config::{ConfigError, ModelKind, Optimizer, Word2VecConfig};

use std::io::BufRead;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::error::BoxError;
use crate::model::EmbeddingModel;
use crate::models::EmbeddingRecord;
use vocabulary::Vocabulary;

const MAX_EXP: f32 = 6.0;
const MIN_LEARNING_RATE_RATIO: f32 = 1.0e-4;

#[derive(Debug)]
pub struct Word2Vec {
    config: Word2VecConfig,
    vocab: Vocabulary,
    syn0: Vec<f32>,
    syn1neg: Vec<f32>,
}

impl Word2Vec {
    pub fn new(config: Word2VecConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!(model = %config.model, optimizer = %config.optimizer, "word2vec configured");
        Ok(Self {
            config,
            vocab: Vocabulary::default(),
            syn0: Vec::new(),
            syn1neg: Vec::new(),
        })
    }

    pub fn config(&self) -> &Word2VecConfig {
        &self.config
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocab.len()
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    fn init_weights(&mut self, rng: &mut StdRng) {
        let dim = self.config.dimension;
        let size = self.vocab.len() * dim;
        self.syn0 = (0..size)
            .map(|_| (rng.random::<f32>() - 0.5) / dim as f32)
            .collect();
        self.syn1neg = vec![0.0; size];
    }

    /// Probability of keeping each word under frequent-word downsampling
    fn keep_probabilities(&self) -> Vec<f64> {
        let t = self.config.subsample_threshold;
        let total = self.vocab.total() as f64;
        (0..self.vocab.len())
            .map(|i| {
                if t <= 0.0 {
                    return 1.0;
                }
                let count = self.vocab.count(i) as f64;
                let scaled = t * total;
                ((count / scaled).sqrt() + 1.0) * scaled / count
            })
            .collect()
    }

    fn fit(&mut self, sentences: &[Vec<usize>], rng: &mut StdRng) {
        let dim = self.config.dimension;
        let window = self.config.window;
        let negative = self.config.negative_samples;
        let lr0 = self.config.initial_learning_rate;

        let noise = self.vocab.noise_distribution();
        let keep = self.keep_probabilities();
        let planned = (self.config.iterations as u64 * self.vocab.total()).max(1) as f32;

        let mut processed: u64 = 0;
        let mut hidden = vec![0.0f32; dim];
        let mut grad = vec![0.0f32; dim];
        let mut context: Vec<usize> = Vec::with_capacity(window * 2);

        for epoch in 0..self.config.iterations {
            for sentence in sentences {
                let kept: Vec<usize> = sentence
                    .iter()
                    .copied()
                    .filter(|&w| keep[w] >= 1.0 || rng.random::<f64>() < keep[w])
                    .collect();
                processed += sentence.len() as u64;
                let lr = (lr0 * (1.0 - processed as f32 / planned)).max(lr0 * MIN_LEARNING_RATE_RATIO);

                for pos in 0..kept.len() {
                    let reach = window - rng.random_range(0..window);
                    let start = pos.saturating_sub(reach);
                    let end = (pos + reach + 1).min(kept.len());
                    context.clear();
                    context.extend((start..end).filter(|&i| i != pos).map(|i| kept[i]));
                    if context.is_empty() {
                        continue;
                    }

                    hidden.fill(0.0);
                    for &c in &context {
                        let row = &self.syn0[c * dim..(c + 1) * dim];
                        hidden.iter_mut().zip(row).for_each(|(h, w)| *h += w);
                    }
                    let scale = 1.0 / context.len() as f32;
                    hidden.iter_mut().for_each(|h| *h *= scale);

                    grad.fill(0.0);
                    let target = kept[pos];
                    for d in 0..=negative {
                        let (out, label) = if d == 0 {
                            (target, 1.0)
                        } else {
                            let sample = sample_noise(&noise, rng);
                            if sample == target {
                                continue;
                            }
                            (sample, 0.0)
                        };

                        let row = &mut self.syn1neg[out * dim..(out + 1) * dim];
                        let g = (label - sigmoid(dot(&hidden, row))) * lr;
                        for k in 0..dim {
                            grad[k] += g * row[k];
                            row[k] += g * hidden[k];
                        }
                    }

                    for &c in &context {
                        let row = &mut self.syn0[c * dim..(c + 1) * dim];
                        row.iter_mut().zip(&grad).for_each(|(w, g)| *w += g);
                    }
                }
            }
            debug!(epoch, lr0, "word2vec epoch complete");
        }
    }
}

impl EmbeddingModel for Word2Vec {
    fn train(&mut self, corpus: &mut dyn BufRead) -> Result<(), BoxError> {
        let mut text = String::new();
        corpus.read_to_string(&mut text)?;

        self.vocab = Vocabulary::build(text.split_whitespace(), self.config.min_count);
        if self.vocab.is_empty() {
            warn!(min_count = self.config.min_count, "Corpus has no trainable words");
            self.syn0.clear();
            self.syn1neg.clear();
            return Ok(());
        }

        let sentences: Vec<Vec<usize>> = text
            .lines()
            .map(|line| {
                line.split_whitespace()
                    .filter_map(|w| self.vocab.get(w))
                    .collect::<Vec<_>>()
            })
            .filter(|s| !s.is_empty())
            .collect();

        let mut rng = self.rng();
        self.init_weights(&mut rng);
        self.fit(&sentences, &mut rng);

        info!(
            vocabulary = self.vocab.len(),
            tokens = self.vocab.total(),
            dimension = self.config.dimension,
            iterations = self.config.iterations,
            "word2vec training finished"
        );
        Ok(())
    }

    fn embeddings(&self) -> Vec<EmbeddingRecord> {
        let dim = self.config.dimension;
        if self.syn0.len() != self.vocab.len() * dim {
            return Vec::new();
        }
        (0..self.vocab.len())
            .map(|i| EmbeddingRecord::new(self.vocab.word(i), self.syn0[i * dim..(i + 1) * dim].to_vec()))
            .collect()
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn sigmoid(x: f32) -> f32 {
    if x > MAX_EXP {
        1.0
    } else if x < -MAX_EXP {
        0.0
    } else {
        1.0 / (1.0 + (-x).exp())
    }
}

fn sample_noise(cumulative: &[f64], rng: &mut StdRng) -> usize {
    let total = cumulative.last().copied().unwrap_or(0.0);
    let r = rng.random::<f64>() * total;
    cumulative
        .partition_point(|&c| c <= r)
        .min(cumulative.len().saturating_sub(1))
}
