// Backoff n-gram predictor over token ids.
//
// A corpus-trained next-token model with Katz-style backoff from 3rd to 2nd
// to 1st order, falling back to the unigram distribution when a context was
// never observed. It implements the same `Predictor` contract a neural model
// would, so the generator does not care which one it is driving; this one
// ships with the repo because it trains in milliseconds from the corpus
// alone.
//
// Tables are keyed by the comma-joined id context and persisted as JSON.

use crate::generate::Predictor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Next-id counts for one context. Key: next id. Value: observation count.
type TransitionTable = BTreeMap<usize, f64>;

/// Corpus-trained backoff model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NgramPredictor {
    /// Order-3 transitions: (context of 3 ids) -> next-id counts.
    order3: BTreeMap<String, TransitionTable>,
    /// Order-2 transitions.
    order2: BTreeMap<String, TransitionTable>,
    /// Order-1 transitions.
    order1: BTreeMap<String, TransitionTable>,
    /// Order-0 (unigram): overall id distribution.
    order0: TransitionTable,
    /// Vocabulary size; every emitted distribution has this many entries.
    vocab_size: usize,
}

impl NgramPredictor {
    /// Count transitions over the id corpus.
    pub fn train(ids: &[usize], vocab_size: usize) -> Self {
        let mut model = NgramPredictor {
            order3: BTreeMap::new(),
            order2: BTreeMap::new(),
            order1: BTreeMap::new(),
            order0: TransitionTable::new(),
            vocab_size,
        };

        for (t, &next) in ids.iter().enumerate() {
            *model.order0.entry(next).or_insert(0.0) += 1.0;
            for order in 1..=3usize {
                if t >= order {
                    let key = context_key(&ids[t - order..t]);
                    let table = match order {
                        1 => &mut model.order1,
                        2 => &mut model.order2,
                        _ => &mut model.order3,
                    };
                    *table.entry(key).or_default().entry(next).or_insert(0.0) += 1.0;
                }
            }
        }
        model
    }

    /// Probability distribution over the next id given a context, backing
    /// off to the longest order with observations for that context.
    pub fn distribution(&self, context: &[usize]) -> Vec<f64> {
        for order in (1..=3usize).rev() {
            if context.len() < order {
                continue;
            }
            let key = context_key(&context[context.len() - order..]);
            let table = match order {
                1 => &self.order1,
                2 => &self.order2,
                _ => &self.order3,
            };
            if let Some(counts) = table.get(&key) {
                return self.normalize(counts);
            }
        }
        self.normalize(&self.order0)
    }

    fn normalize(&self, counts: &TransitionTable) -> Vec<f64> {
        let total: f64 = counts.values().sum();
        let mut probs = vec![0.0; self.vocab_size];
        if total <= 0.0 {
            // Untrained model: uniform.
            probs.fill(1.0 / self.vocab_size.max(1) as f64);
            return probs;
        }
        for (&id, &count) in counts {
            if id < self.vocab_size {
                probs[id] = count / total;
            }
        }
        probs
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Save to a JSON file.
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        std::fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }
}

impl Predictor for NgramPredictor {
    fn predict(&self, one_hot_context: &[Vec<f64>]) -> Vec<f64> {
        // Recover the id sequence from the one-hot rows.
        let context: Vec<usize> = one_hot_context.iter().map(|row| argmax(row)).collect();
        self.distribution(&context)
    }
}

/// Encode an id context as a string key for table lookup.
fn context_key(context: &[usize]) -> String {
    context
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn argmax(row: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}
