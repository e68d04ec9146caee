// Supervised sequence construction.
//
// Slides a fixed-length window over the id corpus: each position yields the
// window as context and the token right after it as the prediction target.
// The one-hot encoding here is the same layout `generate` feeds the
// predictor, so training and inference agree on the input shape.

use crate::vocab::Vocabulary;

/// One supervised pair: predict `target` from the `context` window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingExample {
    pub context: Vec<usize>,
    pub target: usize,
}

/// Slice `ids` into (window, next-id) pairs.
///
/// Produces exactly `max(0, ids.len() - window_length)` examples; an input
/// no longer than the window yields none, which is not an error.
pub fn build_training_examples(ids: &[usize], window_length: usize) -> Vec<TrainingExample> {
    if ids.len() <= window_length {
        return Vec::new();
    }
    (0..ids.len() - window_length)
        .map(|i| TrainingExample {
            context: ids[i..i + window_length].to_vec(),
            target: ids[i + window_length],
        })
        .collect()
}

/// One-hot encode an id sequence: one row per id, `vocab_size` wide.
pub fn one_hot(ids: &[usize], vocab_size: usize) -> Vec<Vec<f64>> {
    ids.iter()
        .map(|&id| {
            let mut row = vec![0.0; vocab_size];
            if id < vocab_size {
                row[id] = 1.0;
            }
            row
        })
        .collect()
}

/// One-hot encode every training example's context against `vocab`.
/// Returns (inputs, targets) in corpus order.
pub fn one_hot_examples(
    examples: &[TrainingExample],
    vocab: &Vocabulary,
) -> (Vec<Vec<Vec<f64>>>, Vec<usize>) {
    let inputs = examples
        .iter()
        .map(|ex| one_hot(&ex.context, vocab.len()))
        .collect();
    let targets = examples.iter().map(|ex| ex.target).collect();
    (inputs, targets)
}
