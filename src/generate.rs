// Autoregressive melody generation with temperature sampling.
//
// The generator owns nothing global: it borrows a vocabulary and a predictor
// and each `generate` call keeps its own context buffer, so independent
// generations can run side by side. The loop itself is strictly sequential —
// every step's input contains the previous step's sampled token.
//
// Seeding pads the context with a full window of terminators (the same
// boundary the corpus puts between songs), so the model sees the seed as a
// song opening. The padding is context only; it never appears in the output.

use crate::error::{Error, Result};
use crate::token::Token;
use crate::training::one_hot;
use crate::vocab::Vocabulary;
use rand::Rng;

/// Next-token oracle. Receives the one-hot encoded context window (one row
/// per id, vocabulary-size wide) and returns one probability per id,
/// summing to 1. Must behave as a synchronous call; internal batching or
/// hardware acceleration is its own business.
pub trait Predictor {
    fn predict(&self, one_hot_context: &[Vec<f64>]) -> Vec<f64>;
}

/// Generator handle: a vocabulary, a predictor, and the terminator padding
/// length used at seeding (the corpus song-delimiter length).
pub struct MelodyGenerator<'a, P: Predictor> {
    vocabulary: &'a Vocabulary,
    predictor: &'a P,
    sequence_length: usize,
}

impl<'a, P: Predictor> MelodyGenerator<'a, P> {
    pub fn new(vocabulary: &'a Vocabulary, predictor: &'a P, sequence_length: usize) -> Self {
        MelodyGenerator {
            vocabulary,
            predictor,
            sequence_length,
        }
    }

    /// Generate a melody from a seed.
    ///
    /// Runs up to `num_steps` sampling steps, feeding the predictor at most
    /// the last `max_context_length` ids each step, and stops early if the
    /// terminator is sampled. Returns the seed plus everything sampled
    /// before the terminator.
    pub fn generate<R: Rng>(
        &self,
        seed: &[Token],
        num_steps: usize,
        max_context_length: usize,
        temperature: f64,
        rng: &mut R,
    ) -> Result<Vec<Token>> {
        if temperature <= 0.0 || temperature.is_nan() {
            return Err(Error::InvalidTemperature(temperature));
        }

        let mut melody = seed.to_vec();
        let terminator_id = self.vocabulary.terminator_id();
        let mut context = vec![terminator_id; self.sequence_length];
        for &token in seed {
            context.push(self.vocabulary.id_of(token)?);
        }

        for _ in 0..num_steps {
            let window_start = context.len().saturating_sub(max_context_length);
            let window = one_hot(&context[window_start..], self.vocabulary.len());

            let probabilities = self.predictor.predict(&window);
            if probabilities.len() != self.vocabulary.len() {
                return Err(Error::PredictorContractViolation {
                    expected: self.vocabulary.len(),
                    got: probabilities.len(),
                });
            }

            let adjusted = apply_temperature(&probabilities, temperature)?;
            let next_id = sample_index(&adjusted, rng);
            context.push(next_id);

            let token = self.vocabulary.symbol_of(next_id)?;
            if token == Token::Terminator {
                break;
            }
            melody.push(token);
        }

        Ok(melody)
    }
}

/// Reshape a distribution by temperature: `softmax(ln(p) / t)`.
///
/// At t = 1 this is the identity. Below 1 it sharpens toward the mode
/// (approaching greedy as t -> 0), above 1 it flattens toward uniform.
/// t <= 0 is rejected, not clamped.
pub fn apply_temperature(probabilities: &[f64], temperature: f64) -> Result<Vec<f64>> {
    if temperature <= 0.0 || temperature.is_nan() {
        return Err(Error::InvalidTemperature(temperature));
    }

    let logits: Vec<f64> = probabilities
        .iter()
        .map(|&p| p.ln() / temperature)
        .collect();
    // Shift by the max logit before exponentiating; zero-probability entries
    // contribute exp(-inf) = 0 and stay zero.
    let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&l| (l - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    Ok(exps.iter().map(|&e| e / total).collect())
}

/// Draw one index from a discrete distribution (weighted choice, never
/// argmax).
pub fn sample_index<R: Rng>(probabilities: &[f64], rng: &mut R) -> usize {
    let target: f64 = rng.random();
    let mut cumulative = 0.0;
    for (i, &p) in probabilities.iter().enumerate() {
        cumulative += p;
        if cumulative > target {
            return i;
        }
    }
    // Rounding left the cumulative sum a hair under 1: last index.
    probabilities.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::RefCell;

    /// Test vocabulary {"60": 0, "62": 1, "r": 2, "_": 3, "/": 4}.
    fn test_vocab() -> Vocabulary {
        Vocabulary::build(&[
            Token::Pitch(60),
            Token::Pitch(62),
            Token::Rest,
            Token::Continuation,
            Token::Terminator,
        ])
        .unwrap()
    }

    /// Predictor that always returns the same distribution and records how
    /// many one-hot rows each call saw.
    struct FixedPredictor {
        probs: Vec<f64>,
        seen_context_lengths: RefCell<Vec<usize>>,
    }

    impl FixedPredictor {
        fn new(probs: Vec<f64>) -> Self {
            FixedPredictor {
                probs,
                seen_context_lengths: RefCell::new(Vec::new()),
            }
        }
    }

    impl Predictor for FixedPredictor {
        fn predict(&self, one_hot_context: &[Vec<f64>]) -> Vec<f64> {
            self.seen_context_lengths
                .borrow_mut()
                .push(one_hot_context.len());
            self.probs.clone()
        }
    }

    #[test]
    fn test_terminator_stops_generation_immediately() {
        let vocab = test_vocab();
        // Probability 1 on the terminator (id 4).
        let predictor = FixedPredictor::new(vec![0.0, 0.0, 0.0, 0.0, 1.0]);
        let generator = MelodyGenerator::new(&vocab, &predictor, 8);
        let mut rng = StdRng::seed_from_u64(1);

        let seed = [Token::Pitch(60), Token::Pitch(62)];
        let melody = generator.generate(&seed, 3, 8, 1.0, &mut rng).unwrap();

        assert_eq!(melody, seed.to_vec());
        assert_eq!(predictor.seen_context_lengths.borrow().len(), 1);
    }

    #[test]
    fn test_num_steps_bounds_output() {
        let vocab = test_vocab();
        // Always continue (id 3), never terminate.
        let predictor = FixedPredictor::new(vec![0.0, 0.0, 0.0, 1.0, 0.0]);
        let generator = MelodyGenerator::new(&vocab, &predictor, 8);
        let mut rng = StdRng::seed_from_u64(1);

        let melody = generator
            .generate(&[Token::Pitch(60)], 5, 16, 1.0, &mut rng)
            .unwrap();
        assert_eq!(melody.len(), 1 + 5);
        assert!(melody[1..].iter().all(|&t| t == Token::Continuation));
    }

    #[test]
    fn test_context_window_is_bounded() {
        let vocab = test_vocab();
        let predictor = FixedPredictor::new(vec![0.0, 0.0, 1.0, 0.0, 0.0]);
        let generator = MelodyGenerator::new(&vocab, &predictor, 8);
        let mut rng = StdRng::seed_from_u64(1);

        // Seed padding alone is 8 ids + 2 seed ids, well over the window.
        let seed = [Token::Pitch(60), Token::Pitch(62)];
        generator.generate(&seed, 6, 4, 1.0, &mut rng).unwrap();

        for &len in predictor.seen_context_lengths.borrow().iter() {
            assert_eq!(len, 4);
        }
    }

    #[test]
    fn test_unknown_seed_symbol_rejected() {
        let vocab = test_vocab();
        let predictor = FixedPredictor::new(vec![0.2; 5]);
        let generator = MelodyGenerator::new(&vocab, &predictor, 8);
        let mut rng = StdRng::seed_from_u64(1);

        let err = generator
            .generate(&[Token::Pitch(99)], 3, 8, 1.0, &mut rng)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownSymbol(Token::Pitch(99))));
    }

    #[test]
    fn test_zero_temperature_rejected_before_sampling() {
        let vocab = test_vocab();
        let predictor = FixedPredictor::new(vec![0.2; 5]);
        let generator = MelodyGenerator::new(&vocab, &predictor, 8);
        let mut rng = StdRng::seed_from_u64(1);

        let err = generator
            .generate(&[Token::Pitch(60)], 3, 8, 0.0, &mut rng)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTemperature(_)));
        assert!(predictor.seen_context_lengths.borrow().is_empty());
    }

    #[test]
    fn test_short_distribution_rejected() {
        let vocab = test_vocab();
        let predictor = FixedPredictor::new(vec![0.5, 0.5]);
        let generator = MelodyGenerator::new(&vocab, &predictor, 8);
        let mut rng = StdRng::seed_from_u64(1);

        let err = generator
            .generate(&[Token::Pitch(60)], 3, 8, 1.0, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::PredictorContractViolation { expected: 5, got: 2 }
        ));
    }

    #[test]
    fn test_temperature_one_is_identity() {
        let probs = vec![0.1, 0.2, 0.3, 0.4];
        let adjusted = apply_temperature(&probs, 1.0).unwrap();
        for (a, p) in adjusted.iter().zip(&probs) {
            assert!((a - p).abs() < 1e-12);
        }
    }

    #[test]
    fn test_low_temperature_sharpens_toward_mode() {
        let probs = vec![0.1, 0.6, 0.3];
        let adjusted = apply_temperature(&probs, 0.05).unwrap();
        assert!(adjusted[1] > 0.999);
    }

    #[test]
    fn test_high_temperature_flattens() {
        let probs = vec![0.1, 0.6, 0.3];
        let adjusted = apply_temperature(&probs, 100.0).unwrap();
        for &a in &adjusted {
            assert!((a - 1.0 / 3.0).abs() < 0.05);
        }
    }

    #[test]
    fn test_end_to_end_with_ngram_predictor() {
        use crate::corpus;
        use crate::markov::NgramPredictor;

        let tokens =
            corpus::split_corpus("60 _ 62 _ 64 _ 62 _ 60 _ / / / / 60 _ 64 _ 62 _ 60 _ / / / /")
                .unwrap();
        let vocab = Vocabulary::build(&tokens).unwrap();
        let ids = corpus::tokens_to_ids(&tokens, &vocab).unwrap();
        let predictor = NgramPredictor::train(&ids, vocab.len());

        let generator = MelodyGenerator::new(&vocab, &predictor, 4);
        let mut rng = StdRng::seed_from_u64(7);
        let seed = [Token::Pitch(60), Token::Continuation];
        let melody = generator.generate(&seed, 20, 8, 1.0, &mut rng).unwrap();

        assert_eq!(&melody[..2], &seed);
        assert!(melody.len() <= 2 + 20);
        assert!(melody.iter().all(|&t| t != Token::Terminator));
    }

    #[test]
    fn test_sample_index_respects_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        let probs = vec![0.0, 1.0, 0.0];
        for _ in 0..100 {
            assert_eq!(sample_index(&probs, &mut rng), 1);
        }
    }
}
