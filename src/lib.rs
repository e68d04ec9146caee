// Folkweave
//
// A monophonic melody pipeline: encodes folk songs onto a fixed-timestep
// token grid, builds a single-file token corpus with a vocabulary mapping,
// windows it into supervised training pairs, and generates new melodies
// autoregressively with temperature-controlled sampling.
//
// Architecture:
// - token.rs: Token alphabet and the Event (pitch/rest + duration) model
// - encoding.rs: Fixed-timestep encode/decode between events and tokens
// - vocab.rs: Symbol <-> id bijection, built from a corpus, JSON-persisted
// - corpus.rs: Single-file dataset assembly and the corpus text format
// - training.rs: Sliding-window (context, target) pairs and one-hot encoding
// - markov.rs: Corpus-trained backoff n-gram predictor
// - generate.rs: Autoregressive sampling loop (Predictor trait lives here)
// - midi.rs: Standard MIDI File output for decoded melodies
// - error.rs: Typed failure taxonomy
//
// Generation is deterministic given an RNG seed, supporting reproducible
// output.

pub mod corpus;
pub mod encoding;
pub mod error;
pub mod generate;
pub mod markov;
pub mod midi;
pub mod token;
pub mod training;
pub mod vocab;
