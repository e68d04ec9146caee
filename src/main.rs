// Folkweave — CLI entry point.
//
// Two subcommands:
//   dataset  — merge per-song encoded token files into a single-file corpus
//              and build the vocabulary mapping
//   melody   — train the n-gram predictor on the corpus, generate a melody
//              from a seed, and write it to MIDI
//
// Usage:
//   cargo run -- dataset <songs_dir> [--out file_dataset.txt]
//     [--mapping mapping.json] [--sequence-length 64]
//   cargo run -- melody [--corpus file_dataset.txt] [--mapping mapping.json]
//     [--seed-tokens "60 64 67 _ _ 64"] [--steps 500] [--temperature 0.9]
//     [--max-context 64] [--rng-seed N] [--time-step 0.25] [--out mel.mid]

use folkweave::corpus::{self, SEQUENCE_LENGTH};
use folkweave::encoding::{self, DEFAULT_TIME_STEP};
use folkweave::error::Result;
use folkweave::generate::MelodyGenerator;
use folkweave::markov::NgramPredictor;
use folkweave::midi::write_midi;
use folkweave::vocab::Vocabulary;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let result = match args.get(1).map(|s| s.as_str()) {
        Some("dataset") => build_dataset(&args),
        Some("melody") => generate_melody(&args),
        _ => {
            eprintln!("Usage: generate <dataset|melody> [options]");
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn build_dataset(args: &[String]) -> Result<()> {
    let songs_dir = args
        .get(2)
        .filter(|s| !s.starts_with("--"))
        .map(|s| s.as_str())
        .unwrap_or("dataset");
    let out: String = parse_flag(args, "--out").unwrap_or_else(|| "file_dataset.txt".to_string());
    let mapping: String =
        parse_flag(args, "--mapping").unwrap_or_else(|| "mapping.json".to_string());
    let sequence_length = parse_flag(args, "--sequence-length").unwrap_or(SEQUENCE_LENGTH);

    println!("=== Folkweave dataset builder ===");
    println!("[1/3] Merging songs from {}...", songs_dir);
    let text = corpus::build_dataset(Path::new(songs_dir), sequence_length)?;
    let tokens = corpus::split_corpus(&text)?;
    std::fs::write(&out, &text)?;
    println!("  {} tokens written to {}.", tokens.len(), out);

    println!("[2/3] Building vocabulary...");
    let vocab = Vocabulary::build(&tokens)?;
    println!("  {} distinct tokens.", vocab.len());

    println!("[3/3] Writing mapping to {}...", mapping);
    vocab.save(Path::new(&mapping))?;
    println!("Done.");
    Ok(())
}

fn generate_melody(args: &[String]) -> Result<()> {
    let corpus_path: String =
        parse_flag(args, "--corpus").unwrap_or_else(|| "file_dataset.txt".to_string());
    let mapping: String =
        parse_flag(args, "--mapping").unwrap_or_else(|| "mapping.json".to_string());
    let seed_text: String = parse_flag(args, "--seed-tokens")
        .unwrap_or_else(|| "60 64 67 _ _ 64 65 _ _ 62 64 62".to_string());
    let num_steps: usize = parse_flag(args, "--steps").unwrap_or(500);
    let max_context: usize = parse_flag(args, "--max-context").unwrap_or(SEQUENCE_LENGTH);
    let temperature: f64 = parse_flag(args, "--temperature").unwrap_or(0.9);
    let rng_seed: Option<u64> = parse_flag(args, "--rng-seed");
    let time_step: f64 = parse_flag(args, "--time-step").unwrap_or(DEFAULT_TIME_STEP);
    let out: String = parse_flag(args, "--out").unwrap_or_else(|| "mel.mid".to_string());

    println!("=== Folkweave melody generator ===");
    println!("Seed: {}", seed_text);
    println!("Steps: {}  Temperature: {}  Context: {}", num_steps, temperature, max_context);

    println!("[1/4] Loading vocabulary and corpus...");
    let vocab = Vocabulary::load(Path::new(&mapping))?;
    let tokens = corpus::split_corpus(&std::fs::read_to_string(&corpus_path)?)?;
    let ids = corpus::tokens_to_ids(&tokens, &vocab)?;
    println!("  {} corpus tokens, {} in vocabulary.", ids.len(), vocab.len());

    println!("[2/4] Training n-gram predictor...");
    let predictor = NgramPredictor::train(&ids, vocab.len());

    println!("[3/4] Generating...");
    let mut rng = match rng_seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    let seed = corpus::split_corpus(&seed_text)?;
    let generator = MelodyGenerator::new(&vocab, &predictor, SEQUENCE_LENGTH);
    let melody = generator.generate(&seed, num_steps, max_context, temperature, &mut rng)?;
    println!("  {} tokens: {}", melody.len(), corpus::tokens_to_text(&melody));

    println!("[4/4] Writing MIDI to {}...", out);
    let events = encoding::decode(&melody, time_step);
    write_midi(&events, Path::new(&out))?;
    println!("Done! {} events. Play with: timidity {}", events.len(), out);
    Ok(())
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
