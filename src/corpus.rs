// Corpus assembly and the on-disk text format.
//
// Encoded songs are plain text: token strings separated by single spaces
// ("67 _ _ r 65 _"). A dataset is all songs concatenated into one file,
// separated by a run of SEQUENCE_LENGTH terminator tokens — the same length
// as the training window, so a window never spans from the end of one song
// into the middle of another without seeing the boundary.
//
// The single-file corpus plus the mapping JSON (vocab.rs) is everything a
// training run or a generation run needs to reload.

use crate::error::Result;
use crate::token::Token;
use crate::vocab::Vocabulary;
use std::path::Path;

/// Training window length, and the length of the song-delimiter run.
pub const SEQUENCE_LENGTH: usize = 64;

/// The delimiter inserted between songs: `sequence_length` copies of "/ ".
fn song_delimiter(sequence_length: usize) -> String {
    "/ ".repeat(sequence_length)
}

/// Concatenate encoded songs into a single corpus string. Each song is
/// followed by the delimiter run; the trailing space after the final
/// delimiter is trimmed.
pub fn join_songs(songs: &[String], sequence_length: usize) -> String {
    let delimiter = song_delimiter(sequence_length);
    let mut corpus = String::new();
    for song in songs {
        corpus.push_str(song);
        corpus.push(' ');
        corpus.push_str(&delimiter);
    }
    corpus.pop();
    corpus
}

/// Parse corpus text back into tokens. Whitespace-separated; fails with
/// `BadToken` on anything that isn't in the alphabet.
pub fn split_corpus(text: &str) -> Result<Vec<Token>> {
    text.split_whitespace().map(Token::parse).collect()
}

/// Render tokens as corpus text.
pub fn tokens_to_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map corpus tokens to vocabulary ids, in order.
pub fn tokens_to_ids(tokens: &[Token], vocab: &Vocabulary) -> Result<Vec<usize>> {
    tokens.iter().map(|&t| vocab.id_of(t)).collect()
}

/// Read every encoded-song file in a directory (sorted by file name for a
/// deterministic corpus) and join them into a single dataset string.
pub fn build_dataset(dir: &Path, sequence_length: usize) -> Result<String> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    let mut songs = Vec::with_capacity(paths.len());
    for path in paths {
        let text = std::fs::read_to_string(&path)?;
        // Validate now so a bad file names itself, not the merged corpus.
        split_corpus(&text)?;
        songs.push(text.trim().to_string());
    }
    Ok(join_songs(&songs, sequence_length))
}
