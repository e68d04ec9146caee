// The token alphabet and event model.
//
// A melody is a sequence of Events (pitch or rest, each with a duration in
// quarter-note lengths). On disk and inside the generator the melody lives
// as a sequence of Tokens: a pitch symbol (the MIDI number in decimal), the
// rest symbol "r", the continuation symbol "_" (the previous pitch/rest is
// still sounding for one more timestep), and the terminator "/" that
// separates songs in a corpus and tells generation to stop.
//
// Events are the representation score parsers hand us and the MIDI writer
// consumes. Tokens are the representation the vocabulary, the training
// windower, and the predictor operate on. encoding.rs converts between them.

use crate::error::{Error, Result};
use std::fmt;

/// Durations (in quarter lengths) a song may use. Songs containing any other
/// duration are rejected before encoding; the timestep grid cannot represent
/// them without rounding.
pub const ACCEPTABLE_DURATIONS: [f64; 8] = [0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 4.0];

/// One symbol in the generation alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// A note attack, carrying its MIDI note number.
    Pitch(u8),
    /// A rest attack ("r").
    Rest,
    /// The previous pitch/rest is held for one more timestep ("_").
    Continuation,
    /// Song boundary / end-of-generation marker ("/").
    Terminator,
}

impl Token {
    /// Parse the corpus text form of a token. Exact inverse of `Display`.
    pub fn parse(s: &str) -> Result<Token> {
        match s {
            "r" => Ok(Token::Rest),
            "_" => Ok(Token::Continuation),
            "/" => Ok(Token::Terminator),
            _ => s
                .parse::<u8>()
                .map(Token::Pitch)
                .map_err(|_| Error::BadToken(s.to_string())),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Pitch(midi) => write!(f, "{}", midi),
            Token::Rest => write!(f, "r"),
            Token::Continuation => write!(f, "_"),
            Token::Terminator => write!(f, "/"),
        }
    }
}

/// What a musical event sounds like: a definite pitch or silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// MIDI note number (0-127).
    Pitch(u8),
    Rest,
}

/// A single note or rest with its duration in quarter-note lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub quarter_length: f64,
}

impl Event {
    pub fn note(midi: u8, quarter_length: f64) -> Self {
        Event {
            kind: EventKind::Pitch(midi),
            quarter_length,
        }
    }

    pub fn rest(quarter_length: f64) -> Self {
        Event {
            kind: EventKind::Rest,
            quarter_length,
        }
    }
}

/// Check that every event's duration is in the acceptable set.
/// Songs failing this are skipped upstream rather than rounded onto the grid.
pub fn has_acceptable_durations(events: &[Event]) -> bool {
    events.iter().all(|event| {
        ACCEPTABLE_DURATIONS
            .iter()
            .any(|&d| (event.quarter_length - d).abs() < 1e-9)
    })
}
