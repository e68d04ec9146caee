// Fixed-timestep encoding and decoding.
//
// A melody of variable-duration events is re-expressed on a uniform grid:
// each event becomes a head token (its pitch, or "r" for a rest) followed by
// one continuation token "_" per additional timestep it sounds. A quarter
// note at the default 0.25 timestep is four grid slots: "60 _ _ _".
//
// The transform is exactly reversible for any duration that sits on the
// grid; off-grid durations are rejected, never rounded.

use crate::error::{Error, Result};
use crate::token::{Event, EventKind, Token};

/// Default grid resolution: a sixteenth note, in quarter lengths.
pub const DEFAULT_TIME_STEP: f64 = 0.25;

/// Relative slack for the exact-multiple check. Durations come from parsed
/// score files via f64 arithmetic, so demand grid alignment only up to
/// rounding noise.
const GRID_TOLERANCE: f64 = 1e-6;

/// Encode events onto the timestep grid.
///
/// Fails with `InvalidDuration` if any event's duration is zero or not an
/// exact multiple of `time_step`.
pub fn encode(events: &[Event], time_step: f64) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    for event in events {
        let exact = event.quarter_length / time_step;
        let steps = exact.round();
        if steps < 1.0 || (exact - steps).abs() > GRID_TOLERANCE {
            return Err(Error::InvalidDuration {
                quarter_length: event.quarter_length,
                time_step,
            });
        }

        let head = match event.kind {
            EventKind::Pitch(midi) => Token::Pitch(midi),
            EventKind::Rest => Token::Rest,
        };
        tokens.push(head);
        for _ in 1..steps as usize {
            tokens.push(Token::Continuation);
        }
    }
    Ok(tokens)
}

/// Decode a timestep token sequence back into events.
///
/// Run-length scan: each head token opens a run, each continuation extends
/// it by one step, and the next head (or end of input) flushes it as an
/// event of `run_length * time_step` quarter lengths. A terminator ends the
/// scan; it never becomes an event.
pub fn decode(tokens: &[Token], time_step: f64) -> Vec<Event> {
    let mut events = Vec::new();
    let mut pending: Option<Token> = None;
    let mut steps = 1usize;

    for &token in tokens {
        if token == Token::Continuation {
            steps += 1;
            continue;
        }
        if let Some(head) = pending.take() {
            events.push(flush(head, steps, time_step));
        }
        steps = 1;
        if token == Token::Terminator {
            return events;
        }
        pending = Some(token);
    }

    if let Some(head) = pending {
        events.push(flush(head, steps, time_step));
    }
    events
}

fn flush(head: Token, steps: usize, time_step: f64) -> Event {
    let quarter_length = steps as f64 * time_step;
    match head {
        Token::Pitch(midi) => Event::note(midi, quarter_length),
        // Only pitch and rest heads ever become pending.
        _ => Event::rest(quarter_length),
    }
}
