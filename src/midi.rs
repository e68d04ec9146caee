// MIDI output for decoded melodies.
//
// Converts an event sequence into a single-track Standard MIDI File for
// playback. Durations are in quarter lengths, mapped to ticks at a fixed
// resolution; rests advance time without emitting any message.
//
// Uses the `midly` crate. Output is SMF Format 0 (one melody, one track).

use crate::token::{Event, EventKind};
use midly::{
    Format, Header, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

/// Playback tempo in BPM.
const TEMPO_BPM: u32 = 120;

/// Note-on velocity for every note.
const VELOCITY: u8 = 80;

/// Convert events to MIDI and write to a file.
pub fn write_midi(events: &[Event], path: &Path) -> crate::error::Result<()> {
    events_to_smf(events).save(path)?;
    Ok(())
}

/// Convert events to an in-memory SMF.
pub fn events_to_smf(events: &[Event]) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let channel = u4::new(0);
    let mut track: Track<'static> = Vec::new();
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::Tempo(u24::new(
            60_000_000 / TEMPO_BPM,
        ))),
    });

    let mut current_tick: u32 = 0;
    let mut last_event_tick: u32 = 0;

    for event in events {
        let ticks = (event.quarter_length * TICKS_PER_QUARTER as f64).round() as u32;
        if let EventKind::Pitch(midi) = event.kind {
            track.push(TrackEvent {
                delta: u28::new(current_tick - last_event_tick),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn {
                        key: u7::new(midi),
                        vel: u7::new(VELOCITY),
                    },
                },
            });
            track.push(TrackEvent {
                delta: u28::new(ticks),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff {
                        key: u7::new(midi),
                        vel: u7::new(0),
                    },
                },
            });
            last_event_tick = current_tick + ticks;
        }
        // Rests contribute only elapsed time.
        current_tick += ticks;
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
    });
    smf.tracks.push(track);
    smf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Event;

    #[test]
    fn test_single_track_with_note_pairs() {
        let events = [Event::note(60, 1.0), Event::rest(0.5), Event::note(64, 0.25)];
        let smf = events_to_smf(&events);
        assert_eq!(smf.tracks.len(), 1);

        let midi_events: Vec<_> = smf.tracks[0]
            .iter()
            .filter(|e| matches!(e.kind, TrackEventKind::Midi { .. }))
            .collect();
        // Two notes: NoteOn + NoteOff each.
        assert_eq!(midi_events.len(), 4);
    }

    #[test]
    fn test_rest_advances_time() {
        let events = [Event::note(60, 1.0), Event::rest(1.0), Event::note(62, 1.0)];
        let smf = events_to_smf(&events);
        // The second NoteOn's delta must include the rest: 480 ticks.
        let deltas: Vec<u32> = smf.tracks[0]
            .iter()
            .filter_map(|e| match e.kind {
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { .. },
                    ..
                } => Some(e.delta.as_int()),
                _ => None,
            })
            .collect();
        assert_eq!(deltas, vec![0, 480]);
    }
}
