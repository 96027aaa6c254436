use super::{PatternEvent, Role, StepEvents};
use crate::notes::{Note, PitchClass::*};
use crate::timing::{Grid, NoteValue};

const TRIADS: [&[Note]; 3] = [
    &[Note::new(C, 3), Note::new(G, 3), Note::new(E, 4)],
    &[Note::new(F, 3), Note::new(C, 4), Note::new(A, 4)],
    &[Note::new(G, 3), Note::new(D, 4), Note::new(B, 4)],
];

const SEVENTHS: [&[Note]; 3] = [
    &[Note::new(C, 3), Note::new(G, 3), Note::new(E, 4), Note::new(B, 4)],
    &[Note::new(F, 3), Note::new(C, 4), Note::new(A, 4), Note::new(E, 5)],
    &[Note::new(G, 3), Note::new(D, 4), Note::new(B, 4), Note::new(Fs, 5)],
];

/// C F G C, as indices into the voicing tables.
const PROGRESSION: [usize; 4] = [0, 1, 2, 0];

const LEVEL4_HITS: [u64; 12] = [0, 3, 6, 8, 11, 14, 16, 19, 22, 24, 27, 30];

pub(super) fn shape(level: u8) -> Option<(Grid, u32)> {
    match level {
        1 => Some((Grid::Eighth, 8)),
        2 => Some((Grid::Eighth, 16)),
        3 | 4 => Some((Grid::Eighth, 32)),
        _ => None,
    }
}

fn steps_per_chord(level: u8) -> u64 {
    match level {
        1 | 2 => 8,
        3 => 16,
        _ => 32,
    }
}

/// Voicing index of the progression chord sounding at `step`.
fn chord_at(level: u8, step: u64) -> usize {
    PROGRESSION[((step / steps_per_chord(level)) % 4) as usize]
}

fn strike(
    voicing: &[Note],
    velocity: f32,
    offset_sec: f64,
    out: &mut StepEvents,
) {
    for note in voicing {
        out.push(PatternEvent::note(
            Role::Chord,
            *note,
            NoteValue::Quarter,
            velocity,
            offset_sec,
        ));
    }
}

pub(super) fn events(level: u8, step: u64, out: &mut StepEvents) {
    let triad = TRIADS[chord_at(level, step)];
    match level {
        1 if step % 8 == 0 => strike(triad, 0.3, 0.0, out),
        2 if step % 4 == 0 => strike(triad, 0.35, 0.0, out),
        3 => match step % 8 {
            0 => strike(triad, 0.4, 0.0, out),
            // pushed late for a lilt
            4 => strike(triad, 0.4, 0.25, out),
            _ => {}
        },
        4 => {
            let pos = step % 32;
            if !LEVEL4_HITS.contains(&pos) {
                return;
            }
            let offset = if pos % 3 == 0 && pos != 0 && pos != 16 {
                0.1
            } else if pos % 2 == 1 {
                0.15
            } else {
                0.0
            };
            let velocity = 0.45 + (pos % 3) as f32 * 0.05;
            strike(SEVENTHS[chord_at(level, step)], velocity, offset, out);
        }
        _ => {}
    }
}
