use super::{PatternEvent, Role, StepEvents};
use crate::notes::{Note, PitchClass::*};
use crate::timing::{Grid, NoteValue};

const ROOTS: [Note; 4] = [
    Note::new(C, 2),
    Note::new(F, 2),
    Note::new(G, 2),
    Note::new(C, 2),
];

const FIFTHS: [Note; 4] = [
    Note::new(G, 2),
    Note::new(C, 3),
    Note::new(D, 3),
    Note::new(G, 2),
];

const WALKING: [&[Note]; 4] = [
    &[Note::new(C, 2), Note::new(D, 2), Note::new(E, 2), Note::new(F, 2)],
    &[Note::new(G, 2), Note::new(A, 2), Note::new(B, 2), Note::new(C, 3)],
    &[Note::new(F, 2), Note::new(G, 2), Note::new(A, 2), Note::new(B, 2)],
    &[Note::new(C, 2), Note::new(E, 2), Note::new(G, 2), Note::new(C, 3)],
];

const EXPRESSIVE: [&[Note]; 4] = [
    &[
        Note::new(C, 2),
        Note::new(E, 2),
        Note::new(G, 2),
        Note::new(C, 3),
        Note::new(E, 3),
    ],
    &[Note::new(G, 2), Note::new(B, 2), Note::new(D, 3), Note::new(G, 3)],
    &[
        Note::new(F, 2),
        Note::new(A, 2),
        Note::new(C, 3),
        Note::new(F, 3),
        Note::new(A, 3),
    ],
    &[
        Note::new(C, 2),
        Note::new(G, 2),
        Note::new(C, 3),
        Note::new(E, 3),
        Note::new(G, 3),
    ],
];

pub(super) fn shape(level: u8) -> Option<(Grid, u32)> {
    match level {
        1..=4 => Some((Grid::Quarter, 4)),
        _ => None,
    }
}

/// Bass note plus its sub-bass double an octave below.
fn doubled(
    note: Note,
    duration: NoteValue,
    velocity: f32,
    sub_velocity: f32,
    offset_sec: f64,
    out: &mut StepEvents,
) {
    out.push(PatternEvent::note(Role::Bass, note, duration, velocity, offset_sec));
    out.push(PatternEvent::note(
        Role::SubBass,
        note.octave_down(),
        duration,
        sub_velocity,
        offset_sec,
    ));
}

pub(super) fn events(level: u8, step: u64, out: &mut StepEvents) {
    let i = (step % 4) as usize;
    match level {
        1 => doubled(ROOTS[i], NoteValue::Half, 0.4, 0.3, 0.0, out),
        2 => {
            doubled(ROOTS[i], NoteValue::Quarter, 0.5, 0.35, 0.0, out);
            doubled(FIFTHS[i], NoteValue::Quarter, 0.5, 0.35, 0.5, out);
        }
        3 => {
            for (j, note) in WALKING[i].iter().enumerate() {
                doubled(*note, NoteValue::Eighth, 0.6, 0.4, j as f64 * 0.25, out);
            }
        }
        4 => {
            for (j, note) in EXPRESSIVE[i].iter().enumerate() {
                let push = if j % 2 == 1 { 0.125 } else { 0.0 };
                doubled(
                    *note,
                    NoteValue::Sixteenth,
                    0.7,
                    0.45,
                    j as f64 * 0.25 + push,
                    out,
                );
            }
        }
        _ => {}
    }
}
