use super::{PatternEvent, Role, StepEvents};
use crate::notes::{Note, PitchClass::*};
use crate::timing::{Grid, NoteValue};

const TRIAD: [Note; 3] = [Note::new(C, 4), Note::new(E, 4), Note::new(G, 4)];

const MOTIFS: [[Note; 3]; 4] = [
    TRIAD,
    [Note::new(D, 4), Note::new(F, 4), Note::new(A, 4)],
    [Note::new(E, 4), Note::new(G, 4), Note::new(B, 4)],
    TRIAD,
];

const PHRASES: [&[Note]; 4] = [
    &[Note::new(C, 4), Note::new(E, 4), Note::new(G, 4), Note::new(C, 5)],
    &[Note::new(G, 4), Note::new(B, 4), Note::new(D, 5)],
    &[Note::new(A, 4), Note::new(C, 5), Note::new(E, 5)],
    &[Note::new(G, 4), Note::new(E, 4), Note::new(C, 4)],
];

const FLOURISHES: [&[Note]; 4] = [
    &[
        Note::new(C, 4),
        Note::new(D, 4),
        Note::new(E, 4),
        Note::new(F, 4),
        Note::new(G, 4),
        Note::new(A, 4),
        Note::new(B, 4),
        Note::new(C, 5),
    ],
    &[
        Note::new(C, 5),
        Note::new(B, 4),
        Note::new(A, 4),
        Note::new(G, 4),
        Note::new(F, 4),
        Note::new(E, 4),
        Note::new(D, 4),
        Note::new(C, 4),
    ],
    &[
        Note::new(C, 4),
        Note::new(E, 4),
        Note::new(G, 4),
        Note::new(C, 5),
        Note::new(E, 5),
    ],
    &[Note::new(G, 4), Note::new(B, 4), Note::new(D, 5), Note::new(G, 5)],
];

pub(super) fn shape(level: u8) -> Option<(Grid, u32)> {
    match level {
        1 => Some((Grid::Quarter, 8)),
        2..=4 => Some((Grid::Quarter, 4)),
        _ => None,
    }
}

fn run(notes: &[Note], spacing: f64, duration: NoteValue, velocity: f32, out: &mut StepEvents) {
    for (i, note) in notes.iter().enumerate() {
        out.push(PatternEvent::note(
            Role::Melody,
            *note,
            duration,
            velocity,
            i as f64 * spacing,
        ));
    }
}

pub(super) fn events(level: u8, step: u64, out: &mut StepEvents) {
    let bar = (step % 4) as usize;
    match level {
        // arpeggiated tonic every two bars
        1 if step % 8 == 0 => run(&TRIAD, 0.25, NoteValue::Eighth, 0.4, out),
        2 => run(&MOTIFS[bar], 0.25, NoteValue::Eighth, 0.5, out),
        3 => run(PHRASES[bar], 0.25, NoteValue::Eighth, 0.6, out),
        4 => run(FLOURISHES[bar], 0.125, NoteValue::Sixteenth, 0.7, out),
        _ => {}
    }
}
