use super::{PatternEvent, StepEvents};
use crate::instruments::HitClass::{self, *};
use crate::timing::Grid;

const KICK: f32 = 0.9;
const SNARE: f32 = 0.8;
const HAT: f32 = 0.7;
const GHOST_HAT: f32 = 0.5;
const SOFT_HAT: f32 = 0.4;
const OPEN_HAT: f32 = 0.6;

pub(super) fn shape(level: u8) -> Option<(Grid, u32)> {
    match level {
        1 => Some((Grid::Quarter, 4)),
        2 => Some((Grid::Eighth, 8)),
        3 => Some((Grid::Eighth, 16)),
        4 => Some((Grid::Sixteenth, 16)),
        _ => None,
    }
}

fn hit(class: HitClass, gain: f32, out: &mut StepEvents) {
    out.push(PatternEvent::hit(class, gain));
}

pub(super) fn events(level: u8, step: u64, out: &mut StepEvents) {
    match level {
        1 => {
            // kick on 1 and 3, snare on 2 and 4
            if step % 2 == 0 {
                hit(Kick, KICK, out);
            } else {
                hit(Snare, SNARE, out);
            }
            hit(ClosedHat, HAT, out);
        }
        2 => {
            if step % 2 == 0 {
                hit(Kick, KICK, out);
            }
            if matches!(step % 8, 2 | 6) {
                hit(Snare, SNARE, out);
            }
            hit(ClosedHat, HAT, out);
        }
        3 => {
            let s = step % 16;
            if s % 2 == 0 {
                hit(Kick, KICK, out);
            }
            if matches!(s % 8, 2 | 6) {
                hit(Snare, SNARE, out);
            }
            hit(ClosedHat, if s % 2 == 1 { GHOST_HAT } else { HAT }, out);
            if s == 7 {
                hit(OpenHat, OPEN_HAT, out);
            }
        }
        4 => {
            let s = step % 16;
            if matches!(s, 0 | 6 | 10 | 14) {
                hit(Kick, KICK, out);
            }
            if matches!(s, 4 | 8 | 12) {
                hit(Snare, SNARE, out);
            }
            if s % 2 == 0 {
                hit(ClosedHat, HAT, out);
            } else if s % 4 == 1 {
                hit(ClosedHat, SOFT_HAT, out);
            }
            if matches!(s, 7 | 15) {
                hit(OpenHat, OPEN_HAT, out);
            }
        }
        _ => {}
    }
}
