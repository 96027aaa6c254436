//! Per-track complexity levels and the patterns they select.
//!
//! A [`Pattern`] is a pure function from an absolute step index to the
//! events that step should sound. Randomness only enters later, when the
//! rack picks a sample from a drum pool.

mod bass;
mod chords;
mod drums;
mod melody;

use smallvec::SmallVec;

use crate::constants::{MAX_LEVEL, TRACK_COUNT};
use crate::error::{CoreError, CoreResult};
use crate::instruments::HitClass;
use crate::notes::Note;
use crate::timing::{Grid, NoteValue};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Melody,
    Chord,
    Drum,
    Bass,
}

impl TrackKind {
    pub const ALL: [TrackKind; TRACK_COUNT] = [
        TrackKind::Melody,
        TrackKind::Chord,
        TrackKind::Drum,
        TrackKind::Bass,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Tracks are numbered 1..=4 by the sparkle branches (birds) that drive them.
    pub fn from_number(number: u8) -> CoreResult<Self> {
        match number {
            1..=4 => Ok(Self::ALL[number as usize - 1]),
            _ => Err(CoreError::invalid(
                "track",
                format!("expected 1..=4, got {number}"),
            )),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            TrackKind::Melody => "melody",
            TrackKind::Chord => "chord",
            TrackKind::Drum => "drum",
            TrackKind::Bass => "bass",
        }
    }
}

/// Complexity level 0..=4. Level 0 is silence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u8);

impl Level {
    pub const SILENT: Level = Level(0);
    pub const MAX: Level = Level(MAX_LEVEL);

    pub fn new(level: u8) -> CoreResult<Self> {
        if level > MAX_LEVEL {
            return Err(CoreError::invalid(
                "level",
                format!("expected 0..={MAX_LEVEL}, got {level}"),
            ));
        }
        Ok(Level(level))
    }

    pub fn from_count(count: usize) -> CoreResult<Self> {
        let level = u8::try_from(count)
            .map_err(|_| CoreError::invalid("level", format!("count {count} out of range")))?;
        Self::new(level)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn is_silent(self) -> bool {
        self.0 == 0
    }
}

/// Which instrument of the rack an event is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Melody,
    Chord,
    Bass,
    SubBass,
    Drum,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sound {
    Pitch(Note),
    Hit(HitClass),
}

/// One trigger within a step. `velocity` doubles as sample gain for hits;
/// `offset_sec` is added to the step's schedule time and is never negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatternEvent {
    pub role: Role,
    pub sound: Sound,
    pub duration: NoteValue,
    pub velocity: f32,
    pub offset_sec: f64,
}

impl PatternEvent {
    pub const fn note(
        role: Role,
        note: Note,
        duration: NoteValue,
        velocity: f32,
        offset_sec: f64,
    ) -> Self {
        Self {
            role,
            sound: Sound::Pitch(note),
            duration,
            velocity,
            offset_sec,
        }
    }

    pub const fn hit(class: HitClass, gain: f32) -> Self {
        Self {
            role: Role::Drum,
            sound: Sound::Hit(class),
            duration: NoteValue::Sixteenth,
            velocity: gain,
            offset_sec: 0.0,
        }
    }
}

pub type StepEvents = SmallVec<[PatternEvent; 8]>;

/// A level's rhythmic shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pattern {
    pub track: TrackKind,
    pub level: Level,
    pub grid: Grid,
    pub cycle_len: u32,
}

impl Pattern {
    /// `None` for level 0: silence has no sequence.
    pub fn for_level(track: TrackKind, level: Level) -> Option<Pattern> {
        let shape = match track {
            TrackKind::Melody => melody::shape(level.get()),
            TrackKind::Chord => chords::shape(level.get()),
            TrackKind::Drum => drums::shape(level.get()),
            TrackKind::Bass => bass::shape(level.get()),
        };
        shape.map(|(grid, cycle_len)| Pattern {
            track,
            level,
            grid,
            cycle_len,
        })
    }

    /// Events for absolute step `step`.
    pub fn events(&self, step: u64) -> StepEvents {
        let mut out = StepEvents::new();
        let level = self.level.get();
        match self.track {
            TrackKind::Melody => melody::events(level, step, &mut out),
            TrackKind::Chord => chords::events(level, step, &mut out),
            TrackKind::Drum => drums::events(level, step, &mut out),
            TrackKind::Bass => bass::events(level, step, &mut out),
        }
        out
    }

    pub fn step_seconds(&self, bpm: f64) -> f64 {
        self.grid.step_seconds(bpm)
    }

    /// Length of one full cycle in beats.
    pub fn cycle_beats(&self) -> f64 {
        self.grid.beats() * self.cycle_len as f64
    }
}
