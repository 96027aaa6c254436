//! Typed pitches.
//!
//! Patterns and stages address pitches as [`Note`] values (pitch class plus
//! octave) rather than strings. Scientific pitch names (`C4`, `F#5`, `Bb3`)
//! parse into notes for configuration and logging.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

const PITCH_CLASSES: [PitchClass; 12] = [
    PitchClass::C,
    PitchClass::Cs,
    PitchClass::D,
    PitchClass::Ds,
    PitchClass::E,
    PitchClass::F,
    PitchClass::Fs,
    PitchClass::G,
    PitchClass::Gs,
    PitchClass::A,
    PitchClass::As,
    PitchClass::B,
];

impl PitchClass {
    /// Semitones above C.
    pub const fn semitone(self) -> i32 {
        self as i32
    }

    pub fn from_semitone(semitone: i32) -> Self {
        PITCH_CLASSES[semitone.rem_euclid(12) as usize]
    }

    pub const fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }
}

/// A pitch in scientific notation: `Note::new(PitchClass::A, 4)` is A4 (440 Hz).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Note {
    pub pitch: PitchClass,
    pub octave: i8,
}

impl Note {
    pub const fn new(pitch: PitchClass, octave: i8) -> Self {
        Self { pitch, octave }
    }

    pub fn midi(self) -> i32 {
        (self.octave as i32 + 1) * 12 + self.pitch.semitone()
    }

    pub fn hz(self) -> f32 {
        midi_to_hz(self.midi() as f32)
    }

    /// Same pitch class, one octave lower. Used for sub-bass doubling.
    pub const fn octave_down(self) -> Self {
        Self {
            pitch: self.pitch,
            octave: self.octave - 1,
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch.name(), self.octave)
    }
}

impl FromStr for Note {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CoreError::invalid("note", format!("cannot parse '{s}'"));
        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(bad)?;
        let base = match letter.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(bad()),
        };
        let rest = chars.as_str();
        let (accidental, octave_str) = match rest.chars().next() {
            Some('#') => (1, &rest[1..]),
            Some('b') => (-1, &rest[1..]),
            _ => (0, rest),
        };
        let octave: i32 = octave_str.parse().map_err(|_| bad())?;
        // B#3 is C4 and Cb4 is B3: carry accidentals across the octave boundary
        let midi = (octave + 1) * 12 + base + accidental;
        let octave = midi.div_euclid(12) - 1;
        let octave = i8::try_from(octave).map_err(|_| bad())?;
        Ok(Note::new(PitchClass::from_semitone(midi), octave))
    }
}

#[inline]
pub fn midi_to_hz(midi: f32) -> f32 {
    440.0 * 2f32.powf((midi - 69.0) / 12.0)
}
