//! Musical time: step grids and note durations expressed in beats.

use std::fmt;

/// Quantization grid a sequence steps on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Grid {
    Quarter,
    Eighth,
    Sixteenth,
}

impl Grid {
    pub const fn beats(self) -> f64 {
        match self {
            Grid::Quarter => 1.0,
            Grid::Eighth => 0.5,
            Grid::Sixteenth => 0.25,
        }
    }

    pub fn step_seconds(self, bpm: f64) -> f64 {
        60.0 / bpm * self.beats()
    }
}

/// Duration token handed to synths alongside a note (`"8n"`, `"16n"`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoteValue {
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
}

impl NoteValue {
    pub const fn beats(self) -> f64 {
        match self {
            NoteValue::Half => 2.0,
            NoteValue::Quarter => 1.0,
            NoteValue::Eighth => 0.5,
            NoteValue::Sixteenth => 0.25,
            NoteValue::ThirtySecond => 0.125,
        }
    }

    pub fn seconds(self, bpm: f64) -> f64 {
        60.0 / bpm * self.beats()
    }

    pub const fn token(self) -> &'static str {
        match self {
            NoteValue::Half => "2n",
            NoteValue::Quarter => "4n",
            NoteValue::Eighth => "8n",
            NoteValue::Sixteenth => "16n",
            NoteValue::ThirtySecond => "32n",
        }
    }
}

impl fmt::Display for NoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
