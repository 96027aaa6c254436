// Recording sound collaborators shared by the integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use wisteria_core::{
    AudioBackend, HitClass, Kit, Note, NoteValue, SampleHandle, SynthHandle, SynthPreset,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Played {
    Note {
        preset: SynthPreset,
        note: Note,
        duration: NoteValue,
        time: f64,
        velocity: f32,
    },
    Hit {
        class: HitClass,
        time: f64,
        gain: f32,
    },
    Volume {
        preset: SynthPreset,
        db: f32,
    },
    Cutoff {
        preset: SynthPreset,
        hz: f32,
    },
}

pub type Log = Rc<RefCell<Vec<Played>>>;

pub struct RecordingSynth {
    pub preset: SynthPreset,
    pub log: Log,
    pub ready: bool,
}

impl SynthHandle for RecordingSynth {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn trigger_note(&mut self, note: Note, duration: NoteValue, time: f64, velocity: f32) {
        self.log.borrow_mut().push(Played::Note {
            preset: self.preset,
            note,
            duration,
            time,
            velocity,
        });
    }

    fn set_volume_db(&mut self, db: f32) {
        self.log.borrow_mut().push(Played::Volume {
            preset: self.preset,
            db,
        });
    }

    fn set_cutoff_hz(&mut self, hz: f32) {
        self.log.borrow_mut().push(Played::Cutoff {
            preset: self.preset,
            hz,
        });
    }
}

pub struct RecordingSample {
    pub class: HitClass,
    pub loaded: bool,
    pub log: Log,
}

impl SampleHandle for RecordingSample {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn play(&mut self, time: f64, gain: f32) {
        self.log.borrow_mut().push(Played::Hit {
            class: self.class,
            time,
            gain,
        });
    }
}

pub struct RecordingBackend {
    pub log: Log,
    pub samples_loaded: bool,
    pub cat_ready: Rc<RefCell<bool>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            samples_loaded: true,
            cat_ready: Rc::new(RefCell::new(true)),
        }
    }

    pub fn log(&self) -> Log {
        Rc::clone(&self.log)
    }
}

impl AudioBackend for RecordingBackend {
    fn synth(&mut self, preset: SynthPreset) -> Box<dyn SynthHandle> {
        Box::new(RecordingSynth {
            preset,
            log: self.log(),
            ready: true,
        })
    }

    fn sample(&mut self, _kit: Kit, class: HitClass, _file: &str) -> Box<dyn SampleHandle> {
        Box::new(RecordingSample {
            class,
            loaded: self.samples_loaded,
            log: self.log(),
        })
    }

    fn asset_ready(&self, _asset: &str) -> bool {
        *self.cat_ready.borrow()
    }
}

pub fn notes_of(log: &Log, preset: SynthPreset) -> Vec<(Note, f64)> {
    log.borrow()
        .iter()
        .filter_map(|p| match p {
            Played::Note {
                preset: p, note, time, ..
            } if *p == preset => Some((*note, *time)),
            _ => None,
        })
        .collect()
}

pub fn hits(log: &Log) -> Vec<(HitClass, f64, f32)> {
    log.borrow()
        .iter()
        .filter_map(|p| match p {
            Played::Hit { class, time, gain } => Some((*class, *time, *gain)),
            _ => None,
        })
        .collect()
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
