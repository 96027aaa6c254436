//! [`AudioBackend`] for the desktop: every synth preset and drum sample is a
//! recipe for the mixer's oscillators, so no audio files are needed.

use std::cell::Cell;
use std::f32::consts::TAU;
use std::rc::Rc;

use wisteria_core::{
    db_to_gain, AudioBackend, HitClass, Kit, Note, NoteValue, SampleHandle, SynthHandle,
    SynthPreset,
};

use crate::audio::{SharedMixer, VoiceSpec, WaveKind};

const FALLBACK_SAMPLE_RATE: f32 = 48_000.0;

/// Counts triggers so headless runs can report what would have sounded.
#[derive(Clone, Default)]
pub struct TriggerStats {
    notes: Rc<Cell<u64>>,
    hits: Rc<Cell<u64>>,
}

impl TriggerStats {
    pub fn notes(&self) -> u64 {
        self.notes.get()
    }

    pub fn hits(&self) -> u64 {
        self.hits.get()
    }
}

pub struct NativeBackend {
    mixer: Option<SharedMixer>,
    bpm: f64,
    stats: TriggerStats,
}

impl NativeBackend {
    /// `mixer` is `None` when running without an output device.
    pub fn new(mixer: Option<SharedMixer>, bpm: f64) -> Self {
        Self {
            mixer,
            bpm,
            stats: TriggerStats::default(),
        }
    }

    pub fn stats(&self) -> TriggerStats {
        self.stats.clone()
    }
}

fn play(mixer: &Option<SharedMixer>, spec: &VoiceSpec) {
    if let Some(mixer) = mixer {
        if let Ok(mut m) = mixer.lock() {
            m.push(spec);
        }
    }
}

fn sample_rate(mixer: &Option<SharedMixer>) -> f32 {
    mixer
        .as_ref()
        .and_then(|m| m.lock().ok().map(|m| m.sample_rate()))
        .unwrap_or(FALLBACK_SAMPLE_RATE)
}

/// One-pole lowpass coefficient for a cutoff frequency.
fn lowpass_coefficient(cutoff_hz: f32, sample_rate: f32) -> f32 {
    1.0 - (-TAU * cutoff_hz / sample_rate).exp()
}

struct Recipe {
    wave: WaveKind,
    attack_sec: f32,
    release_sec: f32,
    pan: f32,
    cutoff_hz: f32,
    gain: f32,
}

fn recipe(preset: SynthPreset) -> Recipe {
    match preset {
        SynthPreset::Melody => Recipe {
            wave: WaveKind::Triangle,
            attack_sec: 0.01,
            release_sec: 0.2,
            pan: -0.3,
            cutoff_hz: 6000.0,
            gain: 0.35,
        },
        SynthPreset::Chord => Recipe {
            wave: WaveKind::Saw,
            attack_sec: 0.05,
            release_sec: 0.3,
            pan: 0.2,
            cutoff_hz: 1000.0,
            gain: 0.15,
        },
        SynthPreset::Bass => Recipe {
            wave: WaveKind::Square,
            attack_sec: 0.01,
            release_sec: 0.1,
            pan: 0.0,
            cutoff_hz: 600.0,
            gain: 0.3,
        },
        SynthPreset::SubBass => Recipe {
            wave: WaveKind::Sine,
            attack_sec: 0.01,
            release_sec: 0.1,
            pan: 0.0,
            cutoff_hz: 20_000.0,
            gain: 0.4,
        },
        SynthPreset::Pluck => Recipe {
            wave: WaveKind::Triangle,
            attack_sec: 0.005,
            release_sec: 0.15,
            pan: 0.0,
            cutoff_hz: 5000.0,
            gain: 0.4,
        },
        SynthPreset::Bell => Recipe {
            wave: WaveKind::Sine,
            attack_sec: 0.002,
            release_sec: 0.4,
            pan: 0.1,
            cutoff_hz: 8000.0,
            gain: 0.3,
        },
    }
}

struct NativeSynth {
    recipe: Recipe,
    mixer: Option<SharedMixer>,
    bpm: f64,
    volume: f32,
    notes: Rc<Cell<u64>>,
}

impl SynthHandle for NativeSynth {
    fn trigger_note(&mut self, note: Note, duration: NoteValue, time: f64, velocity: f32) {
        self.notes.set(self.notes.get() + 1);
        let sr = sample_rate(&self.mixer);
        let spec = VoiceSpec {
            wave: self.recipe.wave,
            frequency_hz: note.hz(),
            pitch_drop: 1.0,
            amplitude: velocity * self.recipe.gain * self.volume,
            start_sec: time,
            duration_sec: duration.seconds(self.bpm) as f32 + self.recipe.release_sec,
            attack_sec: self.recipe.attack_sec,
            release_sec: self.recipe.release_sec,
            pan: self.recipe.pan,
            lowpass: lowpass_coefficient(self.recipe.cutoff_hz, sr),
        };
        play(&self.mixer, &spec);
    }

    fn set_volume_db(&mut self, db: f32) {
        self.volume = db_to_gain(db);
    }

    fn set_cutoff_hz(&mut self, hz: f32) {
        self.recipe.cutoff_hz = hz;
    }
}

struct NativeSample {
    spec: VoiceSpec,
    mixer: Option<SharedMixer>,
    hits: Rc<Cell<u64>>,
}

impl SampleHandle for NativeSample {
    fn is_loaded(&self) -> bool {
        true
    }

    fn play(&mut self, time: f64, gain: f32) {
        self.hits.set(self.hits.get() + 1);
        let spec = VoiceSpec {
            start_sec: time,
            amplitude: self.spec.amplitude * gain,
            ..self.spec.clone()
        };
        play(&self.mixer, &spec);
    }
}

/// Drum recipe for a class. File names vary each pool member slightly so a
/// random pick is audible.
fn drum_voice(kit: Kit, class: HitClass, file: &str, sample_rate: f32) -> VoiceSpec {
    let variant = file.bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    let detune = 1.0 + (variant % 7) as f32 * 0.02;
    let lp = |hz: f32| lowpass_coefficient(hz, sample_rate);
    let base = VoiceSpec {
        wave: WaveKind::Noise,
        frequency_hz: 0.0,
        pitch_drop: 1.0,
        amplitude: 0.6,
        start_sec: 0.0,
        duration_sec: 0.1,
        attack_sec: 0.001,
        release_sec: 0.05,
        pan: 0.0,
        lowpass: 1.0,
    };
    match (kit, class) {
        (_, HitClass::Kick) => VoiceSpec {
            wave: WaveKind::Sine,
            frequency_hz: 110.0 * detune,
            pitch_drop: 0.35,
            amplitude: 0.9,
            duration_sec: 0.25,
            release_sec: 0.15,
            ..base
        },
        (_, HitClass::Snare) => VoiceSpec {
            duration_sec: 0.18,
            release_sec: 0.12,
            lowpass: lp(5000.0 * detune),
            ..base
        },
        (_, HitClass::ClosedHat) => VoiceSpec {
            amplitude: 0.35,
            duration_sec: 0.05,
            release_sec: 0.03,
            pan: 0.25,
            ..base
        },
        // the groove kit's open-hat pool holds toms
        (Kit::Groove, HitClass::OpenHat) => VoiceSpec {
            wave: WaveKind::Sine,
            frequency_hz: 180.0 * detune,
            pitch_drop: 0.6,
            amplitude: 0.7,
            duration_sec: 0.3,
            release_sec: 0.2,
            pan: -0.2,
            ..base
        },
        (Kit::Hand, HitClass::OpenHat) => VoiceSpec {
            amplitude: 0.3,
            duration_sec: 0.35,
            release_sec: 0.3,
            pan: 0.25,
            ..base
        },
    }
}

impl AudioBackend for NativeBackend {
    fn synth(&mut self, preset: SynthPreset) -> Box<dyn SynthHandle> {
        Box::new(NativeSynth {
            recipe: recipe(preset),
            mixer: self.mixer.clone(),
            bpm: self.bpm,
            volume: 1.0,
            notes: Rc::clone(&self.stats.notes),
        })
    }

    fn sample(&mut self, kit: Kit, class: HitClass, file: &str) -> Box<dyn SampleHandle> {
        Box::new(NativeSample {
            spec: drum_voice(kit, class, file, sample_rate(&self.mixer)),
            mixer: self.mixer.clone(),
            hits: Rc::clone(&self.stats.hits),
        })
    }
}
