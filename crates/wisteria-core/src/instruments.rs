//! Collaborator interfaces for sound output and the rack that owns them.
//!
//! The core never synthesizes audio. Hosts implement [`AudioBackend`] to hand
//! out synth and sample handles; the [`InstrumentRack`] routes pattern events
//! to them and picks drum samples at random from per-class pools.

use fnv::FnvHashMap;
use rand::{Rng, RngCore};

use crate::error::{CoreError, CoreResult};
use crate::notes::Note;
use crate::pattern::{PatternEvent, Role, Sound};
use crate::timing::NoteValue;

/// Drum sound family. Each class is backed by a pool of interchangeable samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitClass {
    Kick,
    Snare,
    ClosedHat,
    OpenHat,
}

impl HitClass {
    pub const ALL: [HitClass; 4] = [
        HitClass::Kick,
        HitClass::Snare,
        HitClass::ClosedHat,
        HitClass::OpenHat,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            HitClass::Kick => "kick",
            HitClass::Snare => "snare",
            HitClass::ClosedHat => "closed-hat",
            HitClass::OpenHat => "open-hat",
        }
    }
}

/// Voice a host should build for [`AudioBackend::synth`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SynthPreset {
    Melody,
    Chord,
    Bass,
    SubBass,
    /// Short FM pluck used by the vines.
    Pluck,
    /// Per-flower bell with its own volume and lowpass.
    Bell,
}

/// Which sample library a drum handle comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kit {
    /// Pools behind the sequenced drum track.
    Groove,
    /// Acoustic kit played directly from the keyboard.
    Hand,
}

pub const GROOVE_FILES: [(HitClass, &[&str]); 4] = [
    (HitClass::Kick, &["kick1.wav", "kick2.wav", "kick3.wav"]),
    (HitClass::Snare, &["snare1.wav", "snare2.wav", "snare3.wav"]),
    (HitClass::ClosedHat, &["hihat1.wav", "hihat2.wav", "hihat3.wav"]),
    (HitClass::OpenHat, &["tom1.wav", "tom2.wav", "tom3.wav"]),
];

pub const HAND_FILES: [(HitClass, &[&str]); 4] = [
    (
        HitClass::Kick,
        &[
            "acoustic-kick-01.wav",
            "acoustic-kick-02.wav",
            "acoustic-kick-03.wav",
            "acoustic-kick-04.wav",
        ],
    ),
    (
        HitClass::Snare,
        &[
            "acoustic-snare-01.wav",
            "acoustic-snare-02.wav",
            "acoustic-snare-03.wav",
            "acoustic-snare-04.wav",
        ],
    ),
    (
        HitClass::ClosedHat,
        &[
            "acoustic-closed-hat-a.wav",
            "acoustic-closed-hat-b.wav",
            "acoustic-closed-hat-c.wav",
            "acoustic-closed-hat-d.wav",
        ],
    ),
    (
        HitClass::OpenHat,
        &["acoustic-open-hat-01.wav", "acoustic-open-hat-02.wav"],
    ),
];

pub trait SynthHandle {
    fn is_ready(&self) -> bool {
        true
    }
    fn trigger_note(&mut self, note: Note, duration: NoteValue, time: f64, velocity: f32);
    fn set_volume_db(&mut self, _db: f32) {}
    fn set_cutoff_hz(&mut self, _hz: f32) {}
}

pub trait SampleHandle {
    fn is_loaded(&self) -> bool;
    fn play(&mut self, time: f64, gain: f32);
}

/// Factory for sound handles, implemented by the host.
pub trait AudioBackend {
    fn synth(&mut self, preset: SynthPreset) -> Box<dyn SynthHandle>;
    fn sample(&mut self, kit: Kit, class: HitClass, file: &str) -> Box<dyn SampleHandle>;
    /// Readiness of a visual asset (the stage 1 cat, ...). Rendering owns
    /// loading; the core only asks.
    fn asset_ready(&self, _asset: &str) -> bool {
        true
    }
}

/// Sample pools keyed by hit class.
#[derive(Default)]
pub struct DrumKit {
    pools: FnvHashMap<HitClass, Vec<Box<dyn SampleHandle>>>,
}

impl DrumKit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(backend: &mut dyn AudioBackend, kit: Kit) -> Self {
        let files = match kit {
            Kit::Groove => &GROOVE_FILES,
            Kit::Hand => &HAND_FILES,
        };
        let mut drums = Self::new();
        for (class, names) in files.iter() {
            for name in names.iter() {
                drums.insert(*class, backend.sample(kit, *class, name));
            }
        }
        log::info!(
            "[drums] {:?} kit: {} kick, {} snare, {} closed hat, {} open hat",
            kit,
            drums.pool_len(HitClass::Kick),
            drums.pool_len(HitClass::Snare),
            drums.pool_len(HitClass::ClosedHat),
            drums.pool_len(HitClass::OpenHat),
        );
        drums
    }

    pub fn insert(&mut self, class: HitClass, sample: Box<dyn SampleHandle>) {
        self.pools.entry(class).or_default().push(sample);
    }

    pub fn pool_len(&self, class: HitClass) -> usize {
        self.pools.get(&class).map_or(0, Vec::len)
    }

    /// Play a uniformly chosen sample of `class`. Returns the pool index that
    /// played, or `ResourceNotReady` when the pool is empty or the chosen
    /// sample has not loaded.
    pub fn play_random(
        &mut self,
        class: HitClass,
        time: f64,
        gain: f32,
        rng: &mut dyn RngCore,
    ) -> CoreResult<usize> {
        let pool = self
            .pools
            .get_mut(&class)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| CoreError::not_ready(format!("{} pool is empty", class.name())))?;
        let idx = rng.gen_range(0..pool.len());
        let sample = &mut pool[idx];
        if !sample.is_loaded() {
            return Err(CoreError::not_ready(format!("{} sample {idx}", class.name())));
        }
        sample.play(time, gain);
        Ok(idx)
    }
}

/// Synths and drum pools behind the four sequenced tracks.
pub struct InstrumentRack {
    melody: Option<Box<dyn SynthHandle>>,
    chord: Option<Box<dyn SynthHandle>>,
    bass: Option<Box<dyn SynthHandle>>,
    sub_bass: Option<Box<dyn SynthHandle>>,
    drums: DrumKit,
    rng: Box<dyn RngCore>,
}

impl InstrumentRack {
    /// Rack with no instruments: every trigger is skipped until handles are set.
    pub fn empty(rng: Box<dyn RngCore>) -> Self {
        Self {
            melody: None,
            chord: None,
            bass: None,
            sub_bass: None,
            drums: DrumKit::new(),
            rng,
        }
    }

    pub fn load(backend: &mut dyn AudioBackend, rng: Box<dyn RngCore>) -> Self {
        let mut rack = Self::empty(rng);
        rack.melody = Some(backend.synth(SynthPreset::Melody));
        rack.chord = Some(backend.synth(SynthPreset::Chord));
        rack.bass = Some(backend.synth(SynthPreset::Bass));
        rack.sub_bass = Some(backend.synth(SynthPreset::SubBass));
        rack.drums = DrumKit::load(backend, Kit::Groove);
        rack
    }

    pub fn set_synth(&mut self, role: Role, synth: Box<dyn SynthHandle>) {
        match role {
            Role::Melody => self.melody = Some(synth),
            Role::Chord => self.chord = Some(synth),
            Role::Bass => self.bass = Some(synth),
            Role::SubBass => self.sub_bass = Some(synth),
            Role::Drum => log::warn!("[rack] drums take samples, not a synth"),
        }
    }

    pub fn drums_mut(&mut self) -> &mut DrumKit {
        &mut self.drums
    }

    /// Route one pattern event. `step_time` is the scheduled time of the
    /// step; the event's own offset is added here. Unready resources are
    /// skipped with a warning.
    pub fn dispatch(&mut self, event: &PatternEvent, step_time: f64) {
        let time = step_time + event.offset_sec;
        if let Err(e) = self.try_dispatch(event, time) {
            log::warn!("[rack] skipped {:?} trigger: {e}", event.role);
        }
    }

    fn try_dispatch(&mut self, event: &PatternEvent, time: f64) -> CoreResult<()> {
        match event.sound {
            Sound::Hit(class) => {
                self.drums
                    .play_random(class, time, event.velocity, self.rng.as_mut())?;
            }
            Sound::Pitch(note) => {
                let slot = match event.role {
                    Role::Melody => &mut self.melody,
                    Role::Chord => &mut self.chord,
                    Role::Bass => &mut self.bass,
                    Role::SubBass => &mut self.sub_bass,
                    Role::Drum => {
                        return Err(CoreError::invalid("role", "drum events carry hit classes"))
                    }
                };
                let synth = slot
                    .as_mut()
                    .filter(|s| s.is_ready())
                    .ok_or_else(|| CoreError::not_ready(format!("{:?} synth", event.role)))?;
                synth.trigger_note(note, event.duration, time, event.velocity);
            }
        }
        Ok(())
    }
}
