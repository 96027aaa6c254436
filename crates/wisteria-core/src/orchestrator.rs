//! Keeps the four tracks in step with their complexity levels.

use std::cell::RefCell;
use std::rc::Rc;

use crate::clock::Clock;
use crate::error::CoreResult;
use crate::instruments::InstrumentRack;
use crate::pattern::{Level, TrackKind};
use crate::track::Track;

pub struct Orchestrator {
    clock: Rc<dyn Clock>,
    rack: Rc<RefCell<InstrumentRack>>,
    tracks: [Track; 4],
}

impl Orchestrator {
    pub fn new(clock: Rc<dyn Clock>, rack: InstrumentRack) -> Self {
        Self {
            clock,
            rack: Rc::new(RefCell::new(rack)),
            tracks: TrackKind::ALL.map(Track::new),
        }
    }

    /// Restart `kind` at `level`. Always tears down and rebuilds, even when
    /// the level is unchanged, so the new pattern starts on a fresh boundary.
    pub fn set_level(&mut self, kind: TrackKind, level: Level) -> CoreResult<()> {
        let track = &mut self.tracks[kind.index()];
        let previous = track.level();
        track.install(level, &self.clock, &self.rack)?;
        log::info!(
            "[orchestrator] {} level {} -> {}",
            kind.name(),
            previous.get(),
            level.get()
        );
        Ok(())
    }

    /// Sparkle-branch entry point: track number 1..=4 and its lit count.
    pub fn update_complexity(&mut self, track_number: u8, lit_count: usize) -> CoreResult<()> {
        let kind = TrackKind::from_number(track_number)?;
        let level = Level::from_count(lit_count)?;
        self.set_level(kind, level)
    }

    pub fn level(&self, kind: TrackKind) -> Level {
        self.tracks[kind.index()].level()
    }

    pub fn has_active(&self, kind: TrackKind) -> bool {
        self.tracks[kind.index()].sequence().is_some()
    }

    /// Id of the sequence currently playing on `kind`.
    pub fn sequence_id(&self, kind: TrackKind) -> Option<u64> {
        self.tracks[kind.index()].sequence().map(|s| s.id())
    }

    pub fn active_sequences(&self) -> usize {
        self.tracks.iter().filter(|t| t.sequence().is_some()).count()
    }

    pub fn stop_all(&mut self) {
        for track in self.tracks.iter_mut() {
            track.stop();
        }
        log::info!("[orchestrator] all tracks stopped");
    }

    pub fn rack(&self) -> &Rc<RefCell<InstrumentRack>> {
        &self.rack
    }
}
