//! One instrument track and its single sequence slot.

use std::cell::RefCell;
use std::rc::Rc;

use crate::clock::Clock;
use crate::error::CoreResult;
use crate::instruments::InstrumentRack;
use crate::pattern::{Level, Pattern, TrackKind};
use crate::sequencer::{Rate, SequenceHandle, StepSequencer};

pub struct Track {
    kind: TrackKind,
    level: Level,
    active: Option<SequenceHandle>,
}

impl Track {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            level: Level::SILENT,
            active: None,
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn sequence(&self) -> Option<&SequenceHandle> {
        self.active.as_ref()
    }

    /// Stop whatever is playing, then start `level`'s pattern (nothing for
    /// level 0). The old sequence is fully stopped before the new one exists.
    pub fn install(
        &mut self,
        level: Level,
        clock: &Rc<dyn Clock>,
        rack: &Rc<RefCell<InstrumentRack>>,
    ) -> CoreResult<()> {
        self.stop();
        self.level = level;
        let Some(pattern) = Pattern::for_level(self.kind, level) else {
            return Ok(());
        };
        let rack = Rc::clone(rack);
        let handle = StepSequencer::start(
            clock,
            Rate::Grid(pattern.grid),
            Box::new(move |step, time| {
                let events = pattern.events(step);
                if events.is_empty() {
                    return;
                }
                match rack.try_borrow_mut() {
                    Ok(mut rack) => {
                        for event in events.iter() {
                            rack.dispatch(event, time);
                        }
                    }
                    Err(_) => log::warn!("[track] rack busy, dropped step {step}"),
                }
            }),
        )?;
        self.active = Some(handle);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(old) = self.active.take() {
            old.stop();
        }
    }
}
