//! Stage 4: light the sparkles on four branches to build up the music.
//!
//! Each branch is a [`ToggleGroup`] bound to one track; its lit count is the
//! track's complexity level.

use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{FrameContext, HoldGate, InputEvent, Stage, StageId};
use crate::clock::Clock;
use crate::config::SparkleParams;
use crate::constants::TRACK_COUNT;
use crate::error::{CoreError, CoreResult};
use crate::instruments::{AudioBackend, InstrumentRack};
use crate::orchestrator::Orchestrator;
use crate::pattern::TrackKind;
use crate::toggle::{Cascade, ToggleGroup};

/// Ambient sparkles drifting around the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FloatingSparkles {
    pub active: usize,
    pub lit: usize,
}

/// More of the tree lit means more sparkles in the air, and more of those lit.
pub fn floating_sparkles(total: usize, lit_proportion: f32) -> FloatingSparkles {
    let p = lit_proportion.clamp(0.0, 1.0);
    let active = (total as f32 * p).round() as usize;
    let lit = (active as f32 * p).round() as usize;
    FloatingSparkles { active, lit }
}

pub struct Sparkles {
    params: SparkleParams,
    orchestrator: Orchestrator,
    branches: Vec<ToggleGroup>,
    gate: HoldGate,
}

impl Sparkles {
    pub fn new(
        params: SparkleParams,
        clock: Rc<dyn Clock>,
        backend: &mut dyn AudioBackend,
        seed: u64,
    ) -> CoreResult<Self> {
        let rack = InstrumentRack::load(backend, Box::new(StdRng::seed_from_u64(seed)));
        Self::with_rack(params, clock, rack)
    }

    pub fn with_rack(
        params: SparkleParams,
        clock: Rc<dyn Clock>,
        rack: InstrumentRack,
    ) -> CoreResult<Self> {
        let mut orchestrator = Orchestrator::new(clock, rack);
        let mut branches = Vec::with_capacity(TRACK_COUNT);
        for number in 1..=TRACK_COUNT as u8 {
            let group = ToggleGroup::new(params.cells_per_branch, Cascade::for_track(number))?;
            orchestrator.update_complexity(number, group.lit_count())?;
            branches.push(group);
        }
        Ok(Self {
            gate: HoldGate::new(params.all_lit_hold_sec),
            params,
            orchestrator,
            branches,
        })
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn branch(&self, number: u8) -> Option<&ToggleGroup> {
        (number as usize).checked_sub(1).and_then(|i| self.branches.get(i))
    }

    /// Toggle a sparkle on branch `number` (1..=4) and retune its track.
    /// Returns the branch's new lit count.
    pub fn toggle(&mut self, number: u8, cell: usize) -> CoreResult<usize> {
        let kind = TrackKind::from_number(number)?;
        let group = self
            .branches
            .get_mut(number as usize - 1)
            .ok_or_else(|| CoreError::invalid("branch", format!("no branch {number}")))?;
        let before = group.clone();
        let lit = group.toggle(cell)?;
        if let Err(e) = self.orchestrator.update_complexity(number, lit) {
            *group = before;
            return Err(e);
        }
        log::info!("[sparkles] branch {number} ({}) now {lit} lit", kind.name());
        Ok(lit)
    }

    pub fn all_lit(&self) -> bool {
        self.branches.iter().all(ToggleGroup::all_lit)
    }

    pub fn lit_proportion(&self) -> f32 {
        let total: usize = self.branches.iter().map(ToggleGroup::len).sum();
        if total == 0 {
            return 0.0;
        }
        let lit: usize = self.branches.iter().map(ToggleGroup::lit_count).sum();
        lit as f32 / total as f32
    }

    pub fn floating(&self) -> FloatingSparkles {
        floating_sparkles(self.params.floating_sparkles, self.lit_proportion())
    }
}

impl Stage for Sparkles {
    fn id(&self) -> StageId {
        StageId::Sparkles
    }

    fn handle(&mut self, event: &InputEvent, _ctx: &mut FrameContext<'_>) {
        if let InputEvent::Sparkle { branch, cell } = *event {
            if let Err(e) = self.toggle(branch, cell) {
                log::warn!("[sparkles] ignored toggle: {e}");
            }
        }
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let all = self.all_lit();
        let was_open = self.gate.is_open();
        if self.gate.update(ctx.now, all, all) && !was_open {
            log::info!("[sparkles] the whole tree is glowing");
        }
    }

    fn is_complete(&self) -> bool {
        self.gate.is_open()
    }

    fn teardown(&mut self) {
        self.orchestrator.stop_all();
    }
}
