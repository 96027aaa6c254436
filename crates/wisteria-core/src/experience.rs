//! Runs the five stages in order on one transport.
//!
//! Hosts push input whenever it arrives and call [`Experience::frame`] once
//! per rendered frame. Input is queued and only handled at the start of the
//! next frame, so an event can never re-enter a frame that is already running.

use std::collections::VecDeque;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::clock::{Clock, Transport};
use crate::config::ExperienceParams;
use crate::error::CoreResult;
use crate::instruments::AudioBackend;
use crate::stages::ending::Ending;
use crate::stages::garden::Garden;
use crate::stages::rhythm::Rhythm;
use crate::stages::sparkles::Sparkles;
use crate::stages::vines::{SweepRules, VineField};
use crate::stages::{FrameContext, InputEvent, Stage, StageId};

enum ActiveStage {
    Vines(VineField),
    Garden(Garden),
    Rhythm(Rhythm),
    Sparkles(Sparkles),
    Ending(Ending),
}

impl ActiveStage {
    fn as_stage(&self) -> &dyn Stage {
        match self {
            ActiveStage::Vines(s) => s,
            ActiveStage::Garden(s) => s,
            ActiveStage::Rhythm(s) => s,
            ActiveStage::Sparkles(s) => s,
            ActiveStage::Ending(s) => s,
        }
    }

    fn as_stage_mut(&mut self) -> &mut dyn Stage {
        match self {
            ActiveStage::Vines(s) => s,
            ActiveStage::Garden(s) => s,
            ActiveStage::Rhythm(s) => s,
            ActiveStage::Sparkles(s) => s,
            ActiveStage::Ending(s) => s,
        }
    }
}

pub struct Experience {
    params: ExperienceParams,
    transport: Rc<Transport>,
    backend: Box<dyn AudioBackend>,
    rng: StdRng,
    stage: ActiveStage,
    input: VecDeque<InputEvent>,
    now: f64,
}

impl Experience {
    pub fn new(
        params: ExperienceParams,
        mut backend: Box<dyn AudioBackend>,
        seed: u64,
    ) -> CoreResult<Self> {
        params.validate()?;
        let transport = Rc::new(Transport::new(&params.transport));
        let mut rng = StdRng::seed_from_u64(seed);
        let first = VineField::new(params.vines.clone(), backend.as_mut(), &mut rng)?;
        log::info!("[experience] stage 1 ready (seed {seed})");
        Ok(Self {
            params,
            transport,
            backend,
            rng,
            stage: ActiveStage::Vines(first),
            input: VecDeque::new(),
            now: 0.0,
        })
    }

    pub fn transport(&self) -> &Rc<Transport> {
        &self.transport
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn stage_id(&self) -> StageId {
        self.stage.as_stage().id()
    }

    pub fn is_stage_complete(&self) -> bool {
        self.stage.as_stage().is_complete()
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push_back(event);
    }

    /// Advance to `now` (seconds since start): fire due audio, handle queued
    /// input, step the active stage, then fire whatever that scheduled
    /// inside the look-ahead window.
    pub fn frame(&mut self, now: f64) {
        self.transport.advance(now);
        self.now = self.transport.now();
        let mut ctx = FrameContext {
            now: self.now,
            backend: self.backend.as_mut(),
        };
        let pending: Vec<InputEvent> = self.input.drain(..).collect();
        let stage = self.stage.as_stage_mut();
        for event in &pending {
            stage.handle(event, &mut ctx);
        }
        stage.update(&mut ctx);
        self.transport.advance(self.now);
    }

    /// Press NEXT. Moves on only once the current stage is complete; on the
    /// last stage this starts the closing fade. Returns whether anything
    /// happened.
    pub fn next(&mut self) -> CoreResult<bool> {
        if !self.is_stage_complete() {
            return Ok(false);
        }
        let now = self.now;
        if let ActiveStage::Ending(ending) = &mut self.stage {
            return Ok(ending.begin_finale(now));
        }
        let Some(next_id) = self.stage_id().next() else {
            return Ok(false);
        };
        let next = self.build(next_id)?;
        self.stage.as_stage_mut().teardown();
        self.stage = next;
        self.input.clear();
        log::info!("[experience] entered stage {}", next_id.number());
        Ok(true)
    }

    /// True once the closing fade has finished.
    pub fn is_finished(&self) -> bool {
        match &self.stage {
            ActiveStage::Ending(ending) => ending.is_finished(self.now),
            _ => false,
        }
    }

    pub fn fade_progress(&self) -> f32 {
        match &self.stage {
            ActiveStage::Ending(ending) => ending.fade_progress(self.now),
            _ => 0.0,
        }
    }

    fn build(&mut self, id: StageId) -> CoreResult<ActiveStage> {
        let clock: Rc<dyn Clock> = self.transport.clone();
        let seed = self.rng.next_u64();
        let backend = self.backend.as_mut();
        Ok(match id {
            StageId::Vines => ActiveStage::Vines(VineField::new(
                self.params.vines.clone(),
                backend,
                &mut self.rng,
            )?),
            StageId::Garden => ActiveStage::Garden(Garden::new(
                self.params.garden.clone(),
                clock,
                seed,
            )),
            StageId::Rhythm => {
                ActiveStage::Rhythm(Rhythm::new(self.params.rhythm.clone(), backend, seed))
            }
            StageId::Sparkles => ActiveStage::Sparkles(Sparkles::new(
                self.params.sparkles.clone(),
                clock,
                backend,
                seed,
            )?),
            StageId::Ending => {
                let rules = SweepRules {
                    radius: self.params.vines.interaction_radius,
                    strength: self.params.vines.influence_strength,
                    vine_throttle_sec: None,
                    global_throttle_sec: self.params.vines.global_throttle_sec,
                };
                ActiveStage::Ending(Ending::new(
                    self.params.ending.clone(),
                    rules,
                    backend,
                    seed,
                ))
            }
        })
    }

    pub fn vines(&self) -> Option<&VineField> {
        match &self.stage {
            ActiveStage::Vines(s) => Some(s),
            _ => None,
        }
    }

    pub fn garden(&self) -> Option<&Garden> {
        match &self.stage {
            ActiveStage::Garden(s) => Some(s),
            _ => None,
        }
    }

    pub fn rhythm(&self) -> Option<&Rhythm> {
        match &self.stage {
            ActiveStage::Rhythm(s) => Some(s),
            _ => None,
        }
    }

    pub fn sparkles(&self) -> Option<&Sparkles> {
        match &self.stage {
            ActiveStage::Sparkles(s) => Some(s),
            _ => None,
        }
    }

    pub fn ending(&self) -> Option<&Ending> {
        match &self.stage {
            ActiveStage::Ending(s) => Some(s),
            _ => None,
        }
    }
}

impl Drop for Experience {
    fn drop(&mut self) {
        self.stage.as_stage_mut().teardown();
    }
}
