//! Stage 5: paint vines back across the sky, then fade to white.

use fnv::FnvHashMap;
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::vines::{random_vine_params, SweepRules, VineArena, VineId};
use super::{FrameContext, HoldGate, InputEvent, Stage, StageId};
use crate::config::EndingParams;
use crate::error::CoreResult;
use crate::instruments::{AudioBackend, SynthHandle, SynthPreset};
use crate::timing::NoteValue;

const SPAWN_JITTER: f32 = 1.5;

pub const CLOSING_MESSAGE: &str = "THANK YOU FOR PLAYING";

pub struct Ending {
    params: EndingParams,
    rules: SweepRules,
    arena: VineArena,
    synth: Box<dyn SynthHandle>,
    rng: StdRng,
    cell_spawned_at: FnvHashMap<(i32, i32), f64>,
    last_pointer_x: Option<f32>,
    gate: HoldGate,
    finale_started: Option<f64>,
}

impl Ending {
    pub fn new(
        params: EndingParams,
        rules: SweepRules,
        backend: &mut dyn AudioBackend,
        seed: u64,
    ) -> Self {
        Self {
            gate: HoldGate::new(params.confirm_sec),
            params,
            rules,
            arena: VineArena::new(),
            synth: backend.synth(SynthPreset::Pluck),
            rng: StdRng::seed_from_u64(seed),
            cell_spawned_at: FnvHashMap::default(),
            last_pointer_x: None,
            finale_started: None,
        }
    }

    pub fn arena(&self) -> &VineArena {
        &self.arena
    }

    pub fn vine_count(&self) -> usize {
        self.arena.len()
    }

    fn cell_of(&self, world: Vec2) -> (i32, i32) {
        let g = self.params.grid_size;
        ((world.x / g).floor() as i32, (world.y / g).floor() as i32)
    }

    fn in_area(&self, world: Vec2) -> bool {
        world.y > self.params.area_min_y
            && world.y < self.params.area_max_y
            && world.x.abs() < self.params.area_half_width
    }

    /// Grow a vine near `world` if the spot is open. Each grid cell has its
    /// own cooldown so a resting pointer does not pile vines up.
    pub fn try_spawn(&mut self, world: Vec2, now: f64) -> CoreResult<Option<VineId>> {
        let cell = self.cell_of(world);
        if let Some(t) = self.cell_spawned_at.get(&cell) {
            if now - t < self.params.spawn_cooldown_sec {
                return Ok(None);
            }
        }
        if !self.in_area(world)
            || self.arena.len() >= self.params.max_vines
            || self.arena.any_within(world, self.params.min_vine_distance)
        {
            return Ok(None);
        }
        let position = Vec3::new(
            world.x + (self.rng.gen::<f32>() - 0.5) * SPAWN_JITTER,
            world.y + (self.rng.gen::<f32>() - 0.5) * SPAWN_JITTER,
            self.rng.gen::<f32>() * 2.0 - 1.0,
        );
        let id = self.arena.spawn(position, random_vine_params(&mut self.rng))?;
        self.cell_spawned_at.insert(cell, now);
        Ok(Some(id))
    }

    fn on_pointer_move(&mut self, screen: Vec2, world: Vec2, now: f64) {
        let dx = self.last_pointer_x.map_or(0.0, |x| screen.x - x);
        self.last_pointer_x = Some(screen.x);
        match self.try_spawn(world, now) {
            Ok(Some(_)) => log::debug!("[ending] {} vines", self.arena.len()),
            Ok(None) => {}
            Err(e) => log::warn!("[ending] vine failed to grow: {e}"),
        }
        if dx == 0.0 {
            return;
        }
        for pluck in self.arena.sweep(world, dx, now, &self.rules) {
            self.synth
                .trigger_note(pluck.note, NoteValue::Sixteenth, now, pluck.velocity);
        }
    }

    /// NEXT on the last stage: start fading out. Returns false until enough
    /// vines have grown.
    pub fn begin_finale(&mut self, now: f64) -> bool {
        if !self.gate.is_open() {
            return false;
        }
        if self.finale_started.is_none() {
            self.finale_started = Some(now);
            log::info!("[ending] fading out");
        }
        true
    }

    /// 0 before the finale, rising to 1 when the screen is white.
    pub fn fade_progress(&self, now: f64) -> f32 {
        match self.finale_started {
            None => 0.0,
            Some(_) if self.params.fade_sec <= 0.0 => 1.0,
            Some(t0) => ((now - t0) / self.params.fade_sec).clamp(0.0, 1.0) as f32,
        }
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.finale_started.is_some() && self.fade_progress(now) >= 1.0
    }
}

impl Stage for Ending {
    fn id(&self) -> StageId {
        StageId::Ending
    }

    fn handle(&mut self, event: &InputEvent, ctx: &mut FrameContext<'_>) {
        if self.finale_started.is_some() {
            return;
        }
        if let InputEvent::PointerMove { screen, world } = *event {
            self.on_pointer_move(screen, world, ctx.now);
        }
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        self.arena.step_all();
        let count = self.arena.len();
        let was_open = self.gate.is_open();
        let open = self.gate.update(
            ctx.now,
            count >= self.params.target_vines,
            count >= self.params.confirm_vines,
        );
        if open && !was_open {
            log::info!("[ending] {count} vines grown");
        }
    }

    fn is_complete(&self) -> bool {
        self.gate.is_open()
    }
}
