//! Stage 1: sweep the pointer through a curtain of vines to uncover the cat.
//!
//! The vine arena and the sweep rules are shared with the ending stage,
//! which grows vines instead of clearing them.

use glam::{Vec2, Vec3};
use rand::{Rng, RngCore};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use super::{FrameContext, HoldGate, InputEvent, Stage, StageId};
use crate::config::VineFieldParams;
use crate::constants::*;
use crate::error::CoreResult;
use crate::instruments::{AudioBackend, SynthHandle, SynthPreset};
use crate::mapping::{pluck_velocity, vine_height_to_note_index};
use crate::notes::{Note, PitchClass::*};
use crate::physics::{Oscillator, OscillatorParams};
use crate::timing::NoteValue;

new_key_type! {
    pub struct VineId;
}

/// Name the renderer reports readiness for.
pub const CAT_ASSET: &str = "cat";

pub const PLUCK_SCALE: [Note; 12] = [
    Note::new(C, 4),
    Note::new(D, 4),
    Note::new(E, 4),
    Note::new(G, 4),
    Note::new(A, 4),
    Note::new(C, 5),
    Note::new(D, 5),
    Note::new(E, 5),
    Note::new(G, 5),
    Note::new(A, 5),
    Note::new(C, 6),
    Note::new(D, 6),
];

const REVEAL_CHIME: Note = Note::new(C, 7);
const REVEAL_CHIME_VELOCITY: f32 = 0.05;

#[derive(Clone, Debug)]
pub struct Vine {
    pub position: Vec3,
    pub oscillator: Oscillator,
    /// Phase offset for the render-only wind sway.
    pub wind_phase: u32,
    pub pluck_count: u32,
    pub last_sound: Option<f64>,
    pub fading_since: Option<f64>,
}

impl Vine {
    /// Vines hang from their anchor; the pointer catches them lower down.
    pub fn pluck_point(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.y - PLUCK_POINT_DROP)
    }

    pub fn is_fading(&self) -> bool {
        self.fading_since.is_some()
    }

    pub fn is_removed(&self, now: f64, fall_sec: f64) -> bool {
        self.fading_since.is_some_and(|t| now - t >= fall_sec)
    }

    pub fn render_angle(&self, time_sec: f32) -> f32 {
        self.oscillator.render_angle(time_sec, self.wind_phase)
    }
}

/// Random swing characteristics for a freshly grown vine.
pub fn random_vine_params(rng: &mut dyn RngCore) -> OscillatorParams {
    OscillatorParams {
        max_angle: 0.1 + rng.gen::<f32>() * 0.25,
        mass: 2.0 + rng.gen::<f32>() * 1.5,
        stiffness: 0.003 + rng.gen::<f32>() * 0.002,
        damping: 0.96 + rng.gen::<f32>() * 0.02,
    }
}

/// How a pointer sweep pushes vines and when a push is loud enough to sound.
#[derive(Clone, Copy, Debug)]
pub struct SweepRules {
    pub radius: f32,
    pub strength: f32,
    /// Minimum gap between sounds of the same vine, if limited.
    pub vine_throttle_sec: Option<f64>,
    pub global_throttle_sec: f64,
}

/// A push that made a vine sound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pluck {
    pub id: VineId,
    pub force: f32,
    pub note: Note,
    pub velocity: f32,
}

#[derive(Default)]
pub struct VineArena {
    vines: SlotMap<VineId, Vine>,
    last_global_sound: Option<f64>,
    next_wind_phase: u32,
}

impl VineArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, position: Vec3, params: OscillatorParams) -> CoreResult<VineId> {
        let oscillator = Oscillator::new(params)?;
        let wind_phase = self.next_wind_phase;
        self.next_wind_phase += 1;
        Ok(self.vines.insert(Vine {
            position,
            oscillator,
            wind_phase,
            pluck_count: 0,
            last_sound: None,
            fading_since: None,
        }))
    }

    pub fn len(&self) -> usize {
        self.vines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vines.is_empty()
    }

    pub fn get(&self, id: VineId) -> Option<&Vine> {
        self.vines.get(id)
    }

    pub fn get_mut(&mut self, id: VineId) -> Option<&mut Vine> {
        self.vines.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VineId, &Vine)> {
        self.vines.iter()
    }

    /// Whether any vine anchor lies within `distance` of `point`.
    pub fn any_within(&self, point: Vec2, distance: f32) -> bool {
        self.vines
            .values()
            .any(|v| v.position.truncate().distance(point) < distance)
    }

    /// One physics tick for every vine still hanging.
    pub fn step_all(&mut self) {
        for vine in self.vines.values_mut().filter(|v| !v.is_fading()) {
            vine.oscillator.step(1.0);
        }
    }

    /// Push vines near `pointer` by a horizontal sweep of `dx_px` pixels.
    /// Fading and still-swinging (locked) vines are left alone.
    pub fn sweep(
        &mut self,
        pointer: Vec2,
        dx_px: f32,
        now: f64,
        rules: &SweepRules,
    ) -> SmallVec<[Pluck; 4]> {
        let mut plucks = SmallVec::new();
        for (id, vine) in self.vines.iter_mut() {
            if vine.is_fading() || vine.oscillator.is_locked() {
                continue;
            }
            let dist = pointer.distance(vine.pluck_point());
            if dist >= rules.radius {
                continue;
            }
            let force = dx_px * rules.strength / (dist + PLUCK_DISTANCE_SOFTENING);
            vine.oscillator.apply_impulse(force);

            let vine_ready = match (rules.vine_throttle_sec, vine.last_sound) {
                (Some(gap), Some(t)) => now - t > gap,
                _ => true,
            };
            let global_ready = self
                .last_global_sound
                .map_or(true, |t| now - t > rules.global_throttle_sec);
            if vine_ready && global_ready && force.abs() > MIN_SOUNDING_FORCE {
                vine.last_sound = Some(now);
                self.last_global_sound = Some(now);
                let idx = vine_height_to_note_index(vine.position.y, PLUCK_SCALE.len());
                plucks.push(Pluck {
                    id,
                    force,
                    note: PLUCK_SCALE[idx],
                    velocity: pluck_velocity(force),
                });
            }
        }
        plucks
    }
}

/// Stage 1 state.
pub struct VineField {
    params: VineFieldParams,
    arena: VineArena,
    synth: Box<dyn SynthHandle>,
    last_pointer_x: Option<f32>,
    gate: HoldGate,
}

impl VineField {
    pub fn new(
        params: VineFieldParams,
        backend: &mut dyn AudioBackend,
        rng: &mut dyn RngCore,
    ) -> CoreResult<Self> {
        let mut arena = VineArena::new();
        for _ in 0..params.vine_count {
            let position = Vec3::new(
                (rng.gen::<f32>() - 0.5) * 26.0,
                7.0 + rng.gen::<f32>() * 2.0,
                rng.gen::<f32>() * 2.0 - 1.0,
            );
            arena.spawn(position, random_vine_params(rng))?;
        }
        log::info!("[vines] grew {} vines", arena.len());
        Ok(Self {
            gate: HoldGate::new(params.confirm_sec),
            params,
            arena,
            synth: backend.synth(SynthPreset::Pluck),
            last_pointer_x: None,
        })
    }

    pub fn arena(&self) -> &VineArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut VineArena {
        &mut self.arena
    }

    pub fn removed_count(&self, now: f64) -> usize {
        self.arena
            .iter()
            .filter(|(_, v)| v.is_removed(now, self.params.fall_sec))
            .count()
    }

    pub fn removed_fraction(&self, now: f64) -> f32 {
        if self.arena.is_empty() {
            return 0.0;
        }
        self.removed_count(now) as f32 / self.arena.len() as f32
    }

    fn rules(&self) -> SweepRules {
        SweepRules {
            radius: self.params.interaction_radius,
            strength: self.params.influence_strength,
            vine_throttle_sec: Some(self.params.vine_throttle_sec),
            global_throttle_sec: self.params.global_throttle_sec,
        }
    }

    fn on_pointer_move(&mut self, screen: Vec2, world: Vec2, now: f64) {
        let dx = self.last_pointer_x.map_or(0.0, |x| screen.x - x);
        self.last_pointer_x = Some(screen.x);
        if dx == 0.0 {
            return;
        }
        let rules = self.rules();
        for pluck in self.arena.sweep(world, dx, now, &rules) {
            self.synth
                .trigger_note(pluck.note, NoteValue::Sixteenth, now, pluck.velocity);
            let Some(vine) = self.arena.get_mut(pluck.id) else {
                continue;
            };
            vine.pluck_count += 1;
            if vine.pluck_count >= self.params.pluck_threshold && !vine.is_fading() {
                vine.fading_since = Some(now);
                self.synth.trigger_note(
                    REVEAL_CHIME,
                    NoteValue::ThirtySecond,
                    now,
                    REVEAL_CHIME_VELOCITY,
                );
            }
        }
    }
}

impl Stage for VineField {
    fn id(&self) -> StageId {
        StageId::Vines
    }

    fn handle(&mut self, event: &InputEvent, ctx: &mut FrameContext<'_>) {
        if let InputEvent::PointerMove { screen, world } = *event {
            self.on_pointer_move(screen, world, ctx.now);
        }
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let now = ctx.now;
        self.arena.step_all();
        let revealed = ctx.backend.asset_ready(CAT_ASSET)
            && self.removed_fraction(now) >= self.params.reveal_fraction;
        let was_open = self.gate.is_open();
        if self.gate.update(now, revealed, revealed) && !was_open {
            log::info!(
                "[vines] cat revealed, {}/{} vines gone",
                self.removed_count(now),
                self.arena.len()
            );
        }
    }

    fn is_complete(&self) -> bool {
        self.gate.is_open()
    }
}
