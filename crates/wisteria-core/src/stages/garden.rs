//! Stage 2: plant flowers that ring little bells.
//!
//! Each flower owns a bell synth and a loop that rings it at random. A short
//! click on open ground plants, a click on a flower removes it, a vertical
//! drag resizes it (louder when bigger), and the wheel spins it (rings more
//! often when faster).

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use slotmap::{new_key_type, SlotMap};

use super::{FrameContext, InputEvent, Stage, StageId};
use crate::clock::Clock;
use crate::config::GardenParams;
use crate::constants::*;
use crate::error::{CoreError, CoreResult};
use crate::instruments::{AudioBackend, SynthHandle, SynthPreset};
use crate::mapping::{height_to_cutoff_hz, rotation_to_interval_sec, scale_to_db};
use crate::notes::{Note, PitchClass::*};
use crate::sequencer::{Rate, SequenceHandle, StepSequencer};
use crate::timing::{Grid, NoteValue};

new_key_type! {
    pub struct FlowerId;
}

pub const BELL_NOTES: [Note; 6] = [
    Note::new(C, 5),
    Note::new(E, 5),
    Note::new(G, 5),
    Note::new(A, 5),
    Note::new(C, 6),
    Note::new(E, 6),
];

const INITIAL_SCALE: f32 = 1.0;
const MAX_INITIAL_SPIN: f32 = 0.002;
const PLANT_STRIKE_VELOCITY: f32 = 0.8;
const MIN_PUSH_DISTANCE: f32 = 0.1;

type SharedSynth = Rc<RefCell<Box<dyn SynthHandle>>>;

pub struct Flower {
    pub position: Vec2,
    pub scale: f32,
    pub rotation: f32,
    /// Radians per frame; the sign only sets the spin direction.
    pub rot_speed: f32,
    pub cutoff_hz: f32,
    order: u64,
    synth: SharedSynth,
    bell_loop: Option<SequenceHandle>,
}

impl Flower {
    pub fn volume_db(&self) -> f32 {
        scale_to_db(self.scale)
    }

    pub fn is_ringing(&self) -> bool {
        self.bell_loop.as_ref().is_some_and(SequenceHandle::is_active)
    }

    pub fn loop_id(&self) -> Option<u64> {
        self.bell_loop.as_ref().map(SequenceHandle::id)
    }
}

struct Gesture {
    start: Vec2,
    flower: Option<FlowerId>,
    initial_scale: f32,
    dragged: bool,
}

pub struct Garden {
    params: GardenParams,
    clock: Rc<dyn Clock>,
    flowers: SlotMap<FlowerId, Flower>,
    next_order: u64,
    rng: StdRng,
    gesture: Option<Gesture>,
    complete: bool,
}

impl Garden {
    pub fn new(params: GardenParams, clock: Rc<dyn Clock>, seed: u64) -> Self {
        Self {
            params,
            clock,
            flowers: SlotMap::with_key(),
            next_order: 0,
            rng: StdRng::seed_from_u64(seed),
            gesture: None,
            complete: false,
        }
    }

    pub fn flower_count(&self) -> usize {
        self.flowers.len()
    }

    pub fn flowers(&self) -> impl Iterator<Item = (FlowerId, &Flower)> {
        self.flowers.iter()
    }

    pub fn flower(&self, id: FlowerId) -> Option<&Flower> {
        self.flowers.get(id)
    }

    /// Closest flower whose (scaled) pick radius covers `world`.
    pub fn flower_at(&self, world: Vec2) -> Option<FlowerId> {
        self.flowers
            .iter()
            .map(|(id, f)| (id, f.position.distance(world), f.scale))
            .filter(|(_, d, scale)| *d <= self.params.pick_radius * scale)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _, _)| id)
    }

    /// Plant at `world` unless another flower is too close. Nearby flowers
    /// are nudged outward; beyond the cap the oldest flower goes.
    pub fn plant(
        &mut self,
        world: Vec2,
        now: f64,
        backend: &mut dyn AudioBackend,
    ) -> CoreResult<Option<FlowerId>> {
        let crowded = self
            .flowers
            .values()
            .any(|f| f.position.distance(world) < self.params.min_distance);
        if crowded {
            return Ok(None);
        }

        for flower in self.flowers.values_mut() {
            let offset = flower.position - world;
            let d = offset.length();
            if d > MIN_PUSH_DISTANCE && d < self.params.push_radius {
                let push = self.params.push_strength * (1.0 - d / self.params.push_radius);
                flower.position += offset / d * push;
            }
        }

        let vh = self.params.viewport_height;
        let cutoff_hz = height_to_cutoff_hz((world.y + vh * 0.5) / vh);
        let mut synth = backend.synth(SynthPreset::Bell);
        synth.set_volume_db(scale_to_db(INITIAL_SCALE));
        synth.set_cutoff_hz(cutoff_hz);
        let strike = BELL_NOTES[self.rng.gen_range(0..BELL_NOTES.len())];
        synth.trigger_note(strike, NoteValue::Eighth, now, PLANT_STRIKE_VELOCITY);

        let id = self.flowers.insert(Flower {
            position: world,
            scale: INITIAL_SCALE,
            rotation: 0.0,
            rot_speed: (self.rng.gen::<f32>() * 2.0 - 1.0) * MAX_INITIAL_SPIN,
            cutoff_hz,
            order: self.next_order,
            synth: Rc::new(RefCell::new(synth)),
            bell_loop: None,
        });
        self.next_order += 1;
        self.restart_loop(id, Rate::Grid(Grid::Eighth))?;
        log::info!(
            "[garden] planted flower at ({:.1}, {:.1}), {} growing",
            world.x,
            world.y,
            self.flowers.len()
        );

        while self.flowers.len() > self.params.max_flowers {
            let oldest = self
                .flowers
                .iter()
                .min_by_key(|(_, f)| f.order)
                .map(|(id, _)| id);
            match oldest {
                Some(old) => {
                    self.remove(old);
                }
                None => break,
            }
        }
        Ok(Some(id))
    }

    /// Remove a flower and silence its loop.
    pub fn remove(&mut self, id: FlowerId) -> bool {
        match self.flowers.remove(id) {
            Some(flower) => {
                if let Some(bell) = flower.bell_loop {
                    bell.stop();
                }
                true
            }
            None => false,
        }
    }

    pub fn set_scale(&mut self, id: FlowerId, scale: f32) {
        let Some(flower) = self.flowers.get_mut(id) else {
            return;
        };
        flower.scale = scale.clamp(MIN_FLOWER_SCALE, MAX_FLOWER_SCALE);
        let db = flower.volume_db();
        if let Ok(mut synth) = flower.synth.try_borrow_mut() {
            synth.set_volume_db(db);
        }
    }

    /// Wheel over a flower: scrolling up spins faster, down slower. The
    /// bell loop restarts at the interval matching the new speed.
    pub fn spin(&mut self, id: FlowerId, delta_y: f32) -> CoreResult<()> {
        let Some(flower) = self.flowers.get_mut(id) else {
            return Ok(());
        };
        let direction = if delta_y > 0.0 { -1.0 } else { 1.0 };
        flower.rot_speed = (flower.rot_speed + direction * self.params.wheel_step)
            .clamp(-MAX_ROTATION_SPEED, MAX_ROTATION_SPEED);
        let interval = rotation_to_interval_sec(flower.rot_speed) as f64;
        self.restart_loop(id, Rate::Seconds(interval))
    }

    fn restart_loop(&mut self, id: FlowerId, rate: Rate) -> CoreResult<()> {
        let mut rng = StdRng::seed_from_u64(self.rng.next_u64());
        let probability = self.params.ring_probability.clamp(0.0, 1.0);
        let Some(flower) = self.flowers.get_mut(id) else {
            return Err(CoreError::invalid("flower", "no such flower"));
        };
        if let Some(old) = flower.bell_loop.take() {
            old.stop();
        }
        let synth = Rc::clone(&flower.synth);
        let handle = StepSequencer::start(
            &self.clock,
            rate,
            Box::new(move |_, time| {
                if !rng.gen_bool(probability) {
                    return;
                }
                let note = BELL_NOTES[rng.gen_range(0..BELL_NOTES.len())];
                let velocity = 0.5 + rng.gen::<f32>() * 0.5;
                if let Ok(mut synth) = synth.try_borrow_mut() {
                    synth.trigger_note(note, NoteValue::Sixteenth, time, velocity);
                }
            }),
        )?;
        flower.bell_loop = Some(handle);
        Ok(())
    }

    fn on_release(&mut self, world: Vec2, ctx: &mut FrameContext<'_>) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        if gesture.dragged {
            return;
        }
        match gesture.flower {
            Some(id) => {
                self.remove(id);
                log::info!("[garden] picked a flower, {} left", self.flowers.len());
            }
            None => {
                if let Err(e) = self.plant(world, ctx.now, ctx.backend) {
                    log::warn!("[garden] could not plant: {e}");
                }
            }
        }
    }
}

impl Stage for Garden {
    fn id(&self) -> StageId {
        StageId::Garden
    }

    fn handle(&mut self, event: &InputEvent, ctx: &mut FrameContext<'_>) {
        match *event {
            InputEvent::PointerDown { screen, world } => {
                let flower = self.flower_at(world);
                let initial_scale = flower
                    .and_then(|id| self.flowers.get(id))
                    .map_or(INITIAL_SCALE, |f| f.scale);
                self.gesture = Some(Gesture {
                    start: screen,
                    flower,
                    initial_scale,
                    dragged: false,
                });
            }
            InputEvent::PointerMove { screen, .. } => {
                let threshold = self.params.click_threshold_px;
                let per_px = self.params.drag_scale_per_px;
                let Some(gesture) = self.gesture.as_mut() else {
                    return;
                };
                if screen.distance(gesture.start) > threshold {
                    gesture.dragged = true;
                }
                if let (true, Some(id)) = (gesture.dragged, gesture.flower) {
                    // screen y grows downward: dragging up enlarges
                    let scale = gesture.initial_scale + (gesture.start.y - screen.y) * per_px;
                    self.set_scale(id, scale);
                }
            }
            InputEvent::PointerUp { world, .. } => self.on_release(world, ctx),
            InputEvent::Wheel { world, delta_y } => {
                if let Some(id) = self.flower_at(world) {
                    if let Err(e) = self.spin(id, delta_y) {
                        log::warn!("[garden] spin failed: {e}");
                    }
                }
            }
            _ => {}
        }
    }

    fn update(&mut self, _ctx: &mut FrameContext<'_>) {
        for flower in self.flowers.values_mut() {
            flower.rotation += flower.rot_speed;
        }
        if !self.complete && self.flowers.len() >= self.params.target_flowers {
            self.complete = true;
            log::info!("[garden] {} flowers in bloom", self.flowers.len());
        }
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn teardown(&mut self) {
        let ids: Vec<FlowerId> = self.flowers.keys().collect();
        for id in ids {
            self.remove(id);
        }
    }
}
