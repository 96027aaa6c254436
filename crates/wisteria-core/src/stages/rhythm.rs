//! Stage 3: drum on the arrow keys fast enough, long enough, to light all
//! five circles.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{ArrowKey, FrameContext, InputEvent, Stage, StageId};
use crate::config::RhythmParams;
use crate::instruments::{AudioBackend, DrumKit, HitClass, Kit};

impl ArrowKey {
    /// Sample class and gain a key plays.
    pub fn voice(self) -> (HitClass, f32) {
        match self {
            ArrowKey::Left => (HitClass::Kick, 0.7),
            ArrowKey::Right => (HitClass::Snare, 0.7),
            ArrowKey::Up => (HitClass::OpenHat, 0.7),
            ArrowKey::Down => (HitClass::ClosedHat, 0.3),
        }
    }
}

pub struct Rhythm {
    params: RhythmParams,
    kit: DrumKit,
    rng: StdRng,
    presses: VecDeque<f64>,
    last_tick: Option<f64>,
    speed: f64,
    // progress is counted in whole update ticks so thresholds land exactly
    ticks_at_threshold: u32,
    ticks_below: u32,
    drop_from: u32,
    visible: u32,
    max_reached: u32,
    top_visible_ticks: u32,
    locked: bool,
}

impl Rhythm {
    pub fn new(params: RhythmParams, backend: &mut dyn AudioBackend, seed: u64) -> Self {
        Self {
            presses: VecDeque::with_capacity(params.history),
            params,
            kit: DrumKit::load(backend, Kit::Hand),
            rng: StdRng::seed_from_u64(seed),
            last_tick: None,
            speed: 0.0,
            ticks_at_threshold: 0,
            ticks_below: 0,
            drop_from: 0,
            visible: 0,
            max_reached: 0,
            top_visible_ticks: 0,
            locked: false,
        }
    }

    /// Presses per second at the last update.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn visible_circles(&self) -> u32 {
        self.visible
    }

    pub fn max_reached(&self) -> u32 {
        self.max_reached
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn press(&mut self, key: ArrowKey, now: f64) {
        let (class, gain) = key.voice();
        if let Err(e) = self.kit.play_random(class, now, gain, &mut self.rng) {
            log::warn!("[rhythm] {:?} silent: {e}", key);
        }
        self.record_press(now);
    }

    pub fn record_press(&mut self, now: f64) {
        self.presses.push_back(now);
        while self.presses.len() > self.params.history {
            self.presses.pop_front();
        }
    }

    /// Presses per second over the recent window: (n - 1) presses across
    /// the span from first to last.
    pub fn measure_speed(&self, now: f64) -> f64 {
        let mut recent = self
            .presses
            .iter()
            .copied()
            .filter(|t| now - t < self.params.window_sec);
        let Some(first) = recent.next() else {
            return 0.0;
        };
        let (count, last) = recent.fold((1usize, first), |(n, _), t| (n + 1, t));
        let span = last - first;
        if count < 2 || span <= 0.0 {
            return 0.0;
        }
        (count - 1) as f64 / span
    }

    fn ticks_for(&self, seconds: f64) -> u32 {
        ((seconds / self.params.update_sec).round() as u32).max(1)
    }

    fn tick(&mut self, now: f64) {
        let top = self.params.circles;
        let per_circle = self.ticks_for(self.params.sec_per_circle);
        self.speed = self.measure_speed(now);

        if self.visible >= top {
            self.top_visible_ticks += 1;
            if !self.locked && self.top_visible_ticks >= self.ticks_for(self.params.final_hold_sec)
            {
                self.locked = true;
                log::info!("[rhythm] all {top} circles locked in");
            }
        } else if !self.locked {
            self.top_visible_ticks = 0;
        }

        if self.locked {
            self.visible = top;
            return;
        }

        if self.speed >= self.params.speed_threshold {
            self.ticks_at_threshold += 1;
            self.ticks_below = 0;
            // the first circle shows at once, then one more per interval held
            let reached = self.ticks_at_threshold / per_circle + 1;
            self.visible = reached.clamp(1, top);
            self.max_reached = self.max_reached.max(self.visible);
        } else {
            if self.ticks_below == 0 {
                self.drop_from = self.visible;
            }
            self.ticks_below += 1;
            self.ticks_at_threshold = 0;
            let lost = self.ticks_below / per_circle;
            self.visible = self.drop_from.saturating_sub(lost);
            if self.visible == 0 {
                self.max_reached = 0;
            }
        }
    }
}

impl Stage for Rhythm {
    fn id(&self) -> StageId {
        StageId::Rhythm
    }

    fn handle(&mut self, event: &InputEvent, ctx: &mut FrameContext<'_>) {
        if let InputEvent::Key(key) = *event {
            self.press(key, ctx.now);
        }
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let step = self.params.update_sec;
        let Some(mut last) = self.last_tick else {
            self.last_tick = Some(ctx.now);
            return;
        };
        // small epsilon so 0.1 s frames do not skip a tick on rounding
        while ctx.now - last >= step - 1e-9 {
            last += step;
            self.tick(last);
        }
        self.last_tick = Some(last);
    }

    fn is_complete(&self) -> bool {
        self.locked
    }
}
