//! Tuning parameters for every stage, grouped the way hosts override them.
//!
//! Every struct carries its defaults; [`ExperienceParams::validate`] rejects
//! combinations that would stall the transport or divide by zero.

use crate::constants::*;
use crate::error::{CoreError, CoreResult};

#[derive(Clone, Debug, PartialEq)]
pub struct TransportParams {
    pub bpm: f64,
    pub lookahead_sec: f64,
}

impl Default for TransportParams {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            lookahead_sec: DEFAULT_LOOKAHEAD_SEC,
        }
    }
}

/// Stage 1: the curtain of vines hiding the cat.
#[derive(Clone, Debug, PartialEq)]
pub struct VineFieldParams {
    pub vine_count: usize,
    pub pluck_threshold: u32,
    pub interaction_radius: f32,
    pub influence_strength: f32,
    pub vine_throttle_sec: f64,
    pub global_throttle_sec: f64,
    pub fall_sec: f64, // fade + fall before a plucked vine counts as removed
    pub reveal_fraction: f32,
    pub confirm_sec: f64,
}

impl Default for VineFieldParams {
    fn default() -> Self {
        Self {
            vine_count: 55,
            pluck_threshold: 1,
            interaction_radius: 3.5,
            influence_strength: 0.04,
            vine_throttle_sec: 0.2,
            global_throttle_sec: 0.06,
            fall_sec: 2.5,
            reveal_fraction: 0.6,
            confirm_sec: 0.3,
        }
    }
}

/// Stage 2: flowers with bell loops.
#[derive(Clone, Debug, PartialEq)]
pub struct GardenParams {
    pub max_flowers: usize,
    pub target_flowers: usize,
    pub min_distance: f32,
    pub push_radius: f32,
    pub push_strength: f32,
    pub pick_radius: f32, // world units at scale 1.0
    pub click_threshold_px: f32,
    pub drag_scale_per_px: f32,
    pub wheel_step: f32,
    pub ring_probability: f64,
    pub viewport_height: f32, // world units visible vertically at the flower plane
}

impl Default for GardenParams {
    fn default() -> Self {
        Self {
            max_flowers: 10,
            target_flowers: 10,
            min_distance: 3.5,
            push_radius: 5.0,
            push_strength: 3.5,
            pick_radius: 1.0,
            click_threshold_px: 10.0,
            drag_scale_per_px: 0.01,
            wheel_step: 0.0005,
            ring_probability: 0.2,
            viewport_height: 16.57,
        }
    }
}

/// Stage 3: keyboard drumming that grows a ladder of circles.
#[derive(Clone, Debug, PartialEq)]
pub struct RhythmParams {
    pub history: usize,
    pub window_sec: f64,
    pub update_sec: f64,
    pub speed_threshold: f64, // presses per second
    pub sec_per_circle: f64,
    pub circles: u32,
    pub final_hold_sec: f64,
}

impl Default for RhythmParams {
    fn default() -> Self {
        Self {
            history: 10,
            window_sec: 2.0,
            update_sec: 0.1,
            speed_threshold: 3.5,
            sec_per_circle: 2.0,
            circles: 5,
            final_hold_sec: 3.0,
        }
    }
}

/// Stage 4: four branches of sparkles, one per track.
#[derive(Clone, Debug, PartialEq)]
pub struct SparkleParams {
    pub cells_per_branch: usize,
    pub floating_sparkles: usize,
    pub all_lit_hold_sec: f64,
}

impl Default for SparkleParams {
    fn default() -> Self {
        Self {
            cells_per_branch: 4,
            floating_sparkles: FLOATING_SPARKLES,
            all_lit_hold_sec: 3.0,
        }
    }
}

/// Stage 5: painting vines back in.
#[derive(Clone, Debug, PartialEq)]
pub struct EndingParams {
    pub max_vines: usize,
    pub spawn_cooldown_sec: f64,
    pub grid_size: f32,
    pub min_vine_distance: f32,
    pub area_min_y: f32,
    pub area_max_y: f32,
    pub area_half_width: f32,
    pub target_vines: usize,
    pub confirm_vines: usize,
    pub confirm_sec: f64,
    pub fade_sec: f64,
}

impl Default for EndingParams {
    fn default() -> Self {
        Self {
            max_vines: 55,
            spawn_cooldown_sec: 0.3,
            grid_size: 2.0,
            min_vine_distance: 2.0,
            area_min_y: 3.0,
            area_max_y: 12.0,
            area_half_width: 18.0,
            target_vines: 25,
            confirm_vines: 20,
            confirm_sec: 0.3,
            fade_sec: 4.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExperienceParams {
    pub transport: TransportParams,
    pub vines: VineFieldParams,
    pub garden: GardenParams,
    pub rhythm: RhythmParams,
    pub sparkles: SparkleParams,
    pub ending: EndingParams,
}

fn positive(name: &'static str, v: f64) -> CoreResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(CoreError::invalid(name, format!("must be positive, got {v}")))
    }
}

impl ExperienceParams {
    pub fn validate(&self) -> CoreResult<()> {
        positive("transport.bpm", self.transport.bpm)?;
        if !(self.transport.lookahead_sec.is_finite() && self.transport.lookahead_sec >= 0.0) {
            return Err(CoreError::invalid(
                "transport.lookahead_sec",
                "must be non-negative",
            ));
        }
        if self.vines.vine_count == 0 {
            return Err(CoreError::invalid("vines.vine_count", "must be at least 1"));
        }
        if self.vines.pluck_threshold == 0 {
            return Err(CoreError::invalid("vines.pluck_threshold", "must be at least 1"));
        }
        positive("vines.interaction_radius", self.vines.interaction_radius as f64)?;
        if self.garden.max_flowers == 0 || self.garden.target_flowers > self.garden.max_flowers {
            return Err(CoreError::invalid(
                "garden.target_flowers",
                "must be reachable within garden.max_flowers",
            ));
        }
        if !(0.0..=1.0).contains(&self.garden.ring_probability) {
            return Err(CoreError::invalid("garden.ring_probability", "must lie in [0, 1]"));
        }
        positive("garden.viewport_height", self.garden.viewport_height as f64)?;
        positive("rhythm.window_sec", self.rhythm.window_sec)?;
        positive("rhythm.update_sec", self.rhythm.update_sec)?;
        positive("rhythm.sec_per_circle", self.rhythm.sec_per_circle)?;
        if self.rhythm.circles == 0 || self.rhythm.history < 2 {
            return Err(CoreError::invalid(
                "rhythm",
                "needs at least one circle and a history of two presses",
            ));
        }
        if !(1..=MAX_LEVEL as usize).contains(&self.sparkles.cells_per_branch) {
            return Err(CoreError::invalid(
                "sparkles.cells_per_branch",
                format!("must lie in 1..={MAX_LEVEL}"),
            ));
        }
        positive("ending.grid_size", self.ending.grid_size as f64)?;
        if self.ending.target_vines > self.ending.max_vines
            || self.ending.confirm_vines > self.ending.target_vines
        {
            return Err(CoreError::invalid(
                "ending.target_vines",
                "must satisfy confirm_vines <= target_vines <= max_vines",
            ));
        }
        Ok(())
    }
}
