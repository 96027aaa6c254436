//! Spring-damper oscillator driving hanging vines.
//!
//! One oscillator per vine, stepped once per rendered frame with
//! semi-implicit Euler. Pointer sweeps feed it impulses; while an impulse is
//! still ringing out the oscillator reports itself `locked` so the same vine
//! is not re-plucked mid-swing.

use crate::constants::*;
use crate::error::{CoreError, CoreResult};

/// Construction parameters for [`Oscillator`].
///
/// Fields:
/// - `mass`: inertia, must be finite and > 0
/// - `stiffness`: spring constant pulling the angle back to rest, >= 0
/// - `damping`: per-tick velocity retention in `[0, 1)`
/// - `max_angle`: swing limit in radians, > 0
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OscillatorParams {
    pub mass: f32,
    pub stiffness: f32,
    pub damping: f32,
    pub max_angle: f32,
}

impl OscillatorParams {
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(CoreError::invalid(
                "mass",
                format!("must be positive, got {}", self.mass),
            ));
        }
        if !(self.stiffness.is_finite() && self.stiffness >= 0.0) {
            return Err(CoreError::invalid(
                "stiffness",
                format!("must be non-negative, got {}", self.stiffness),
            ));
        }
        if !(0.0..1.0).contains(&self.damping) {
            return Err(CoreError::invalid(
                "damping",
                format!("must lie in [0, 1), got {}", self.damping),
            ));
        }
        if !(self.max_angle.is_finite() && self.max_angle > 0.0) {
            return Err(CoreError::invalid(
                "max_angle",
                format!("must be positive, got {}", self.max_angle),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct Oscillator {
    params: OscillatorParams,
    angle: f32,
    angular_velocity: f32,
    locked: bool,
}

impl Oscillator {
    pub fn new(params: OscillatorParams) -> CoreResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            angle: 0.0,
            angular_velocity: 0.0,
            locked: false,
        })
    }

    /// Start from a displaced angle, clamped into the swing limit.
    pub fn with_angle(params: OscillatorParams, angle: f32) -> CoreResult<Self> {
        let mut osc = Self::new(params)?;
        osc.angle = angle.clamp(-params.max_angle, params.max_angle);
        Ok(osc)
    }

    pub fn params(&self) -> &OscillatorParams {
        &self.params
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Advance by `dt` ticks (1.0 = one frame).
    pub fn step(&mut self, dt: f32) {
        let p = self.params;
        let accel = -p.stiffness * self.angle / p.mass;
        self.angular_velocity += accel * dt;
        self.angular_velocity *= p.damping.powf(dt);
        self.angular_velocity = self.angular_velocity.clamp(-MAX_SPEED, MAX_SPEED);
        self.angle += self.angular_velocity * dt;

        if self.angle.abs() > p.max_angle {
            self.angle = self.angle.clamp(-p.max_angle, p.max_angle);
            self.angular_velocity *= CLAMP_BOUNCE;
        }

        if self.locked
            && self.angle.abs() < UNLOCK_ANGLE
            && self.angular_velocity.abs() < UNLOCK_VELOCITY
        {
            self.locked = false;
        }
    }

    /// Push the oscillator. Returns the velocity change actually applied.
    pub fn apply_impulse(&mut self, force: f32) -> f32 {
        if !force.is_finite() {
            return 0.0;
        }
        let delta = (force / self.params.mass).clamp(-MAX_IMPULSE, MAX_IMPULSE);
        self.angular_velocity += delta;
        if delta.abs() > LOCK_IMPULSE {
            self.locked = true;
        }
        delta
    }

    /// Angle to draw at `time_sec`, including a per-object wind sway. The
    /// sway never feeds back into the simulation.
    pub fn render_angle(&self, time_sec: f32, id: u32) -> f32 {
        let wind = (time_sec * WIND_FREQUENCY + id as f32).sin() * (WIND_STRENGTH / self.params.mass);
        self.angle + wind
    }
}
