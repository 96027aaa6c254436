//! Continuous mappings from interaction state to audio parameters.

use crate::constants::*;

/// Linear interpolation of `value` from `[in_min, in_max]` onto
/// `[out_min, out_max]`. The input is clamped to its range first, so the
/// result always lies between `out_min` and `out_max`. A degenerate input
/// range maps everything to `out_min`.
pub fn map_linear(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let span = in_max - in_min;
    if span.abs() <= f32::EPSILON {
        return out_min;
    }
    let (lo, hi) = if in_min <= in_max {
        (in_min, in_max)
    } else {
        (in_max, in_min)
    };
    let v = value.clamp(lo, hi);
    out_min + (v - in_min) / span * (out_max - out_min)
}

/// Flower scale to synth volume in dB.
pub fn scale_to_db(scale: f32) -> f32 {
    map_linear(
        scale,
        MIN_FLOWER_SCALE,
        MAX_FLOWER_SCALE,
        MIN_FLOWER_DB,
        MAX_FLOWER_DB,
    )
}

/// Spin speed to bell loop interval. Faster spin in either direction rings
/// more often.
pub fn rotation_to_interval_sec(speed: f32) -> f32 {
    map_linear(
        speed.abs(),
        0.0,
        MAX_ROTATION_SPEED,
        SLOWEST_BELL_INTERVAL_SEC,
        FASTEST_BELL_INTERVAL_SEC,
    )
}

/// Normalized height (0 bottom, 1 top) to lowpass cutoff: lower is duller.
pub fn height_to_cutoff_hz(normalized_y: f32) -> f32 {
    map_linear(normalized_y, 0.0, 1.0, MIN_CUTOFF_HZ, MAX_CUTOFF_HZ)
}

/// Index into a scale of `len` notes for a vine whose anchor sits at `y`.
/// Higher vines pick higher notes.
pub fn vine_height_to_note_index(y: f32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let norm = ((y - PLUCK_POINT_DROP) / PLUCK_HEIGHT_RANGE).clamp(0.0, 1.0);
    ((norm * (len - 1) as f32).floor() as usize).min(len - 1)
}

pub fn pluck_velocity(force: f32) -> f32 {
    (force.abs() * PLUCK_VELOCITY_GAIN).clamp(MIN_PLUCK_VELOCITY, 1.0)
}

#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}
