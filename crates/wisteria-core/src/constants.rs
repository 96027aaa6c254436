// Shared tuning constants for the sequencer, physics and stage logic.

// Transport
pub const DEFAULT_BPM: f64 = 120.0;
pub const DEFAULT_LOOKAHEAD_SEC: f64 = 0.1; // how far ahead of `now` triggers are handed to the synth

// Spring-damper oscillator
pub const MAX_SPEED: f32 = 0.008; // angular velocity clamp, radians per tick
pub const MAX_IMPULSE: f32 = 0.012; // per-impulse velocity change clamp
pub const LOCK_IMPULSE: f32 = 1e-4; // impulses above this lock the oscillator
pub const UNLOCK_ANGLE: f32 = 0.02;
pub const UNLOCK_VELOCITY: f32 = 0.001;
pub const CLAMP_BOUNCE: f32 = -0.5; // velocity factor when the angle hits max_angle
pub const WIND_FREQUENCY: f32 = 0.5; // radians per second
pub const WIND_STRENGTH: f32 = 0.015; // divided by mass

// Track levels
pub const MAX_LEVEL: u8 = 4;
pub const TRACK_COUNT: usize = 4;

// Audio parameter mapping
pub const MIN_FLOWER_SCALE: f32 = 0.5;
pub const MAX_FLOWER_SCALE: f32 = 3.0;
pub const MIN_FLOWER_DB: f32 = -18.0;
pub const MAX_FLOWER_DB: f32 = 0.0;
pub const MAX_ROTATION_SPEED: f32 = 0.02; // radians per frame
pub const SLOWEST_BELL_INTERVAL_SEC: f32 = 2.0;
pub const FASTEST_BELL_INTERVAL_SEC: f32 = 0.1;
pub const MIN_CUTOFF_HZ: f32 = 200.0;
pub const MAX_CUTOFF_HZ: f32 = 8000.0;
pub const PLUCK_VELOCITY_GAIN: f32 = 8.0; // force -> note velocity
pub const MIN_PLUCK_VELOCITY: f32 = 0.1;

// Vine pluck geometry: vines are plucked around a point below their anchor
pub const PLUCK_POINT_DROP: f32 = 4.0;
pub const PLUCK_HEIGHT_RANGE: f32 = 6.0; // world units above the pluck floor mapped onto the scale
pub const PLUCK_DISTANCE_SOFTENING: f32 = 0.5;
pub const MIN_SOUNDING_FORCE: f32 = 0.02;

// Sparkles
pub const FLOATING_SPARKLES: usize = 60;
