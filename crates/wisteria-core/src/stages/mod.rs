//! The five interactive stages and the pieces they share.

pub mod ending;
pub mod garden;
pub mod rhythm;
pub mod sparkles;
pub mod vines;

use glam::Vec2;

use crate::instruments::AudioBackend;

/// Arrow keys played in the rhythm stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrowKey {
    Left,
    Right,
    Up,
    Down,
}

/// Host input, already projected into world space where that matters.
/// `screen` is in pixels; `world` lies on the stage's interaction plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { screen: Vec2, world: Vec2 },
    PointerMove { screen: Vec2, world: Vec2 },
    PointerUp { screen: Vec2, world: Vec2 },
    Wheel { world: Vec2, delta_y: f32 },
    Key(ArrowKey),
    /// The renderer picked sparkle `cell` on branch `branch` (1..=4).
    Sparkle { branch: u8, cell: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageId {
    Vines,
    Garden,
    Rhythm,
    Sparkles,
    Ending,
}

impl StageId {
    pub fn next(self) -> Option<StageId> {
        match self {
            StageId::Vines => Some(StageId::Garden),
            StageId::Garden => Some(StageId::Rhythm),
            StageId::Rhythm => Some(StageId::Sparkles),
            StageId::Sparkles => Some(StageId::Ending),
            StageId::Ending => None,
        }
    }

    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

/// What a stage sees of the frame it runs in.
pub struct FrameContext<'a> {
    /// Transport time in seconds.
    pub now: f64,
    pub backend: &'a mut dyn AudioBackend,
}

/// Common surface the experience drives each stage through.
pub trait Stage {
    fn id(&self) -> StageId;
    fn handle(&mut self, event: &InputEvent, ctx: &mut FrameContext<'_>);
    /// Once per frame, after queued input has been handled.
    fn update(&mut self, ctx: &mut FrameContext<'_>);
    /// Whether NEXT may be offered.
    fn is_complete(&self) -> bool;
    /// Silence everything the stage started before it is dropped.
    fn teardown(&mut self) {}
}

/// Completion gate that opens once a condition has held for `delay` seconds.
///
/// `arm` starts the countdown; `hold` must stay true until it runs out, or
/// the gate resets. Once open it stays open.
#[derive(Clone, Debug)]
pub struct HoldGate {
    delay: f64,
    armed_at: Option<f64>,
    open: bool,
}

impl HoldGate {
    pub fn new(delay: f64) -> Self {
        Self {
            delay,
            armed_at: None,
            open: false,
        }
    }

    pub fn update(&mut self, now: f64, arm: bool, hold: bool) -> bool {
        if self.open {
            return true;
        }
        match self.armed_at {
            None if arm => self.armed_at = Some(now),
            None => {}
            Some(_) if !hold => self.armed_at = None,
            Some(t0) if now - t0 >= self.delay => self.open = true,
            Some(_) => {}
        }
        self.open
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }
}
