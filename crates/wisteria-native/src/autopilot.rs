//! Scripted player: feeds each stage the input a person would give it and
//! presses NEXT as soon as it is offered.

use glam::Vec2;
use wisteria_core::stages::{ArrowKey, InputEvent, StageId};
use wisteria_core::{CoreResult, Experience};

const PX_PER_UNIT: f32 = 40.0;
const SCREEN_LEFT: f32 = -15.0;
const SCREEN_TOP: f32 = 8.3;

const SWEEP_STEP: f32 = 0.5; // world units per frame
const SWEEP_HALF_WIDTH: f32 = 14.0;
const VINE_ROWS: [f32; 3] = [3.5, 4.0, 4.5];
const ENDING_ROWS: [f32; 4] = [4.0, 6.0, 8.0, 10.0];
const ENDING_HALF_WIDTH: f32 = 16.0;

const CLICK_GAP_SEC: f64 = 0.3;
const PRESS_GAP_SEC: f64 = 0.2;
const RHYTHM_KEYS: [ArrowKey; 4] = [ArrowKey::Left, ArrowKey::Right, ArrowKey::Down, ArrowKey::Up];

/// Pixel position of a world point, with screen y growing downward.
pub fn to_screen(world: Vec2) -> Vec2 {
    Vec2::new(
        (world.x - SCREEN_LEFT) * PX_PER_UNIT,
        (SCREEN_TOP - world.y) * PX_PER_UNIT,
    )
}

/// Flower beds: two rows of five, wide enough apart that planting never
/// crowds or pushes a neighbour.
fn bed(index: usize) -> Vec2 {
    let col = (index % 5) as f32 - 2.0;
    let row = if index < 5 { 3.0 } else { -3.0 };
    Vec2::new(col * 5.5, row)
}

#[derive(Clone, Copy, Debug)]
enum GardenMove {
    Click(Vec2),
    Spin(Vec2),
    Drag(Vec2),
}

fn garden_script() -> Vec<GardenMove> {
    let mut script: Vec<GardenMove> = (0..10).map(|i| GardenMove::Click(bed(i))).collect();
    script.insert(4, GardenMove::Spin(bed(0)));
    script.insert(7, GardenMove::Drag(bed(1)));
    script
}

/// Raster-sweeping pointer in world space.
#[derive(Debug)]
struct Sweeper {
    x: f32,
    direction: f32,
    pass: usize,
}

impl Sweeper {
    fn new() -> Self {
        Self {
            x: -SWEEP_HALF_WIDTH,
            direction: 1.0,
            pass: 0,
        }
    }

    fn advance(&mut self, half_width: f32, rows: &[f32]) -> Vec2 {
        self.x += SWEEP_STEP * self.direction;
        if self.x.abs() > half_width {
            self.x = self.x.clamp(-half_width, half_width);
            self.direction = -self.direction;
            self.pass += 1;
        }
        Vec2::new(self.x, rows[self.pass % rows.len()])
    }
}

pub struct Autopilot {
    stage: Option<StageId>,
    sweeper: Sweeper,
    garden: Vec<GardenMove>,
    step: usize,
    last_action: f64,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new()
    }
}

impl Autopilot {
    pub fn new() -> Self {
        Self {
            stage: None,
            sweeper: Sweeper::new(),
            garden: garden_script(),
            step: 0,
            last_action: f64::NEG_INFINITY,
        }
    }

    /// Queue this frame's input. Call before [`Experience::frame`].
    pub fn drive(&mut self, experience: &mut Experience) -> CoreResult<()> {
        if experience.fade_progress() > 0.0 {
            return Ok(());
        }
        if experience.is_stage_complete() {
            if experience.next()? {
                log::debug!("[autopilot] pressed next");
            }
            return Ok(());
        }

        let id = experience.stage_id();
        if self.stage != Some(id) {
            self.stage = Some(id);
            self.sweeper = Sweeper::new();
            self.step = 0;
            self.last_action = f64::NEG_INFINITY;
        }
        let now = experience.now();
        match id {
            StageId::Vines => {
                let world = self.sweeper.advance(SWEEP_HALF_WIDTH, &VINE_ROWS);
                experience.push_input(pointer_move(world));
            }
            StageId::Garden => self.drive_garden(experience, now),
            StageId::Rhythm => {
                if now - self.last_action >= PRESS_GAP_SEC {
                    let key = RHYTHM_KEYS[self.step % RHYTHM_KEYS.len()];
                    experience.push_input(InputEvent::Key(key));
                    self.step += 1;
                    self.last_action = now;
                }
            }
            StageId::Sparkles => {
                // lighting the first cell of an ascending branch or the last
                // of a descending one cascades across the whole branch
                if self.step < 4 && now - self.last_action >= CLICK_GAP_SEC {
                    let branch = self.step as u8 + 1;
                    let cell = if branch % 2 == 1 { 0 } else { 3 };
                    experience.push_input(InputEvent::Sparkle { branch, cell });
                    self.step += 1;
                    self.last_action = now;
                }
            }
            StageId::Ending => {
                let world = self.sweeper.advance(ENDING_HALF_WIDTH, &ENDING_ROWS);
                experience.push_input(pointer_move(world));
            }
        }
        Ok(())
    }

    fn drive_garden(&mut self, experience: &mut Experience, now: f64) {
        if now - self.last_action < CLICK_GAP_SEC {
            return;
        }
        let Some(&action) = self.garden.get(self.step) else {
            return;
        };
        self.step += 1;
        self.last_action = now;
        match action {
            GardenMove::Click(world) => {
                let screen = to_screen(world);
                experience.push_input(InputEvent::PointerDown { screen, world });
                experience.push_input(InputEvent::PointerUp { screen, world });
            }
            GardenMove::Spin(world) => {
                experience.push_input(InputEvent::Wheel {
                    world,
                    delta_y: -30.0,
                });
            }
            GardenMove::Drag(world) => {
                let start = to_screen(world);
                let end = start - Vec2::new(0.0, 60.0);
                experience.push_input(InputEvent::PointerDown { screen: start, world });
                experience.push_input(InputEvent::PointerMove { screen: end, world });
                experience.push_input(InputEvent::PointerUp { screen: end, world });
            }
        }
    }
}

fn pointer_move(world: Vec2) -> InputEvent {
    InputEvent::PointerMove {
        screen: to_screen(world),
        world,
    }
}
