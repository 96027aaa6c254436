mod common;

use std::rc::Rc;

use common::{hits, notes_of, Played, RecordingBackend};
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use wisteria_core::stages::ending::Ending;
use wisteria_core::stages::garden::{FlowerId, Garden, BELL_NOTES};
use wisteria_core::stages::rhythm::Rhythm;
use wisteria_core::stages::sparkles::{floating_sparkles, FloatingSparkles, Sparkles};
use wisteria_core::stages::vines::{SweepRules, VineArena};
use wisteria_core::stages::{ArrowKey, FrameContext, HoldGate, InputEvent, Stage, StageId};
use wisteria_core::PitchClass::*;
use wisteria_core::*;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

fn clock() -> (Rc<Transport>, Rc<dyn Clock>) {
    let transport = Rc::new(Transport::default());
    let clock: Rc<dyn Clock> = transport.clone();
    (transport, clock)
}

fn steady_params() -> OscillatorParams {
    OscillatorParams {
        mass: 2.0,
        stiffness: 0.004,
        damping: 0.97,
        max_angle: 0.2,
    }
}

fn rules() -> SweepRules {
    SweepRules {
        radius: 3.5,
        strength: 0.04,
        vine_throttle_sec: Some(0.2),
        global_throttle_sec: 0.06,
    }
}

// ---------------- gates and stage ids ----------------

#[test]
fn stages_run_in_order() {
    assert_eq!(StageId::Vines.next(), Some(StageId::Garden));
    assert_eq!(StageId::Sparkles.next(), Some(StageId::Ending));
    assert_eq!(StageId::Ending.next(), None);
    assert_eq!(StageId::Vines.number(), 1);
    assert_eq!(StageId::Ending.number(), 5);
}

#[test]
fn hold_gate_needs_the_condition_to_hold() {
    let mut gate = HoldGate::new(0.3);
    assert!(!gate.update(0.0, true, true));
    assert!(gate.is_armed());
    // condition lost before the delay: start over
    assert!(!gate.update(0.2, false, false));
    assert!(!gate.is_armed());
    assert!(!gate.update(0.5, true, true));
    assert!(!gate.update(0.7, false, true));
    assert!(gate.update(0.8, false, true));
    // latched
    assert!(gate.update(5.0, false, false));
}

// ---------------- vines ----------------

#[test]
fn a_sweep_plucks_a_nearby_vine_once() {
    let mut arena = VineArena::new();
    let id = arena.spawn(Vec3::new(0.0, 8.0, 0.0), steady_params()).unwrap();
    let plucks = arena.sweep(Vec2::new(0.0, 4.0), 20.0, 0.0, &rules());
    assert_eq!(plucks.len(), 1);
    assert_eq!(plucks[0].id, id);
    assert!(close(plucks[0].force, 1.6));
    assert!(close(plucks[0].velocity, 1.0));
    assert_eq!(plucks[0].note, Note::new(E, 5));
    assert!(arena.get(id).unwrap().oscillator.is_locked());
    // still swinging: left alone
    assert!(arena.sweep(Vec2::new(0.0, 4.0), 20.0, 1.0, &rules()).is_empty());
}

#[test]
fn only_one_vine_sounds_per_global_gap() {
    let mut arena = VineArena::new();
    arena.spawn(Vec3::new(0.0, 8.0, 0.0), steady_params()).unwrap();
    arena.spawn(Vec3::new(1.0, 8.0, 0.0), steady_params()).unwrap();
    let plucks = arena.sweep(Vec2::new(0.5, 4.0), 20.0, 0.0, &rules());
    assert_eq!(plucks.len(), 1);
    assert!(arena.iter().all(|(_, v)| v.oscillator.is_locked()));
}

#[test]
fn distant_vines_are_untouched() {
    let mut arena = VineArena::new();
    let id = arena.spawn(Vec3::new(10.0, 8.0, 0.0), steady_params()).unwrap();
    assert!(arena.sweep(Vec2::new(0.0, 4.0), 20.0, 0.0, &rules()).is_empty());
    assert!(!arena.get(id).unwrap().oscillator.is_locked());
    assert!(arena.any_within(Vec2::new(10.5, 8.0), 2.0));
    assert!(!arena.any_within(Vec2::new(0.0, 8.0), 2.0));
}

#[test]
fn gentle_push_moves_without_sounding() {
    let mut arena = VineArena::new();
    let id = arena.spawn(Vec3::new(0.0, 8.0, 0.0), steady_params()).unwrap();
    // 0.1px at distance 3 is far below an audible pluck
    let plucks = arena.sweep(Vec2::new(0.0, 1.0), 0.1, 0.0, &rules());
    assert!(plucks.is_empty());
    assert!(arena.get(id).unwrap().oscillator.angular_velocity() > 0.0);
}

#[test]
fn fading_vines_count_as_removed_after_the_fall() {
    let mut arena = VineArena::new();
    let id = arena.spawn(Vec3::new(0.0, 8.0, 0.0), steady_params()).unwrap();
    let vine = arena.get_mut(id).unwrap();
    vine.fading_since = Some(1.0);
    assert!(vine.is_fading());
    assert!(!vine.is_removed(3.0, 2.5));
    assert!(vine.is_removed(3.5, 2.5));
}

// ---------------- garden ----------------

struct GardenRig {
    transport: Rc<Transport>,
    garden: Garden,
    backend: RecordingBackend,
}

fn garden(params: GardenParams) -> GardenRig {
    let (transport, clock) = clock();
    GardenRig {
        transport,
        garden: Garden::new(params, clock, 21),
        backend: RecordingBackend::new(),
    }
}

impl GardenRig {
    fn plant(&mut self, x: f32, y: f32) -> Option<FlowerId> {
        self.garden
            .plant(Vec2::new(x, y), 0.0, &mut self.backend)
            .unwrap()
    }

    fn send(&mut self, event: InputEvent) {
        let mut ctx = FrameContext {
            now: 0.0,
            backend: &mut self.backend,
        };
        self.garden.handle(&event, &mut ctx);
        self.garden.update(&mut ctx);
    }

    fn click(&mut self, world: Vec2) {
        let screen = world * 40.0;
        self.send(InputEvent::PointerDown { screen, world });
        self.send(InputEvent::PointerUp { screen, world });
    }
}

#[test]
fn planting_strikes_a_bell_and_starts_its_loop() {
    let mut rig = garden(GardenParams::default());
    let id = rig.plant(0.0, 0.0).unwrap();
    let log = rig.backend.log();
    let log = log.borrow();
    assert!(log.iter().any(|p| matches!(
        p,
        Played::Volume { preset: SynthPreset::Bell, db } if close(*db, -14.4)
    )));
    assert!(log.iter().any(|p| matches!(
        p,
        Played::Cutoff { preset: SynthPreset::Bell, hz } if (*hz - 4100.0).abs() < 1.0
    )));
    assert!(log.iter().any(|p| matches!(
        p,
        Played::Note { preset: SynthPreset::Bell, duration: NoteValue::Eighth, velocity, .. }
            if close(*velocity, 0.8)
    )));
    let flower = rig.garden.flower(id).unwrap();
    assert!(flower.is_ringing());
    assert!(close(flower.volume_db(), -14.4));
    assert_eq!(rig.transport.pending(), 1);
}

#[test]
fn higher_flowers_are_brighter() {
    let mut rig = garden(GardenParams::default());
    let low = rig.plant(0.0, -6.0).unwrap();
    let high = rig.plant(0.0, 6.0).unwrap();
    let low = rig.garden.flower(low).unwrap().cutoff_hz;
    let high = rig.garden.flower(high).unwrap().cutoff_hz;
    assert!(high > low);
}

#[test]
fn crowded_spots_are_refused() {
    let mut rig = garden(GardenParams::default());
    rig.plant(0.0, 0.0).unwrap();
    assert!(rig.plant(1.0, 0.0).is_none());
    assert_eq!(rig.garden.flower_count(), 1);
}

#[test]
fn planting_nudges_neighbours_outward() {
    let mut rig = garden(GardenParams::default());
    let first = rig.plant(0.0, 0.0).unwrap();
    rig.plant(4.0, 0.0).unwrap();
    let moved = rig.garden.flower(first).unwrap().position;
    assert!(close(moved.x, -0.7));
    assert!(close(moved.y, 0.0));
}

#[test]
fn the_oldest_flower_goes_beyond_the_cap() {
    let mut rig = garden(GardenParams::default());
    let first = rig.plant(-30.0, 0.0).unwrap();
    for i in 1..11 {
        rig.plant(-30.0 + i as f32 * 6.0, 0.0).unwrap();
    }
    assert_eq!(rig.garden.flower_count(), 10);
    assert!(rig.garden.flower(first).is_none());
    assert_eq!(rig.transport.pending(), 10);
}

#[test]
fn picking_and_removing_flowers() {
    let mut rig = garden(GardenParams::default());
    let id = rig.plant(0.0, 0.0).unwrap();
    assert_eq!(rig.garden.flower_at(Vec2::new(0.5, 0.0)), Some(id));
    assert_eq!(rig.garden.flower_at(Vec2::new(2.0, 0.0)), None);
    assert!(rig.garden.remove(id));
    assert!(!rig.garden.remove(id));
    assert_eq!(rig.transport.pending(), 0);
}

#[test]
fn scale_is_clamped_and_sets_volume() {
    let mut rig = garden(GardenParams::default());
    let id = rig.plant(0.0, 0.0).unwrap();
    rig.garden.set_scale(id, 10.0);
    let flower = rig.garden.flower(id).unwrap();
    assert!(close(flower.scale, MAX_FLOWER_SCALE));
    assert!(close(flower.volume_db(), 0.0));
    rig.garden.set_scale(id, 0.0);
    assert!(close(rig.garden.flower(id).unwrap().scale, MIN_FLOWER_SCALE));
}

#[test]
fn spinning_restarts_the_loop() {
    let mut rig = garden(GardenParams::default());
    let id = rig.plant(0.0, 0.0).unwrap();
    let before = rig.garden.flower(id).unwrap();
    let (loop_before, speed_before) = (before.loop_id(), before.rot_speed);
    rig.garden.spin(id, -1.0).unwrap();
    let after = rig.garden.flower(id).unwrap();
    assert_ne!(after.loop_id(), loop_before);
    assert!((after.rot_speed - speed_before - 0.0005).abs() < 1e-6);
    assert!(after.is_ringing());
    assert_eq!(rig.transport.pending(), 1);
}

#[test]
fn click_plants_and_click_on_a_flower_picks_it() {
    let mut rig = garden(GardenParams::default());
    rig.click(Vec2::new(2.0, 1.0));
    assert_eq!(rig.garden.flower_count(), 1);
    rig.click(Vec2::new(2.2, 1.0));
    assert_eq!(rig.garden.flower_count(), 0);
}

#[test]
fn dragging_a_flower_resizes_it() {
    let mut rig = garden(GardenParams::default());
    let id = rig.plant(0.0, 0.0).unwrap();
    let world = Vec2::ZERO;
    let start = Vec2::new(600.0, 330.0);
    rig.send(InputEvent::PointerDown { screen: start, world });
    rig.send(InputEvent::PointerMove {
        screen: start - Vec2::new(0.0, 60.0),
        world,
    });
    rig.send(InputEvent::PointerUp {
        screen: start - Vec2::new(0.0, 60.0),
        world,
    });
    assert_eq!(rig.garden.flower_count(), 1);
    assert!(close(rig.garden.flower(id).unwrap().scale, 1.6));
}

#[test]
fn wheel_over_a_flower_spins_it() {
    let mut rig = garden(GardenParams::default());
    let id = rig.plant(0.0, 0.0).unwrap();
    let before = rig.garden.flower(id).unwrap().loop_id();
    rig.send(InputEvent::Wheel {
        world: Vec2::new(0.2, 0.0),
        delta_y: -50.0,
    });
    assert_ne!(rig.garden.flower(id).unwrap().loop_id(), before);
}

#[test]
fn garden_completes_at_its_target_and_tears_down() {
    let params = GardenParams {
        target_flowers: 2,
        ..GardenParams::default()
    };
    let mut rig = garden(params);
    rig.click(Vec2::new(-5.0, 0.0));
    assert!(!rig.garden.is_complete());
    rig.click(Vec2::new(5.0, 0.0));
    assert!(rig.garden.is_complete());
    rig.garden.teardown();
    assert_eq!(rig.garden.flower_count(), 0);
    assert_eq!(rig.transport.pending(), 0);
}

#[test]
fn bell_loops_ring_on_eighths() {
    let params = GardenParams {
        ring_probability: 1.0,
        ..GardenParams::default()
    };
    let mut rig = garden(params);
    rig.plant(0.0, 0.0).unwrap();
    rig.transport.advance(0.9);
    let rings = notes_of(&rig.backend.log(), SynthPreset::Bell);
    // the planting strike plus eighths at 0, 0.25 .. 1.0
    assert_eq!(rings.len(), 6);
    assert!(rings[1..].iter().all(|(n, _)| BELL_NOTES.contains(n)));
}

// ---------------- rhythm ----------------

fn rhythm() -> (Rhythm, RecordingBackend) {
    let mut backend = RecordingBackend::new();
    let rhythm = Rhythm::new(RhythmParams::default(), &mut backend, 9);
    (rhythm, backend)
}

/// Run 0.1s frames `from..to`, pressing a key every `press_every` frames.
fn play(
    rhythm: &mut Rhythm,
    backend: &mut RecordingBackend,
    frames: std::ops::Range<u32>,
    press_every: Option<u32>,
    mut each: impl FnMut(&Rhythm),
) {
    for i in frames {
        let mut ctx = FrameContext {
            now: i as f64 * 0.1,
            backend: &mut *backend,
        };
        if press_every.is_some_and(|n| i % n == 0) {
            rhythm.handle(&InputEvent::Key(ArrowKey::Left), &mut ctx);
        }
        rhythm.update(&mut ctx);
        each(rhythm);
    }
}

#[test]
fn arrow_keys_play_the_hand_kit() {
    assert_eq!(ArrowKey::Left.voice().0, HitClass::Kick);
    assert_eq!(ArrowKey::Right.voice().0, HitClass::Snare);
    assert_eq!(ArrowKey::Up.voice().0, HitClass::OpenHat);
    let (class, gain) = ArrowKey::Down.voice();
    assert_eq!(class, HitClass::ClosedHat);
    assert!(close(gain, 0.3));

    let (mut rhythm, backend) = rhythm();
    rhythm.press(ArrowKey::Right, 1.5);
    assert_eq!(hits(&backend.log()), vec![(HitClass::Snare, 1.5, 0.7)]);
}

#[test]
fn speed_is_presses_per_second_over_the_window() {
    let (mut rhythm, _backend) = rhythm();
    assert_eq!(rhythm.measure_speed(0.0), 0.0);
    for i in 0..10 {
        rhythm.record_press(i as f64 * 0.2);
    }
    assert!((rhythm.measure_speed(1.8) - 5.0).abs() < 1e-9);
    assert_eq!(rhythm.measure_speed(10.0), 0.0);
}

#[test]
fn slow_playing_never_shows_a_circle() {
    let (mut rhythm, mut backend) = rhythm();
    play(&mut rhythm, &mut backend, 0..200, Some(5), |r| {
        assert_eq!(r.visible_circles(), 0);
    });
    assert!(!rhythm.is_complete());
}

#[test]
fn keeping_up_the_pace_locks_every_circle() {
    let (mut rhythm, mut backend) = rhythm();
    let mut last = 0;
    play(&mut rhythm, &mut backend, 0..200, Some(2), |r| {
        let v = r.visible_circles();
        assert!(v >= last && v <= 5);
        last = v;
    });
    assert!(rhythm.is_locked());
    assert!(rhythm.is_complete());
    assert_eq!(rhythm.max_reached(), 5);
    // locked circles stay when playing stops
    play(&mut rhythm, &mut backend, 200..400, None, |r| {
        assert_eq!(r.visible_circles(), 5);
    });
}

#[test]
fn circles_fade_one_at_a_time_when_playing_stops() {
    let (mut rhythm, mut backend) = rhythm();
    play(&mut rhythm, &mut backend, 0..50, Some(2), |_| {});
    let reached = rhythm.visible_circles();
    assert!(reached >= 2, "reached {reached}");
    let mut last = reached;
    play(&mut rhythm, &mut backend, 50..300, None, |r| {
        let v = r.visible_circles();
        assert!(v <= last + 1);
        assert!(last <= v + 1);
        last = v;
    });
    assert_eq!(rhythm.visible_circles(), 0);
    assert_eq!(rhythm.max_reached(), 0);
    assert!(!rhythm.is_locked());
}

// ---------------- sparkles ----------------

fn sparkles() -> (Rc<Transport>, Sparkles) {
    let (transport, clock) = clock();
    let mut backend = RecordingBackend::new();
    let rack = InstrumentRack::load(&mut backend, Box::new(StdRng::seed_from_u64(2)));
    let stage = Sparkles::with_rack(SparkleParams::default(), clock, rack).unwrap();
    (transport, stage)
}

#[test]
fn branches_start_dark_and_silent() {
    let (transport, stage) = sparkles();
    for n in 1..=4 {
        assert_eq!(stage.branch(n).unwrap().lit_count(), 0);
    }
    assert!(stage.branch(0).is_none());
    assert_eq!(stage.orchestrator().active_sequences(), 0);
    assert_eq!(transport.pending(), 0);
}

#[test]
fn toggling_a_cell_retunes_its_track() {
    let (_transport, mut stage) = sparkles();
    assert_eq!(stage.toggle(1, 3).unwrap(), 1);
    let first = stage.orchestrator().sequence_id(TrackKind::Melody).unwrap();
    assert_eq!(stage.toggle(1, 1).unwrap(), 3);
    assert_eq!(stage.orchestrator().level(TrackKind::Melody), Level::new(3).unwrap());
    let second = stage.orchestrator().sequence_id(TrackKind::Melody).unwrap();
    assert_ne!(first, second);

    assert_eq!(stage.toggle(2, 3).unwrap(), 4);
    assert_eq!(stage.orchestrator().level(TrackKind::Chord), Level::MAX);
    assert!((stage.lit_proportion() - 7.0 / 16.0).abs() < 1e-6);
}

#[test]
fn bad_toggles_are_rejected() {
    let (_transport, mut stage) = sparkles();
    assert!(stage.toggle(0, 0).is_err());
    assert!(stage.toggle(5, 0).is_err());
    assert!(stage.toggle(1, 4).is_err());
    assert_eq!(stage.orchestrator().active_sequences(), 0);
}

#[test]
fn a_toggle_the_track_cannot_play_is_rolled_back() {
    let (_transport, clock) = clock();
    let mut backend = RecordingBackend::new();
    let rack = InstrumentRack::load(&mut backend, Box::new(StdRng::seed_from_u64(2)));
    let params = SparkleParams {
        cells_per_branch: 5,
        ..SparkleParams::default()
    };
    let mut stage = Sparkles::with_rack(params, clock, rack).unwrap();
    assert_eq!(stage.toggle(1, 4).unwrap(), 1);
    let id = stage.orchestrator().sequence_id(TrackKind::Melody);

    // lighting from the start would need level 5
    assert!(matches!(
        stage.toggle(1, 0),
        Err(CoreError::InvalidParameter { .. })
    ));
    let branch = stage.branch(1).unwrap();
    assert_eq!(branch.cells(), &[false, false, false, false, true]);
    assert_eq!(branch.lit_count(), 1);
    assert_eq!(stage.orchestrator().level(TrackKind::Melody), Level::new(1).unwrap());
    assert_eq!(stage.orchestrator().sequence_id(TrackKind::Melody), id);
}

#[test]
fn floating_sparkles_follow_the_lit_proportion() {
    assert_eq!(floating_sparkles(60, 0.0), FloatingSparkles { active: 0, lit: 0 });
    assert_eq!(floating_sparkles(60, 0.5), FloatingSparkles { active: 30, lit: 15 });
    assert_eq!(floating_sparkles(60, 1.0), FloatingSparkles { active: 60, lit: 60 });
    assert_eq!(floating_sparkles(60, 3.0), FloatingSparkles { active: 60, lit: 60 });
}

#[test]
fn a_fully_lit_tree_completes_after_holding() {
    let (transport, mut stage) = sparkles();
    let mut backend = RecordingBackend::new();
    let mut frame = |stage: &mut Sparkles, now: f64, event: Option<InputEvent>| {
        let mut ctx = FrameContext {
            now,
            backend: &mut backend,
        };
        if let Some(e) = event {
            stage.handle(&e, &mut ctx);
        }
        stage.update(&mut ctx);
    };
    for (branch, cell) in [(1, 0), (2, 3), (3, 0), (4, 3)] {
        frame(&mut stage, 0.0, Some(InputEvent::Sparkle { branch, cell }));
    }
    assert!(stage.all_lit());
    assert_eq!(stage.floating(), FloatingSparkles { active: 60, lit: 60 });
    frame(&mut stage, 2.0, None);
    assert!(!stage.is_complete());
    frame(&mut stage, 3.0, None);
    assert!(stage.is_complete());
    assert_eq!(transport.pending(), 4);

    stage.teardown();
    assert_eq!(stage.orchestrator().active_sequences(), 0);
    assert_eq!(transport.pending(), 0);
}

// ---------------- ending ----------------

fn ending(params: EndingParams) -> (Ending, RecordingBackend) {
    let mut backend = RecordingBackend::new();
    let rules = SweepRules {
        vine_throttle_sec: None,
        ..rules()
    };
    let ending = Ending::new(params, rules, &mut backend, 4);
    (ending, backend)
}

#[test]
fn vines_grow_where_the_pointer_rests_once_per_cooldown() {
    let (mut stage, _backend) = ending(EndingParams::default());
    assert!(stage.try_spawn(Vec2::new(0.5, 5.0), 0.0).unwrap().is_some());
    assert!(stage.try_spawn(Vec2::new(0.5, 5.0), 0.1).unwrap().is_none());
    // same cell after the cooldown, but too close to the first vine
    assert!(stage.try_spawn(Vec2::new(0.5, 5.0), 1.0).unwrap().is_none());
    assert!(stage.try_spawn(Vec2::new(8.0, 5.0), 1.0).unwrap().is_some());
    assert_eq!(stage.vine_count(), 2);
}

#[test]
fn vines_only_grow_inside_the_sky() {
    let (mut stage, _backend) = ending(EndingParams::default());
    assert!(stage.try_spawn(Vec2::new(0.0, 1.0), 0.0).unwrap().is_none());
    assert!(stage.try_spawn(Vec2::new(0.0, 13.0), 0.0).unwrap().is_none());
    assert!(stage.try_spawn(Vec2::new(19.0, 5.0), 0.0).unwrap().is_none());
    assert_eq!(stage.vine_count(), 0);
}

#[test]
fn vine_count_is_capped() {
    let params = EndingParams {
        max_vines: 2,
        target_vines: 2,
        confirm_vines: 1,
        ..EndingParams::default()
    };
    let (mut stage, _backend) = ending(params);
    for (i, x) in [-10.0, 0.0, 10.0].into_iter().enumerate() {
        let _ = stage.try_spawn(Vec2::new(x, 5.0), i as f64);
    }
    assert_eq!(stage.vine_count(), 2);
}

#[test]
fn finale_fades_out_once_enough_vines_have_grown() {
    let params = EndingParams {
        target_vines: 3,
        confirm_vines: 2,
        ..EndingParams::default()
    };
    let (mut stage, mut backend) = ending(params);
    let mut frame = |stage: &mut Ending, now: f64, at: Option<Vec2>| {
        let mut ctx = FrameContext {
            now,
            backend: &mut backend,
        };
        if let Some(world) = at {
            let screen = Vec2::new((world.x + 15.0) * 40.0, 100.0);
            stage.handle(&InputEvent::PointerMove { screen, world }, &mut ctx);
        }
        stage.update(&mut ctx);
    };
    assert!(!stage.begin_finale(0.0));
    for (i, x) in [-10.0, 0.0, 10.0].into_iter().enumerate() {
        frame(&mut stage, i as f64 * 0.1, Some(Vec2::new(x, 6.0)));
    }
    assert_eq!(stage.vine_count(), 3);
    assert!(!stage.is_complete());
    frame(&mut stage, 0.6, None);
    assert!(stage.is_complete());

    assert!(stage.begin_finale(1.0));
    assert!(close(stage.fade_progress(1.0), 0.0));
    assert!(close(stage.fade_progress(3.0), 0.5));
    assert!(!stage.is_finished(4.9));
    assert!(stage.is_finished(5.0));
    // the pointer no longer grows vines
    frame(&mut stage, 5.0, Some(Vec2::new(5.0, 10.0)));
    assert_eq!(stage.vine_count(), 3);
}

#[test]
fn sweeping_grown_vines_plays_them() {
    let (mut stage, mut backend) = ending(EndingParams::default());
    stage.try_spawn(Vec2::new(0.0, 8.0), 0.0).unwrap();
    let log = backend.log();
    let anchor = stage.arena().iter().next().unwrap().1.pluck_point();
    let mut ctx = FrameContext {
        now: 1.0,
        backend: &mut backend,
    };
    for x in [100.0, 120.0] {
        stage.handle(
            &InputEvent::PointerMove {
                screen: Vec2::new(x, 200.0),
                world: anchor,
            },
            &mut ctx,
        );
    }
    assert_eq!(notes_of(&log, SynthPreset::Pluck).len(), 1);
}
