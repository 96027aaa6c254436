mod common;

use std::rc::Rc;

use common::{approx, hits, notes_of, Log, RecordingBackend, RecordingSample};
use rand::rngs::StdRng;
use rand::SeedableRng;
use wisteria_core::PitchClass::*;
use wisteria_core::*;

struct Rig {
    transport: Rc<Transport>,
    orchestrator: Orchestrator,
    log: Log,
}

fn rig(samples_loaded: bool) -> Rig {
    let transport = Rc::new(Transport::default());
    let mut backend = RecordingBackend::new();
    backend.samples_loaded = samples_loaded;
    let log = backend.log();
    let rack = InstrumentRack::load(&mut backend, Box::new(StdRng::seed_from_u64(11)));
    let clock: Rc<dyn Clock> = transport.clone();
    Rig {
        transport,
        orchestrator: Orchestrator::new(clock, rack),
        log,
    }
}

#[test]
fn tracks_start_silent() {
    let rig = rig(true);
    for kind in TrackKind::ALL {
        assert_eq!(rig.orchestrator.level(kind), Level::SILENT);
        assert!(!rig.orchestrator.has_active(kind));
    }
    assert_eq!(rig.orchestrator.active_sequences(), 0);
}

#[test]
fn raising_a_level_installs_one_sequence() {
    let mut rig = rig(true);
    rig.orchestrator.update_complexity(1, 2).unwrap();
    assert_eq!(rig.orchestrator.level(TrackKind::Melody), Level::new(2).unwrap());
    assert!(rig.orchestrator.has_active(TrackKind::Melody));
    assert_eq!(rig.orchestrator.active_sequences(), 1);
    assert_eq!(rig.transport.pending(), 1);
}

#[test]
fn every_level_change_replaces_the_sequence() {
    let mut rig = rig(true);
    rig.orchestrator.update_complexity(2, 1).unwrap();
    let first = rig.orchestrator.sequence_id(TrackKind::Chord).unwrap();
    rig.orchestrator.update_complexity(2, 3).unwrap();
    let second = rig.orchestrator.sequence_id(TrackKind::Chord).unwrap();
    assert_ne!(first, second);
    // the same level again still restarts
    rig.orchestrator.update_complexity(2, 3).unwrap();
    assert_ne!(rig.orchestrator.sequence_id(TrackKind::Chord), Some(second));
    assert_eq!(rig.transport.pending(), 1);
}

#[test]
fn level_zero_stops_the_track() {
    let mut rig = rig(true);
    rig.orchestrator.update_complexity(4, 2).unwrap();
    rig.orchestrator.update_complexity(4, 0).unwrap();
    assert!(!rig.orchestrator.has_active(TrackKind::Bass));
    assert_eq!(rig.orchestrator.level(TrackKind::Bass), Level::SILENT);
    assert_eq!(rig.transport.pending(), 0);
}

#[test]
fn bad_track_or_level_is_rejected() {
    let mut rig = rig(true);
    rig.orchestrator.update_complexity(1, 1).unwrap();
    let before = rig.orchestrator.sequence_id(TrackKind::Melody);
    assert!(matches!(
        rig.orchestrator.update_complexity(5, 1),
        Err(CoreError::InvalidParameter { name: "track", .. })
    ));
    assert!(matches!(
        rig.orchestrator.update_complexity(1, 5),
        Err(CoreError::InvalidParameter { name: "level", .. })
    ));
    assert_eq!(rig.orchestrator.sequence_id(TrackKind::Melody), before);
    assert_eq!(rig.orchestrator.level(TrackKind::Melody), Level::new(1).unwrap());
}

#[test]
fn melody_level_one_plays_its_arpeggio_on_schedule() {
    let mut rig = rig(true);
    rig.orchestrator.set_level(TrackKind::Melody, Level::new(1).unwrap()).unwrap();
    rig.transport.advance(0.0);
    rig.transport.advance(4.0);
    let played = notes_of(&rig.log, SynthPreset::Melody);
    let times: Vec<f64> = played.iter().map(|(_, t)| *t).collect();
    assert_eq!(times, vec![0.0, 0.25, 0.5, 4.0, 4.25, 4.5]);
    assert_eq!(played[0].0, Note::new(C, 4));
    assert_eq!(played[2].0, Note::new(G, 4));
}

#[test]
fn bass_doubles_into_the_sub_synth() {
    let mut rig = rig(true);
    rig.orchestrator.update_complexity(4, 1).unwrap();
    rig.transport.advance(0.0);
    assert_eq!(notes_of(&rig.log, SynthPreset::Bass), vec![(Note::new(C, 2), 0.0)]);
    assert_eq!(
        notes_of(&rig.log, SynthPreset::SubBass),
        vec![(Note::new(C, 1), 0.0)]
    );
}

#[test]
fn drums_draw_from_the_groove_pools() {
    let mut rig = rig(true);
    rig.orchestrator.update_complexity(3, 1).unwrap();
    rig.transport.advance(1.9);
    let played = hits(&rig.log);
    let kicks: Vec<f64> = played
        .iter()
        .filter(|(c, _, _)| *c == HitClass::Kick)
        .map(|(_, t, _)| *t)
        .collect();
    let snares: Vec<f64> = played
        .iter()
        .filter(|(c, _, _)| *c == HitClass::Snare)
        .map(|(_, t, _)| *t)
        .collect();
    assert_eq!(kicks, vec![0.0, 1.0, 2.0]);
    assert_eq!(snares, vec![0.5, 1.5]);
    assert!(played
        .iter()
        .any(|(c, _, g)| *c == HitClass::Kick && (*g - 0.9).abs() < 1e-6));
}

#[test]
fn unloaded_samples_are_skipped_not_fatal() {
    let mut rig = rig(false);
    rig.orchestrator.update_complexity(3, 4).unwrap();
    assert!(rig.orchestrator.has_active(TrackKind::Drum));
    rig.transport.advance(2.0);
    assert!(hits(&rig.log).is_empty());
    // the sequence keeps running
    assert_eq!(rig.transport.pending(), 1);
}

#[test]
fn stop_all_silences_every_track() {
    let mut rig = rig(true);
    for n in 1..=4 {
        rig.orchestrator.update_complexity(n, n as usize).unwrap();
    }
    assert_eq!(rig.orchestrator.active_sequences(), 4);
    rig.orchestrator.stop_all();
    assert_eq!(rig.orchestrator.active_sequences(), 0);
    assert_eq!(rig.transport.pending(), 0);
    rig.transport.advance(10.0);
    assert!(rig.log.borrow().is_empty());
}

#[test]
fn chord_offsets_are_added_to_the_step_time() {
    let mut rig = rig(true);
    rig.orchestrator.update_complexity(2, 3).unwrap();
    rig.transport.advance(0.0);
    let on_beat = notes_of(&rig.log, SynthPreset::Chord);
    assert_eq!(on_beat.len(), 3);
    assert!(on_beat.iter().all(|(_, t)| approx(*t, 0.0)));
    // step 4 lands at 1.0s and is pushed a quarter second late
    rig.transport.advance(1.0);
    let late = notes_of(&rig.log, SynthPreset::Chord);
    assert_eq!(late.len(), 6);
    assert!(late[3..].iter().all(|(_, t)| approx(*t, 1.25)));
}

#[test]
fn drum_kit_picks_uniformly_from_a_pool() {
    let log: Log = Default::default();
    let mut kit = DrumKit::new();
    let mut rng = StdRng::seed_from_u64(3);
    assert!(matches!(
        kit.play_random(HitClass::Snare, 0.0, 1.0, &mut rng),
        Err(CoreError::ResourceNotReady { .. })
    ));
    for _ in 0..4 {
        kit.insert(
            HitClass::Snare,
            Box::new(RecordingSample {
                class: HitClass::Snare,
                loaded: true,
                log: Rc::clone(&log),
            }),
        );
    }
    let mut seen = [false; 4];
    for _ in 0..200 {
        let idx = kit.play_random(HitClass::Snare, 0.0, 0.5, &mut rng).unwrap();
        seen[idx] = true;
    }
    assert!(seen.iter().all(|s| *s));
    assert_eq!(log.borrow().len(), 200);
}

#[test]
fn drum_kit_reports_an_unloaded_pick() {
    let log: Log = Default::default();
    let mut kit = DrumKit::new();
    kit.insert(
        HitClass::Kick,
        Box::new(RecordingSample {
            class: HitClass::Kick,
            loaded: false,
            log: Rc::clone(&log),
        }),
    );
    let mut rng = StdRng::seed_from_u64(3);
    assert!(matches!(
        kit.play_random(HitClass::Kick, 0.0, 1.0, &mut rng),
        Err(CoreError::ResourceNotReady { .. })
    ));
    assert!(log.borrow().is_empty());
}

#[test]
fn empty_rack_skips_pitched_events() {
    let mut rack = InstrumentRack::empty(Box::new(StdRng::seed_from_u64(0)));
    let event = PatternEvent::note(
        Role::Melody,
        Note::new(C, 4),
        NoteValue::Eighth,
        0.5,
        0.0,
    );
    rack.dispatch(&event, 1.0);
    assert_eq!(rack.drums_mut().pool_len(HitClass::Kick), 0);
}
