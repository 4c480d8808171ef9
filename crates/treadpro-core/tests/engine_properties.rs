//! Property tests for the workout engine.

use proptest::prelude::*;
use treadpro_core::workout::engine;
use treadpro_core::{RunStatus, Segment, Session, Signal, WorkoutEngine};

fn session(durations: &[u32]) -> Session {
    Session {
        id: "prop".into(),
        name: "Prop".into(),
        description: String::new(),
        segments: durations
            .iter()
            .enumerate()
            .map(|(i, &d)| Segment::new(format!("s-{i}"), d, 6.0, 1))
            .collect(),
        is_custom: false,
    }
}

fn durations() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(1u32..15, 1..6)
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Tick,
    Skip,
    Pause,
    Resume,
}

fn commands() -> impl Strategy<Value = Vec<Command>> {
    prop::collection::vec(
        prop_oneof![
            6 => Just(Command::Tick),
            1 => Just(Command::Skip),
            1 => Just(Command::Pause),
            1 => Just(Command::Resume),
        ],
        0..80,
    )
}

proptest! {
    #[test]
    fn ticking_total_duration_finishes_once(durations in durations()) {
        let s = session(&durations);
        let total: u64 = durations.iter().map(|&d| d as u64).sum();
        let mut engine = WorkoutEngine::start(&s).unwrap();

        let mut finished_on = Vec::new();
        for n in 1..=total {
            if engine.tick().contains(&Signal::Finished) {
                finished_on.push(n);
            }
        }
        prop_assert_eq!(finished_on, vec![total]);
        prop_assert_eq!(engine.total_seconds_elapsed(), total);
        prop_assert_eq!(engine.status(), RunStatus::Finished);

        // Further ticks are absorbed.
        prop_assert!(engine.tick().is_empty());
        prop_assert_eq!(engine.total_seconds_elapsed(), total);
    }

    #[test]
    fn time_is_conserved(durations in durations(), commands in commands()) {
        let s = session(&durations);
        let total = s.total_duration();
        let mut engine = WorkoutEngine::start(&s).unwrap();

        for command in commands {
            match command {
                Command::Tick => { engine.tick(); }
                Command::Skip => { engine.skip(); }
                Command::Pause => { engine.pause(); }
                Command::Resume => { engine.resume(); }
            }
            let state = engine.state();
            prop_assert!(state.segment_index < durations.len());
            prop_assert_eq!(
                state.total_seconds_elapsed
                    + state.segment_seconds_left as u64
                    + s.duration_after(state.segment_index),
                total
            );
            if state.status == RunStatus::Finished {
                break;
            }
        }
    }

    #[test]
    fn pause_resume_pair_is_transparent(
        durations in durations(),
        before in 0usize..10,
        paused_ticks in 0usize..10,
        after in 0usize..20,
    ) {
        let s = session(&durations);
        let mut plain = WorkoutEngine::start(&s).unwrap();
        let mut paused = WorkoutEngine::start(&s).unwrap();

        for _ in 0..before {
            plain.tick();
            paused.tick();
        }
        paused.pause();
        let frozen = paused.state();
        for _ in 0..paused_ticks {
            prop_assert!(paused.tick().is_empty());
        }
        prop_assert_eq!(paused.state(), frozen);
        paused.resume();

        for _ in 0..after {
            prop_assert_eq!(plain.tick(), paused.tick());
        }
        prop_assert_eq!(plain.state(), paused.state());
    }

    #[test]
    fn skip_moves_to_next_segment(durations in prop::collection::vec(1u32..15, 2..6), ticks in 0u32..5) {
        let s = session(&durations);
        let mut engine = WorkoutEngine::start(&s).unwrap();
        for _ in 0..ticks.min(durations[0] - 1) {
            engine.tick();
        }
        let before = engine.state();
        let signals = engine.skip();
        prop_assert_eq!(signals, vec![Signal::SegmentChanged { index: 1 }]);
        prop_assert_eq!(engine.segment_index(), 1);
        prop_assert_eq!(engine.segment_seconds_left(), durations[1]);
        prop_assert_eq!(
            engine.total_seconds_elapsed(),
            before.total_seconds_elapsed + before.segment_seconds_left as u64
        );
    }

    #[test]
    fn skipping_last_segment_matches_natural_end(durations in durations(), ticks in 0u32..5) {
        let s = session(&durations);
        let last = durations.len() - 1;

        let mut skipped = WorkoutEngine::start(&s).unwrap();
        while skipped.segment_index() < last {
            skipped.skip();
        }
        for _ in 0..ticks.min(durations[last] - 1) {
            skipped.tick();
        }
        prop_assert_eq!(skipped.skip(), vec![Signal::Finished]);

        let mut natural = WorkoutEngine::start(&s).unwrap();
        let mut last_signals = Vec::new();
        while !natural.status().is_terminal() {
            last_signals = natural.tick();
        }
        prop_assert_eq!(last_signals, vec![Signal::Finished]);
        prop_assert_eq!(skipped.state(), natural.state());
    }
}

#[test]
fn pure_transitions_reproduce_walkthrough() {
    let s = Session {
        id: "walk".into(),
        name: "Walk".into(),
        description: String::new(),
        segments: vec![Segment::new("a", 3, 5.0, 0), Segment::new("b", 2, 6.0, 2)],
        is_custom: false,
    };
    let mut state = engine::RunState::initial(&s).unwrap();
    let mut all = Vec::new();
    for _ in 0..5 {
        let (next, signals) = engine::tick(state, &s);
        state = next;
        all.push(signals);
    }
    assert_eq!(
        all,
        vec![
            vec![Signal::CountdownCue],
            vec![Signal::CountdownCue],
            vec![Signal::SegmentEndCue, Signal::SegmentChanged { index: 1 }],
            vec![Signal::CountdownCue],
            vec![Signal::Finished],
        ]
    );
    assert_eq!(state.total_seconds_elapsed, 5);
    assert!(!state.is_running());
}
