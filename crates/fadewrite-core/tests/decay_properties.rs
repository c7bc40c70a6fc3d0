//! Property tests for the decay engine on virtual time.

use std::time::Duration;

use fadewrite_core::simulation::script_from_gaps;
use fadewrite_core::{
    DecayEngine, DecayOutput, DecayPhase, Easing, ManualTimers, Simulation, TimeoutSeconds,
};
use proptest::prelude::*;

fn easing_strategy() -> impl Strategy<Value = Easing> {
    prop_oneof![
        Just(Easing::Linear),
        Just(Easing::Quadratic),
        Just(Easing::Cubic),
    ]
}

proptest! {
    #[test]
    fn test_gaps_under_grace_never_destroy(
        timeout in 1u32..=30,
        gaps in prop::collection::vec(0.0f64..0.99, 1..80),
    ) {
        let mut script_gaps = gaps.clone();
        // The trailing wait is followed by no keystroke; keep it short too.
        script_gaps.push(0.5);
        let mut sim = Simulation::new(TimeoutSeconds::new(timeout).unwrap(), Easing::default());
        let report = sim.run(&script_from_gaps(&script_gaps, &[]));
        prop_assert!(report.destroyed().is_empty());
        prop_assert!(!report.entered_decay());
    }

    #[test]
    fn test_gaps_under_deadline_never_destroy(
        timeout in 1u32..=30,
        fractions in prop::collection::vec(0.0f64..0.95, 1..30),
    ) {
        let limit = 1.0 + f64::from(timeout);
        let gaps: Vec<f64> = fractions.iter().map(|f| f * limit).collect();
        let mut sim = Simulation::new(TimeoutSeconds::new(timeout).unwrap(), Easing::default());
        let report = sim.run(&script_from_gaps(&gaps, &["ok"]));
        prop_assert!(report.destroyed().is_empty());
    }

    #[test]
    fn test_frames_move_one_way(
        timeout in 1u32..=30,
        easing in easing_strategy(),
    ) {
        let mut engine = DecayEngine::new(
            ManualTimers::new(),
            TimeoutSeconds::new(timeout).unwrap(),
            easing,
        );
        engine.on_session_start();
        let out = engine.advance(Duration::from_secs(u64::from(timeout) + 2));

        let mut progress = 1.0f64;
        let mut intensity = 0.0f64;
        let mut destroyed = 0;
        for output in &out {
            let frame = match output {
                DecayOutput::Tick(frame) => frame,
                DecayOutput::Destroyed(frame) => {
                    destroyed += 1;
                    prop_assert_eq!(frame.intensity, 1.0);
                    prop_assert_eq!(frame.remaining_seconds, 0.0);
                    frame
                }
            };
            prop_assert!(frame.progress <= progress);
            prop_assert!(frame.intensity >= intensity);
            prop_assert!((0.0..=1.0).contains(&frame.pulse));
            progress = frame.progress;
            intensity = frame.intensity;
        }
        prop_assert_eq!(destroyed, 1);
        prop_assert_eq!(engine.phase(), DecayPhase::Idle);
    }

    #[test]
    fn test_long_idle_destroys_exactly_once(
        timeout in 1u32..=30,
        extra in 0.0f64..60.0,
        text in "[a-z]{1,8}( [a-z]{1,8}){0,6}",
    ) {
        let idle = 1.0 + f64::from(timeout) + extra;
        let mut sim = Simulation::new(TimeoutSeconds::new(timeout).unwrap(), Easing::default());
        let report = sim.run(&[
            fadewrite_core::Step::Start { text: Some(text.clone()) },
            fadewrite_core::Step::Wait { secs: idle },
        ]);
        let destroyed = report.destroyed();
        prop_assert_eq!(destroyed.len(), 1);
        prop_assert_eq!(destroyed[0].at_ms, 1_000 + u64::from(timeout) * 1_000);
        prop_assert!(!sim.session().is_active());
    }
}
