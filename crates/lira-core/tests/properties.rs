//! Property tests over arbitrary sequences of advance calls.

use lira_core::prelude::*;
use lira_core::systems::MAX_LOG_LINES;
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Call {
    metrics: DailyHealthMetrics,
    fraction: f64,
    summary: bool,
}

fn call() -> impl Strategy<Value = Call> {
    (
        0.0f64..20_000.0,
        0.0f64..600.0,
        0.0f64..180.0,
        0.0f64..12.0,
        -0.5f64..1.5,
        any::<bool>(),
    )
        .prop_map(|(steps, daylight, exercise, sleep, fraction, summary)| Call {
            metrics: DailyHealthMetrics::new(steps, daylight, exercise, sleep),
            fraction,
            summary,
        })
}

fn hostile_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1.0e6f64..0.0,
        Just(f64::NAN),
        Just(f64::NEG_INFINITY),
        Just(0.0),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn counters_never_decrease(seed in any::<u64>(), calls in prop::collection::vec(call(), 1..80)) {
        let mut engine = SimulationEngine::with_seed(seed);
        let mut state = SimulationState::new_colony(engine.catalog());

        for c in &calls {
            let before = state.clone();
            engine.advance_fraction_of_day(&mut state, &c.metrics, c.fraction, c.summary);

            prop_assert!(state.current_day_index >= before.current_day_index);
            prop_assert!(state.current_day_index <= before.current_day_index + 1);
            prop_assert!(state.explored_radius_km >= before.explored_radius_km);
            prop_assert!(state.greenhouse_count >= before.greenhouse_count);
            prop_assert!(state.school_count >= before.school_count);
            prop_assert!(state.technology_level >= before.technology_level);
            prop_assert!(state.population >= before.population);
        }
    }

    #[test]
    fn counters_stay_non_negative(seed in any::<u64>(), calls in prop::collection::vec(call(), 1..80)) {
        let mut engine = SimulationEngine::with_seed(seed);
        let mut state = SimulationState::new_colony(engine.catalog());

        for c in &calls {
            engine.advance_fraction_of_day(&mut state, &c.metrics, c.fraction, c.summary);
            for value in [
                state.food_stock_rations,
                state.build_points,
                state.science_points,
                state.population,
                state.housing_capacity,
            ] {
                prop_assert!(value.is_finite() && value >= 0.0, "bad counter {}", value);
            }
            prop_assert!(state.event_log.len() <= MAX_LOG_LINES);
        }
    }

    #[test]
    fn malformed_metrics_act_like_zero(
        steps in hostile_value(),
        daylight in hostile_value(),
        exercise in hostile_value(),
        sleep in hostile_value(),
        fraction in 0.0f64..=1.0,
    ) {
        let mut a = SimulationState::new_colony(&BuildingCatalog::standard());
        let mut b = a.clone();
        let mut ea = SimulationEngine::with_seed(9);
        let mut eb = SimulationEngine::with_seed(9);

        let hostile = DailyHealthMetrics::new(steps, daylight, exercise, sleep);
        ea.advance_fraction_of_day(&mut a, &hostile, fraction, true);
        eb.advance_fraction_of_day(&mut b, &DailyHealthMetrics::ZERO, fraction, true);
        prop_assert_eq!(a, b);
    }
}
