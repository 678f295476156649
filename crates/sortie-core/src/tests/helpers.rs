//! Test helper functions for setting up scenarios and aircraft.

use crate::config::{ScenarioConfig, SimulationSettings};
use crate::entity::{Aircraft, Airbase, EntityKey, Ship, Waypoint};
use crate::scenario::Scenario;

// =============================================================================
// Scenario Setup
// =============================================================================

/// One-hour scenario starting at epoch 0 with compression 1.
pub fn test_scenario() -> Scenario {
    test_scenario_with(SimulationSettings::default())
}

/// One-hour scenario with custom settings.
pub fn test_scenario_with(settings: SimulationSettings) -> Scenario {
    Scenario::with_settings(ScenarioConfig::new("test", "Test", 0.0, 3600.0), settings)
        .expect("valid test scenario")
}

/// Blue airbase at (0, 1) and a blue aircraft at (0, 0) flying east at
/// 600 kt, ordered home.
///
/// The base is about 111 km away, so at dt = 60 s the aircraft arrives on the
/// sixth tick.
pub fn setup_return_to_base(scenario: &mut Scenario) {
    scenario
        .add_airbase(Airbase::new("home", "blue", 0.0, 1.0))
        .expect("add base");
    scenario
        .add_aircraft(
            Aircraft::new("viper-1", "blue", 0.0, 0.0)
                .with_motion(90.0, 600.0)
                .with_home_base("home", true),
        )
        .expect("add aircraft");
}

/// A grid of `count` aircraft split across two sides, each with a distinct
/// heading, speed and burn rate, plus one airbase and one patrolling ship per
/// side.
///
/// Every third aircraft is sent home, every fifth pursues the aircraft with
/// the same index on the other side.
#[allow(clippy::cast_precision_loss)]
pub fn setup_fleet(scenario: &mut Scenario, count: usize) {
    scenario
        .add_airbase(Airbase::new("blue-base", "blue", 10.0, 10.0))
        .expect("add base");
    scenario
        .add_airbase(Airbase::new("red-base", "red", 12.0, 14.0))
        .expect("add base");
    for (side, latitude, longitude) in [("blue", 9.0, 9.0), ("red", 13.0, 15.0)] {
        let patrol = vec![
            Waypoint::new(latitude + 0.05, longitude),
            Waypoint::new(latitude + 0.05, longitude + 0.05),
            Waypoint::new(latitude, longitude),
        ];
        scenario
            .add_ship(
                Ship::new(format!("{side}-ship"), side, latitude, longitude)
                    .with_motion(0.0, 30.0)
                    .with_fuel(40_000.0, 50_000.0, 600.0)
                    .with_route(patrol),
            )
            .expect("add ship");
    }

    for i in 0..count {
        let side = if i % 2 == 0 { "blue" } else { "red" };
        let other = if i % 2 == 0 { "red" } else { "blue" };
        let f = i as f64;
        let id = format!("ac-{}", i / 2);
        let mut aircraft = Aircraft::new(id.clone(), side, 11.0 + f * 0.01, 12.0 - f * 0.01)
            .with_motion((f * 37.0) % 360.0, 250.0 + f * 3.0)
            .with_fuel(5_000.0, 10_000.0, 1_000.0 + f * 50.0)
            .with_home_base(format!("{side}-base"), i % 3 == 0);
        if i % 5 == 0 {
            aircraft = aircraft.with_target(EntityKey::new(other, id));
        }
        scenario.add_aircraft(aircraft).expect("add aircraft");
    }
}

/// Ticks `n` times with the same wall step.
pub fn run_ticks(scenario: &mut Scenario, n: usize, wall_seconds: f64) {
    for _ in 0..n {
        scenario.tick(wall_seconds).expect("tick");
    }
}
