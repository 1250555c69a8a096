//! Integration tests for the behavior profiler
//!
//! Covers threshold learning from resource events, combat style tracking,
//! pattern analysis driven by periodic sampling, and snapshot restore.

use shambler::core::config::ProfilerConfig;
use shambler::core::types::Vec2;
use shambler::profiler::{BehaviorProfiler, CombatStyle, Pattern, ResourceKind, SubjectSample};

fn sample(position: Vec2, crouching: bool) -> Option<SubjectSample> {
    Some(SubjectSample {
        position,
        moving: true,
        sprinting: false,
        crouching,
    })
}

#[test]
fn test_health_threshold_learned_after_six_samples() {
    let mut profiler = BehaviorProfiler::new(ProfilerConfig::default());
    let befores = [40.0, 45.0, 50.0, 55.0, 50.0, 60.0];

    for (i, before) in befores.iter().enumerate() {
        profiler.record_resource_use(ResourceKind::Health, *before, 100.0);
        if i < 5 {
            // Default until enough samples exist
            assert_eq!(profiler.average_health_threshold(), 50.0);
        }
    }
    assert!((profiler.average_health_threshold() - 50.0).abs() < 1e-5);

    profiler.record_resource_use(ResourceKind::Health, 85.0, 100.0);
    let expected = (40.0 + 45.0 + 50.0 + 55.0 + 50.0 + 60.0 + 85.0) / 7.0;
    assert!((profiler.average_health_threshold() - expected).abs() < 1e-4);
}

#[test]
fn test_preferred_style_follows_majority() {
    let mut profiler = BehaviorProfiler::default();
    profiler.record_combat(CombatStyle::Melee, 2.0, true);
    profiler.record_combat(CombatStyle::Melee, 2.0, true);
    profiler.record_combat(CombatStyle::Ranged, 15.0, false);
    assert_eq!(profiler.preferred_combat_style(), CombatStyle::Melee);

    profiler.record_combat(CombatStyle::Ranged, 15.0, true);
    // Tie keeps the previous preference
    assert_eq!(profiler.preferred_combat_style(), CombatStyle::Melee);

    profiler.record_combat(CombatStyle::Ranged, 15.0, true);
    assert_eq!(profiler.preferred_combat_style(), CombatStyle::Ranged);
    assert!((profiler.combat_success_rate() - 0.8).abs() < 1e-5);
}

#[test]
fn test_close_fighting_leans_aggressive() {
    let mut profiler = BehaviorProfiler::default();
    for _ in 0..6 {
        profiler.record_combat(CombatStyle::Melee, 1.5, true);
    }

    // Ten one-second samples trigger one analysis pass
    let mut position = Vec2::ZERO;
    for i in 0..10 {
        position += Vec2::new(1.0, 0.0);
        profiler.update(1.0, (i + 1) as f32, sample(position, false), Some(true));
    }

    let aggressive = profiler.pattern_confidence(Pattern::AggressiveCombat);
    let defensive = profiler.pattern_confidence(Pattern::DefensiveCombat);
    assert!(aggressive > 0.99);
    assert!((aggressive + defensive - 1.0).abs() < 1e-5);
    assert!(profiler.prefers_day_activity());
}

#[test]
fn test_crouched_movement_marks_stealth() {
    let mut profiler = BehaviorProfiler::default();
    let mut position = Vec2::ZERO;
    for i in 0..20 {
        position += Vec2::new(0.5, 0.0);
        profiler.update(1.0, (i + 1) as f32, sample(position, true), Some(false));
    }
    assert!(profiler.prefers_stealth());
    assert!(!profiler.prefers_day_activity());
    assert!((profiler.total_distance() - 9.5).abs() < 1e-4);
}

#[test]
fn test_dangerous_encounters_set_risk() {
    let mut profiler = BehaviorProfiler::default();
    profiler.record_dangerous_encounter(false);
    profiler.record_dangerous_encounter(false);
    profiler.record_dangerous_encounter(true);
    assert!((profiler.risk_tolerance() - 2.0 / 3.0).abs() < 1e-5);
    assert!(!profiler.prefers_safe_approach());
}

#[test]
fn test_disabled_profiler_ignores_everything() {
    let config = ProfilerConfig {
        enabled: false,
        ..ProfilerConfig::default()
    };
    let mut profiler = BehaviorProfiler::new(config);
    profiler.record_combat(CombatStyle::Ranged, 10.0, true);
    profiler.record_location_visit("Hospital");
    profiler.update(5.0, 5.0, sample(Vec2::new(10.0, 0.0), false), Some(true));
    assert_eq!(profiler.counters().combat_engagements, 0);
    assert!(profiler.movement_history().is_empty());
    assert_eq!(profiler.location_visit_count("Hospital"), 0);
}

#[test]
fn test_snapshot_restores_profile() {
    let mut profiler = BehaviorProfiler::default();
    profiler.record_combat(CombatStyle::Ranged, 12.0, true);
    profiler.record_location_visit("Hospital");
    profiler.record_location_visit("Hospital");
    profiler.record_dangerous_encounter(true);

    let snapshot = profiler.snapshot();
    let mut restored = BehaviorProfiler::default();
    restored.restore(&snapshot);

    assert_eq!(restored.snapshot(), snapshot);
    assert_eq!(restored.preferred_location_type(), "Hospital");
    assert_eq!(restored.preferred_combat_style(), CombatStyle::Ranged);
    // Histories are not part of the snapshot
    assert!(restored.combat_history().is_empty());
}
