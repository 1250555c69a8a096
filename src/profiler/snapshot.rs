//! Plain-data profile snapshot for persistence
//!
//! Totals, counters and the pattern map round-trip exactly. Histories are
//! never persisted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::profiler::events::CombatStyle;
use crate::profiler::patterns::Pattern;
use crate::profiler::tracker::{BehaviorProfiler, ProfileCounters};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorSnapshot {
    pub total_distance: f32,
    pub average_speed: f32,
    pub preferred_combat_style: CombatStyle,
    pub average_combat_distance: f32,
    pub health_threshold: f32,
    pub hunger_threshold: f32,
    pub thirst_threshold: f32,
    pub preferred_location_type: String,
    pub exploration_radius: f32,
    pub prefers_day_activity: bool,
    pub prefers_safe_approach: bool,
    pub risk_tolerance: f32,
    pub prefers_stealth: bool,
    pub counters: ProfileCounters,
    pub location_visits: BTreeMap<String, u32>,
    /// Raw accumulators by pattern name
    pub patterns: BTreeMap<String, f32>,
}

impl BehaviorProfiler {
    pub fn snapshot(&self) -> BehaviorSnapshot {
        BehaviorSnapshot {
            total_distance: self.total_distance,
            average_speed: self.average_speed,
            preferred_combat_style: self.preferred_combat_style,
            average_combat_distance: self.average_combat_distance,
            health_threshold: self.health_threshold,
            hunger_threshold: self.hunger_threshold,
            thirst_threshold: self.thirst_threshold,
            preferred_location_type: self.preferred_location_type.clone(),
            exploration_radius: self.exploration_radius,
            prefers_day_activity: self.prefers_day_activity,
            prefers_safe_approach: self.prefers_safe_approach,
            risk_tolerance: self.risk_tolerance,
            prefers_stealth: self.prefers_stealth,
            counters: self.counters,
            location_visits: self
                .location_visits
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            patterns: Pattern::ALL
                .into_iter()
                .map(|p| (p.name().to_string(), self.patterns.raw(p)))
                .collect(),
        }
    }

    /// Overwrite totals, counters and patterns; histories are left alone
    pub fn restore(&mut self, snapshot: &BehaviorSnapshot) {
        self.total_distance = snapshot.total_distance;
        self.average_speed = snapshot.average_speed;
        self.preferred_combat_style = snapshot.preferred_combat_style;
        self.average_combat_distance = snapshot.average_combat_distance;
        self.health_threshold = snapshot.health_threshold;
        self.hunger_threshold = snapshot.hunger_threshold;
        self.thirst_threshold = snapshot.thirst_threshold;
        self.preferred_location_type = snapshot.preferred_location_type.clone();
        self.exploration_radius = snapshot.exploration_radius;
        self.prefers_day_activity = snapshot.prefers_day_activity;
        self.prefers_safe_approach = snapshot.prefers_safe_approach;
        self.risk_tolerance = snapshot.risk_tolerance;
        self.prefers_stealth = snapshot.prefers_stealth;
        self.counters = snapshot.counters;
        self.location_visits = snapshot
            .location_visits
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();

        self.patterns.reset();
        for (name, value) in &snapshot.patterns {
            match name.parse::<Pattern>() {
                Ok(pattern) => self.patterns.set(pattern, *value),
                Err(()) => tracing::warn!("Ignoring unknown pattern '{}' in snapshot", name),
            }
        }

        tracing::info!(
            "Behavior profile restored ({} combat engagements, style {})",
            self.counters.combat_engagements,
            self.preferred_combat_style
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::events::ResourceKind;

    #[test]
    fn test_snapshot_round_trip_through_json() {
        let mut profiler = BehaviorProfiler::default();
        profiler.record_combat(CombatStyle::Ranged, 12.5, true);
        profiler.record_dangerous_encounter(false);
        profiler.record_location_visit("Store");
        profiler.record_resource_use(ResourceKind::Thirst, 33.3, 90.0);

        let snapshot = profiler.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: BehaviorSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, snapshot);

        let mut restored = BehaviorProfiler::default();
        restored.restore(&decoded);
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.preferred_combat_style(), CombatStyle::Ranged);
        // Histories are not part of the snapshot
        assert!(restored.combat_history().is_empty());
    }

    #[test]
    fn test_unknown_pattern_names_are_ignored() {
        let mut snapshot = BehaviorProfiler::default().snapshot();
        snapshot.patterns.insert("Telepathic".into(), 0.9);
        snapshot.patterns.insert("RiskTaker".into(), 1.4);

        let mut profiler = BehaviorProfiler::default();
        profiler.restore(&snapshot);
        assert_eq!(profiler.pattern_confidence(Pattern::RiskTaker), 1.0);
        assert!((profiler.patterns().raw(Pattern::RiskTaker) - 1.4).abs() < 1e-6);
        assert_eq!(profiler.pattern_confidence_by_name("Telepathic"), 0.0);
    }
}
