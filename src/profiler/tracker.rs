//! Behavior profiler
//!
//! Incrementally summarizes what the player does into derived scalars and
//! pattern confidences. Every derived value is a function of the bounded
//! histories plus plain counters, so memory use is fixed.
//!
//! Two cadences run off `update`:
//! - sampling: every `sample_rate` seconds while the subject exists
//! - analysis: whenever the running sample total hits a multiple of
//!   `pattern_window_size`

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::ProfilerConfig;
use crate::core::types::{SimTime, Vec2};
use crate::profiler::events::{
    CombatEvent, CombatStyle, MovementSample, ResourceEvent, ResourceKind, SubjectSample,
};
use crate::profiler::history::BoundedHistory;
use crate::profiler::patterns::{Pattern, PatternTable};

/// Combat analysis needs at least this many events
const MIN_COMBAT_EVENTS: usize = 5;
/// Resource analysis needs at least this many events
const MIN_RESOURCE_EVENTS: usize = 5;
/// Day/night accumulator growth per moving sample
const ACTIVITY_INCREMENT: f32 = 0.1;

pub const DEFAULT_LOCATION_TYPE: &str = "House";

/// Running counters behind the derived scalars
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCounters {
    pub combat_engagements: u32,
    pub melee_attacks: u32,
    pub ranged_attacks: u32,
    pub dangerous_encounters: u32,
    pub retreats: u32,
    pub stand_fights: u32,
    pub loud_actions: u32,
    pub stealth_actions: u32,
    /// Movement samples taken since creation, not capped by history size
    pub movement_samples: u64,
}

#[derive(Debug, Clone)]
pub struct BehaviorProfiler {
    pub(crate) config: ProfilerConfig,

    pub(crate) movement: BoundedHistory<MovementSample>,
    pub(crate) combat: BoundedHistory<CombatEvent>,
    pub(crate) resources: BoundedHistory<ResourceEvent>,
    pub(crate) visited_locations: BoundedHistory<Vec2>,
    pub(crate) location_visits: AHashMap<String, u32>,
    pub(crate) counters: ProfileCounters,
    pub(crate) patterns: PatternTable,

    // Derived scalars
    pub(crate) total_distance: f32,
    pub(crate) average_speed: f32,
    pub(crate) average_combat_distance: f32,
    pub(crate) preferred_combat_style: CombatStyle,
    pub(crate) health_threshold: f32,
    pub(crate) hunger_threshold: f32,
    pub(crate) thirst_threshold: f32,
    pub(crate) preferred_location_type: String,
    pub(crate) exploration_radius: f32,
    pub(crate) prefers_day_activity: bool,
    pub(crate) prefers_safe_approach: bool,
    pub(crate) risk_tolerance: f32,
    pub(crate) prefers_stealth: bool,

    // Sampling state
    sample_timer: f32,
    last_position: Vec2,
    subject_present: bool,
    /// Marks taken at the previous analysis pass
    locations_at_last_pass: u64,
    combats_at_last_pass: u64,
    locations_discovered: u64,
    now: SimTime,
}

impl BehaviorProfiler {
    pub fn new(config: ProfilerConfig) -> Self {
        let capacity = config.max_history_size;
        Self {
            movement: BoundedHistory::new(capacity),
            combat: BoundedHistory::new(capacity),
            resources: BoundedHistory::new(capacity),
            visited_locations: BoundedHistory::new(capacity),
            location_visits: AHashMap::new(),
            counters: ProfileCounters::default(),
            patterns: PatternTable::new(),
            total_distance: 0.0,
            average_speed: 0.0,
            average_combat_distance: 5.0,
            preferred_combat_style: CombatStyle::Melee,
            health_threshold: ResourceKind::Health.default_threshold(),
            hunger_threshold: ResourceKind::Hunger.default_threshold(),
            thirst_threshold: ResourceKind::Thirst.default_threshold(),
            preferred_location_type: DEFAULT_LOCATION_TYPE.to_string(),
            exploration_radius: 0.0,
            prefers_day_activity: true,
            prefers_safe_approach: true,
            risk_tolerance: 0.5,
            prefers_stealth: false,
            sample_timer: 0.0,
            last_position: Vec2::ZERO,
            subject_present: false,
            locations_at_last_pass: 0,
            combats_at_last_pass: 0,
            locations_discovered: 0,
            now: 0.0,
            config,
        }
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    // === PERIODIC UPDATE ===

    /// Advance the sampling cadence.
    ///
    /// `subject` is `None` while the tracked player does not exist; sampling
    /// is suspended and resumes from the subject's position when it returns.
    /// `is_daytime` is `None` when no clock is available.
    pub fn update(
        &mut self,
        dt: f32,
        now: SimTime,
        subject: Option<SubjectSample>,
        is_daytime: Option<bool>,
    ) {
        self.now = now;
        if !self.config.enabled {
            return;
        }
        let Some(subject) = subject else {
            self.subject_present = false;
            return;
        };
        if !self.subject_present {
            self.last_position = subject.position;
            self.subject_present = true;
        }

        self.sample_timer += dt;
        if self.sample_timer >= self.config.sample_rate {
            self.sample_timer = 0.0;
            self.take_sample(now, subject, is_daytime);

            if self.counters.movement_samples % self.config.pattern_window_size as u64 == 0 {
                self.analyze_patterns();
            }
        }
    }

    fn take_sample(&mut self, now: SimTime, subject: SubjectSample, is_daytime: Option<bool>) {
        let delta = subject.position - self.last_position;
        self.total_distance += delta.length();

        self.movement.push(MovementSample {
            timestamp: now,
            position: subject.position,
            velocity: delta / self.config.sample_rate,
            sprinting: subject.sprinting,
            crouching: subject.crouching,
            moving: subject.moving,
        });
        self.counters.movement_samples += 1;

        if subject.crouching {
            self.counters.stealth_actions += 1;
        }
        self.last_position = subject.position;

        let count = self.movement.len() as f32;
        self.average_speed = self.movement.iter().map(|s| s.velocity.length()).sum::<f32>() / count;

        self.sample_exploration(subject.position);

        if let (true, Some(daytime)) = (subject.moving, is_daytime) {
            let pattern = if daytime { Pattern::DayActive } else { Pattern::NightActive };
            self.patterns.add(pattern, ACTIVITY_INCREMENT);
            self.patterns.normalize_pair(Pattern::DayActive, Pattern::NightActive);
            self.prefers_day_activity =
                self.patterns.raw(Pattern::DayActive) > self.patterns.raw(Pattern::NightActive);
        }
    }

    fn sample_exploration(&mut self, position: Vec2) {
        let radius = self.config.location_dedup_radius;
        if self.visited_locations.iter().any(|p| p.distance(position) < radius) {
            return;
        }
        self.visited_locations.push(position);
        self.locations_discovered += 1;

        if self.visited_locations.len() > 1 {
            let centroid = self.exploration_center();
            self.exploration_radius = self
                .visited_locations
                .iter()
                .map(|p| p.distance(centroid))
                .fold(0.0, f32::max);
        }
    }

    fn exploration_center(&self) -> Vec2 {
        if self.visited_locations.is_empty() {
            return Vec2::ZERO;
        }
        let sum: Vec2 = self.visited_locations.iter().copied().sum();
        sum / self.visited_locations.len() as f32
    }

    // === EVENT INGESTION ===

    pub fn record_combat(&mut self, style: CombatStyle, distance: f32, successful: bool) {
        if !self.config.enabled {
            return;
        }
        self.combat.push(CombatEvent {
            timestamp: self.now,
            style,
            distance,
            successful,
        });
        self.counters.combat_engagements += 1;

        match style {
            CombatStyle::Melee => self.counters.melee_attacks += 1,
            CombatStyle::Ranged => {
                self.counters.ranged_attacks += 1;
                self.counters.loud_actions += 1;
            }
        }

        let (melee, ranged) = (self.counters.melee_attacks, self.counters.ranged_attacks);
        if melee > ranged {
            self.preferred_combat_style = CombatStyle::Melee;
        } else if ranged > melee {
            self.preferred_combat_style = CombatStyle::Ranged;
        }

        self.average_combat_distance =
            self.combat.iter().map(|e| e.distance).sum::<f32>() / self.combat.len() as f32;

        tracing::debug!("Combat event: {} at {:.1}m, success: {}", style, distance, successful);
    }

    pub fn record_resource_use(&mut self, kind: ResourceKind, value_before: f32, value_after: f32) {
        if !self.config.enabled {
            return;
        }
        self.resources.push(ResourceEvent {
            timestamp: self.now,
            kind,
            value_before,
            value_after,
        });

        let (count, sum) = self
            .resources
            .iter()
            .filter(|r| r.kind == kind)
            .fold((0usize, 0.0f32), |(n, s), r| (n + 1, s + r.value_before));

        if count >= self.config.min_resource_samples {
            let mean = sum / count as f32;
            match kind {
                ResourceKind::Health => self.health_threshold = mean,
                ResourceKind::Hunger => self.hunger_threshold = mean,
                ResourceKind::Thirst => self.thirst_threshold = mean,
            }
        }

        tracing::debug!(
            "Resource usage: {} from {:.1} to {:.1}",
            kind.name(),
            value_before,
            value_after
        );
    }

    pub fn record_location_visit(&mut self, location_type: &str) {
        if !self.config.enabled {
            return;
        }
        let count = {
            let entry = self.location_visits.entry(location_type.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };
        // Ties go to the key updated last
        if count >= self.location_visit_count(&self.preferred_location_type) {
            self.preferred_location_type = location_type.to_string();
        }
    }

    pub fn record_dangerous_encounter(&mut self, retreated: bool) {
        if !self.config.enabled {
            return;
        }
        self.counters.dangerous_encounters += 1;

        if retreated {
            self.counters.retreats += 1;
            self.patterns.add(Pattern::Cautious, self.config.encounter_increment);
        } else {
            self.counters.stand_fights += 1;
            self.patterns.add(Pattern::RiskTaker, self.config.encounter_increment);
        }

        self.risk_tolerance =
            self.counters.stand_fights as f32 / self.counters.dangerous_encounters as f32;
        self.prefers_safe_approach = self.counters.retreats > self.counters.stand_fights;
    }

    // === PATTERN ANALYSIS ===

    fn analyze_patterns(&mut self) {
        self.analyze_combat();
        self.analyze_movement();
        self.analyze_resources();
        self.analyze_focus();

        let stealth = self.counters.stealth_actions;
        let loud = self.counters.loud_actions;
        if stealth + loud > 0 {
            let ratio = stealth as f32 / (stealth + loud) as f32;
            self.prefers_stealth = ratio > self.config.stealth_ratio_threshold;
            self.patterns.set(Pattern::StealthApproach, ratio);
        }

        tracing::debug!(
            "Pattern analysis after {} samples: aggressive {:.2}, rush {:.2}, stealth {}",
            self.counters.movement_samples,
            self.patterns.confidence(Pattern::AggressiveCombat),
            self.patterns.confidence(Pattern::RushApproach),
            self.prefers_stealth
        );
    }

    fn analyze_combat(&mut self) {
        if self.combat.len() < MIN_COMBAT_EVENTS {
            return;
        }
        let window = self.config.recent_combat_window.max(1);
        let recent: Vec<f32> = self.combat.recent(window).map(|e| e.distance).collect();
        let mean = recent.iter().sum::<f32>() / recent.len() as f32;

        let leaning = if mean < self.config.aggressive_distance {
            Pattern::AggressiveCombat
        } else {
            Pattern::DefensiveCombat
        };
        self.patterns.add(leaning, self.config.pattern_increment);
        self.patterns.normalize_pair(Pattern::AggressiveCombat, Pattern::DefensiveCombat);
    }

    fn analyze_movement(&mut self) {
        let window = self.config.pattern_window_size;
        if self.movement.len() < window {
            return;
        }
        let mean = self.movement.recent(window).map(|s| s.velocity.length()).sum::<f32>()
            / window as f32;

        if mean > self.config.rush_speed {
            self.patterns.add(Pattern::RushApproach, self.config.pattern_increment);
        } else if mean < self.config.cautious_speed {
            self.patterns.add(Pattern::Cautious, self.config.pattern_increment);
        }
        self.patterns.normalize_pair(Pattern::RushApproach, Pattern::Cautious);
    }

    fn analyze_resources(&mut self) {
        let Some(last) = self.resources.last() else {
            return;
        };
        if self.resources.len() < MIN_RESOURCE_EVENTS {
            return;
        }
        let idle = self.now - last.timestamp;
        let leaning = if idle > self.config.conservative_gap_secs {
            Pattern::ResourceConservative
        } else {
            Pattern::ResourceLiberal
        };
        self.patterns.add(leaning, self.config.pattern_increment);
        self.patterns.normalize_pair(Pattern::ResourceConservative, Pattern::ResourceLiberal);
    }

    /// Exploration vs combat since the previous pass
    fn analyze_focus(&mut self) {
        let engagements = self.counters.combat_engagements as u64;
        let explored = self.locations_discovered - self.locations_at_last_pass;
        let fought = engagements - self.combats_at_last_pass;
        self.locations_at_last_pass = self.locations_discovered;
        self.combats_at_last_pass = engagements;

        if explored > fought {
            self.patterns.add(Pattern::ExplorationFocused, self.config.pattern_increment);
        } else if fought > explored {
            self.patterns.add(Pattern::CombatFocused, self.config.pattern_increment);
        }
        self.patterns.normalize_pair(Pattern::ExplorationFocused, Pattern::CombatFocused);
    }

    // === QUERIES ===

    pub fn average_speed(&self) -> f32 {
        self.average_speed
    }

    pub fn total_distance(&self) -> f32 {
        self.total_distance
    }

    pub fn preferred_combat_style(&self) -> CombatStyle {
        self.preferred_combat_style
    }

    pub fn average_combat_distance(&self) -> f32 {
        self.average_combat_distance
    }

    /// Fraction of stored combat events that succeeded; 0 with no history
    pub fn combat_success_rate(&self) -> f32 {
        if self.combat.is_empty() {
            return 0.0;
        }
        let successes = self.combat.iter().filter(|e| e.successful).count();
        successes as f32 / self.combat.len() as f32
    }

    pub fn resource_threshold(&self, kind: ResourceKind) -> f32 {
        match kind {
            ResourceKind::Health => self.health_threshold,
            ResourceKind::Hunger => self.hunger_threshold,
            ResourceKind::Thirst => self.thirst_threshold,
        }
    }

    pub fn average_health_threshold(&self) -> f32 {
        self.health_threshold
    }

    pub fn preferred_location_type(&self) -> &str {
        &self.preferred_location_type
    }

    /// Visits recorded for a location type; unknown types read as 0
    pub fn location_visit_count(&self, location_type: &str) -> u32 {
        self.location_visits.get(location_type).copied().unwrap_or(0)
    }

    pub fn exploration_radius(&self) -> f32 {
        self.exploration_radius
    }

    pub fn prefers_day_activity(&self) -> bool {
        self.prefers_day_activity
    }

    pub fn prefers_safe_approach(&self) -> bool {
        self.prefers_safe_approach
    }

    pub fn risk_tolerance(&self) -> f32 {
        self.risk_tolerance
    }

    pub fn prefers_stealth(&self) -> bool {
        self.prefers_stealth
    }

    pub fn pattern_confidence(&self, pattern: Pattern) -> f32 {
        self.patterns.confidence(pattern)
    }

    /// Clamped confidence by pattern name; 0 for unknown names
    pub fn pattern_confidence_by_name(&self, name: &str) -> f32 {
        self.patterns.confidence_by_name(name)
    }

    pub fn patterns(&self) -> &PatternTable {
        &self.patterns
    }

    /// Patterns at or above `min_pattern_confidence`
    pub fn dominant_patterns(&self) -> Vec<Pattern> {
        self.patterns
            .iter()
            .filter(|(_, c)| *c >= self.config.min_pattern_confidence)
            .map(|(p, _)| p)
            .collect()
    }

    pub fn counters(&self) -> &ProfileCounters {
        &self.counters
    }

    pub fn movement_history(&self) -> &BoundedHistory<MovementSample> {
        &self.movement
    }

    pub fn combat_history(&self) -> &BoundedHistory<CombatEvent> {
        &self.combat
    }

    pub fn resource_history(&self) -> &BoundedHistory<ResourceEvent> {
        &self.resources
    }

    pub fn visited_locations(&self) -> &BoundedHistory<Vec2> {
        &self.visited_locations
    }

    /// Drop all histories, counters and patterns
    pub fn clear_history(&mut self) {
        let config = self.config.clone();
        *self = Self::new(config);
        tracing::info!("Behavior history cleared");
    }
}

impl Default for BehaviorProfiler {
    fn default() -> Self {
        Self::new(ProfilerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject_at(x: f32, y: f32) -> Option<SubjectSample> {
        Some(SubjectSample {
            position: Vec2::new(x, y),
            moving: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_health_threshold_after_six_samples() {
        let mut profiler = BehaviorProfiler::default();
        let befores = [40.0, 45.0, 50.0, 55.0, 50.0];
        for b in befores {
            profiler.record_resource_use(ResourceKind::Health, b, 100.0);
        }
        // Five samples are not enough, default holds
        assert_eq!(profiler.average_health_threshold(), 50.0);

        profiler.record_resource_use(ResourceKind::Health, 60.0, 100.0);
        assert!((profiler.average_health_threshold() - 50.0).abs() < 1e-5);

        profiler.record_resource_use(ResourceKind::Health, 64.0, 100.0);
        assert!((profiler.average_health_threshold() - 52.0).abs() < 1e-5);
        assert_eq!(profiler.resource_threshold(ResourceKind::Hunger), 60.0);
    }

    #[test]
    fn test_combat_style_majority_and_ties() {
        let mut profiler = BehaviorProfiler::default();
        profiler.record_combat(CombatStyle::Ranged, 10.0, true);
        assert_eq!(profiler.preferred_combat_style(), CombatStyle::Ranged);

        profiler.record_combat(CombatStyle::Melee, 1.0, true);
        // 1 vs 1 keeps the previous value
        assert_eq!(profiler.preferred_combat_style(), CombatStyle::Ranged);

        profiler.record_combat(CombatStyle::Melee, 1.0, false);
        assert_eq!(profiler.preferred_combat_style(), CombatStyle::Melee);
        assert_eq!(profiler.counters().loud_actions, 1);
        assert!((profiler.average_combat_distance() - 4.0).abs() < 1e-5);
        assert!((profiler.combat_success_rate() - 2.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_location_preference_tie_goes_to_latest() {
        let mut profiler = BehaviorProfiler::default();
        assert_eq!(profiler.preferred_location_type(), "House");

        profiler.record_location_visit("Store");
        profiler.record_location_visit("Hospital");
        assert_eq!(profiler.preferred_location_type(), "Hospital");

        profiler.record_location_visit("Store");
        assert_eq!(profiler.preferred_location_type(), "Store");
        assert_eq!(profiler.location_visit_count("Store"), 2);
        assert_eq!(profiler.location_visit_count("Bunker"), 0);
    }

    #[test]
    fn test_dangerous_encounters() {
        let mut profiler = BehaviorProfiler::default();
        profiler.record_dangerous_encounter(false);
        profiler.record_dangerous_encounter(false);
        profiler.record_dangerous_encounter(true);

        assert!((profiler.risk_tolerance() - 2.0 / 3.0).abs() < 1e-5);
        assert!(!profiler.prefers_safe_approach());
        assert!((profiler.patterns().raw(Pattern::RiskTaker) - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_sampling_cadence_and_speed() {
        let mut profiler = BehaviorProfiler::default();
        profiler.update(0.5, 0.5, subject_at(0.0, 0.0), Some(true));
        assert_eq!(profiler.movement_history().len(), 0);

        profiler.update(0.5, 1.0, subject_at(3.0, 4.0), Some(true));
        assert_eq!(profiler.movement_history().len(), 1);
        assert!((profiler.average_speed() - 5.0).abs() < 1e-5);
        assert!((profiler.total_distance() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_missing_subject_suspends_and_reanchors() {
        let mut profiler = BehaviorProfiler::default();
        profiler.update(1.0, 1.0, subject_at(0.0, 0.0), None);
        assert_eq!(profiler.movement_history().len(), 1);

        for i in 0..5 {
            profiler.update(1.0, 2.0 + i as f32, None, None);
        }
        assert_eq!(profiler.movement_history().len(), 1);

        // Returns far away: no teleport distance is counted
        profiler.update(1.0, 8.0, subject_at(100.0, 0.0), None);
        assert_eq!(profiler.movement_history().len(), 2);
        assert_eq!(profiler.total_distance(), 0.0);
    }

    #[test]
    fn test_disabled_profiler_ignores_everything() {
        let mut profiler = BehaviorProfiler::default();
        profiler.set_enabled(false);
        profiler.record_combat(CombatStyle::Ranged, 3.0, true);
        profiler.record_location_visit("Store");
        profiler.update(5.0, 5.0, subject_at(1.0, 1.0), Some(true));

        assert_eq!(profiler.counters().combat_engagements, 0);
        assert_eq!(profiler.preferred_location_type(), "House");
        assert!(profiler.movement_history().is_empty());
    }

    #[test]
    fn test_analysis_runs_once_per_window() {
        let mut profiler = BehaviorProfiler::default();
        for _ in 0..5 {
            profiler.record_combat(CombatStyle::Melee, 2.0, true);
        }
        // Stationary subject: slow movement leans cautious
        for i in 0..10 {
            profiler.update(1.0, (i + 1) as f32, subject_at(0.0, 0.0), Some(true));
        }
        assert_eq!(profiler.pattern_confidence(Pattern::AggressiveCombat), 1.0);
        assert_eq!(profiler.pattern_confidence(Pattern::Cautious), 1.0);
        assert_eq!(profiler.pattern_confidence(Pattern::CombatFocused), 1.0);

        // More frames without a new sample do not re-run analysis
        profiler.update(0.1, 10.1, subject_at(0.0, 0.0), Some(true));
        assert_eq!(profiler.counters().movement_samples, 10);
    }

    #[test]
    fn test_stealth_from_crouching() {
        let mut profiler = BehaviorProfiler::default();
        for i in 0..10 {
            let subject = SubjectSample {
                position: Vec2::new(i as f32 * 10.0, 0.0),
                moving: true,
                crouching: true,
                sprinting: false,
            };
            profiler.update(1.0, (i + 1) as f32, Some(subject), Some(false));
        }
        assert!(profiler.prefers_stealth());
        assert_eq!(profiler.pattern_confidence(Pattern::StealthApproach), 1.0);
        assert!(!profiler.prefers_day_activity());
        assert_eq!(profiler.pattern_confidence(Pattern::ExplorationFocused), 1.0);
        assert!(profiler.exploration_radius() > 0.0);
    }

    #[test]
    fn test_clear_history() {
        let mut profiler = BehaviorProfiler::default();
        profiler.record_dangerous_encounter(true);
        profiler.record_location_visit("Store");
        profiler.clear_history();
        assert_eq!(profiler.counters().dangerous_encounters, 0);
        assert_eq!(profiler.pattern_confidence(Pattern::Cautious), 0.0);
        assert_eq!(profiler.preferred_location_type(), DEFAULT_LOCATION_TYPE);
    }
}
