//! Named behavior archetypes and their confidence accumulators

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pattern {
    AggressiveCombat,
    DefensiveCombat,
    StealthApproach,
    RushApproach,
    ResourceConservative,
    ResourceLiberal,
    ExplorationFocused,
    CombatFocused,
    DayActive,
    NightActive,
    RiskTaker,
    Cautious,
}

impl Pattern {
    pub const COUNT: usize = 12;

    pub const ALL: [Pattern; Pattern::COUNT] = [
        Pattern::AggressiveCombat,
        Pattern::DefensiveCombat,
        Pattern::StealthApproach,
        Pattern::RushApproach,
        Pattern::ResourceConservative,
        Pattern::ResourceLiberal,
        Pattern::ExplorationFocused,
        Pattern::CombatFocused,
        Pattern::DayActive,
        Pattern::NightActive,
        Pattern::RiskTaker,
        Pattern::Cautious,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pattern::AggressiveCombat => "AggressiveCombat",
            Pattern::DefensiveCombat => "DefensiveCombat",
            Pattern::StealthApproach => "StealthApproach",
            Pattern::RushApproach => "RushApproach",
            Pattern::ResourceConservative => "ResourceConservative",
            Pattern::ResourceLiberal => "ResourceLiberal",
            Pattern::ExplorationFocused => "ExplorationFocused",
            Pattern::CombatFocused => "CombatFocused",
            Pattern::DayActive => "DayActive",
            Pattern::NightActive => "NightActive",
            Pattern::RiskTaker => "RiskTaker",
            Pattern::Cautious => "Cautious",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pattern {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::ALL.into_iter().find(|p| p.name() == s).ok_or(())
    }
}

/// Un-clamped accumulators, clamped to [0, 1] on read
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternTable {
    values: [f32; Pattern::COUNT],
}

impl PatternTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, pattern: Pattern) -> f32 {
        self.values[pattern.slot()]
    }

    pub fn confidence(&self, pattern: Pattern) -> f32 {
        self.raw(pattern).clamp(0.0, 1.0)
    }

    /// Confidence by name; unknown names read as 0
    pub fn confidence_by_name(&self, name: &str) -> f32 {
        name.parse::<Pattern>()
            .map(|p| self.confidence(p))
            .unwrap_or(0.0)
    }

    pub fn add(&mut self, pattern: Pattern, amount: f32) {
        self.values[pattern.slot()] += amount;
    }

    pub fn set(&mut self, pattern: Pattern, value: f32) {
        self.values[pattern.slot()] = value;
    }

    /// Rescale a complementary pair to sum to 1 when the sum is positive
    pub fn normalize_pair(&mut self, a: Pattern, b: Pattern) {
        let total = self.raw(a) + self.raw(b);
        if total > 0.0 {
            self.values[a.slot()] /= total;
            self.values[b.slot()] /= total;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pattern, f32)> + '_ {
        Pattern::ALL.into_iter().map(|p| (p, self.confidence(p)))
    }

    pub fn reset(&mut self) {
        self.values = [0.0; Pattern::COUNT];
    }
}
