/*
 * Rules Module
 *
 * The rule table read by the flock every tick. Each rule has an on/off
 * toggle and a magnitude whose meaning depends on the rule (a coefficient,
 * not a physical unit). The UI writes these fields directly between ticks.
 *
 * The two clamp rules never switch clamping off: when they are disabled or
 * hold a value outside the sane band, a fixed fallback limit is used so the
 * simulation always stays bounded.
 */

use std::fmt;
use std::ops::{Index, IndexMut};

pub const FALLBACK_MAX_FORCE: f32 = 50.0;
pub const FALLBACK_MAX_VELOCITY: f32 = 100.0;

// Largest clamp limit accepted from the rule table
pub const MAX_CLAMP_LIMIT: f32 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    CenterOfMass,
    Density,
    Confine,
    AverageVelocity,
    Gravity,
    RandomNoise,
    MaxForce,
    MaxVelocity,
}

impl RuleKind {
    pub const COUNT: usize = 8;

    pub const ALL: [RuleKind; RuleKind::COUNT] = [
        RuleKind::CenterOfMass,
        RuleKind::Density,
        RuleKind::Confine,
        RuleKind::AverageVelocity,
        RuleKind::Gravity,
        RuleKind::RandomNoise,
        RuleKind::MaxForce,
        RuleKind::MaxVelocity,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    // Human readable label for panels and logs
    pub const fn label(self) -> &'static str {
        match self {
            RuleKind::CenterOfMass => "Center Of Mass",
            RuleKind::Density => "Density",
            RuleKind::Confine => "Confine",
            RuleKind::AverageVelocity => "Average Velocity",
            RuleKind::Gravity => "Gravity",
            RuleKind::RandomNoise => "Random Noise",
            RuleKind::MaxForce => "Maximum Force",
            RuleKind::MaxVelocity => "Maximum Speed",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleSetting {
    pub enabled: bool,
    pub magnitude: f32,
}

impl RuleSetting {
    pub const fn new(enabled: bool, magnitude: f32) -> Self {
        Self { enabled, magnitude }
    }

    pub const fn disabled() -> Self {
        Self::new(false, 0.0)
    }

    // Magnitude when enabled, None otherwise
    #[inline]
    pub fn active(&self) -> Option<f32> {
        self.enabled.then_some(self.magnitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rules {
    settings: [RuleSetting; RuleKind::COUNT],
}

impl Default for Rules {
    fn default() -> Self {
        let mut rules = Self::all_disabled();
        rules[RuleKind::CenterOfMass] = RuleSetting::new(true, 0.05);
        rules[RuleKind::Density] = RuleSetting::new(true, 0.05);
        rules[RuleKind::Confine] = RuleSetting::new(true, 1e4);
        rules[RuleKind::AverageVelocity] = RuleSetting::new(true, 0.02);
        rules[RuleKind::Gravity] = RuleSetting::new(false, 9.8);
        rules[RuleKind::RandomNoise] = RuleSetting::new(false, 1.0);
        rules[RuleKind::MaxForce] = RuleSetting::new(true, 10.0);
        rules[RuleKind::MaxVelocity] = RuleSetting::new(true, 60.0);
        rules
    }
}

impl Rules {
    pub const fn all_disabled() -> Self {
        Self {
            settings: [RuleSetting::disabled(); RuleKind::COUNT],
        }
    }

    // Builder style toggle, mostly for tests and presets
    pub fn with(mut self, kind: RuleKind, magnitude: f32) -> Self {
        self[kind] = RuleSetting::new(true, magnitude);
        self
    }

    #[inline]
    pub fn is_enabled(&self, kind: RuleKind) -> bool {
        self[kind].enabled
    }

    #[inline]
    pub fn magnitude(&self, kind: RuleKind) -> f32 {
        self[kind].magnitude
    }

    #[inline]
    pub fn active(&self, kind: RuleKind) -> Option<f32> {
        self[kind].active()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RuleKind, &RuleSetting)> {
        RuleKind::ALL.into_iter().zip(self.settings.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (RuleKind, &mut RuleSetting)> {
        RuleKind::ALL.into_iter().zip(self.settings.iter_mut())
    }

    // Effective force clamp for this tick
    pub fn max_force(&self) -> f32 {
        clamp_limit(self[RuleKind::MaxForce], FALLBACK_MAX_FORCE)
    }

    // Effective speed clamp for this tick
    pub fn max_velocity(&self) -> f32 {
        clamp_limit(self[RuleKind::MaxVelocity], FALLBACK_MAX_VELOCITY)
    }
}

fn clamp_limit(setting: RuleSetting, fallback: f32) -> f32 {
    match setting.active() {
        Some(limit) if limit.is_finite() && limit > 0.0 && limit <= MAX_CLAMP_LIMIT => limit,
        _ => fallback,
    }
}

impl Index<RuleKind> for Rules {
    type Output = RuleSetting;

    fn index(&self, kind: RuleKind) -> &RuleSetting {
        &self.settings[kind.index()]
    }
}

impl IndexMut<RuleKind> for Rules {
    fn index_mut(&mut self, kind: RuleKind) -> &mut RuleSetting {
        &mut self.settings[kind.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_index_their_own_slot() {
        for (i, kind) in RuleKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn rules_toggle_independently() {
        let mut rules = Rules::all_disabled();
        rules[RuleKind::Density].enabled = true;
        rules[RuleKind::Density].magnitude = 2.5;

        assert!(rules.is_enabled(RuleKind::Density));
        assert_eq!(rules.active(RuleKind::Density), Some(2.5));
        for kind in RuleKind::ALL.into_iter().filter(|&k| k != RuleKind::Density) {
            assert!(!rules.is_enabled(kind), "{kind} should still be off");
        }
    }

    #[test]
    fn clamp_rules_use_configured_value_in_band() {
        let rules = Rules::all_disabled()
            .with(RuleKind::MaxForce, 3.0)
            .with(RuleKind::MaxVelocity, 7.0);
        assert_eq!(rules.max_force(), 3.0);
        assert_eq!(rules.max_velocity(), 7.0);
    }

    #[test]
    fn clamp_rules_fall_back_when_disabled() {
        let rules = Rules::all_disabled();
        assert_eq!(rules.max_force(), FALLBACK_MAX_FORCE);
        assert_eq!(rules.max_velocity(), FALLBACK_MAX_VELOCITY);
    }

    #[test]
    fn clamp_rules_fall_back_when_out_of_band() {
        for bad in [0.0, -1.0, MAX_CLAMP_LIMIT * 2.0, f32::NAN, f32::INFINITY] {
            let rules = Rules::all_disabled()
                .with(RuleKind::MaxForce, bad)
                .with(RuleKind::MaxVelocity, bad);
            assert_eq!(rules.max_force(), FALLBACK_MAX_FORCE, "max force {bad}");
            assert_eq!(rules.max_velocity(), FALLBACK_MAX_VELOCITY, "max velocity {bad}");
        }
    }

    #[test]
    fn iter_mut_reaches_every_rule() {
        let mut rules = Rules::default();
        for (_, setting) in rules.iter_mut() {
            setting.enabled = false;
        }
        assert!(rules.iter().all(|(_, setting)| !setting.enabled));
    }
}
