//! Loadout stat modifiers (trinkets and items) feeding the timing inputs.
//!
//! Gear effects are collected per target stat into a [`ModifierStack`]:
//! additive effects are summed onto the base value first, then every
//! multiplicative effect scales the result by `1 + value`. Multiplicative
//! effects compound, so two +25% effects yield ×1.5625 rather than ×1.5.
//!
//! Items may also be timed, boosting only the first seconds of a repair, and
//! a loadout can carry head starts that remove machine progress up front.
//! [`Loadout::run_machine`] combines both into a phased machine run.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::inputs::{ModelError, ModelInputs};
use crate::timing::{MachineRun, StatPhase, TimingModel, cascade};

/// Model input a gear effect can adjust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetStat {
    ExtractionSpeed,
    SkillCheckChance,
    /// Bonus units granted by a successful skill check.
    SkillCheckAmount,
    /// Movement, stealth, stamina and the like; irrelevant to machine timing.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationType {
    Additive,
    Multiplicative,
}

/// A single effect as listed on a trinket or item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatEffect {
    pub target_stat: TargetStat,
    pub application_type: ApplicationType,
    pub value: f64,
    /// Ceiling on the final stacked stat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap: Option<f64>,
}

impl StatEffect {
    #[must_use]
    pub const fn new(
        target_stat: TargetStat,
        application_type: ApplicationType,
        value: f64,
    ) -> Self {
        Self {
            target_stat,
            application_type,
            value,
            cap: None,
        }
    }

    #[must_use]
    pub const fn with_cap(mut self, cap: f64) -> Self {
        self.cap = Some(cap);
        self
    }
}

/// Accumulated modifiers for one stat.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModifierStack {
    additive: f64,
    multiplicative: SmallVec<[f64; 4]>,
    cap: Option<f64>,
}

impl ModifierStack {
    /// Add one effect. When several effects carry a cap the lowest wins.
    pub fn push(&mut self, effect: &StatEffect) {
        match effect.application_type {
            ApplicationType::Additive => self.additive += effect.value,
            ApplicationType::Multiplicative => self.multiplicative.push(effect.value),
        }
        if let Some(cap) = effect.cap {
            self.cap = Some(self.cap.map_or(cap, |current| current.min(cap)));
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.additive == 0.0 && self.multiplicative.is_empty() && self.cap.is_none()
    }

    /// Compounded multiplier `Π(1 + mᵢ)`.
    #[must_use]
    pub fn multiplier(&self) -> f64 {
        self.multiplicative
            .iter()
            .fold(1.0, |acc, value| acc * (1.0 + value))
    }

    /// `(base + additive) · Π(1 + mᵢ)`, limited by the cap if one is set.
    #[must_use]
    pub fn apply(&self, base: f64) -> f64 {
        let value = (base + self.additive) * self.multiplier();
        self.cap.map_or(value, |cap| value.min(cap))
    }
}

const fn default_count() -> u32 {
    1
}

/// A trinket or item together with how many copies are carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadoutEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub effects: Vec<StatEffect>,
    /// Seconds the effects last once repairs start. Missing or non-positive
    /// means they last the whole machine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl LoadoutEntry {
    #[must_use]
    pub fn new(name: &str, effects: Vec<StatEffect>) -> Self {
        Self {
            name: name.to_string(),
            count: default_count(),
            effects,
            duration: None,
        }
    }

    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    #[must_use]
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Expiry time for a carried, timed entry.
    fn expires_at(&self) -> Option<f64> {
        self.duration.filter(|seconds| *seconds > 0.0 && self.count > 0)
    }

    /// Still active in a window that ends at `time`.
    fn active_until(&self, time: f64) -> bool {
        self.expires_at().is_none_or(|expiry| expiry >= time)
    }
}

/// Progress removed from a machine before repairs begin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HeadStart {
    /// Each copy completes `fraction` of the whole machine; copies add up and
    /// reaching the whole machine completes it outright.
    PerCopy { fraction: f64, count: u32 },
    /// Completes `fraction` of whatever is left.
    Percentage { fraction: f64 },
    /// Removes a flat number of units, never below zero.
    FlatUnits { units: f64 },
}

/// Everything a character carries into a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Loadout {
    #[serde(default)]
    pub trinkets: Vec<LoadoutEntry>,
    #[serde(default)]
    pub items: Vec<LoadoutEntry>,
    #[serde(default)]
    pub head_starts: Vec<HeadStart>,
}

impl Loadout {
    /// Parse a loadout from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Collect every effect targeting `stat`, repeating items by their count.
    #[must_use]
    pub fn stack_for(&self, stat: TargetStat) -> ModifierStack {
        self.stack_where(stat, |_| true)
    }

    fn stack_where(
        &self,
        stat: TargetStat,
        active: impl Fn(&LoadoutEntry) -> bool,
    ) -> ModifierStack {
        let mut stack = ModifierStack::default();
        for entry in self.trinkets.iter().chain(&self.items).filter(|entry| active(*entry)) {
            for effect in entry.effects.iter().filter(|e| e.target_stat == stat) {
                for _ in 0..entry.count {
                    stack.push(effect);
                }
            }
        }
        stack
    }

    /// Apply the loadout to `base` and validate the adjusted inputs.
    ///
    /// Chances are not clamped: gear pushing `skill_check_chance` outside
    /// `[0, 1]` is a configuration error.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] when the adjusted inputs fail
    /// validation.
    pub fn apply(&self, base: &ModelInputs) -> Result<ModelInputs, ModelError> {
        self.apply_where(base, |_| true)
    }

    fn apply_where(
        &self,
        base: &ModelInputs,
        active: impl Fn(&LoadoutEntry) -> bool,
    ) -> Result<ModelInputs, ModelError> {
        let speed = self.stack_where(TargetStat::ExtractionSpeed, &active);
        let chance = self.stack_where(TargetStat::SkillCheckChance, &active);
        let amount = self.stack_where(TargetStat::SkillCheckAmount, &active);
        if speed.is_empty() && chance.is_empty() && amount.is_empty() {
            base.validate()?;
            return Ok(*base);
        }

        let adjusted = base
            .with_extraction_speed(speed.apply(base.extraction_speed))
            .with_skill_check_chance(chance.apply(base.skill_check_chance))
            .with_skill_check_units(amount.apply(base.skill_check_units));
        log::debug!(
            "loadout adjusted U {:.4} -> {:.4}, p {:.4} -> {:.4}, S {:.4} -> {:.4}",
            base.extraction_speed,
            adjusted.extraction_speed,
            base.skill_check_chance,
            adjusted.skill_check_chance,
            base.skill_check_units,
            adjusted.skill_check_units,
        );

        adjusted.validate()?;
        Ok(adjusted)
    }

    /// Units left on a machine of `total_units` once head starts are used.
    ///
    /// Per-copy completions are summed and capped at the whole machine, then
    /// percentages apply to what is left, then flat reductions. Fractions are
    /// clamped to `[0, 1]`.
    #[must_use]
    pub fn remaining_units(&self, total_units: f64) -> f64 {
        let mut per_copy = 0.0;
        let mut keep = 1.0;
        let mut flat = 0.0;
        for head_start in &self.head_starts {
            match *head_start {
                HeadStart::PerCopy { fraction, count } => {
                    per_copy += fraction.clamp(0.0, 1.0) * f64::from(count);
                }
                HeadStart::Percentage { fraction } => keep *= 1.0 - fraction.clamp(0.0, 1.0),
                HeadStart::FlatUnits { units } => flat += units.max(0.0),
            }
        }
        let after_copies = total_units * (1.0 - per_copy.min(1.0));
        (after_copies * keep - flat).max(0.0)
    }

    /// Split a repair into phases at each timed entry's expiry.
    ///
    /// Each phase carries the inputs adjusted by the entries still active at
    /// its end; the returned final inputs use only untimed entries.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] when any phase's adjusted
    /// inputs fail validation.
    pub fn phases(
        &self,
        base: &ModelInputs,
    ) -> Result<(Vec<StatPhase>, ModelInputs), ModelError> {
        let mut expiries: Vec<f64> = self
            .trinkets
            .iter()
            .chain(&self.items)
            .filter_map(LoadoutEntry::expires_at)
            .collect();
        expiries.sort_by(f64::total_cmp);
        expiries.dedup();

        let phases = expiries
            .into_iter()
            .map(|ends_at| {
                let inputs = self.apply_where(base, |entry| entry.active_until(ends_at))?;
                Ok(StatPhase { ends_at, inputs })
            })
            .collect::<Result<Vec<_>, ModelError>>()?;
        let final_inputs = self.apply_where(base, |entry| entry.expires_at().is_none())?;
        Ok((phases, final_inputs))
    }

    /// Expected repair of one machine with this loadout: head starts first,
    /// then timed phases, then the untimed stats until completion.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] when `base` or any adjusted
    /// inputs fail validation.
    pub fn run_machine(
        &self,
        model: TimingModel,
        base: &ModelInputs,
    ) -> Result<MachineRun, ModelError> {
        let units = self.remaining_units(base.total_units);
        let (phases, final_inputs) = self.phases(base)?;
        log::debug!(
            "{model} machine: {units:.3} of {:.3} units after head starts, {} timed phases",
            base.total_units,
            phases.len()
        );
        cascade(model, &phases, &final_inputs, units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(
        target_stat: TargetStat,
        application_type: ApplicationType,
        value: f64,
    ) -> StatEffect {
        StatEffect::new(target_stat, application_type, value)
    }

    #[test]
    fn multiplicative_effects_compound() {
        let mut stack = ModifierStack::default();
        let candy = effect(TargetStat::ExtractionSpeed, ApplicationType::Multiplicative, 0.25);
        stack.push(&candy);
        stack.push(&candy);
        assert!((stack.apply(10.0) - 15.625).abs() < 1e-12);
    }

    #[test]
    fn additive_applies_before_multiplier() {
        let mut stack = ModifierStack::default();
        stack.push(&effect(TargetStat::SkillCheckAmount, ApplicationType::Additive, 40.0));
        assert!((stack.apply(100.0) - 140.0).abs() < 1e-12);
        stack.push(&effect(TargetStat::SkillCheckAmount, ApplicationType::Multiplicative, 0.5));
        assert!((stack.apply(100.0) - 210.0).abs() < 1e-12);
    }

    #[test]
    fn empty_stack_is_identity() {
        let stack = ModifierStack::default();
        assert!(stack.is_empty());
        assert!((stack.apply(1.25) - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn item_counts_repeat_effects() {
        let loadout = Loadout {
            items: vec![
                LoadoutEntry::new(
                    "speed candy",
                    vec![effect(
                        TargetStat::ExtractionSpeed,
                        ApplicationType::Multiplicative,
                        0.25,
                    )],
                )
                .with_count(2),
                LoadoutEntry::new(
                    "unused",
                    vec![effect(TargetStat::ExtractionSpeed, ApplicationType::Additive, 5.0)],
                )
                .with_count(0),
            ],
            ..Loadout::default()
        };
        let stack = loadout.stack_for(TargetStat::ExtractionSpeed);
        assert!((stack.apply(10.0) - 15.625).abs() < 1e-12);
    }

    #[test]
    fn cap_limits_the_stacked_value() {
        let mut stack = ModifierStack::default();
        let boost = effect(TargetStat::SkillCheckChance, ApplicationType::Multiplicative, 1.0);
        stack.push(&boost.with_cap(0.5));
        assert!(!stack.is_empty());
        assert!((stack.apply(0.2) - 0.4).abs() < 1e-12);
        assert!((stack.apply(0.4) - 0.5).abs() < 1e-12);
        stack.push(&boost.with_cap(0.6));
        assert!((stack.apply(0.4) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn capped_effect_parses_from_json() {
        let parsed: StatEffect = serde_json::from_str(
            r#"{"targetStat": "skillCheckChance", "applicationType": "multiplicative", "value": 0.5, "cap": 0.3}"#,
        )
        .unwrap();
        assert_eq!(parsed.cap, Some(0.3));
    }

    #[test]
    fn loadout_without_relevant_effects_returns_base() {
        let loadout = Loadout {
            trinkets: vec![LoadoutEntry::new(
                "dog plush",
                vec![effect(TargetStat::Other, ApplicationType::Multiplicative, 0.1)],
            )],
            ..Loadout::default()
        };
        let base = ModelInputs::new(1.0, 0.25, 3.0);
        assert_eq!(loadout.apply(&base).unwrap(), base);
        let err = loadout.apply(&base.with_total_units(-1.0)).unwrap_err();
        assert_eq!(err.field(), "total_units");
    }

    #[test]
    fn head_starts_reduce_units_in_order() {
        let loadout = Loadout {
            head_starts: vec![
                HeadStart::FlatUnits { units: 15.0 },
                HeadStart::Percentage { fraction: 0.1 },
                HeadStart::PerCopy {
                    fraction: 0.33,
                    count: 1,
                },
            ],
            ..Loadout::default()
        };
        let expected = 45.0 * 0.67 * 0.9 - 15.0;
        assert!((loadout.remaining_units(45.0) - expected).abs() < 1e-9);

        let flat_only = Loadout {
            head_starts: vec![HeadStart::FlatUnits { units: 60.0 }],
            ..Loadout::default()
        };
        assert!(flat_only.remaining_units(45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn enough_copies_complete_the_machine() {
        let loadout = Loadout {
            head_starts: vec![HeadStart::PerCopy {
                fraction: 0.33,
                count: 4,
            }],
            ..Loadout::default()
        };
        assert!(loadout.remaining_units(45.0).abs() < f64::EPSILON);
        let run = loadout
            .run_machine(TimingModel::Continuous, &ModelInputs::new(1.0, 0.25, 3.0))
            .unwrap();
        assert!(run.is_instant());
        assert!(run.average_time.abs() < f64::EPSILON);
    }

    #[test]
    fn timed_items_split_the_repair_into_phases() {
        let candy = |name: &str, seconds: f64| {
            LoadoutEntry::new(
                name,
                vec![effect(TargetStat::ExtractionSpeed, ApplicationType::Multiplicative, 0.5)],
            )
            .with_duration(seconds)
        };
        let loadout = Loadout {
            items: vec![candy("long", 10.0), candy("short", 5.0), candy("again", 5.0)],
            trinkets: vec![LoadoutEntry::new(
                "toolbelt",
                vec![effect(TargetStat::ExtractionSpeed, ApplicationType::Additive, 0.5)],
            )],
            ..Loadout::default()
        };
        let base = ModelInputs::new(1.0, 0.25, 3.0);
        let (phases, final_inputs) = loadout.phases(&base).unwrap();

        assert_eq!(phases.len(), 2);
        assert!((phases[0].ends_at - 5.0).abs() < f64::EPSILON);
        assert!((phases[0].inputs.extraction_speed - 1.5 * 1.5_f64.powi(3)).abs() < 1e-12);
        assert!((phases[1].ends_at - 10.0).abs() < f64::EPSILON);
        assert!((phases[1].inputs.extraction_speed - 2.25).abs() < 1e-12);
        assert!((final_inputs.extraction_speed - 1.5).abs() < 1e-12);

        let run = loadout.run_machine(TimingModel::Discrete, &base).unwrap();
        let untimed = TimingModel::Discrete.evaluate(&final_inputs).unwrap();
        assert_eq!(run.steps.len(), 2);
        assert!(run.average_time < untimed.average_time);
    }

    #[test]
    fn unknown_stats_deserialize_as_other() {
        let parsed: StatEffect = serde_json::from_str(
            r#"{"targetStat": "walkSpeed", "applicationType": "multiplicative", "value": 0.1}"#,
        )
        .unwrap();
        assert_eq!(parsed.target_stat, TargetStat::Other);
    }
}
