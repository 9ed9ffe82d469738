// src/course/progress.rs

use serde::Serialize;

use crate::course::layout::{CourseLayout, Gate, LayoutError, ModuleSpec};

/// Clamps a raw percentage into [0, 100]. NaN counts as 0.
pub fn sanitize_percentage(percentage: f64) -> f64 {
    if percentage.is_nan() {
        0.0
    } else {
        percentage.clamp(0.0, 100.0)
    }
}

/// Maps a completion percentage onto the discrete course parts.
///
/// Built once from a validated [`CourseLayout`]. All queries are pure, so the
/// model is shared read-only across requests.
#[derive(Debug, Clone)]
pub struct ProgressModel {
    layout: CourseLayout,
    /// First part index of each module, in sequence order.
    starts: Vec<u32>,
    /// `thresholds[u]` is the percentage at which `u` parts count as done.
    thresholds: Vec<f64>,
}

/// Unlock state of one module at a given percentage.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleUnlock {
    pub id: u32,
    pub title: String,
    pub unlocked: bool,
    pub required_units: u32,
    pub tabs: Vec<bool>,
}

/// Full unlock report for a percentage.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnlockSnapshot {
    pub progress: f64,
    pub units_completed: u32,
    pub total_units: u32,
    pub completed: bool,
    pub modules: Vec<ModuleUnlock>,
}

/// Static description of one module's place in the course.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleOutline {
    pub id: u32,
    pub title: String,
    pub gate: Gate,
    pub start_unit: u32,
    pub required_units: u32,
    pub unlock_percentage: f64,
    pub tab_thresholds: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseOutline {
    pub total_units: u32,
    pub modules: Vec<ModuleOutline>,
}

impl ProgressModel {
    pub fn new(layout: CourseLayout) -> Result<Self, LayoutError> {
        layout.validate()?;

        let mut starts = Vec::with_capacity(layout.modules.len());
        let mut offset = 0;
        for module in &layout.modules {
            starts.push(offset);
            offset += module.units();
        }

        let total = offset;
        let thresholds = (0..=total)
            .map(|unit| (f64::from(unit) * 100.0 / f64::from(total)).round())
            .collect();

        Ok(Self {
            layout,
            starts,
            thresholds,
        })
    }

    pub fn layout(&self) -> &CourseLayout {
        &self.layout
    }

    /// T: number of parts across all counted modules.
    pub fn total_units(&self) -> u32 {
        (self.thresholds.len() - 1) as u32
    }

    /// `round(unit * 100 / T)`; units beyond T are treated as T.
    pub fn threshold_for_unit(&self, unit: u32) -> f64 {
        let index = unit.min(self.total_units()) as usize;
        self.thresholds[index]
    }

    /// Largest `u` whose threshold is at most the (sanitized) percentage.
    pub fn units_completed(&self, percentage: f64) -> u32 {
        let p = sanitize_percentage(percentage);
        // thresholds[0] == 0.0 <= p, so the partition point is at least 1.
        let passed = self.thresholds.partition_point(|threshold| *threshold <= p);
        (passed - 1) as u32
    }

    /// Smallest percentage at which `units` parts count as done.
    pub fn percentage_for_units(&self, units: u32) -> f64 {
        self.threshold_for_unit(units)
    }

    fn position(&self, module_id: u32) -> Option<(usize, &ModuleSpec)> {
        self.layout
            .modules
            .iter()
            .enumerate()
            .find(|(_, module)| module.id == module_id)
    }

    fn required_for(&self, index: usize, module: &ModuleSpec) -> u32 {
        let start = self.starts[index];
        match module.gate {
            Gate::Start => start,
            Gate::IntroFirst => (start + 1).min(self.total_units()),
            Gate::Appendix => self.total_units(),
        }
    }

    fn tab_threshold(&self, index: usize, module: &ModuleSpec, tab: u32) -> Option<u32> {
        if tab >= module.tabs {
            return None;
        }
        let required = self.required_for(index, module);
        Some(match module.gate {
            Gate::Appendix => required,
            _ => (self.starts[index] + tab).max(required),
        })
    }

    /// Parts that must be done before the module opens. `None` for unknown ids.
    pub fn required_units(&self, module_id: u32) -> Option<u32> {
        self.position(module_id)
            .map(|(index, module)| self.required_for(index, module))
    }

    pub fn is_module_unlocked(&self, module_id: u32, percentage: f64) -> bool {
        match self.required_units(module_id) {
            Some(required) => self.units_completed(percentage) >= required,
            None => false,
        }
    }

    /// Unknown modules and tab indices past the module's last tab are locked.
    pub fn is_tab_unlocked(&self, module_id: u32, tab: u32, percentage: f64) -> bool {
        let Some((index, module)) = self.position(module_id) else {
            return false;
        };
        match self.tab_threshold(index, module, tab) {
            Some(threshold) => self.units_completed(percentage) >= threshold,
            None => false,
        }
    }

    pub fn snapshot(&self, percentage: f64) -> UnlockSnapshot {
        let progress = sanitize_percentage(percentage);
        let done = self.units_completed(progress);

        let modules = self
            .layout
            .modules
            .iter()
            .enumerate()
            .map(|(index, module)| {
                let required = self.required_for(index, module);
                let tabs = (0..module.tabs)
                    .map(|tab| {
                        self.tab_threshold(index, module, tab)
                            .is_some_and(|threshold| done >= threshold)
                    })
                    .collect();
                ModuleUnlock {
                    id: module.id,
                    title: module.title.clone(),
                    unlocked: done >= required,
                    required_units: required,
                    tabs,
                }
            })
            .collect();

        UnlockSnapshot {
            progress,
            units_completed: done,
            total_units: self.total_units(),
            completed: done == self.total_units(),
            modules,
        }
    }

    pub fn outline(&self) -> CourseOutline {
        let modules = self
            .layout
            .modules
            .iter()
            .enumerate()
            .map(|(index, module)| {
                let required = self.required_for(index, module);
                ModuleOutline {
                    id: module.id,
                    title: module.title.clone(),
                    gate: module.gate,
                    start_unit: self.starts[index],
                    required_units: required,
                    unlock_percentage: self.percentage_for_units(required),
                    tab_thresholds: (0..module.tabs)
                        .filter_map(|tab| self.tab_threshold(index, module, tab))
                        .collect(),
                }
            })
            .collect();

        CourseOutline {
            total_units: self.total_units(),
            modules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Five modules of twenty parts plus an appendix.
    fn even_model() -> ProgressModel {
        let mut modules: Vec<ModuleSpec> = (1..=5)
            .map(|id| ModuleSpec::new(id, format!("Module {}", id), 20, Gate::Start))
            .collect();
        modules.push(ModuleSpec::new(6, "Appendix", 2, Gate::Appendix));
        ProgressModel::new(CourseLayout { modules }).unwrap()
    }

    fn default_model() -> ProgressModel {
        ProgressModel::new(CourseLayout::default_course()).unwrap()
    }

    #[test]
    fn endpoints_map_to_zero_and_total() {
        for model in [even_model(), default_model()] {
            assert_eq!(model.units_completed(0.0), 0);
            assert_eq!(model.units_completed(100.0), model.total_units());
        }
    }

    #[test]
    fn units_completed_is_monotonic() {
        let model = default_model();
        let mut previous = 0;
        for step in 0..=10_000 {
            let p = f64::from(step) / 100.0;
            let units = model.units_completed(p);
            assert!(units >= previous, "dropped at {}", p);
            previous = units;
        }
    }

    #[test]
    fn out_of_range_and_nan_are_clamped() {
        let model = even_model();
        assert_eq!(model.units_completed(-5.0), 0);
        assert_eq!(model.units_completed(f64::NAN), 0);
        assert_eq!(model.units_completed(250.0), 100);
        assert_eq!(model.units_completed(f64::INFINITY), 100);
        assert_eq!(model.units_completed(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn rounding_reaches_the_top_before_literal_hundred() {
        // T = 300: round(299 * 100 / 300) == 100, so 99.9 is not yet 299 units
        // but 100 reaches T.
        let model = ProgressModel::new(CourseLayout {
            modules: vec![ModuleSpec::new(1, "Long", 300, Gate::Start)],
        })
        .unwrap();
        assert_eq!(model.threshold_for_unit(299), 100.0);
        assert_eq!(model.units_completed(99.9), 298);
        assert_eq!(model.units_completed(100.0), 300);
    }

    #[test]
    fn modules_unlock_at_their_start_offset() {
        let model = even_model();
        assert!(model.is_module_unlocked(1, 0.0));
        assert!(model.is_module_unlocked(3, 40.0));
        assert!(!model.is_module_unlocked(4, 40.0));
        assert!(!model.is_module_unlocked(3, 39.0));
        assert!(model.is_module_unlocked(5, 80.0));
    }

    #[test]
    fn appendix_needs_full_completion() {
        for model in [even_model(), default_model()] {
            let appendix = model.layout().modules.last().unwrap().id;
            for step in 0..1000 {
                let p = f64::from(step) / 10.0;
                assert!(!model.is_module_unlocked(appendix, p), "open at {}", p);
                assert!(!model.is_tab_unlocked(appendix, 0, p));
            }
            assert!(model.is_module_unlocked(appendix, 100.0));
            assert!(model.is_tab_unlocked(appendix, 1, 100.0));
        }
    }

    #[test]
    fn intro_first_module_needs_one_extra_part() {
        let model = default_model();
        // Module 9 starts after modules 1-4 (48 parts).
        assert_eq!(model.required_units(9), Some(49));
        assert!(!model.is_module_unlocked(9, 48.0));
        assert!(model.is_module_unlocked(9, 49.0));
        // Its first tab never opens before the module itself.
        assert!(!model.is_tab_unlocked(9, 0, 48.0));
        assert!(model.is_tab_unlocked(9, 0, 49.0));
        assert!(model.is_tab_unlocked(9, 1, 49.0));
        assert!(!model.is_tab_unlocked(9, 2, 49.0));
    }

    #[test]
    fn tabs_open_one_part_at_a_time() {
        let model = even_model();
        assert!(model.is_tab_unlocked(2, 0, 20.0));
        assert!(!model.is_tab_unlocked(2, 1, 20.0));
        assert!(model.is_tab_unlocked(2, 1, 21.0));
        assert!(model.is_tab_unlocked(2, 19, 39.0));
        assert!(!model.is_tab_unlocked(2, 20, 100.0));
        assert!(!model.is_tab_unlocked(42, 0, 100.0));
    }

    #[test]
    fn unknown_modules_are_locked() {
        let model = even_model();
        assert_eq!(model.required_units(99), None);
        assert!(!model.is_module_unlocked(99, 100.0));
    }

    #[test]
    fn percentage_for_units_round_trips() {
        let model = default_model();
        for units in 0..=model.total_units() {
            let p = model.percentage_for_units(units);
            assert!(model.units_completed(p) >= units);
        }
    }

    #[test]
    fn snapshot_matches_single_queries() {
        let model = default_model();
        let snapshot = model.snapshot(37.2);
        assert_eq!(snapshot.units_completed, 37);
        assert_eq!(snapshot.total_units, 100);
        assert!(!snapshot.completed);
        for module in &snapshot.modules {
            assert_eq!(module.unlocked, model.is_module_unlocked(module.id, 37.2));
            for (tab, open) in module.tabs.iter().enumerate() {
                assert_eq!(*open, model.is_tab_unlocked(module.id, tab as u32, 37.2));
            }
        }
    }

    #[test]
    fn outline_lists_start_offsets_in_sequence() {
        let outline = default_model().outline();
        let starts: Vec<(u32, u32)> = outline
            .modules
            .iter()
            .map(|m| (m.id, m.start_unit))
            .collect();
        assert_eq!(
            starts,
            vec![
                (1, 0),
                (2, 12),
                (3, 24),
                (4, 36),
                (9, 48),
                (5, 52),
                (6, 64),
                (7, 76),
                (8, 88),
                (10, 100)
            ]
        );
        assert_eq!(outline.modules[9].unlock_percentage, 100.0);
    }
}
