// src/course/layout.rs

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Rule deciding when a module opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    /// Opens as soon as every earlier module's parts are done.
    #[default]
    Start,
    /// Needs one completed part beyond its start offset.
    IntroFirst,
    /// Opens only at full completion. Its tabs do not count as course parts.
    Appendix,
}

/// One course chapter. Every tab is one content part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSpec {
    pub id: u32,
    pub title: String,
    pub tabs: u32,
    #[serde(default)]
    pub gate: Gate,
}

impl ModuleSpec {
    pub fn new(id: u32, title: impl Into<String>, tabs: u32, gate: Gate) -> Self {
        Self {
            id,
            title: title.into(),
            tabs,
            gate,
        }
    }

    /// Number of parts this module contributes to the course total.
    pub fn units(&self) -> u32 {
        match self.gate {
            Gate::Appendix => 0,
            _ => self.tabs,
        }
    }
}

/// Ordered module sequence of the course.
/// The order of `modules` is the unlock order, not the id order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseLayout {
    pub modules: Vec<ModuleSpec>,
}

#[derive(Debug)]
pub enum LayoutError {
    Empty,
    NoParts,
    DuplicateModule(u32),
    EmptyModule(u32),
    FirstModuleGated(u32),
    AppendixNotLast(u32),
    SecondIntroFirst(u32),
    Io(String),
    Parse(String),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Empty => write!(f, "course layout has no modules"),
            LayoutError::NoParts => write!(f, "course layout has no countable parts"),
            LayoutError::DuplicateModule(id) => write!(f, "module {} is listed twice", id),
            LayoutError::EmptyModule(id) => write!(f, "module {} has no tabs", id),
            LayoutError::FirstModuleGated(id) => {
                write!(f, "first module {} must open at 0%", id)
            }
            LayoutError::AppendixNotLast(id) => {
                write!(f, "appendix module {} must be the last module", id)
            }
            LayoutError::SecondIntroFirst(id) => {
                write!(f, "module {} is a second intro-first module", id)
            }
            LayoutError::Io(msg) => write!(f, "failed to read course layout: {}", msg),
            LayoutError::Parse(msg) => write!(f, "failed to parse course layout: {}", msg),
        }
    }
}

impl std::error::Error for LayoutError {}

impl CourseLayout {
    /// The layout shipped with the course: eight regular modules of twelve
    /// tabs, the mini mock test (module 9) between modules 4 and 5, and a
    /// trailing appendix. That gives exactly 100 parts.
    pub fn default_course() -> Self {
        let regular = |id: u32| ModuleSpec::new(id, format!("Module {}", id), 12, Gate::Start);

        let mut modules: Vec<ModuleSpec> = (1..=4).map(regular).collect();
        modules.push(ModuleSpec::new(9, "Mini mock test", 4, Gate::IntroFirst));
        modules.extend((5..=8).map(regular));
        modules.push(ModuleSpec::new(10, "Appendix", 3, Gate::Appendix));

        Self { modules }
    }

    /// Loads a layout from a JSON file of the shape `{"modules": [...]}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let raw =
            std::fs::read_to_string(path.as_ref()).map_err(|e| LayoutError::Io(e.to_string()))?;
        let layout: CourseLayout =
            serde_json::from_str(&raw).map_err(|e| LayoutError::Parse(e.to_string()))?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn total_units(&self) -> u32 {
        self.modules.iter().map(ModuleSpec::units).sum()
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let first = self.modules.first().ok_or(LayoutError::Empty)?;
        if first.gate != Gate::Start {
            return Err(LayoutError::FirstModuleGated(first.id));
        }

        let mut seen = HashSet::new();
        let mut intro_first = false;
        let last_index = self.modules.len() - 1;
        for (index, module) in self.modules.iter().enumerate() {
            if !seen.insert(module.id) {
                return Err(LayoutError::DuplicateModule(module.id));
            }
            if module.tabs == 0 {
                return Err(LayoutError::EmptyModule(module.id));
            }
            if module.gate == Gate::Appendix && index != last_index {
                return Err(LayoutError::AppendixNotLast(module.id));
            }
            if module.gate == Gate::IntroFirst {
                if intro_first {
                    return Err(LayoutError::SecondIntroFirst(module.id));
                }
                intro_first = true;
            }
        }

        if self.total_units() == 0 {
            return Err(LayoutError::NoParts);
        }
        Ok(())
    }
}
