// src/course/mod.rs

//! Pure course logic: answer tables, answer checking, writing rubrics and the
//! progress-to-unlock model. Nothing in here touches the database or the clock.

pub mod answers;
pub mod checker;
pub mod layout;
pub mod progress;
pub mod writing;

pub use checker::CheckError;
pub use layout::{CourseLayout, Gate, LayoutError, ModuleSpec};
pub use progress::ProgressModel;
