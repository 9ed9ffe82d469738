// src/handlers/mod.rs

pub mod auth;
pub mod check;
pub mod course;
pub mod progress;
