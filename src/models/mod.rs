// src/models/mod.rs

pub mod account;
pub mod check;
pub mod progress;
