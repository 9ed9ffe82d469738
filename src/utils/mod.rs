// src/utils/mod.rs

pub mod captcha;
pub mod hash;
pub mod mail;
pub mod session;
pub mod verification;
