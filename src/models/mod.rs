// src/models/mod.rs

pub mod level;
pub mod progress;
pub mod question;
pub mod quiz_attempt;
pub mod user;
