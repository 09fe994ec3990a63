// src/services/mod.rs

pub mod history;
pub mod progression;
pub mod questions;
pub mod submission;
