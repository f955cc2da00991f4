// src/models/mod.rs

pub mod result;
pub mod submission;
