// src/utils/mod.rs

pub mod chunk;
pub mod markdown;
pub mod report;
pub mod scoring;
pub mod telegram;
