//! Core abstractions for prompt construction

pub mod budget;
pub mod config;
pub mod error;
pub mod types;
