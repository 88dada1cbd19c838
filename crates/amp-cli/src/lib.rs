//! Host harness library for the Amplitude transformation CLI.

pub mod config;
pub mod logging;
pub mod runner;
