//! Posterframe - video poster-frame extraction tool
//!
//! This library crate exposes configuration loading for integration testing.
//! The extraction pipeline itself lives in `posterframe-av`.

pub mod config;
