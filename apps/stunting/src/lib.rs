//! # Stunting Library
//!
//! This library exposes the stunting calculator modules for testing and
//! integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod api;
pub mod cli;
pub mod config;

pub use stunting_core;
