//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Simulation clock and stopwatch

pub mod math;
pub mod time;
