//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Colour parsing
//! - Time management
//! - Logging utilities

pub mod math;
pub mod color;
pub mod time;
pub mod logging;
