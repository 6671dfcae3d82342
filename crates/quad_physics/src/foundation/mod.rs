//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and operations
//! - Scalar intervals with configurable boundary semantics
//! - Fixed-capacity collections
//! - Logging utilities

pub mod math;
pub mod range;
pub mod collections;
pub mod logging;
