//! Utility functions and data structures.
//!
//! This module provides shared utilities used throughout lix:
//!
//! ## Modules
//!
//! - [`layout`] - Index directory placement under the app data directory (XDG-compliant)
//! - [`progress`] - Progress bar that compiles to a no-op without the `progress` feature

pub mod layout;
pub mod progress;

pub use layout::*;
