//! Utility functions
//!
//! **Used by**: main.rs (operator message)

pub mod net;
