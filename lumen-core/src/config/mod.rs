//! Configuration types
//!
//! Board-agnostic configuration structures. Calibration is stored as
//! postcard binary data.

pub mod calibration;
pub mod types;

pub use calibration::*;
pub use types::*;
