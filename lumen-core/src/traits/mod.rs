//! Hardware abstraction traits
//!
//! These traits define the interface between application logic and
//! sensor driver implementations.

pub mod light;

pub use light::{LightSensor, SensorError};
