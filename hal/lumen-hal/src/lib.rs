//! Lumen Hardware Abstraction Layer
//!
//! This crate defines the bus contract that sensor drivers are written
//! against, plus the adapters that implement it. Drivers never see the
//! transport; swapping the adapter is the only change needed to run the
//! same driver on real hardware or in a host test.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Drivers (lumen-drivers: Bh1750, ...)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumen-hal (this crate - BusAdapter)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  I2cAdapter   │       │    MockBus    │
//! │ (embedded-hal)│       │  (in memory)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`bus::BusAdapter`] - Register-addressed and raw transfers

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bus;
pub mod i2c;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export key items at crate root for convenience
pub use bus::{encode_value, BusAdapter, BusError, ByteOrder, Bytes, Error, RegisterValue};
pub use bus::MAX_TRANSFER;
pub use i2c::I2cAdapter;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockBus, Transaction};
