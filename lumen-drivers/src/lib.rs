//! Sensor driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in lumen-core, written against the lumen-hal bus contract:
//!
//! - Ambient light sensors (BH1750 family)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod log;

pub mod sensor;
