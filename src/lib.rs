//! Trip computer library: testable logic for the fuel consumption firmware.
//!
//! This library contains everything between the pins and the pixels that can
//! be tested on the host machine. The binary (`main.rs`) adds the RP2350
//! peripherals, the SH1107 driver and the embassy tasks.
//!
//! # Data Flow
//!
//! ```text
//! edges -> capture -> aggregate -> ledger ------------> readout -+
//!                                                                 +-> screens
//! sensors, fuel -> classify -> presentation -> alarm ------------+
//! ```
//!
//! [`orchestrator::TripComputer`] owns every stage and runs them once per tick.
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test --lib --target x86_64-unknown-linux-gnu
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the actual firmware runs as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

// Logging macros must come first so every module sees them.
#[macro_use]
mod fmt;

// Configuration
pub mod config;

// Measurement
pub mod aggregate;
pub mod capture;
pub mod fuel;
pub mod time;

// Conditions and alerting
pub mod alarm;
pub mod classify;
pub mod conditions;
pub mod presentation;

// Persistence
pub mod ledger;
pub mod storage;

// Rendering
pub mod readout;
pub mod screens;
pub mod styles;

// Board seams and the tick loop
pub mod error;
pub mod hal;
pub mod orchestrator;
