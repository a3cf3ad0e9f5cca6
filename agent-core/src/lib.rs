//! Agent Core - Hardware-independent logic for the ESP32 health agent
//!
//! This crate contains the update session state machine, scheduler gating,
//! telemetry record and error taxonomy, all of which can be tested on the
//! host platform without requiring ESP32 hardware. The firmware binary at
//! the repository root supplies the platform collaborators (WiFi, HTTP
//! transport, flash slot) behind the traits defined here.

pub mod config;
pub mod error;
pub mod scheduler;
pub mod session;
pub mod telemetry;
