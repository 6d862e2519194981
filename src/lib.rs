//! # Eos - EO Mini EV Charger Monitor
//!
//! A Rust monitoring daemon for the EO Mini EV charger. Charger state is
//! polled from the EO cloud API and projected into sensor entities (session
//! energy and session charging time) whose states are published to the
//! hosting platform after every poll cycle.
//!
//! ## Architecture
//!
//! The application follows a modular architecture with clear separation of concerns:
//!
//! - `config`: Configuration management and validation
//! - `logging`: Structured logging and tracing
//! - `cloud`: EO cloud API client and transport seam
//! - `snapshot`: Typed view of the polled live session document
//! - `coordinator`: Polling loop, snapshot ownership, sensor notification
//! - `sensor`: Sensor entities projecting snapshot fields into values
//! - `publish`: Observer contract for pushing sensor states outward

pub mod cloud;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod publish;
pub mod sensor;
pub mod snapshot;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::ChargerCoordinator;
pub use error::{EosError, Result};
