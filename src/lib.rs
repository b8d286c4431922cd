//! A single shared elevator car serving a facility with security-tiered floors.
//!
//! Callers on independent threads request rides through [`ElevatorCore`]. The
//! core serializes whole rides (admission, travel and the access check at
//! arrival) and reports whether the caller's clearance allows exit at the
//! destination. Agent simulation and console output live in [`simulation`].

/* Modules */
pub mod access;
pub mod config;
pub mod elevator;
pub mod error;
pub mod shared;
pub mod simulation;


/* Re-exports */
pub use access::AccessPolicy;
pub use elevator::{CancelToken, Caller, ElevatorCore};
pub use error::{ConfigError, SimulationError, TransportError};
pub use shared::{ArrivalOutcome, CarPhase, CarSnapshot, ElevatorEvent, Floor, SecurityClearance};
