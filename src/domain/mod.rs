//! Domain layer for policy gates
//!
//! Pure types and the port the decision engine talks to. Nothing in here
//! performs I/O.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{GateError, GateResult, RemoteError, RemoteResult};
