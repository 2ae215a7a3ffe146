//! Core domain types
//!
//! These types describe what is executed (runs and run sets), under which
//! limits, and what comes back from the service once a run has finished.
//! They are shared between the protocol client and the runner engine.

pub mod result;
pub mod run;
pub mod state;
