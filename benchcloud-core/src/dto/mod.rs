//! Data Transfer Objects for the cloud master protocol
//!
//! DTOs are immutable request values built from domain types right before
//! they are put on the wire.

pub mod submission;
