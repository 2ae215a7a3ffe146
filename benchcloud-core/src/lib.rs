//! Benchcloud Core
//!
//! Core types and abstractions for submitting verification runs to a
//! remote execution service.
//!
//! This crate contains:
//! - Domain types: runs, run sets, limits, run state and parsed results
//! - DTOs: the submission request built once per run
//! - Option translation: tool options mapped onto protocol parameters

pub mod domain;
pub mod dto;
pub mod options;
