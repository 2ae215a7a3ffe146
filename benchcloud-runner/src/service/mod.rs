//! Service layer
//!
//! Business logic executed on behalf of the lifecycle tracker.

mod retrieval;

pub use retrieval::{ResultRetriever, Retrieval};
