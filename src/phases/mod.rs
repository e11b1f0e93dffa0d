//! Stages of the migration pipeline.
//!
//! ## Overview
//!
//! A migration runs three phases over the inputs read at the boundary:
//! 1. Merge - Combine legacy sources into one configuration and infer defaults
//! 2. Deduplicate - Drop library values that repeat a default
//! 3. Group - Resolve API ownership, then minimise to explicit libraries and
//!    name overrides
//!
//! Each phase works on in-memory values only. The `orchestrator` chains them
//! and is what commands call.

pub mod dedup;
pub mod grouping;
pub mod merge;
pub mod orchestrator;

pub use dedup as phase2;
pub use grouping as phase3;
pub use merge as phase1;
