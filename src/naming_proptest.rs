//! Property-based tests for name derivation and version preference.
//!
//! These tests use proptest to generate API paths and verify that the
//! invariants the grouping resolver relies on hold for all of them.
