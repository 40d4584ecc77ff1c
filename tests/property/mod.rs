//! Property-based tests for the staging tree

mod determinism;
