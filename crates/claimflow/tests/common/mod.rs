//! Shared test utilities for claimflow integration tests.
//!
//! This module provides:
//! - `TestHarness` for an isolated on-disk database per test
//! - Builders for stage definitions and invoice submissions

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
