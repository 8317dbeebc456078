//! Shared test utilities for omnimed integration tests.
//!
//! This module provides:
//! - `TestHarness` with scripted capabilities that record every call
//! - Builders for pipeline settings and config files

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{CallLog, Script, TestHarness};
