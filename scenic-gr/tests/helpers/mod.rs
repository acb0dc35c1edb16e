//! Test Helper Utilities
//!
//! Shared utilities for testing scenic-gr

#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod stubs;

pub use fixtures::{fixture_detailed, fixture_mains, fixture_resolver, write_taxonomy_dir};
pub use stubs::{CountingSource, Reply, ScriptedCompletion};
