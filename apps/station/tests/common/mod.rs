//! Common test utilities for station integration tests
//!
//! This module provides shared test infrastructure for integration tests,
//! including catalog fixtures, a fully wired station and failure-injecting
//! backend doubles.

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
