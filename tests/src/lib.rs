//! Shared harness for the dashboard engine's integration tests.

pub mod fixtures;
pub mod mocks;
pub mod setup;
