//! Test utilities for integration and E2E tests.
//!
//! This crate provides shared utilities for tests that need a real
//! database, including an ephemeral MySQL container fixture.

pub mod mysql;

pub use mysql::MysqlContainer;
