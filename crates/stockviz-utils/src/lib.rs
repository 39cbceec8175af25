//! Shared utilities for stockviz
//!
//! This crate provides common functionality used across the stockviz
//! workspace, currently the logging setup shared by binaries and tests.

pub mod logging;

pub use logging::{LogFormat, init_tracing, init_tracing_with};
