//! querydesk - a query-builder client core.
//!
//! This library exposes the core modules for use by the binary and in
//! integration tests.

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod output;
pub mod persistence;
pub mod results;
