//! Integration tests for querydesk.
//!
//! API tests talk to a throwaway HTTP server on localhost; nothing here
//! needs network access beyond the loopback interface.
//!
//! Run with: `cargo test --test integration_tests`

mod integration;
