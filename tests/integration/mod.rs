//! Integration tests for querydesk.

pub mod api_test;
pub mod cli_test;
pub mod persistence_test;
pub mod workspace_test;
