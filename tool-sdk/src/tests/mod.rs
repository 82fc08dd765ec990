//! Unit tests for the Tool SDK
//!
//! This module contains tests for the service clients and the error system.

pub mod error_tests;
pub mod sheets_mock_tests;
