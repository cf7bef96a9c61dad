//! Integration tests for gamelog-rs
//!
//! These tests verify the interaction between multiple components
//! and test real system behavior without mocking.

pub mod buffer_tests;
pub mod facade_tests;
pub mod retention_tests;
