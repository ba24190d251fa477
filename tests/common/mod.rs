// Each test crate uses a different subset of these helpers
#![allow(dead_code)]

//! Common test utilities for integration tests
//!
//! This module provides shared functionality including:
//! - Temporary file trees to shred
//! - Content checks for overwritten data

pub mod fixtures;
pub mod test_helpers;
