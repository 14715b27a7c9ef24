//! Common test utilities for tessera-secrets
//!
//! This module provides shared test infrastructure including:
//! - Constants for ARNs and names
//! - Builders for stacks, grantees and database targets
//! - Assertion helpers over synthesized templates

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod assertions;
pub mod builders;
pub mod constants;

pub use assertions::*;
pub use builders::*;
pub use constants::*;
