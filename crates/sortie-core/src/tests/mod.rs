//! Scenario-level tests.
//!
//! - `integration.rs`: End-to-end tick behaviour through the public API
//! - `determinism.rs`: Identical inputs give identical outputs, parallel or not
//! - `properties.rs`: Property-based invariants over random fleets
//! - `helpers.rs`: Scenario setup and factory functions

mod helpers;
