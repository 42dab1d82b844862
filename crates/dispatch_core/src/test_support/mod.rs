//! Shared test fixtures, used across this crate's unit and integration
//! tests. Grounded on `sim_core`'s `test_helpers.rs` (a single module of
//! cheap, deterministic builders every test file pulls from, rather than a
//! mocking framework).

pub mod fixtures;
