//! Test utilities for GraphFlow integration tests
//!
//! - TestFixture: catalog + in-memory graph + executor in one place
//! - graph_generator: deterministic chain and random graphs

#![allow(dead_code)]

pub mod graph_generator;
pub mod test_fixture;

/// Route `log` output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
