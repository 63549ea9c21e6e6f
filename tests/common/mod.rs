//! Common test utilities for report-sync integration tests

#[allow(dead_code)]
pub mod fixtures;
#[allow(dead_code)]
pub mod store;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use store::*;
