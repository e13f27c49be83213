//! Policy gates composed from the retrieval, verdict and report services.

pub mod code_scanning;
pub mod freshness;
pub mod required_property;

pub use code_scanning::CodeScanningGate;
pub use freshness::FreshnessGate;
pub use required_property::{check_maintainers, RequiredPropertyGate};
