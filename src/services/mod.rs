pub mod finding_retriever;
pub mod gates;
pub mod ref_resolver;
pub mod report_manager;

pub use finding_retriever::FindingRetriever;
pub use gates::{CodeScanningGate, FreshnessGate, RequiredPropertyGate};
pub use ref_resolver::RefResolver;
pub use report_manager::ReportManager;
