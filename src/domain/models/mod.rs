pub mod config;
pub mod finding;
pub mod policy;
pub mod refs;
pub mod remote;
pub mod report;
pub mod severity;
pub mod verdict;

pub use config::{Config, GitHubConfig, LoggingConfig, PolicySettings};
pub use finding::{age_in_days, Finding};
pub use policy::{
    FreshnessInput, FreshnessPolicy, PolicyConfig, PolicyInput, PropertyInput, PropertyPolicy,
    RefMode, RepoCoordinates, Visibility,
};
pub use refs::{pull_head_ref, pull_merge_ref, RefPlan};
pub use remote::{
    AlertQuery, AnalysisQuery, CommentAuthor, IssueComment, Page, PageCursor, RawAlert,
    RawAnalysis,
};
pub use report::Report;
pub use severity::Severity;
pub use verdict::{GateOutcome, GateRun, Verdict};
