//! Adapters for the repository service port.

pub mod github;
pub mod memory;

pub use github::GitHubClient;
pub use memory::InMemoryRepositoryService;
