//! Port trait definitions (Hexagonal Architecture)
//!
//! - RepositoryService: code scanning, issue comment and property queries
//!   against the hosting service
//!
//! The decision engine only ever talks to the remote through this trait, so
//! gates can run against the GitHub adapter or an in-memory fake.

pub mod repository_service;

pub use repository_service::RepositoryService;
