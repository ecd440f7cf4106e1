//! Storage backends.
//!
//! - [`traits`]: the [`LocalStore`] and [`RemoteStore`] seams the engine calls through
//! - [`memory`]: in-memory implementations of both (tests, embedding, dry runs)
//! - [`github`]: GitHub contents API as a [`RemoteStore`]

pub mod traits;
pub mod memory;
pub mod github;

pub use traits::{LocalStore, RemoteArtifact, RemoteStore, Revision, RootFolder, StoreError};
pub use memory::{InMemoryBookmarkStore, InMemoryRemoteStore};
pub use github::GitHubContentsStore;
