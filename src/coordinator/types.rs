//! Public types for the sync engine coordinator.

use thiserror::Error;

use crate::config::ConfigError;
use crate::merge::MergeReport;
use crate::storage::traits::{Revision, StoreError};

/// Progress of the current sync cycle.
///
/// Broadcast on every transition. Use [`super::SyncEngine::phase()`] to read
/// it or [`super::SyncEngine::phase_receiver()`] to watch for changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No cycle has run yet
    Idle,
    /// Reading the remote structural snapshot
    FetchingRemote,
    /// Merging remote links into the local store
    Merging,
    /// Re-reading the local tree and rendering artifacts
    Rendering,
    /// Writing artifacts to the remote
    Pushing,
    /// Last cycle finished
    Complete,
    /// Last cycle aborted
    Failed,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::FetchingRemote => write!(f, "FetchingRemote"),
            Self::Merging => write!(f, "Merging"),
            Self::Rendering => write!(f, "Rendering"),
            Self::Pushing => write!(f, "Pushing"),
            Self::Complete => write!(f, "Complete"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// How a cycle treated the remote snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleMode {
    /// Remote snapshot absent or blank; local tree uploaded as is
    FirstSync,
    /// Remote snapshot merged into the local store before upload
    Merged,
    /// Remote snapshot unparseable; local tree overwrote it
    RemoteMalformed,
}

impl CycleMode {
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::FirstSync => "first_sync",
            Self::Merged => "merged",
            Self::RemoteMalformed => "remote_malformed",
        }
    }
}

impl std::fmt::Display for CycleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// One artifact written at the end of a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushedArtifact {
    pub name: String,
    pub revision: Revision,
}

/// Result of a successful cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub mode: CycleMode,
    /// Present only when the remote snapshot was merged
    pub merge: Option<MergeReport>,
    /// In write order
    pub artifacts: Vec<PushedArtifact>,
}

impl CycleReport {
    /// Links added locally by this cycle.
    #[must_use]
    pub fn added(&self) -> usize {
        self.merge.map_or(0, |m| m.added)
    }
}

impl std::fmt::Display for CycleReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.merge {
            Some(merge) => write!(f, "{} ({}), {} artifacts pushed", self.mode, merge, self.artifacts.len()),
            None => write!(f, "{}, {} artifacts pushed", self.mode, self.artifacts.len()),
        }
    }
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Remote file '{name}' is not a bookmark tree: {reason}")]
    MalformedRemote { name: String, reason: String },
    #[error("Failed to serialize bookmark tree: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SyncError {
    /// A remote write lost an optimistic-concurrency race.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_conflict())
    }
}
