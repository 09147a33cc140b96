//! Dumpster Core - record model, storage and sync orchestration
//!
//! This crate owns everything about a sync that is independent of the
//! upstream API: the record shapes written to disk, the sharded record
//! store with its watermark document, and the tracker that drives one
//! invocation across resource kinds.

pub mod config;
pub mod error;
pub mod kind;
pub mod model;
pub mod secrets;
pub mod source;
pub mod state;
pub mod store;
pub mod tracker;

pub use config::{Config, GitHubConfig, OutputConfig};
pub use error::{Error, Result};
pub use kind::{KindSet, ResourceKind};
pub use model::{
    Actor, Comment, Discussion, DiscussionComment, DiscussionReply, Event, EventKind, Issue,
    Label, PullRequest, Record, Review, ReviewComment,
};
pub use secrets::{Secrets, TokenSource};
pub use source::{RecordSource, Repository, SourceError};
pub use state::SyncState;
pub use store::RecordStore;
pub use tracker::{SyncOptions, SyncReport, Tracker};
