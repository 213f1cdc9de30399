// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::dag::ResolutionStatus;

/// Errors reported by graph and node operations.
///
/// The first seven variants are user-facing and recoverable: the caller
/// referenced something that does not exist, already exists, or has already
/// settled. `NotifiedOfWaiting` and `DuplicateDependencyResolution` signal a
/// broken engine invariant; they cannot be triggered through the public API
/// and should be treated as bugs rather than application state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node \"{id}\" already exists")]
    NodeAlreadyExists { id: String },

    #[error("node \"{id}\" not found")]
    NodeNotFound { id: String },

    #[error("node \"{id}\" has been removed")]
    NodeDeleted { id: String },

    #[error("cannot connect node \"{id}\" to itself")]
    CannotConnectToSelf { id: String },

    #[error("connection from \"{from}\" to \"{to}\" already exists")]
    ConnectionAlreadyExists { from: String, to: String },

    #[error("connection from \"{from}\" to \"{to}\" does not exist")]
    ConnectionDoesNotExist { from: String, to: String },

    #[error("node \"{id}\" is already resolved as {existing}; cannot re-resolve as {requested}")]
    NodeResolutionAlreadySet {
        id: String,
        existing: ResolutionStatus,
        requested: ResolutionStatus,
    },

    #[error("node \"{id}\" was notified of dependency \"{dependency}\" while it is still waiting")]
    NotifiedOfWaiting { id: String, dependency: String },

    #[error("dependency \"{dependency}\" of node \"{id}\" was already settled")]
    DuplicateDependencyResolution { id: String, dependency: String },
}

pub type Result<T> = std::result::Result<T, GraphError>;
