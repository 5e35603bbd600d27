//! Error handling for the store layer

use std::fmt;

use mongodb::error::{Error as DriverError, ErrorKind};
use thiserror::Error;

/// Server code returned by `createUser` when the user exists.
pub const USER_EXISTS_CODE: i32 = 51003;
/// Server code `NamespaceExists`, returned by `create` for an existing collection.
pub const NAMESPACE_EXISTS_CODE: i32 = 48;
/// Server code `NamespaceNotFound`, e.g. listing indexes of a missing collection.
pub const NAMESPACE_NOT_FOUND_CODE: i32 = 26;

/// Kind of database artifact an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    User,
    Collection,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::User => "user",
            Self::Collection => "collection",
        };
        f.write_str(label)
    }
}

/// Errors raised by a [`crate::Store`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: ArtifactKind, name: String },

    #[error("database unreachable after {attempts} attempts")]
    Unavailable {
        attempts: usize,
        #[source]
        source: DriverError,
    },

    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl StoreError {
    pub fn already_exists(kind: ArtifactKind, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    /// Maps a driver error from creating `name`, turning the server's
    /// duplicate codes into [`StoreError::AlreadyExists`].
    pub fn from_create(err: DriverError, kind: ArtifactKind, name: &str) -> Self {
        match command_code(&err) {
            Some(USER_EXISTS_CODE | NAMESPACE_EXISTS_CODE) => Self::already_exists(kind, name),
            _ => Self::Driver(err),
        }
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Whether retrying the initial connection could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Driver(err) => is_transient_driver_error(err),
            Self::AlreadyExists { .. } | Self::Unavailable { .. } => false,
        }
    }
}

pub(crate) fn command_code(err: &DriverError) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Command(command) => Some(command.code),
        _ => None,
    }
}

/// Server selection, socket and pool-cleared failures clear up once the
/// server is accepting connections.
pub fn is_transient_driver_error(err: &DriverError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) | ErrorKind::ConnectionPoolCleared { .. }
    )
}
