//! Error types for inspection
//!
//! Failures are local to the row that produced them. [`MemberError`] is
//! captured into the cache and shown inline; the others are returned from
//! user-initiated operations only.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reading, writing, iterating or invoking a single member.
///
/// Cloned into the cache so the cause can be displayed for as long as the
/// entry exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemberError {
    #[error("read failed: {0}")]
    Read(String),
    #[error("iteration failed: {0}")]
    Iterate(String),
    #[error("write failed: {0}")]
    Write(String),
    #[error("member is read-only")]
    ReadOnly,
    #[error("member cannot be invoked")]
    NotInvocable,
    #[error("object no longer exists")]
    Destroyed,
}

/// Failure discovering type information for a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntrospectError {
    #[error("unknown type '{0}'")]
    UnknownType(String),
    #[error("unknown object #{0}")]
    UnknownObject(u64),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Failure applying a user edit or invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error("no node at {0}")]
    NoSuchNode(String),
    #[error("'{0}' is read-only")]
    ReadOnly(String),
    #[error(transparent)]
    Provider(#[from] MemberError),
}

/// Failure parsing a node path such as `player.items[2].hp`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty path")]
    Empty,
    #[error("path must start with a root name: '{0}'")]
    MissingRoot(String),
    #[error("empty segment in '{0}'")]
    EmptySegment(String),
    #[error("unclosed '[' in '{0}'")]
    Unclosed(String),
    #[error("invalid index '{0}'")]
    BadIndex(String),
}

/// Failure loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("page limit must be positive, got {0}")]
    InvalidPageLimit(usize),
}
