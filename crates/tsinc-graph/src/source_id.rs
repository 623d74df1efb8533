use std::borrow::Cow;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Canonical identifier for a tracked source file.
///
/// The identifier is an absolute, lexically-normalized filesystem path so we
/// can safely compare files originating from different user inputs (relative
/// vs absolute, `.` vs `..`, etc.). Every map in the cached record and the
/// dependency graph is keyed by `SourceId`; two spellings of the same path
/// must never produce two distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(PathBuf);

impl SourceId {
    /// Create a new source identifier from a filesystem path.
    ///
    /// Relative paths are resolved against the current working directory.
    /// When the file exists the canonical path (symlinks resolved) is used;
    /// a missing file falls back to the cleaned path so identifiers can be
    /// formed for not-yet-emitted outputs.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, SourceIdError> {
        let path = path.as_ref();

        if path.as_os_str().is_empty() {
            return Err(SourceIdError::EmptyPath);
        }

        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|source| SourceIdError::CurrentDir { source })?
                .join(path)
        };

        let cleaned = joined.clean();

        match std::fs::canonicalize(&cleaned) {
            Ok(canonical) => Ok(Self(canonical)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self(cleaned)),
            Err(err) => Err(SourceIdError::Canonicalization {
                path: cleaned,
                source: err,
            }),
        }
    }

    /// Returns the underlying path representation.
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Consume the identifier and return the owned path.
    pub fn into_path(self) -> PathBuf {
        self.0
    }

    /// Borrow the identifier as a string for logging/serialization.
    pub fn path_string(&self) -> Cow<'_, str> {
        self.0.to_string_lossy()
    }

    /// Rehydrate an identifier from a previously serialized cache entry.
    ///
    /// Serialized identifiers were normalized when first constructed, so no
    /// further cleaning is performed here.
    fn from_serialized_path(path: PathBuf) -> Self {
        Self(path)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_string())
    }
}

impl Serialize for SourceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.path_string())
    }
}

impl<'de> Deserialize<'de> for SourceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(SourceId::from_serialized_path(PathBuf::from(value)))
    }
}

/// Error type for `SourceId` construction failures.
#[derive(Debug, Error)]
pub enum SourceIdError {
    /// The provided path was empty.
    #[error("source id path is empty")]
    EmptyPath,

    /// Failed to resolve the current working directory for normalization.
    #[error("failed to resolve current directory: {source}")]
    CurrentDir {
        #[source]
        source: io::Error,
    },

    /// Canonicalization failed for reasons other than `NotFound`.
    #[error("failed to canonicalize path '{path}': {source}")]
    Canonicalization {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
