//! The durable cached record and its on-disk store.
//!
//! The cached record is the single unit of persistence:
//! `{ "checkSums": {path: int}, "dependencyGraph": {path: [path, ...]} }`
//! as one JSON file. It is created empty on first run (cache-miss is not an
//! error), read at the start of each build cycle, mutated in memory during
//! the cycle, and written back at the end. The checksum map and dependency
//! graph have no lifecycle of their own - they are views over the record.

use std::fs;
use std::path::PathBuf;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tsinc_graph::{DependencyGraph, SourceId};

use crate::{Error, Result};

/// The persisted `{checksums, dependencyGraph}` pair surviving across
/// build cycles.
///
/// Invariant: every path present in `dependency_graph` was, at some point,
/// submitted to the compiler. The record is monotonically merged - new
/// entries overwrite old ones for the same key, other keys are untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CachedRecord {
    /// Content checksum per tracked source, as of its last compilation.
    #[serde(rename = "checkSums", default)]
    pub check_sums: FxHashMap<SourceId, i32>,

    /// Forward import edges per compiled source. Older caches may predate
    /// this field, so absence deserializes as an empty graph.
    #[serde(rename = "dependencyGraph", default)]
    pub dependency_graph: DependencyGraph,
}

impl CachedRecord {
    /// Fold a completed cycle's results into the record.
    ///
    /// For every path in the work list the checksum is overwritten with the
    /// freshly computed one; the dependency graph absorbs the freshly
    /// resolved edges wholesale per file. Paths outside the work list keep
    /// their previous checksum and edges. Must be applied before `save`.
    pub fn merge(
        &mut self,
        work_list: &[SourceId],
        fresh_checksums: &FxHashMap<SourceId, i32>,
        fresh_edges: DependencyGraph,
    ) {
        for path in work_list {
            if let Some(sum) = fresh_checksums.get(path) {
                self.check_sums.insert(path.clone(), *sum);
            }
        }
        self.dependency_graph.merge(fresh_edges);
    }
}

/// Loads and persists the [`CachedRecord`] at a fixed path.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    /// Create a store backed by the given cache file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing cache file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Read the record from disk.
    ///
    /// A missing or corrupt file returns a fresh empty record: cache
    /// absence is normal and degrades to a full-rebuild-equivalent state,
    /// never a fatal error.
    pub fn load(&self) -> CachedRecord {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(path = %self.path.display(), %err, "cache is empty");
                return CachedRecord::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(err) => {
                debug!(path = %self.path.display(), %err, "cache is corrupt, starting fresh");
                CachedRecord::default()
            }
        }
    }

    /// Write the record to disk.
    ///
    /// Creates the parent directory if absent, writes to a temp file, and
    /// renames into place so a crash mid-write cannot corrupt the previous
    /// file. A failed write is surfaced as [`Error::CacheWrite`] - losing it
    /// silently would cause missed recompilation in later cycles.
    pub fn save(&self, record: &CachedRecord) -> Result<()> {
        let write = |path: &PathBuf| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let serialized = serde_json::to_string(record).map_err(std::io::Error::other)?;
            let temp_path = path.with_extension("json.tmp");
            fs::write(&temp_path, serialized)?;
            fs::rename(&temp_path, path)?;
            Ok(())
        };

        write(&self.path).map_err(|source| Error::CacheWrite {
            path: self.path.clone(),
            source,
        })
    }
}
