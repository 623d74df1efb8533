//! The build-cycle driver.
//!
//! One [`Scheduler`] instance is constructed by the host pipeline with all
//! configuration and collaborators; each build trigger calls
//! [`Scheduler::run_cycle`] with no parameters. A cycle is strictly
//! sequential: checksum every tracked source, load the cached record,
//! compute the work list, submit it to the compiler (driving dependency
//! graph construction as a side effect), merge and persist the record.
//!
//! The whole compute-and-persist sequence runs under one mutex, so a host
//! that exposes concurrent triggers still gets the load-mutate-save
//! atomicity the cache format assumes.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use tsinc_graph::{SourceId, checksum};

use crate::cache::{CacheStore, CachedRecord};
use crate::compiler::{CompilerService, Diagnostic, DiagnosticSeverity, ProgramHandle};
use crate::config::SchedulerConfig;
use crate::invalidate::compute_work_list;
use crate::resolve::{BundlerResolver, GraphBuilder, NativeResolver};
use crate::{Error, Result};

/// Structured result of one build cycle.
///
/// The scheduler performs no reporting of its own beyond `tracing` events;
/// the host pipeline renders diagnostics and decides pass/fail.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// Files submitted to the compiler this cycle, in submission order.
    pub work_list: Vec<SourceId>,

    /// Tracked sources that were served from cache instead.
    pub cached_count: usize,

    /// Diagnostics the compiler reported for this cycle.
    pub diagnostics: Vec<Diagnostic>,

    /// Wall-clock duration of the cycle.
    pub duration: Duration,
}

impl BuildSummary {
    /// Whether the compiler reported any error-severity diagnostic.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }
}

/// State mutated during a cycle, serialized behind the scheduler's mutex.
struct CycleState {
    compiler: Box<dyn CompilerService + Send>,
    previous_program: Option<ProgramHandle>,
    record: CachedRecord,
}

/// Drives incremental recompilation cycles for a fixed source tree.
pub struct Scheduler {
    config: SchedulerConfig,
    store: CacheStore,
    bundler: Box<dyn BundlerResolver + Send + Sync>,
    native: Box<dyn NativeResolver + Send + Sync>,
    inner: Mutex<CycleState>,
}

impl Scheduler {
    /// Construct a scheduler from its config and external collaborators.
    ///
    /// The in-memory record is seeded from the cache file so the loader
    /// interface can serve dependency lists before the first cycle runs.
    pub fn new(
        config: SchedulerConfig,
        compiler: Box<dyn CompilerService + Send>,
        bundler: Box<dyn BundlerResolver + Send + Sync>,
        native: Box<dyn NativeResolver + Send + Sync>,
    ) -> Self {
        let store = CacheStore::new(config.cache_path());
        let record = store.load();
        Self {
            config,
            store,
            bundler,
            native,
            inner: Mutex::new(CycleState {
                compiler,
                previous_program: None,
                record,
            }),
        }
    }

    /// The scheduler's configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Directory where previously emitted output lives, for the downstream
    /// loader.
    pub fn output_dir(&self) -> PathBuf {
        self.config.output_dir()
    }

    /// Transitive dependency list of `path` from the current graph,
    /// including `path` itself.
    ///
    /// This is what a downstream file-loader registers as filesystem watch
    /// dependencies for the file.
    pub fn dependencies_of(&self, path: impl AsRef<Path>) -> Result<Vec<SourceId>> {
        let source = SourceId::new(path)?;
        let state = self.inner.lock();
        Ok(state.record.dependency_graph.transitive_closure(&source))
    }

    /// Run one build cycle.
    ///
    /// Checksums every tracked source, diffs against the cached record,
    /// expands via the cached dependency graph, submits the resulting work
    /// list to the compiler service with a fresh [`GraphBuilder`] registered
    /// as its resolution hook, then merges and persists the record. A failed
    /// cache write aborts the cycle with [`Error::CacheWrite`].
    pub fn run_cycle(&self) -> Result<BuildSummary> {
        let mut state = self.inner.lock();
        let started = Instant::now();

        let all_sources = self.config.tracked_sources()?;
        let fresh_checksums = checksum_sources(&all_sources)?;
        let mut record = self.store.load();

        let work_list = compute_work_list(&all_sources, &fresh_checksums, &record, &self.config);
        info!(
            to_compile = work_list.len(),
            cached = all_sources.len() - work_list.len(),
            reusing_program = state.previous_program.is_some(),
            "starting compilation"
        );

        if work_list.is_empty() {
            // Steady state: nothing to submit, nothing to persist.
            state.record = record;
            return Ok(BuildSummary {
                work_list,
                cached_count: all_sources.len(),
                diagnostics: Vec::new(),
                duration: started.elapsed(),
            });
        }

        let mut builder = GraphBuilder::new(self.bundler.as_ref(), self.native.as_ref(), &self.config);
        let previous_program = state.previous_program;
        let outcome = state.compiler.compile(
            &work_list,
            &self.config.compiler_options(),
            previous_program,
            &mut builder,
        )?;
        state.previous_program = Some(outcome.program);

        record.merge(&work_list, &fresh_checksums, builder.into_graph());
        self.store.save(&record)?;
        state.record = record;

        let duration = started.elapsed();
        debug!(elapsed_ms = duration.as_millis() as u64, "compilation finished");

        Ok(BuildSummary {
            cached_count: all_sources.len() - work_list.len(),
            work_list,
            diagnostics: outcome.diagnostics,
            duration,
        })
    }
}

/// Read and hash every tracked source.
///
/// An unreadable source is surfaced: skipping it would silently drop the
/// file from change detection.
fn checksum_sources(sources: &[SourceId]) -> Result<FxHashMap<SourceId, i32>> {
    let mut checksums = FxHashMap::default();
    for source in sources {
        let content = fs::read_to_string(source.as_path()).map_err(|io| Error::SourceRead {
            path: source.as_path().to_path_buf(),
            source: io,
        })?;
        checksums.insert(source.clone(), checksum(&content));
    }
    Ok(checksums)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_error_detection() {
        let mut summary = BuildSummary {
            work_list: Vec::new(),
            cached_count: 0,
            diagnostics: vec![],
            duration: Duration::ZERO,
        };
        assert!(!summary.has_errors());

        summary.diagnostics.push(Diagnostic {
            severity: DiagnosticSeverity::Warning,
            message: "unused import".into(),
            file: None,
            line: None,
            column: None,
        });
        assert!(!summary.has_errors());

        summary.diagnostics.push(Diagnostic::error("type mismatch"));
        assert!(summary.has_errors());
    }
}
