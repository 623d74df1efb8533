//! # tsinc
//!
//! Incremental recompilation scheduling for a TypeScript source tree embedded
//! in a larger build pipeline.
//!
//! Given the full source set, a persisted record of previous checksums, and
//! the dependency graph from the previous build, tsinc determines the minimal
//! set of files that must be resubmitted to an external compiler service, and
//! rebuilds the dependency graph for exactly those files as module resolution
//! proceeds.
//!
//! The compiler itself (parsing, type-checking, emission), the host build
//! tool's plugin lifecycle, and the per-file output loader are external
//! collaborators consumed through narrow trait interfaces:
//!
//! - [`CompilerService`] - submit a file list, options, and the previous
//!   program handle; receive emitted diagnostics and a fresh handle.
//! - [`BundlerResolver`] - the bundler's synchronous module resolution,
//!   raising on failure.
//! - [`NativeResolver`] - the compiler's own module resolution.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tsinc::SchedulerConfig;
//!
//! let config = SchedulerConfig::new(["src/index.ts", "src/util.ts"])
//!     .cache_dir(".tsinc")
//!     .include(["typings/globals.d.ts"]);
//! ```
//!
//! Construct a [`Scheduler`] from the config plus the three collaborators and
//! call [`Scheduler::run_cycle`] on each build trigger. The returned
//! [`BuildSummary`] carries the work list, the compiler's diagnostics, and
//! timing; all reporting is the embedder's concern - tsinc only emits
//! `tracing` events.
//!
//! ## Cached record
//!
//! The durable unit is a single JSON file (default `.tsinc/cache.json`)
//! holding `{ "checkSums": {path: int}, "dependencyGraph": {path: [path]} }`.
//! Absence or corruption of the file degrades to a full rebuild; it is never
//! a fatal error. A failed cache *write* is fatal for the cycle, since a lost
//! write causes missed recompilation later.

pub mod cache;
pub mod compiler;
pub mod config;
pub mod invalidate;
pub mod resolve;
pub mod scheduler;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
pub mod logging;

#[cfg(feature = "logging")]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use cache::{CacheStore, CachedRecord};
pub use compiler::{
    CompileOutcome, CompilerOptions, CompilerService, Diagnostic, DiagnosticSeverity,
    ModuleResolutionHost, ProgramHandle,
};
pub use config::SchedulerConfig;
pub use invalidate::compute_work_list;
pub use resolve::{
    BundlerResolver, GraphBuilder, NativeResolution, NativeResolver, ResolveError, ResolvedModule,
};
pub use scheduler::{BuildSummary, Scheduler};

// Re-export foundation types so embedders depend on one crate.
pub use tsinc_graph::{DependencyGraph, SourceId, SourceIdError, checksum};

use std::path::PathBuf;

/// Error types for tsinc operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A tracked source file could not be read for checksumming.
    #[error("failed to read source '{path}': {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cached record could not be persisted.
    ///
    /// Fatal for the current build cycle: a lost cache write causes
    /// incorrect future invalidation decisions.
    #[error("failed to write cache '{path}': {source}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The external compiler service failed outright.
    ///
    /// Per-file diagnostics are not errors; they are collected into the
    /// [`BuildSummary`]. This variant is for the service itself dying.
    #[error("compiler service error: {0}")]
    Compiler(String),

    /// A tracked path could not be normalized into a source identity.
    #[error(transparent)]
    SourceId(#[from] SourceIdError),
}

/// Result type alias for tsinc operations.
pub type Result<T> = std::result::Result<T, Error>;
