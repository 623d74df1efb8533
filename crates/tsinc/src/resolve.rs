//! Dependency graph construction from module resolution.
//!
//! For every file the compiler processes in a build cycle, the set of files
//! it imports must be determined with the *same* semantics the bundler's
//! module system uses - the recompilation decision and the loader's watch
//! registration have to agree with the bundler's view of the module graph,
//! not just the compiler's default resolution.
//!
//! Each import is therefore resolved through two strategies - the bundler's
//! resolver and the compiler's native resolution - and the two results are
//! reconciled by an explicit merge function with a fixed precedence rule.
//! Per-import failures are non-fatal: they contribute no edge, and the
//! compiler's own unresolved-module diagnostics remain the user-visible
//! signal.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, trace};

use tsinc_graph::{DependencyGraph, SourceId};

use crate::compiler::ModuleResolutionHost;
use crate::config::SchedulerConfig;

/// Suffix appended by the suffix-append rule list.
const DEFAULT_SOURCE_SUFFIX: &str = ".ts";

/// Bundler-style resolution failed for one import.
#[derive(Debug, thiserror::Error)]
#[error("cannot resolve '{request}': {reason}")]
pub struct ResolveError {
    pub request: String,
    pub reason: String,
}

impl ResolveError {
    pub fn new(request: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            reason: reason.into(),
        }
    }
}

/// The bundler's synchronous module resolution.
///
/// Resolves `request` relative to `base_dir` with the bundler's full
/// algorithm (extension probing, package-main resolution, alias rules),
/// raising on failure. External collaborator.
pub trait BundlerResolver {
    fn resolve(&self, base_dir: &Path, request: &str) -> Result<PathBuf, ResolveError>;
}

/// One result of the compiler's own module resolution.
#[derive(Debug, Clone)]
pub struct NativeResolution {
    /// File the specifier resolved to.
    pub resolved: PathBuf,

    /// Whether the compiler classified the target as an external library
    /// dependency (e.g. under `node_modules`).
    pub is_external_library: bool,
}

/// The compiler's native module resolution. External collaborator.
pub trait NativeResolver {
    fn resolve(&self, specifier: &str, containing_file: &Path) -> Option<NativeResolution>;
}

/// A reconciled import target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    /// Normalized identity of the resolved file.
    pub source: SourceId,

    /// External-library classification inherited from native resolution
    /// when both strategies agree on the path.
    pub is_external_library: bool,
}

/// Builds the cycle's fresh forward graph as module resolution proceeds.
///
/// One instance per build cycle. The graph is explicit state owned by the
/// builder - edge writes go through [`DependencyGraph::set_imports`], and a
/// file's edge set is replaced wholesale each time the compiler asks about
/// that file. Registered with the compiler service as its
/// [`ModuleResolutionHost`] before submission; consumed with
/// [`GraphBuilder::into_graph`] afterwards.
pub struct GraphBuilder<'a> {
    bundler: &'a dyn BundlerResolver,
    native: &'a dyn NativeResolver,
    append_ts_suffix_to: &'a [Regex],
    source_pattern: &'a Regex,
    graph: DependencyGraph,
}

impl<'a> GraphBuilder<'a> {
    /// Create a builder for one build cycle.
    pub fn new(
        bundler: &'a dyn BundlerResolver,
        native: &'a dyn NativeResolver,
        config: &'a SchedulerConfig,
    ) -> Self {
        Self {
            bundler,
            native,
            append_ts_suffix_to: &config.append_ts_suffix_to,
            source_pattern: &config.source_pattern,
            graph: DependencyGraph::new(),
        }
    }

    /// Consume the builder and return the edges recorded this cycle.
    pub fn into_graph(self) -> DependencyGraph {
        self.graph
    }

    /// Resolve one `(specifier, containing file)` pair through both
    /// strategies and reconcile.
    pub fn resolve_import(&self, specifier: &str, containing_file: &Path) -> Option<ResolvedModule> {
        let bundler = self.bundler_candidate(specifier, containing_file);
        let native = self.native.resolve(specifier, containing_file);
        reconcile(bundler, native)
    }

    /// Bundler-style candidate: resolve relative to the containing file's
    /// directory, apply the suffix-append rule, keep only recognized
    /// sources.
    fn bundler_candidate(&self, specifier: &str, containing_file: &Path) -> Option<SourceId> {
        let base_dir = containing_file.parent()?;
        let resolved = match self.bundler.resolve(base_dir, specifier) {
            Ok(path) => path,
            Err(err) => {
                trace!(%specifier, containing = %containing_file.display(), %err, "bundler resolution failed");
                return None;
            }
        };

        let resolved = self.append_suffix_if_match(resolved);
        if !self.source_pattern.is_match(&resolved.to_string_lossy()) {
            return None;
        }
        SourceId::new(&resolved).ok()
    }

    /// Append the default source suffix to paths matched by the configured
    /// rule list, unless the path is already a recognized source.
    fn append_suffix_if_match(&self, path: PathBuf) -> PathBuf {
        let text = path.to_string_lossy();
        if self.source_pattern.is_match(&text) {
            return path;
        }
        if self.append_ts_suffix_to.iter().any(|p| p.is_match(&text)) {
            return PathBuf::from(format!("{text}{DEFAULT_SOURCE_SUFFIX}"));
        }
        path
    }
}

impl ModuleResolutionHost for GraphBuilder<'_> {
    fn resolve_module_names(
        &mut self,
        specifiers: &[String],
        containing_file: &Path,
    ) -> Vec<Option<ResolvedModule>> {
        let resolved: Vec<Option<ResolvedModule>> = specifiers
            .iter()
            .map(|specifier| self.resolve_import(specifier, containing_file))
            .collect();

        match SourceId::new(containing_file) {
            Ok(containing) => {
                let imports = resolved
                    .iter()
                    .flatten()
                    .map(|module| module.source.clone())
                    .collect();
                self.graph.set_imports(containing, imports);
            }
            Err(err) => {
                debug!(containing = %containing_file.display(), %err, "skipping edge record");
            }
        }

        resolved
    }
}

/// Reconcile the two resolution strategies for one import.
///
/// Precedence: with both results, the bundler result is the file identity
/// and the external-library classification is inherited from native
/// resolution only when the two agree on the resolved path. Native-only
/// is used outright; bundler-only carries no external-library
/// classification; neither resolves to nothing.
fn reconcile(
    bundler: Option<SourceId>,
    native: Option<NativeResolution>,
) -> Option<ResolvedModule> {
    let native = native.and_then(|n| {
        let source = SourceId::new(&n.resolved).ok()?;
        Some(ResolvedModule {
            source,
            is_external_library: n.is_external_library,
        })
    });

    match (bundler, native) {
        (Some(bundler), Some(native)) => Some(ResolvedModule {
            is_external_library: bundler == native.source && native.is_external_library,
            source: bundler,
        }),
        (None, Some(native)) => Some(native),
        (Some(bundler), None) => Some(ResolvedModule {
            source: bundler,
            is_external_library: false,
        }),
        (None, None) => None,
    }
}
