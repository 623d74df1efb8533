//! The invalidation engine.
//!
//! Given the full source list, freshly computed checksums, and the cached
//! record from the previous successful build, computes the minimal
//! recompilation work list for the current cycle.

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use tracing::debug;

use tsinc_graph::SourceId;

use crate::cache::CachedRecord;
use crate::config::SchedulerConfig;

/// Compute the work list to submit to the compiler this cycle.
///
/// 1. Directly changed = every source whose fresh checksum differs from the
///    cached one (absent from the cache counts as changed).
/// 2. No direct changes - empty work list, the steady-state fast path.
/// 3. Otherwise each changed file is expanded to its transitive *import*
///    closure over the cached graph. The compiler must be handed a
///    self-consistent program: submitting a changed file without the files
///    it imports risks stale-type references in a pass that reuses prior
///    program state. Closure walks imports, not importers.
/// 4. Every declaration file is appended unconditionally on a non-empty
///    invalidation - declarations can affect type resolution globally and
///    are cheap to include.
/// 5. Only recognized sources are kept; duplicates are removed preserving
///    first-seen order.
pub fn compute_work_list(
    all_sources: &[SourceId],
    fresh_checksums: &FxHashMap<SourceId, i32>,
    cached: &CachedRecord,
    config: &SchedulerConfig,
) -> Vec<SourceId> {
    let changed: Vec<&SourceId> = all_sources
        .iter()
        .filter(|source| fresh_checksums.get(*source) != cached.check_sums.get(*source))
        .collect();

    if changed.is_empty() {
        return Vec::new();
    }
    debug!(changed = changed.len(), "sources changed since last cycle");

    let mut work: IndexSet<SourceId> = IndexSet::new();
    for source in &changed {
        work.insert((*source).clone());
    }
    for source in &changed {
        work.extend(cached.dependency_graph.transitive_closure(source));
    }
    for source in all_sources {
        if config.is_declaration(source.as_path()) {
            work.insert(source.clone());
        }
    }

    work.into_iter()
        .filter(|source| config.is_source(source.as_path()))
        .collect()
}
