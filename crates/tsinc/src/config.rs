//! Scheduler configuration.
//!
//! All configuration is supplied at construction time: the tracked source
//! list, the cache directory, the suffix-append rules, and the pass-through
//! compiler settings. `run_cycle` itself takes no parameters.
//!
//! Glob expansion is the host's concern - `sources`, `include`, and
//! `exclude` are explicit, pre-expanded path lists.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use regex::Regex;

use tsinc_graph::SourceId;

use crate::Result;
use crate::compiler::CompilerOptions;

/// Sources matched by this suffix never emit output; they can affect type
/// resolution globally and are always included in a non-empty work list.
const DECLARATION_SUFFIX: &str = ".d.ts";

/// Default pattern recognizing compilable sources.
const DEFAULT_SOURCE_PATTERN: &str = r"(?i)\.tsx?$";

/// Default dot-directory holding the cache file and the compiler's output.
const DEFAULT_CACHE_DIR: &str = ".tsinc";

/// Construction-time configuration for a [`Scheduler`](crate::Scheduler).
///
/// The tracked set is `sources ∪ include ∖ exclude`, normalized and
/// deduplicated in first-seen order.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Tracked source files (pre-expanded by the host).
    pub sources: Vec<PathBuf>,

    /// Additional files merged into the tracked set.
    pub include: Vec<PathBuf>,

    /// Files removed from the tracked set.
    pub exclude: Vec<PathBuf>,

    /// Directory holding the cache file and the compiler output directory.
    pub cache_dir: PathBuf,

    /// Suffix-append rule list: a bundler-resolved path matching any of
    /// these patterns (and not already a recognized source) gets the default
    /// `.ts` suffix appended before extension filtering.
    pub append_ts_suffix_to: Vec<Regex>,

    /// Pattern recognizing compilable sources by extension.
    pub source_pattern: Regex,

    /// Compiler-specific settings forwarded verbatim to the service.
    pub compiler_settings: serde_json::Value,
}

impl SchedulerConfig {
    /// Create a config tracking the given source files.
    pub fn new(sources: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            include: Vec::new(),
            exclude: Vec::new(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            append_ts_suffix_to: Vec::new(),
            source_pattern: Regex::new(DEFAULT_SOURCE_PATTERN)
                .expect("default source pattern is valid"),
            compiler_settings: serde_json::Value::Null,
        }
    }

    /// Merge additional files into the tracked set.
    pub fn include(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.include.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Remove files from the tracked set.
    pub fn exclude(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.exclude.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Set the cache directory (default `.tsinc`).
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Set the suffix-append rule list.
    pub fn append_ts_suffix_to(mut self, patterns: impl IntoIterator<Item = Regex>) -> Self {
        self.append_ts_suffix_to = patterns.into_iter().collect();
        self
    }

    /// Override the source-extension pattern.
    pub fn source_pattern(mut self, pattern: Regex) -> Self {
        self.source_pattern = pattern;
        self
    }

    /// Set compiler-specific settings forwarded verbatim to the service.
    pub fn compiler_settings(mut self, settings: serde_json::Value) -> Self {
        self.compiler_settings = settings;
        self
    }

    /// Path of the persisted cache file.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join("cache.json")
    }

    /// Directory the compiler emits into; the downstream loader reads
    /// previously emitted output from here.
    pub fn output_dir(&self) -> PathBuf {
        self.cache_dir.join("build")
    }

    /// Compiler options for a build cycle.
    pub fn compiler_options(&self) -> CompilerOptions {
        CompilerOptions {
            out_dir: self.output_dir(),
            settings: self.compiler_settings.clone(),
        }
    }

    /// The normalized tracked set: `sources ∪ include ∖ exclude`,
    /// deduplicated in first-seen order.
    pub fn tracked_sources(&self) -> Result<Vec<SourceId>> {
        let mut excluded = IndexSet::new();
        for path in &self.exclude {
            excluded.insert(SourceId::new(path)?);
        }

        let mut tracked = IndexSet::new();
        for path in self.sources.iter().chain(&self.include) {
            let id = SourceId::new(path)?;
            if !excluded.contains(&id) {
                tracked.insert(id);
            }
        }
        Ok(tracked.into_iter().collect())
    }

    /// Whether `path` is recognized as a compilable source by extension.
    pub fn is_source(&self, path: &Path) -> bool {
        self.source_pattern.is_match(&path.to_string_lossy())
    }

    /// Whether `path` names a pure ambient-declaration file.
    pub fn is_declaration(&self, path: &Path) -> bool {
        path.to_string_lossy().ends_with(DECLARATION_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SchedulerConfig::new(["src/a.ts"]);
        assert_eq!(config.cache_dir, PathBuf::from(".tsinc"));
        assert_eq!(config.cache_path(), PathBuf::from(".tsinc/cache.json"));
        assert_eq!(config.output_dir(), PathBuf::from(".tsinc/build"));
        assert!(config.append_ts_suffix_to.is_empty());
    }

    #[test]
    fn source_recognition() {
        let config = SchedulerConfig::new(["src/a.ts"]);
        assert!(config.is_source(Path::new("/p/a.ts")));
        assert!(config.is_source(Path::new("/p/a.tsx")));
        assert!(config.is_source(Path::new("/p/A.TS")));
        assert!(config.is_source(Path::new("/p/types.d.ts")));
        assert!(!config.is_source(Path::new("/p/a.js")));
        assert!(!config.is_source(Path::new("/p/a.ts.bak")));
    }

    #[test]
    fn declaration_recognition() {
        let config = SchedulerConfig::new(["src/a.ts"]);
        assert!(config.is_declaration(Path::new("/p/globals.d.ts")));
        assert!(!config.is_declaration(Path::new("/p/a.ts")));
    }

    #[test]
    fn tracked_set_merges_include_and_drops_exclude() {
        let config = SchedulerConfig::new(["/p/a.ts", "/p/b.ts"])
            .include(["/p/globals.d.ts", "/p/a.ts"])
            .exclude(["/p/b.ts"]);

        let tracked = config.tracked_sources().unwrap();
        let paths: Vec<_> = tracked.iter().map(|s| s.path_string().into_owned()).collect();
        assert_eq!(paths, vec!["/p/a.ts", "/p/globals.d.ts"]);
    }

    #[test]
    fn tracked_set_unifies_path_spellings() {
        let config = SchedulerConfig::new(["/p/a.ts", "/p/sub/../a.ts"]);
        assert_eq!(config.tracked_sources().unwrap().len(), 1);
    }
}
