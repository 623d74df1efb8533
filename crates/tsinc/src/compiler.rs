//! The narrow interface to the external compiler service.
//!
//! tsinc never parses, type-checks, or emits anything itself. It hands the
//! service a work list, pass-through options, and the previous program
//! handle, and gets back emitted diagnostics plus a fresh handle. Before
//! submission the [`GraphBuilder`](crate::GraphBuilder) is registered as the
//! service's module-resolution hook via [`ModuleResolutionHost`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use tsinc_graph::SourceId;

use crate::Result;
use crate::resolve::ResolvedModule;

/// Opaque token for the compiler's reusable program state.
///
/// Minted by the service; tsinc only retains it across cycles and passes it
/// back so the service can reuse prior program state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(u64);

impl ProgramHandle {
    /// Wrap a service-minted token.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw token value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Severity of a compiler-reported diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// A diagnostic reported by the compiler service.
///
/// Collected, never thrown: the host pipeline decides pass/fail and does
/// all user-visible reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl Diagnostic {
    /// Build an error diagnostic with no location.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            file: None,
            line: None,
            column: None,
        }
    }

    /// Attach a source location.
    pub fn at(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

/// Options forwarded to the compiler service for one submission.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Directory the compiler emits into.
    pub out_dir: PathBuf,

    /// Compiler-specific settings, forwarded verbatim.
    pub settings: serde_json::Value,
}

/// Result of one submission to the compiler service.
#[derive(Debug, Clone)]
pub struct CompileOutcome {
    /// Handle to the program state this submission produced.
    pub program: ProgramHandle,

    /// Diagnostics emitted while building and emitting the program.
    pub diagnostics: Vec<Diagnostic>,
}

/// Module-resolution hook the service invokes during program construction.
///
/// Called once per containing file with every module specifier that file
/// names. `None` entries are imports neither resolution strategy could
/// place; the service raises its own unresolved-module diagnostic for
/// those as part of normal error reporting.
pub trait ModuleResolutionHost {
    fn resolve_module_names(
        &mut self,
        specifiers: &[String],
        containing_file: &Path,
    ) -> Vec<Option<ResolvedModule>>;
}

/// The external compiler service.
///
/// One call per build cycle: submit the work list, reuse the previous
/// program handle, and drive `resolution` for every import the submitted
/// files declare.
pub trait CompilerService {
    fn compile(
        &mut self,
        files: &[SourceId],
        options: &CompilerOptions,
        previous_program: Option<ProgramHandle>,
        resolution: &mut dyn ModuleResolutionHost,
    ) -> Result<CompileOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_builder() {
        let diag = Diagnostic::error("cannot find module './missing'").at("/p/a.ts", 3, 17);
        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.file.as_deref(), Some("/p/a.ts"));
        assert_eq!(diag.line, Some(3));
        assert_eq!(diag.column, Some(17));
    }

    #[test]
    fn program_handle_round_trips_raw_value() {
        let handle = ProgramHandle::new(7);
        assert_eq!(handle.raw(), 7);
        assert_eq!(handle, ProgramHandle::new(7));
    }
}
