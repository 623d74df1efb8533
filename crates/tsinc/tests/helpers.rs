//! Shared test utilities for tsinc integration tests.
//!
//! Provides a scripted compiler service, disk-probing fake resolvers, and
//! fixture helpers so scenario tests stay focused on scheduling behavior.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tsinc::{
    BundlerResolver, CompileOutcome, CompilerOptions, CompilerService, Diagnostic,
    ModuleResolutionHost, NativeResolution, NativeResolver, ProgramHandle, ResolveError,
    Scheduler, SchedulerConfig, SourceId,
};

/// What the fake compiler observed, for assertions after cycles.
#[derive(Default)]
pub struct CompileLog {
    /// File names submitted per compile call, in submission order.
    pub submissions: Vec<Vec<String>>,

    /// The previous program handle passed on each call.
    pub previous_programs: Vec<Option<u64>>,

    /// The output directory passed on each call.
    pub out_dirs: Vec<PathBuf>,
}

/// Compiler service double.
///
/// Drives the registered resolution host exactly once per submitted file
/// with that file's scripted import specifiers (keyed by file name), the
/// way a real compiler resolves each file's module names during program
/// construction.
pub struct FakeCompiler {
    imports: HashMap<String, Vec<String>>,
    diagnostics: Vec<Diagnostic>,
    log: Arc<Mutex<CompileLog>>,
    next_handle: u64,
}

impl FakeCompiler {
    pub fn new(imports: &[(&str, &[&str])]) -> Self {
        Self {
            imports: imports
                .iter()
                .map(|(file, specs)| {
                    let specs = specs.iter().map(|s| s.to_string()).collect();
                    (file.to_string(), specs)
                })
                .collect(),
            diagnostics: Vec::new(),
            log: Arc::new(Mutex::new(CompileLog::default())),
            next_handle: 0,
        }
    }

    /// Script diagnostics returned from every compile call.
    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn log(&self) -> Arc<Mutex<CompileLog>> {
        Arc::clone(&self.log)
    }
}

impl CompilerService for FakeCompiler {
    fn compile(
        &mut self,
        files: &[SourceId],
        options: &CompilerOptions,
        previous_program: Option<ProgramHandle>,
        resolution: &mut dyn ModuleResolutionHost,
    ) -> tsinc::Result<CompileOutcome> {
        for file in files {
            let name = file_name(file.as_path());
            let specifiers = self.imports.get(&name).cloned().unwrap_or_default();
            resolution.resolve_module_names(&specifiers, file.as_path());
        }

        self.next_handle += 1;
        {
            let mut log = self.log.lock().unwrap();
            log.submissions
                .push(files.iter().map(|f| file_name(f.as_path())).collect());
            log.previous_programs
                .push(previous_program.map(|p| p.raw()));
            log.out_dirs.push(options.out_dir.clone());
        }

        Ok(CompileOutcome {
            program: ProgramHandle::new(self.next_handle),
            diagnostics: self.diagnostics.clone(),
        })
    }
}

/// Bundler resolver double: joins the request onto the base directory and
/// probes for the file as-is, then with a `.ts` extension.
pub struct DiskBundlerResolver;

impl BundlerResolver for DiskBundlerResolver {
    fn resolve(&self, base_dir: &Path, request: &str) -> Result<PathBuf, ResolveError> {
        let candidate = base_dir.join(request);
        if candidate.is_file() {
            return Ok(candidate);
        }
        let with_ts = PathBuf::from(format!("{}.ts", candidate.display()));
        if with_ts.is_file() {
            return Ok(with_ts);
        }
        Err(ResolveError::new(request, "no matching file"))
    }
}

/// Native resolver double that never resolves anything, leaving the
/// bundler strategy in charge.
pub struct NullNativeResolver;

impl NativeResolver for NullNativeResolver {
    fn resolve(&self, _specifier: &str, _containing_file: &Path) -> Option<NativeResolution> {
        None
    }
}

/// Write a source file under `dir` and return its path.
pub fn write_source(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Build a scheduler over `sources` with scripted per-file imports,
/// returning the compile log for assertions.
pub fn scheduler_with(
    dir: &Path,
    sources: &[PathBuf],
    imports: &[(&str, &[&str])],
) -> (Scheduler, Arc<Mutex<CompileLog>>) {
    let compiler = FakeCompiler::new(imports);
    let log = compiler.log();
    let config = SchedulerConfig::new(sources.to_vec()).cache_dir(dir.join(".tsinc"));
    let scheduler = Scheduler::new(
        config,
        Box::new(compiler),
        Box::new(DiskBundlerResolver),
        Box::new(NullNativeResolver),
    );
    (scheduler, log)
}

/// File names of a work list, for readable assertions.
pub fn names(work_list: &[SourceId]) -> Vec<String> {
    work_list.iter().map(|s| file_name(s.as_path())).collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
