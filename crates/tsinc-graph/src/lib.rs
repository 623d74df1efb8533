//! # tsinc-graph
//!
//! Foundation crate for tsinc - path-normalized source identity, content
//! checksums, and the forward dependency graph used for recompilation
//! scheduling.
//!
//! Everything in this crate is a pure data structure: the only I/O performed
//! is path canonicalization when constructing a [`SourceId`]. Reading file
//! contents, talking to the compiler, and persisting state are the scheduler
//! crate's concern.
//!
//! ## Quick Start
//!
//! ```
//! use tsinc_graph::{DependencyGraph, SourceId, checksum};
//!
//! # fn main() -> Result<(), tsinc_graph::SourceIdError> {
//! let a = SourceId::new("/project/src/a.ts")?;
//! let b = SourceId::new("/project/src/b.ts")?;
//!
//! let mut graph = DependencyGraph::new();
//! graph.set_imports(a.clone(), vec![b.clone()]);
//!
//! // Closure walks forward edges and includes the starting file.
//! let closure = graph.transitive_closure(&a);
//! assert_eq!(closure, vec![a, b]);
//!
//! // Content fingerprint for change detection.
//! assert_eq!(checksum(""), 0);
//! # Ok(()) }
//! ```

mod checksum;
mod graph;
mod source_id;

pub use checksum::checksum;
pub use graph::DependencyGraph;
pub use source_id::{SourceId, SourceIdError};
