//! `mdinline_core` is the core library for [mdinline](https://github.com/ifiokjr/mdinline). It keeps
//! code samples in markdown documents synchronized with the source files they
//! were copied from.
//!
//! A document requests a file with a directive hidden in a markdown comment:
//!
//! ```markdown
//! [//]: # (markdown:inline ./examples/full.go)
//! ```
//!
//! Every run rewrites the lines after the directive with a fenced code block
//! holding the file's current content, followed by an end marker:
//!
//! ````markdown
//! [//]: # (markdown:inline ./examples/full.go)
//!
//! ```go
//! package full
//! ```
//! [//]: # (markdown:end)
//! ````
//!
//! ## Processing Pipeline
//!
//! ```text
//! Document bytes
//!   → Stale-block remover (drops lines between each directive and its end marker)
//!   → Inline-block generator (parses directives, reads targets, emits fenced blocks)
//!   → Caller persists the result when it differs from the input
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `mdinline.toml`.
//! - [`directive`]: The `markdown:inline` directive grammar.
//! - [`fs`]: The open / stat / read capability used by the core.
//! - [`project`]: Document discovery and batch check/update over a project.
//! - [`rewrite`]: The two line-rewriting passes.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::path::Path;
//!
//! use mdinline_core::Inliner;
//! use mdinline_core::MemoryFileSystem;
//! use mdinline_core::UpdateOutcome;
//!
//! let fs = MemoryFileSystem::new()
//! 	.with_file("readme.md", "[//]: # (markdown:inline ./main.rs)\n")
//! 	.with_file("main.rs", "fn main() {}\n");
//! let inliner = Inliner::new(fs);
//!
//! let outcome = inliner.update(Path::new("readme.md")).unwrap();
//! assert_eq!(
//! 	outcome,
//! 	UpdateOutcome::Changed(
//! 		b"[//]: # (markdown:inline ./main.rs)\n\n```rs\nfn main() {}\n```\n[//]: # (markdown:end)\n"
//! 			.to_vec()
//! 	)
//! );
//! ```

pub use directive::Directive;
pub use directive::DirectiveError;
pub use directive::END_MARKER;
pub use directive::END_MARKER_LINE;
pub use directive::INLINE_MARKER;
pub use directive::parse_directive;
pub use engine::*;
pub use error::*;
pub use fs::FileStat;
pub use fs::FileSystem;
pub use fs::MemoryFileSystem;
pub use fs::OsFileSystem;
pub use project::check_project;
pub use project::compute_updates;
pub use project::write_updates;

pub mod config;
pub mod directive;
mod engine;
#[allow(unused_assignments)]
mod error;
pub mod fs;
pub mod project;
pub mod rewrite;
