use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum InlineError {
	#[error(transparent)]
	#[diagnostic(code(mdinline::io_error))]
	Io(#[from] std::io::Error),

	#[error("line {line}: `markdown:inline` found outside of a parenthesized comment: `{content}`")]
	#[diagnostic(
		code(mdinline::malformed_comment),
		help("wrap the directive in a markdown comment: `[//]: # (markdown:inline ./path/to/file)`")
	)]
	MalformedComment { line: usize, content: String },

	#[error("line {line}: invalid `markdown:inline` declaration: `{content}`")]
	#[diagnostic(
		code(mdinline::malformed_declaration),
		help(
			"expected `markdown:inline <path>` with a single path token; paths containing \
			 whitespace are not supported"
		)
	)]
	MalformedDeclaration { line: usize, content: String },

	#[error("line {line}: referenced file not found: `{path}`")]
	#[diagnostic(
		code(mdinline::referenced_file_not_found),
		help("paths are resolved relative to the project root")
	)]
	ReferencedFileNotFound { path: String, line: usize },

	#[error("line {line}: failed to read referenced file `{path}`: {source}")]
	#[diagnostic(code(mdinline::referenced_file_read))]
	ReferencedFileRead {
		path: String,
		line: usize,
		source: std::io::Error,
	},

	#[error("failed to read document `{path}`: {source}")]
	#[diagnostic(code(mdinline::source_read))]
	SourceRead {
		path: String,
		source: std::io::Error,
	},

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(mdinline::config_parse),
		help("check that mdinline.toml is valid TOML with optional [exclude] and [languages] sections")
	)]
	ConfigParse(String),

	#[error("file too large: `{path}` is {size} bytes (limit: {limit} bytes)")]
	#[diagnostic(
		code(mdinline::file_too_large),
		help("increase `max_file_size` in mdinline.toml or exclude this file")
	)]
	FileTooLarge { path: String, size: u64, limit: u64 },

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(mdinline::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },
}

impl InlineError {
	/// The 1-indexed document line the error points at, for errors raised while
	/// processing a directive.
	pub fn line(&self) -> Option<usize> {
		match self {
			Self::MalformedComment { line, .. }
			| Self::MalformedDeclaration { line, .. }
			| Self::ReferencedFileNotFound { line, .. }
			| Self::ReferencedFileRead { line, .. } => Some(*line),
			_ => None,
		}
	}
}

pub type InlineResult<T> = Result<T, InlineError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
