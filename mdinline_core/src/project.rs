use std::collections::HashSet;
use std::fs::Permissions;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::Directive;
use crate::DirectiveError;
use crate::InlineError;
use crate::InlineResult;
use crate::Inliner;
use crate::OsFileSystem;
use crate::UpdateOutcome;
use crate::config::InlinerConfig;
use crate::directive::is_directive_line;
use crate::directive::parse_directive;
use crate::rewrite::lines;

/// Options for controlling how a project is scanned.
///
/// Use [`ScanOptions::default()`] for sensible defaults or
/// [`ScanOptions::from_config`] to construct from an [`InlinerConfig`].
#[derive(Debug, Clone)]
pub struct ScanOptions {
	/// Gitignore-style patterns to exclude from scanning.
	pub exclude_patterns: Vec<String>,
	/// Glob patterns for extra files to process regardless of extension.
	pub include_set: GlobSet,
	/// Document extensions to process (case-insensitive, without the dot).
	pub extensions: Vec<String>,
	/// Maximum document size in bytes.
	pub max_file_size: u64,
	/// Whether to disable `.gitignore` integration.
	pub disable_gitignore: bool,
}

impl Default for ScanOptions {
	fn default() -> Self {
		Self::from_config(&InlinerConfig::default())
	}
}

impl ScanOptions {
	pub fn from_config(config: &InlinerConfig) -> Self {
		Self {
			exclude_patterns: config.exclude.patterns.clone(),
			include_set: build_glob_set(&config.include.patterns),
			extensions: config.extensions.clone(),
			max_file_size: config.max_file_size,
			disable_gitignore: config.disable_gitignore,
		}
	}

	fn matches_extension(&self, path: &Path) -> bool {
		let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
			return false;
		};

		self.extensions
			.iter()
			.any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(ext))
	}
}

/// A document discovered in the project together with the permission bits it
/// had when it was scanned. The bits are restored after rewriting.
#[derive(Debug, Clone)]
pub struct Document {
	pub path: PathBuf,
	pub permissions: Permissions,
}

/// A scanned project, ready for checking or updating.
#[derive(Debug)]
pub struct ProjectContext {
	pub root: PathBuf,
	pub documents: Vec<Document>,
	pub inliner: Inliner<OsFileSystem>,
}

/// A document that could not be processed. The rest of the batch is still
/// processed.
#[derive(Debug)]
pub struct DocumentFailure {
	pub file: PathBuf,
	pub error: InlineError,
}

/// A document with its regenerated content.
#[derive(Debug, Clone)]
pub struct UpdatedDocument {
	pub document: Document,
	pub content: Vec<u8>,
}

/// Result of updating a project.
#[derive(Debug, Default)]
pub struct UpdateResult {
	/// Documents whose content changed, in scan order.
	pub updated_files: Vec<UpdatedDocument>,
	/// Number of documents that were already up to date.
	pub unchanged_count: usize,
	pub failures: Vec<DocumentFailure>,
}

impl UpdateResult {
	pub fn has_failures(&self) -> bool {
		!self.failures.is_empty()
	}
}

/// A document whose inlined blocks are out of date.
#[derive(Debug)]
pub struct StaleDocument {
	pub file: PathBuf,
	pub current_content: String,
	pub expected_content: String,
}

/// Result of checking a project for stale documents.
#[derive(Debug, Default)]
pub struct CheckResult {
	pub stale: Vec<StaleDocument>,
	pub failures: Vec<DocumentFailure>,
	/// Number of documents that were checked.
	pub checked_count: usize,
}

impl CheckResult {
	/// Returns true if every document is up to date and none failed.
	pub fn is_ok(&self) -> bool {
		self.stale.is_empty() && self.failures.is_empty()
	}
}

/// A directive found in a document, with its 1-indexed line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveEntry {
	pub line: usize,
	pub content: String,
	pub directive: Result<Directive, DirectiveError>,
}

/// Scan a directory with default options and no config file.
pub fn scan_project(root: &Path) -> InlineResult<ProjectContext> {
	scan_project_with_options(root, &InlinerConfig::default())
}

/// Scan a project with config. Loads the discovered project config, then
/// collects documents.
pub fn scan_project_with_config(root: &Path) -> InlineResult<ProjectContext> {
	let config = InlinerConfig::load(root)?.unwrap_or_default();
	scan_project_with_options(root, &config)
}

fn scan_project_with_options(root: &Path, config: &InlinerConfig) -> InlineResult<ProjectContext> {
	// `OsFileSystem` joins document paths onto the root again, which only
	// leaves them intact when the root is absolute.
	let root = std::path::absolute(root)?;
	let root = root.as_path();
	let options = ScanOptions::from_config(config);
	let documents = collect_documents(root, &options)?;
	tracing::debug!(
		root = %root.display(),
		documents = documents.len(),
		"scanned project"
	);

	let inliner =
		Inliner::new(OsFileSystem::new(root)).with_language_aliases(config.languages.clone());

	Ok(ProjectContext {
		root: root.to_path_buf(),
		documents,
		inliner,
	})
}

/// Compute the new content of every document in the project. Documents that
/// fail are collected in [`UpdateResult::failures`] and skipped.
pub fn compute_updates(ctx: &ProjectContext) -> UpdateResult {
	let mut result = UpdateResult::default();

	for document in &ctx.documents {
		match ctx.inliner.update(&document.path) {
			Ok(UpdateOutcome::Changed(content)) => {
				result.updated_files.push(UpdatedDocument {
					document: document.clone(),
					content,
				});
			}
			Ok(UpdateOutcome::Unchanged | UpdateOutcome::Directory) => {
				result.unchanged_count += 1;
			}
			Err(error) => {
				tracing::warn!(path = %document.path.display(), error = %error, "skipping document");
				result.failures.push(DocumentFailure {
					file: document.path.clone(),
					error,
				});
			}
		}
	}

	result
}

/// Check whether every document in the project is up to date.
pub fn check_project(ctx: &ProjectContext) -> CheckResult {
	let mut result = CheckResult::default();

	for document in &ctx.documents {
		result.checked_count += 1;

		match ctx.inliner.update(&document.path) {
			Ok(UpdateOutcome::Changed(expected)) => {
				let current = match std::fs::read(&document.path) {
					Ok(current) => current,
					Err(source) => {
						result.failures.push(DocumentFailure {
							file: document.path.clone(),
							error: InlineError::SourceRead {
								path: document.path.display().to_string(),
								source,
							},
						});
						continue;
					}
				};
				result.stale.push(StaleDocument {
					file: document.path.clone(),
					current_content: String::from_utf8_lossy(&current).into_owned(),
					expected_content: String::from_utf8_lossy(&expected).into_owned(),
				});
			}
			Ok(UpdateOutcome::Unchanged | UpdateOutcome::Directory) => {}
			Err(error) => {
				result.failures.push(DocumentFailure {
					file: document.path.clone(),
					error,
				});
			}
		}
	}

	result
}

/// Write the updated contents back to disk, restoring each document's
/// original permission bits.
pub fn write_updates(updates: &UpdateResult) -> InlineResult<()> {
	for updated in &updates.updated_files {
		let path = &updated.document.path;
		std::fs::write(path, &updated.content)?;
		std::fs::set_permissions(path, updated.document.permissions.clone())?;
		tracing::info!(path = %path.display(), "updated document");
	}
	Ok(())
}

/// List every directive line in a document.
pub fn find_directives(document: &[u8]) -> Vec<DirectiveEntry> {
	lines(document)
		.enumerate()
		.filter(|(_, line)| is_directive_line(line))
		.map(|(index, line)| {
			let content = String::from_utf8_lossy(line).into_owned();
			let directive = parse_directive(&content);
			DirectiveEntry {
				line: index + 1,
				content,
				directive,
			}
		})
		.collect()
}

/// Build a `GlobSet` from a list of glob pattern strings.
fn build_glob_set(patterns: &[String]) -> GlobSet {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		match Glob::new(pattern) {
			Ok(glob) => {
				builder.add(glob);
			}
			Err(e) => tracing::warn!(pattern = %pattern, error = %e, "ignoring invalid include pattern"),
		}
	}
	builder.build().unwrap_or_else(|_| GlobSet::empty())
}

/// Build a `Gitignore` matcher from exclude patterns specified in
/// `mdinline.toml` `[exclude]`.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> InlineResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			InlineError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| InlineError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

/// Build a `Gitignore` matcher from the project's `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		if let Some(e) = builder.add(gitignore_path) {
			tracing::warn!(error = %e, "failed to read .gitignore");
		}
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

struct Walker<'a> {
	options: &'a ScanOptions,
	gitignore: Gitignore,
	custom_exclude: Gitignore,
	visited_dirs: HashSet<PathBuf>,
	files: Vec<PathBuf>,
}

impl Walker<'_> {
	fn walk(&mut self, root: &Path, dir: &Path) -> InlineResult<()> {
		if !dir.is_dir() {
			return Ok(());
		}

		// Detect symlink cycles by tracking canonical paths.
		let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
		if !self.visited_dirs.insert(canonical) {
			return Err(InlineError::SymlinkCycle {
				path: dir.display().to_string(),
			});
		}

		for entry in std::fs::read_dir(dir)? {
			let path = entry?.path();

			if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
				if is_ignored_directory_name(name) && path.is_dir() {
					continue;
				}
			}

			let is_dir = path.is_dir();
			if self.gitignore.matched(&path, is_dir).is_ignore()
				|| self.custom_exclude.matched(&path, is_dir).is_ignore()
			{
				continue;
			}

			if is_dir {
				self.walk(root, &path)?;
			} else if self.options.matches_extension(&path)
				|| path
					.strip_prefix(root)
					.is_ok_and(|rel| self.options.include_set.is_match(rel))
			{
				self.files.push(path);
			}
		}

		Ok(())
	}
}

/// Collect every document to process under `root`, sorted by path.
///
/// Files matched by the project's `.gitignore` are skipped unless
/// `disable_gitignore` is set. Exclude patterns are always applied on top.
pub fn collect_documents(root: &Path, options: &ScanOptions) -> InlineResult<Vec<Document>> {
	let gitignore = if options.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let custom_exclude = build_exclude_matcher(root, &options.exclude_patterns)?;

	let mut walker = Walker {
		options,
		gitignore,
		custom_exclude,
		visited_dirs: HashSet::new(),
		files: Vec::new(),
	};
	walker.walk(root, root)?;

	let mut files = walker.files;
	files.sort();

	files
		.into_iter()
		.map(|path| {
			let metadata = std::fs::metadata(&path)?;
			if metadata.len() > options.max_file_size {
				return Err(InlineError::FileTooLarge {
					path: path.display().to_string(),
					size: metadata.len(),
					limit: options.max_file_size,
				});
			}

			Ok(Document {
				path,
				permissions: metadata.permissions(),
			})
		})
		.collect()
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}
