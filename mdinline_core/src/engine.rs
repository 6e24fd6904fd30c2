use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use crate::FileSystem;
use crate::InlineError;
use crate::InlineResult;
use crate::directive::INLINE_MARKER;
use crate::rewrite::generate_inline_blocks;
use crate::rewrite::remove_generated_blocks;

/// Result of running [`Inliner::update`] on a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
	/// The path is a directory. Nothing was done.
	Directory,
	/// The document is already up to date.
	Unchanged,
	/// The document needs to be rewritten with these bytes.
	Changed(Vec<u8>),
}

impl UpdateOutcome {
	pub fn is_changed(&self) -> bool {
		matches!(self, Self::Changed(_))
	}

	/// The new content, when the document changed.
	pub fn content(&self) -> Option<&[u8]> {
		match self {
			Self::Changed(content) => Some(content),
			Self::Directory | Self::Unchanged => None,
		}
	}
}

/// Rewrites documents so every `markdown:inline` directive is followed by the
/// current content of the file it names.
#[derive(Debug, Clone)]
pub struct Inliner<F> {
	fs: F,
	language_aliases: HashMap<String, String>,
}

impl<F: FileSystem> Inliner<F> {
	pub fn new(fs: F) -> Self {
		Self {
			fs,
			language_aliases: HashMap::new(),
		}
	}

	/// Map file extensions to fence language tags, e.g. `rs` → `rust`.
	#[must_use]
	pub fn with_language_aliases(mut self, aliases: HashMap<String, String>) -> Self {
		self.language_aliases = aliases;
		self
	}

	pub fn fs(&self) -> &F {
		&self.fs
	}

	/// Compute the up-to-date content of the document at `path`.
	///
	/// The document is not written; persisting a [`UpdateOutcome::Changed`]
	/// result is left to the caller.
	pub fn update(&self, path: &Path) -> InlineResult<UpdateOutcome> {
		let source_error = |source: std::io::Error| {
			InlineError::SourceRead {
				path: path.display().to_string(),
				source,
			}
		};

		let stat = self.fs.stat(path).map_err(source_error)?;
		if stat.is_dir {
			return Ok(UpdateOutcome::Directory);
		}

		let file = self.fs.open(path).map_err(source_error)?;
		let original = self.fs.read(file).map_err(source_error)?;
		let rendered = self.render(&original)?;

		if *rendered == *original {
			tracing::debug!(path = %path.display(), "document is up to date");
			Ok(UpdateOutcome::Unchanged)
		} else {
			tracing::debug!(path = %path.display(), "document needs updating");
			Ok(UpdateOutcome::Changed(rendered.into_owned()))
		}
	}

	/// Strip stale generated blocks from `document` and regenerate them.
	///
	/// Documents without a directive are returned as-is, even when they
	/// mention the end marker.
	pub fn render<'a>(&self, document: &'a [u8]) -> InlineResult<Cow<'a, [u8]>> {
		if !has_directives(document) {
			return Ok(Cow::Borrowed(document));
		}

		let cleaned = remove_generated_blocks(document);
		let generated = generate_inline_blocks(&cleaned, &self.fs, &self.language_aliases)?;
		Ok(Cow::Owned(generated))
	}
}

/// Check whether any line of the document requests an inline block.
pub fn has_directives(document: &[u8]) -> bool {
	document
		.windows(INLINE_MARKER.len())
		.any(|window| window == INLINE_MARKER.as_bytes())
}
