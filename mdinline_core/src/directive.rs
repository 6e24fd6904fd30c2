use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Substring that marks a line as an inline directive.
pub const INLINE_MARKER: &str = "markdown:inline";

/// Substring that marks the last line of a generated block.
pub const END_MARKER: &str = "markdown:end";

/// The exact line written after every generated block. It is itself a
/// markdown comment, so it does not show up in rendered output.
pub const END_MARKER_LINE: &str = "[//]: # (markdown:end)";

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"markdown:inline\s+(\S+)(?:\s+\w+:)?\s*$")
		.unwrap_or_else(|e| panic!("invalid pattern: {e}"))
});

/// A parsed `markdown:inline` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
	/// Path of the file whose content is inlined, with any leading `./`
	/// removed.
	pub target_path: PathBuf,
	/// Language annotation for the opening fence.
	pub language: String,
	/// Reserved for named sections. Always empty.
	pub section: String,
}

impl Directive {
	/// Replace the language tag using an extension alias table, e.g. `rs` →
	/// `rust`. Tags without an alias are left untouched.
	#[must_use]
	#[allow(clippy::implicit_hasher)]
	pub fn with_language_aliases(mut self, aliases: &HashMap<String, String>) -> Self {
		if let Some(alias) = aliases.get(&self.language) {
			self.language.clone_from(alias);
		}
		self
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DirectiveError {
	#[error("no parenthesized comment found around the directive")]
	MalformedComment,
	#[error("the comment does not match `markdown:inline <path>`")]
	MalformedDeclaration,
}

/// Returns true when the line requests an inline block.
pub fn is_directive_line(line: &[u8]) -> bool {
	contains(line, INLINE_MARKER.as_bytes())
}

/// Returns true when the line terminates a generated block.
pub fn is_end_marker_line(line: &[u8]) -> bool {
	contains(line, END_MARKER.as_bytes())
}

/// Parse a directive from a line that contains [`INLINE_MARKER`].
///
/// The directive must sit inside a parenthesized comment wrapper, any of
/// which keeps it out of the rendered document:
///
/// ```text
/// [//]: # (markdown:inline ./examples/full.go)
/// [comment]: <> (markdown:inline ./examples/full.go)
/// [//]: # (markdown:inline ./examples/full.go section:)
/// ```
///
/// Only the first parenthesized group on the line is considered. An optional
/// trailing `keyword:` token after the path is accepted and ignored.
pub fn parse_directive(line: &str) -> Result<Directive, DirectiveError> {
	let group = first_parenthesized_group(line).ok_or(DirectiveError::MalformedComment)?;

	let path = DECLARATION
		.captures(group)
		.and_then(|captures| captures.get(1))
		.ok_or(DirectiveError::MalformedDeclaration)?
		.as_str();
	let path = path.strip_prefix("./").unwrap_or(path);

	Ok(Directive {
		target_path: PathBuf::from(path),
		language: language_tag(path).to_string(),
		section: String::new(),
	})
}

/// The text after the last `.` of the final path component, or an empty
/// string when there is none.
pub fn language_tag(path: &str) -> &str {
	let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
	file_name.rsplit_once('.').map_or("", |(_, ext)| ext)
}

/// The content of the first balanced `(...)` group on the line. Nested
/// parentheses stay part of the group, so `(markdown:inline a(1).go)` keeps
/// the whole path.
fn first_parenthesized_group(line: &str) -> Option<&str> {
	let start = line.find('(')? + 1;
	let mut depth = 1usize;

	for (offset, ch) in line[start..].char_indices() {
		match ch {
			'(' => depth += 1,
			')' => {
				depth -= 1;
				if depth == 0 {
					let group = &line[start..start + offset];
					return (!group.is_empty()).then_some(group);
				}
			}
			_ => {}
		}
	}

	None
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
	haystack
		.windows(needle.len())
		.any(|window| window == needle)
}
