use std::collections::HashMap;
use std::io;

use crate::END_MARKER_LINE;
use crate::FileSystem;
use crate::InlineError;
use crate::InlineResult;
use crate::directive::DirectiveError;
use crate::directive::is_directive_line;
use crate::directive::is_end_marker_line;
use crate::directive::parse_directive;

/// Iterator over the lines of a byte buffer.
///
/// Lines are split on `\n` and a trailing `\r` is dropped. A final empty
/// line after the last `\n` is not yielded, so `"a\n"` and `"a"` both produce
/// a single line.
#[derive(Debug, Clone)]
pub struct Lines<'a> {
	rest: &'a [u8],
}

pub fn lines(bytes: &[u8]) -> Lines<'_> {
	Lines { rest: bytes }
}

impl<'a> Iterator for Lines<'a> {
	type Item = &'a [u8];

	fn next(&mut self) -> Option<Self::Item> {
		if self.rest.is_empty() {
			return None;
		}

		let line = if let Some(index) = self.rest.iter().position(|&byte| byte == b'\n') {
			let line = &self.rest[..index];
			self.rest = &self.rest[index + 1..];
			line
		} else {
			let line = self.rest;
			self.rest = &[];
			line
		};

		Some(line.strip_suffix(b"\r").unwrap_or(line))
	}
}

/// State machine that strips previously generated blocks.
///
/// Every directive line opens a block. Lines after it are held back until an
/// end marker confirms them as generated (they are then dropped, together with
/// the end marker) or until it becomes clear they were never terminated (they
/// are then written back verbatim).
#[derive(Debug, Default)]
pub struct BlockRemover<'a> {
	output: Vec<u8>,
	inside_generated_block: bool,
	pending: Vec<&'a [u8]>,
}

impl<'a> BlockRemover<'a> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_inside_generated_block(&self) -> bool {
		self.inside_generated_block
	}

	/// Number of lines currently held back as possibly generated.
	pub fn pending_lines(&self) -> usize {
		self.pending.len()
	}

	pub fn push_line(&mut self, line: &'a [u8]) {
		if is_directive_line(line) {
			// A new directive while a block is open means the earlier block was
			// never terminated.
			self.flush_pending();
			emit(&mut self.output, line);
			self.inside_generated_block = true;
			return;
		}

		if is_end_marker_line(line) {
			self.inside_generated_block = false;
			self.pending.clear();
			return;
		}

		if self.inside_generated_block {
			self.pending.push(line);
		} else {
			emit(&mut self.output, line);
		}
	}

	/// Flush any unterminated block and return the cleaned text.
	pub fn finish(mut self) -> Vec<u8> {
		self.flush_pending();
		self.output
	}

	fn flush_pending(&mut self) {
		for line in self.pending.drain(..) {
			emit(&mut self.output, line);
		}
	}
}

/// Remove every generated block (fenced content plus end marker) that follows
/// a directive, leaving the directive lines in place.
pub fn remove_generated_blocks(document: &[u8]) -> Vec<u8> {
	let mut remover = BlockRemover::new();
	for line in lines(document) {
		remover.push_line(line);
	}

	let unterminated = remover.pending_lines();
	if unterminated > 0 {
		tracing::debug!(
			lines = unterminated,
			"keeping unterminated block after last directive"
		);
	}

	remover.finish()
}

/// Append a freshly generated block after every directive line.
///
/// The first directive that cannot be parsed or whose target cannot be read
/// aborts the whole pass.
#[allow(clippy::implicit_hasher)]
pub fn generate_inline_blocks<F: FileSystem>(
	cleaned: &[u8],
	fs: &F,
	language_aliases: &HashMap<String, String>,
) -> InlineResult<Vec<u8>> {
	let mut output = Vec::with_capacity(cleaned.len());

	for (index, line) in lines(cleaned).enumerate() {
		emit(&mut output, line);

		if !is_directive_line(line) {
			continue;
		}

		let line_number = index + 1;
		let text = String::from_utf8_lossy(line);
		let directive = parse_directive(&text)
			.map_err(|error| {
				match error {
					DirectiveError::MalformedComment => {
						InlineError::MalformedComment {
							line: line_number,
							content: text.to_string(),
						}
					}
					DirectiveError::MalformedDeclaration => {
						InlineError::MalformedDeclaration {
							line: line_number,
							content: text.to_string(),
						}
					}
				}
			})?
			.with_language_aliases(language_aliases);

		let target = directive.target_path.display().to_string();
		let read_error = |source: io::Error| {
			if source.kind() == io::ErrorKind::NotFound {
				InlineError::ReferencedFileNotFound {
					path: target.clone(),
					line: line_number,
				}
			} else {
				InlineError::ReferencedFileRead {
					path: target.clone(),
					line: line_number,
					source,
				}
			}
		};
		let file = fs.open(&directive.target_path).map_err(read_error)?;
		let content = fs.read(file).map_err(read_error)?;

		tracing::debug!(
			line = line_number,
			target = %target,
			bytes = content.len(),
			"inlining referenced file"
		);

		output.push(b'\n');
		output.extend_from_slice(b"```");
		output.extend_from_slice(directive.language.as_bytes());
		output.push(b'\n');
		output.extend_from_slice(&content);
		if !content.is_empty() && !content.ends_with(b"\n") {
			output.push(b'\n');
		}
		output.extend_from_slice(b"```\n");
		output.extend_from_slice(END_MARKER_LINE.as_bytes());
		output.push(b'\n');
	}

	Ok(output)
}

fn emit(output: &mut Vec<u8>, line: &[u8]) {
	output.extend_from_slice(line);
	output.push(b'\n');
}
