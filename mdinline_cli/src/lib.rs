use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Keep the code samples in your markdown in sync with the files they came from.",
	long_about = "mdinline copies the content of source files into your markdown documents.\n\nAdd \
	              a directive inside a markdown comment and every run replaces the fenced block \
	              after it with the current content of the referenced file:\n\n  [//]: # \
	              (markdown:inline ./examples/main.go)\n\nQuick start:\n  mdinline update  \
	              Regenerate every inlined block\n  mdinline check   Verify everything is up to \
	              date\n  mdinline list    Show the directives in each document"
)]
pub struct MdinlineCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Regenerate the inlined blocks of every document.
	///
	/// Every `markdown:inline` directive is followed by a fenced code block
	/// holding the current content of the file it names. Blocks written by an
	/// earlier run are replaced. Documents without directives are never
	/// touched.
	///
	/// Use `--dry-run` to preview changes without writing to disk, or
	/// `--watch` to automatically re-run whenever files change.
	Update {
		/// Preview changes without writing files. Prints which files would
		/// be modified.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Watch for file changes and re-run updates automatically.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// Check that every inlined block is up to date.
	///
	/// Computes what `update` would write for each document without writing
	/// it. Exits with status 1 if any document is stale and status 2 if any
	/// document could not be processed.
	Check {
		/// Show a line diff for each stale document.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results. Use `text` for human-readable
		/// output, `json` for programmatic consumption, or `github` for
		/// GitHub Actions annotations that appear inline on PRs.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List the directives found in every document.
	///
	/// Shows each directive with its line number and the file it inlines.
	/// Malformed directives and missing targets are flagged.
	List,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
	/// GitHub Actions annotation format. Emits `::warning` or `::error`
	/// annotations that appear inline on pull request diffs.
	Github,
}
