use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use mdinline_cli::Commands;
use mdinline_cli::MdinlineCli;
use mdinline_cli::OutputFormat;
use mdinline_core::FileSystem;
use mdinline_core::InlineError;
use mdinline_core::check_project;
use mdinline_core::compute_updates;
use mdinline_core::project::CheckResult;
use mdinline_core::project::DocumentFailure;
use mdinline_core::project::ProjectContext;
use mdinline_core::project::find_directives;
use mdinline_core::project::scan_project_with_config;
use mdinline_core::write_updates;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

/// Environment variable holding the log filter directives.
const LOG_ENV: &str = "MDINLINE_LOG";

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = MdinlineCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match args.command {
		Some(Commands::Update { dry_run, watch }) => run_update(&args, dry_run, watch),
		Some(Commands::Check { diff, format }) => run_check(&args, diff, format),
		Some(Commands::List) => run_list(&args),
		None => {
			eprintln!("No subcommand specified. Run `mdinline --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Core errors carry error codes and help text.
		match e.downcast::<InlineError>() {
			Ok(inline_err) => {
				let report: miette::Report = (*inline_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

fn init_tracing(verbose: bool) {
	let default_directives = if verbose {
		"mdinline_core=debug,mdinline=debug"
	} else {
		"warn"
	};
	let filter =
		EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directives));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.without_time()
		.init();
}

/// The project root as an absolute path, so it prefixes the scanned document
/// paths.
fn resolve_root(args: &MdinlineCli) -> PathBuf {
	let root = args
		.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
	std::path::absolute(&root).unwrap_or(root)
}

fn scan(args: &MdinlineCli) -> Result<ProjectContext, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let ctx = scan_project_with_config(&root)?;

	if args.verbose {
		println!("Scanned project: {} document(s)", ctx.documents.len());
	}

	Ok(ctx)
}

fn run_update(
	args: &MdinlineCli,
	dry_run: bool,
	watch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	// Run the initial update.
	let has_failures = run_update_once(args, dry_run)?;

	if !watch || dry_run {
		if has_failures {
			process::exit(2);
		}
		return Ok(());
	}

	// Watch mode
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let root = resolve_root(args);
	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_) | notify::EventKind::Create(_)
				) {
					tracing::debug!(paths = ?event.paths, "file change detected");
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, updating...");
		if let Err(e) = run_update_once(args, false) {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

/// Run a single update pass and return whether any document failed.
fn run_update_once(args: &MdinlineCli, dry_run: bool) -> Result<bool, Box<dyn std::error::Error>> {
	let ctx = scan(args)?;
	let root = resolve_root(args);
	let updates = compute_updates(&ctx);

	if updates.updated_files.is_empty() {
		if !updates.has_failures() {
			println!("All documents are already up to date.");
		}
	} else if dry_run {
		println!(
			"Dry run: would update {} file(s):",
			updates.updated_files.len()
		);
		for updated in &updates.updated_files {
			let rel = make_relative(&updated.document.path, &root);
			println!("  {rel}");
		}
	} else {
		write_updates(&updates)?;
		println!("Updated {} file(s).", updates.updated_files.len());

		if args.verbose {
			for updated in &updates.updated_files {
				let rel = make_relative(&updated.document.path, &root);
				println!("  {rel}");
			}
		}
	}

	let has_failures = updates.has_failures();
	print_failures(updates.failures, &root);

	Ok(has_failures)
}

fn run_check(
	args: &MdinlineCli,
	show_diff: bool,
	format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
	let ctx = scan(args)?;
	let root = resolve_root(args);
	let result = check_project(&ctx);

	if result.is_ok() {
		match format {
			OutputFormat::Json => {
				println!("{{\"ok\":true,\"stale\":[],\"errors\":[]}}");
			}
			OutputFormat::Github => {
				println!("All inlined blocks are up to date.");
			}
			OutputFormat::Text => {
				println!(
					"Check passed: {} document(s) are up to date.",
					result.checked_count
				);
			}
		}
		return Ok(());
	}

	match format {
		OutputFormat::Json => {
			let stale_entries: Vec<serde_json::Value> = result
				.stale
				.iter()
				.map(|entry| {
					serde_json::json!({
						"file": make_relative(&entry.file, &root),
					})
				})
				.collect();
			let error_entries: Vec<serde_json::Value> = result
				.failures
				.iter()
				.map(|failure| {
					serde_json::json!({
						"file": make_relative(&failure.file, &root),
						"line": failure.error.line(),
						"message": failure.error.to_string(),
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": false,
				"stale": stale_entries,
				"errors": error_entries,
			});
			println!("{output}");
		}
		OutputFormat::Github => {
			for failure in &result.failures {
				let rel = make_relative(&failure.file, &root);
				let location = match failure.error.line() {
					Some(line) => format!("file={rel},line={line}"),
					None => format!("file={rel}"),
				};
				println!("::error {location}::{}", failure.error);
			}
			for entry in &result.stale {
				let rel = make_relative(&entry.file, &root);
				println!("::warning file={rel}::Inlined blocks are out of date");
			}
			eprintln!("{}", check_summary(&result));
		}
		OutputFormat::Text => {
			eprintln!("Check failed.");
			eprintln!("  failed documents: {}", result.failures.len());
			eprintln!("  stale documents: {}", result.stale.len());

			if !result.stale.is_empty() {
				eprintln!();
				eprintln!("Stale documents:");
				for entry in &result.stale {
					let rel = make_relative(&entry.file, &root);
					eprintln!("  {rel}");

					if show_diff {
						print_diff(&entry.current_content, &entry.expected_content);
					}
				}
			}

			eprintln!();
			eprintln!("{}", check_summary(&result));
		}
	}

	let has_failures = !result.failures.is_empty();
	if matches!(format, OutputFormat::Text) {
		print_failures(result.failures, &root);
	}

	process::exit(if has_failures { 2 } else { 1 });
}

fn check_summary(result: &CheckResult) -> String {
	let mut parts = Vec::new();
	if !result.failures.is_empty() {
		parts.push(format!(
			"{} document(s) could not be processed",
			result.failures.len()
		));
	}
	if !result.stale.is_empty() {
		parts.push(format!("{} document(s) are out of date", result.stale.len()));
	}
	format!("{}. Run `mdinline update` to fix.", parts.join(" and "))
}

fn run_list(args: &MdinlineCli) -> Result<(), Box<dyn std::error::Error>> {
	let ctx = scan(args)?;
	let root = resolve_root(args);
	let mut directive_count = 0;
	let mut document_count = 0;

	for document in &ctx.documents {
		let content = std::fs::read(&document.path)?;
		let entries = find_directives(&content);
		if entries.is_empty() {
			continue;
		}

		if document_count > 0 {
			println!();
		}
		document_count += 1;
		directive_count += entries.len();

		let rel = make_relative(&document.path, &root);
		println!("{}", colored!(rel, bold));

		for entry in entries {
			match entry.directive {
				Ok(directive) => {
					let target = directive.target_path.display().to_string();
					if ctx.inliner.fs().stat(&directive.target_path).is_ok() {
						println!("  {}: {target}", entry.line);
					} else {
						println!(
							"  {}: {target} {}",
							entry.line,
							colored!("(missing)", yellow)
						);
					}
				}
				Err(error) => {
					println!(
						"  {}: {} {error}",
						entry.line,
						colored!("malformed:", red)
					);
				}
			}
		}
	}

	if document_count == 0 {
		println!("No inline directives found.");
	} else {
		println!();
		println!("{directive_count} directive(s) in {document_count} document(s).");
	}

	Ok(())
}

/// Render every document failure through miette.
fn print_failures(failures: Vec<DocumentFailure>, root: &Path) {
	for failure in failures {
		let rel = make_relative(&failure.file, root);
		let report = miette::Report::new(failure.error).wrap_err(format!("failed to update {rel}"));
		eprintln!("{report:?}");
	}
}

/// Print a line diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
