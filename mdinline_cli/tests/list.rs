mod common;

use mdinline_core::AnyEmptyResult;

#[test]
fn list_shows_directives_per_document() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			(
				"readme.md",
				"# Readme\n\n[//]: # (markdown:inline ./examples/full.go)\n\n[//]: # \
				 (markdown:inline ./examples/missing.go)\n\nmarkdown:inline nowhere.go\n",
			),
			("examples/full.go", "package full"),
		],
	)?;

	common::mdinline_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("readme.md\n"))
		.stdout(predicates::str::contains("  3: examples/full.go\n"))
		.stdout(predicates::str::contains("  5: examples/missing.go (missing)"))
		.stdout(predicates::str::contains("  7: malformed:"))
		.stdout(predicates::str::contains("3 directive(s) in 1 document(s)."));

	Ok(())
}

#[test]
fn list_without_directives() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(tmp.path(), &[("readme.md", "# Nothing here\n")])?;

	common::mdinline_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("No inline directives found."));

	Ok(())
}
