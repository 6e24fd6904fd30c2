mod common;

use mdinline_core::AnyEmptyResult;

const STALE_DOC: &str = "# Readme\n\n[//]: # (markdown:inline ./examples/full.go)\n\n```go\npackage old\n```\n[//]: # (markdown:end)\n";

fn stale_project() -> std::io::Result<tempfile::TempDir> {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			("readme.md", STALE_DOC),
			("examples/full.go", "package full"),
		],
	)?;
	Ok(tmp)
}

#[test]
fn check_passes_after_update() -> AnyEmptyResult {
	let tmp = stale_project()?;

	common::mdinline_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	common::mdinline_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Check passed"));

	Ok(())
}

#[test]
fn check_passes_without_directives() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(tmp.path(), &[("readme.md", "# Nothing to inline\n")])?;

	common::mdinline_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Check passed: 1 document(s)"));

	Ok(())
}

#[test]
fn check_fails_when_stale_and_does_not_write() -> AnyEmptyResult {
	let tmp = stale_project()?;

	common::mdinline_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("Stale documents:"))
		.stderr(predicates::str::contains("readme.md"))
		.stderr(predicates::str::contains("Run `mdinline update` to fix."));

	similar_asserts::assert_eq!(
		std::fs::read_to_string(tmp.path().join("readme.md"))?,
		STALE_DOC
	);

	Ok(())
}

#[test]
fn check_diff_shows_changed_lines() -> AnyEmptyResult {
	let tmp = stale_project()?;

	common::mdinline_cmd()
		.arg("check")
		.arg("--diff")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("-package old"))
		.stderr(predicates::str::contains("+package full"));

	Ok(())
}

#[test]
fn check_json_reports_stale_files() -> AnyEmptyResult {
	let tmp = stale_project()?;

	let output = common::mdinline_cmd()
		.arg("check")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.get_output()
		.stdout
		.clone();

	let json: serde_json::Value = serde_json::from_slice(&output)?;
	assert_eq!(json["ok"], serde_json::json!(false));
	assert_eq!(json["stale"], serde_json::json!([{ "file": "readme.md" }]));
	assert_eq!(json["errors"], serde_json::json!([]));

	Ok(())
}

#[test]
fn check_json_ok_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(tmp.path(), &[("readme.md", "plain")])?;

	common::mdinline_cmd()
		.arg("check")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("{\"ok\":true"));

	Ok(())
}

#[test]
fn check_github_emits_annotations() -> AnyEmptyResult {
	let tmp = stale_project()?;

	common::mdinline_cmd()
		.arg("check")
		.arg("--format")
		.arg("github")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::contains(
			"::warning file=readme.md::Inlined blocks are out of date",
		));

	Ok(())
}

#[test]
fn check_failure_exits_with_error_code() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[("readme.md", "\n[//]: # (markdown:inline ./missing.go)\n")],
	)?;

	let output = common::mdinline_cmd()
		.arg("check")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.get_output()
		.stdout
		.clone();

	let json: serde_json::Value = serde_json::from_slice(&output)?;
	assert_eq!(json["errors"][0]["file"], serde_json::json!("readme.md"));
	assert_eq!(json["errors"][0]["line"], serde_json::json!(2));

	Ok(())
}

#[test]
fn check_github_reports_failure_line() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[("readme.md", "[//]: # (markdown:inline)\n")],
	)?;

	common::mdinline_cmd()
		.arg("check")
		.arg("--format")
		.arg("github")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stdout(predicates::str::contains("::error file=readme.md,line=1::"));

	Ok(())
}
