mod common;

use mdinline_core::AnyEmptyResult;

const DIRECTIVE: &str = "[//]: # (markdown:inline ./src/lib.rs)\n";

#[test]
fn config_extensions_select_documents() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			("mdinline.toml", "extensions = [\"markdown\"]\n"),
			("guide.markdown", DIRECTIVE),
			("readme.md", DIRECTIVE),
			("src/lib.rs", "pub fn it() {}\n"),
		],
	)?;

	common::mdinline_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	assert!(std::fs::read_to_string(tmp.path().join("guide.markdown"))?.contains("pub fn it()"));
	similar_asserts::assert_eq!(
		std::fs::read_to_string(tmp.path().join("readme.md"))?,
		DIRECTIVE
	);

	Ok(())
}

#[test]
fn config_languages_from_dot_config_dir() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			(".config/mdinline.toml", "[languages]\nrs = \"rust\"\n"),
			("readme.md", DIRECTIVE),
			("src/lib.rs", "pub fn it() {}\n"),
		],
	)?;

	common::mdinline_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	assert!(std::fs::read_to_string(tmp.path().join("readme.md"))?.contains("```rust\n"));

	Ok(())
}

#[test]
fn config_prefers_mdinline_toml_over_other_candidates() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			("mdinline.toml", "[languages]\nrs = \"rust\"\n"),
			(".mdinline.toml", "[languages]\nrs = \"rs-dot\"\n"),
			("readme.md", DIRECTIVE),
			("src/lib.rs", "pub fn it() {}\n"),
		],
	)?;

	common::mdinline_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let content = std::fs::read_to_string(tmp.path().join("readme.md"))?;
	assert!(content.contains("```rust\n"));
	assert!(!content.contains("rs-dot"));

	Ok(())
}

#[test]
fn config_exclude_patterns_skip_documents() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			(".mdinline.toml", "[exclude]\npatterns = [\"vendor/\"]\n"),
			("vendor/readme.md", DIRECTIVE),
			("readme.md", DIRECTIVE),
			("src/lib.rs", "pub fn it() {}\n"),
		],
	)?;

	common::mdinline_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Updated 1 file(s)."));

	similar_asserts::assert_eq!(
		std::fs::read_to_string(tmp.path().join("vendor/readme.md"))?,
		DIRECTIVE
	);

	Ok(())
}

#[test]
fn invalid_config_is_an_error() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[("mdinline.toml", "extensions = ["), ("readme.md", DIRECTIVE)],
	)?;

	common::mdinline_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("mdinline::config_parse"));

	Ok(())
}
