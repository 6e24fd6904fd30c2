use assert_cmd::Command;

pub fn mdinline_cmd() -> Command {
	let mut cmd = Command::new(env!("CARGO_BIN_EXE_mdinline"));
	cmd.env("NO_COLOR", "1").env_remove("MDINLINE_LOG");
	cmd
}

/// Write `files` (relative path, content) under `root`, creating parent
/// directories as needed.
pub fn write_files(root: &std::path::Path, files: &[(&str, &str)]) -> std::io::Result<()> {
	for (path, content) in files {
		let path = root.join(path);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(path, content)?;
	}
	Ok(())
}
