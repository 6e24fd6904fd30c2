use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::InlineError;
use crate::InlineResult;

/// Default maximum file size in bytes (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"mdinline.toml",
	".mdinline.toml",
	".config/mdinline.toml",
];

/// Extensions scanned when no `extensions` key is configured.
pub const DEFAULT_EXTENSIONS: [&str; 1] = ["md"];

/// Configuration loaded from an `mdinline.toml` file.
///
/// ```toml
/// extensions = ["md", "markdown"]
/// max_file_size = 10485760
/// disable_gitignore = false
///
/// [exclude]
/// patterns = ["vendor/", "CHANGELOG.md"]
///
/// [include]
/// patterns = ["docs/**/*.txt"]
///
/// [languages]
/// rs = "rust"
/// ```
#[derive(Debug, Deserialize)]
pub struct InlinerConfig {
	/// File extensions (without the dot, case-insensitive) of documents to
	/// process.
	#[serde(default = "default_extensions")]
	pub extensions: Vec<String>,
	/// Exclusion configuration using gitignore-style patterns.
	#[serde(default)]
	pub exclude: ExcludeConfig,
	/// Inclusion configuration: extra glob patterns processed regardless of
	/// their extension.
	#[serde(default)]
	pub include: IncludeConfig,
	/// Extension to fence language overrides. The extension of the inlined
	/// file is used as the language tag unless it appears here.
	#[serde(default)]
	pub languages: HashMap<String, String>,
	/// Maximum document size in bytes. Larger documents abort the scan.
	/// Defaults to 10 MB.
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
	/// When true, `.gitignore` is not used for filtering.
	#[serde(default)]
	pub disable_gitignore: bool,
}

impl Default for InlinerConfig {
	fn default() -> Self {
		Self {
			extensions: default_extensions(),
			exclude: ExcludeConfig::default(),
			include: IncludeConfig::default(),
			languages: HashMap::new(),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
			disable_gitignore: false,
		}
	}
}

fn default_extensions() -> Vec<String> {
	DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect()
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}

/// Configuration for excluding files and directories from scanning.
///
/// Patterns follow gitignore syntax and are applied on top of any `.gitignore`
/// rules (unless `disable_gitignore` is set).
#[derive(Debug, Default, Deserialize)]
pub struct ExcludeConfig {
	/// Examples: `"build/"`, `"CHANGELOG.md"`, `"!important.md"`.
	#[serde(default)]
	pub patterns: Vec<String>,
}

/// Configuration for including additional files in scanning.
#[derive(Debug, Default, Deserialize)]
pub struct IncludeConfig {
	/// Glob patterns relative to the project root.
	#[serde(default)]
	pub patterns: Vec<String>,
}

impl InlinerConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> InlineResult<Option<InlinerConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		tracing::debug!(path = %config_path.display(), "loading config");
		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::from_toml(&content)?;

		Ok(Some(config))
	}

	pub fn from_toml(content: &str) -> InlineResult<InlinerConfig> {
		toml::from_str(content).map_err(|e| InlineError::ConfigParse(e.to_string()))
	}
}
