//! The narrow file-system capability the inliner depends on.
//!
//! The core only ever opens, stats, and fully reads files. Keeping those three
//! operations behind [`FileSystem`] lets the rewrite passes run against an
//! in-memory [`MemoryFileSystem`] in tests and against the real disk via
//! [`OsFileSystem`] everywhere else.

use std::collections::BTreeMap;
use std::io;
use std::io::Cursor;
use std::io::Read;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Metadata returned by [`FileSystem::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
	pub is_dir: bool,
	/// Size in bytes. Zero for directories.
	pub len: u64,
}

pub trait FileSystem {
	type File: Read;

	/// Open a file for reading. Missing files must fail with
	/// [`io::ErrorKind::NotFound`].
	fn open(&self, path: &Path) -> io::Result<Self::File>;

	fn stat(&self, path: &Path) -> io::Result<FileStat>;

	/// Read the whole stream, byte for byte.
	fn read(&self, mut file: Self::File) -> io::Result<Vec<u8>> {
		let mut bytes = Vec::new();
		file.read_to_end(&mut bytes)?;
		Ok(bytes)
	}
}

/// The real file system. Relative paths resolve against `root`; absolute
/// paths are used as-is.
#[derive(Debug, Clone)]
pub struct OsFileSystem {
	root: PathBuf,
}

impl OsFileSystem {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn resolve(&self, path: &Path) -> PathBuf {
		self.root.join(path)
	}
}

impl FileSystem for OsFileSystem {
	type File = std::fs::File;

	fn open(&self, path: &Path) -> io::Result<Self::File> {
		std::fs::File::open(self.resolve(path))
	}

	fn stat(&self, path: &Path) -> io::Result<FileStat> {
		let metadata = std::fs::metadata(self.resolve(path))?;
		Ok(FileStat {
			is_dir: metadata.is_dir(),
			len: if metadata.is_dir() { 0 } else { metadata.len() },
		})
	}
}

#[derive(Debug, Clone)]
enum MemoryEntry {
	File(Vec<u8>),
	Dir,
}

/// An in-memory file system. Adding a file implicitly creates its parent
/// directories.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
	entries: BTreeMap<PathBuf, MemoryEntry>,
}

impl MemoryFileSystem {
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> Self {
		self.insert_file(path, contents);
		self
	}

	#[must_use]
	pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
		self.insert_dir(path.as_ref());
		self
	}

	/// Insert or overwrite a file.
	pub fn insert_file(&mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
		let key = normalize(path.as_ref());
		if let Some(parent) = key.parent() {
			self.insert_dir(parent);
		}
		self.entries.insert(key, MemoryEntry::File(contents.into()));
	}

	fn insert_dir(&mut self, path: &Path) {
		let key = normalize(path);
		for ancestor in key.ancestors() {
			if ancestor.as_os_str().is_empty() {
				continue;
			}
			self.entries
				.entry(ancestor.to_path_buf())
				.or_insert(MemoryEntry::Dir);
		}
	}

	/// The current bytes of a file, if it exists.
	pub fn contents(&self, path: impl AsRef<Path>) -> Option<&[u8]> {
		match self.entries.get(&normalize(path.as_ref()))? {
			MemoryEntry::File(bytes) => Some(bytes),
			MemoryEntry::Dir => None,
		}
	}

	fn entry(&self, path: &Path) -> io::Result<&MemoryEntry> {
		self.entries.get(&normalize(path)).ok_or_else(|| {
			io::Error::new(
				io::ErrorKind::NotFound,
				format!("no such file: {}", path.display()),
			)
		})
	}
}

impl FileSystem for MemoryFileSystem {
	type File = Cursor<Vec<u8>>;

	fn open(&self, path: &Path) -> io::Result<Self::File> {
		match self.entry(path)? {
			MemoryEntry::File(bytes) => Ok(Cursor::new(bytes.clone())),
			MemoryEntry::Dir => Err(io::Error::other(format!(
				"is a directory: {}",
				path.display()
			))),
		}
	}

	fn stat(&self, path: &Path) -> io::Result<FileStat> {
		Ok(match self.entry(path)? {
			MemoryEntry::File(bytes) => {
				FileStat {
					is_dir: false,
					len: bytes.len() as u64,
				}
			}
			MemoryEntry::Dir => FileStat { is_dir: true, len: 0 },
		})
	}
}

/// Drop `.` components so `./a/b` and `a/b` share a key.
fn normalize(path: &Path) -> PathBuf {
	path.components()
		.filter(|component| !matches!(component, Component::CurDir))
		.collect()
}
