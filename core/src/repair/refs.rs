//! Ref families and contents validation

use std::fs;
use std::io;
use std::path::Path;

/// One family of refs the repair engine can diagnose.
///
/// A family knows how to enumerate its refs on disk and what well-formed
/// contents look like; the engine supplies everything else.
pub trait RefFamily {
	/// Human name used in diagnostics.
	fn name(&self) -> &'static str;

	/// Full symbolic names (`HEAD`, `refs/heads/...`) of every ref of this
	/// family present in `git_dir`.
	fn enumerate_refs(&self, git_dir: &Path) -> io::Result<Vec<String>>;

	fn is_valid_ref_contents(&self, _ref_name: &str, contents: &str) -> bool {
		valid_ref_contents(contents)
	}
}

/// A ref file is valid when, after trimming trailing whitespace, it is a
/// symbolic ref (`ref: refs/...`, case-insensitive) or a 40-character
/// lowercase hex SHA-1.
pub fn valid_ref_contents(contents: &str) -> bool {
	let trimmed = contents.trim_end();
	is_symbolic_ref(trimmed) || is_valid_sha(trimmed)
}

fn is_symbolic_ref(contents: &str) -> bool {
	const PREFIX: &[u8] = b"ref: refs/";
	contents.len() >= PREFIX.len() && contents.as_bytes()[..PREFIX.len()].eq_ignore_ascii_case(PREFIX)
}

pub(crate) fn is_valid_sha(contents: &str) -> bool {
	contents.len() == 40
		&& contents
			.bytes()
			.all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// The single symbolic ref `HEAD`.
pub struct HeadRefs;

impl RefFamily for HeadRefs {
	fn name(&self) -> &'static str {
		"HEAD"
	}

	fn enumerate_refs(&self, _git_dir: &Path) -> io::Result<Vec<String>> {
		Ok(vec!["HEAD".to_string()])
	}
}

/// Every local branch under `refs/heads/`, recursively.
pub struct LocalBranchRefs;

impl RefFamily for LocalBranchRefs {
	fn name(&self) -> &'static str {
		"local branches"
	}

	fn enumerate_refs(&self, git_dir: &Path) -> io::Result<Vec<String>> {
		let heads = git_dir.join("refs").join("heads");
		if !heads.is_dir() {
			return Ok(Vec::new());
		}

		let mut refs = Vec::new();
		let mut pending = vec![heads.clone()];
		while let Some(dir) = pending.pop() {
			for entry in fs::read_dir(&dir)? {
				let entry = entry?;
				let path = entry.path();
				if entry.file_type()?.is_dir() {
					pending.push(path);
				} else if let Ok(relative) = path.strip_prefix(&heads) {
					let name = relative
						.components()
						.map(|c| c.as_os_str().to_string_lossy())
						.collect::<Vec<_>>()
						.join("/");
					refs.push(format!("refs/heads/{}", name));
				}
			}
		}

		// Deterministic diagnostics regardless of directory order.
		refs.sort();
		Ok(refs)
	}
}
