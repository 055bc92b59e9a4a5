//! Ref diagnosis and repair

use super::reflog::RefLogEntry;
use super::refs::RefFamily;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};

/// Outcome of diagnosing one ref family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueStatus {
	/// Every ref is well-formed.
	None,
	/// Damage was found and repair may be attempted.
	Fixable,
	/// Damage was found but an in-progress git operation forbids repair.
	/// `try_fix` must not be invoked.
	CantFix,
}

/// Outcome of a repair pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixResult {
	Success,
	Failure,
}

/// Git operations whose in-progress markers forbid any ref rewrite.
const REPAIR_BLOCKING_OPERATIONS: &[(&str, &str)] = &[
	("rebase-apply", "rebase"),
	("MERGE_HEAD", "merge"),
	("BISECT_START", "bisect"),
	("CHERRY_PICK_HEAD", "cherry-pick"),
	("REVERT_HEAD", "revert"),
];

/// Diagnoses and repairs one family of refs inside an enlistment.
///
/// Works on the bare files under `.git/`; the repo may be too damaged for
/// git itself to run. User-facing diagnostics accumulate in the caller's
/// message buffer; per-ref failures never abort the surrounding pass.
pub struct RefRepairer<F> {
	git_dir: PathBuf,
	family: F,
}

impl<F: RefFamily> RefRepairer<F> {
	pub fn new(enlistment_root: &Path, family: F) -> Self {
		Self {
			git_dir: enlistment_root.join(".git"),
			family,
		}
	}

	/// Validate every ref of the family, appending a diagnostic per damaged
	/// ref, then decide whether repair is allowed.
	pub fn has_issue(&self, messages: &mut Vec<String>) -> IssueStatus {
		let _activity = info_span!("ref_diagnosis", family = self.family.name()).entered();

		let refs = match self.family.enumerate_refs(&self.git_dir) {
			Ok(refs) => refs,
			Err(err) => {
				messages.push(format!(
					"Could not enumerate {}: {}",
					self.family.name(),
					err
				));
				return self.blocked_or_fixable(messages);
			}
		};

		let mut bad_refs = 0;
		for ref_name in &refs {
			if !self.validate_ref(ref_name, messages) {
				bad_refs += 1;
			}
		}

		if bad_refs == 0 {
			return IssueStatus::None;
		}

		warn!(
			family = self.family.name(),
			bad_refs, "found damaged refs"
		);
		self.blocked_or_fixable(messages)
	}

	/// Rewrite every still-invalid ref from the tail of its reflog.
	///
	/// All-or-nothing as a result, not as an effect: refs repaired before a
	/// later failure stay repaired. A no-op when nothing needs repair.
	pub fn try_fix(&self, messages: &mut Vec<String>) -> FixResult {
		let _activity = info_span!("ref_repair", family = self.family.name()).entered();

		let refs = match self.family.enumerate_refs(&self.git_dir) {
			Ok(refs) => refs,
			Err(err) => {
				messages.push(format!(
					"Could not enumerate {}: {}",
					self.family.name(),
					err
				));
				return FixResult::Failure;
			}
		};

		let mut failed = 0;
		for ref_name in &refs {
			if self.ref_is_intact(ref_name) {
				continue;
			}
			if !self.try_write_ref_from_log(ref_name, messages) {
				failed += 1;
			}
		}

		if failed > 0 {
			messages.push(format!(
				"Not all references could be fixed. Failed to fix {} references.",
				failed
			));
			return FixResult::Failure;
		}

		FixResult::Success
	}

	fn blocked_or_fixable(&self, messages: &mut Vec<String>) -> IssueStatus {
		let mut blocked = false;
		for (marker, operation) in REPAIR_BLOCKING_OPERATIONS {
			if self.git_dir.join(marker).exists() {
				messages.push(format!(
					"Can't repair while a {} operation is in progress",
					operation
				));
				blocked = true;
			}
		}

		if blocked {
			IssueStatus::CantFix
		} else {
			IssueStatus::Fixable
		}
	}

	/// Read and validate one ref, appending a diagnostic when it fails.
	fn validate_ref(&self, ref_name: &str, messages: &mut Vec<String>) -> bool {
		let path = self.ref_path(ref_name);
		match fs::read_to_string(&path) {
			Ok(contents) => {
				if self.family.is_valid_ref_contents(ref_name, &contents) {
					true
				} else {
					messages.push(format!(
						"Invalid contents found in '{}': {}",
						path.display(),
						contents.trim_end()
					));
					false
				}
			}
			Err(err) => {
				messages.push(format!("Could not read '{}': {}", path.display(), err));
				false
			}
		}
	}

	/// Quiet re-validation used by `try_fix` to pick its work set.
	fn ref_is_intact(&self, ref_name: &str) -> bool {
		match fs::read_to_string(self.ref_path(ref_name)) {
			Ok(contents) => self.family.is_valid_ref_contents(ref_name, &contents),
			Err(_) => false,
		}
	}

	fn try_write_ref_from_log(&self, ref_name: &str, messages: &mut Vec<String>) -> bool {
		let log_path = self.reflog_path(ref_name);
		let log = match fs::read_to_string(&log_path) {
			Ok(log) => log,
			Err(err) => {
				messages.push(format!("Could not read reflog for '{}': {}", ref_name, err));
				return false;
			}
		};

		let Some(last_line) = log.lines().last() else {
			messages.push(format!("Reflog for '{}' is empty", ref_name));
			return false;
		};

		let Some(entry) = RefLogEntry::parse(last_line) else {
			messages.push(format!(
				"Could not parse reflog entry for '{}': {}",
				ref_name, last_line
			));
			return false;
		};

		let ref_path = self.ref_path(ref_name);
		if let Some(parent) = ref_path.parent() {
			if let Err(err) = fs::create_dir_all(parent) {
				messages.push(format!("Could not write '{}': {}", ref_path.display(), err));
				return false;
			}
		}

		match fs::write(&ref_path, format!("{}\n", entry.target_sha)) {
			Ok(()) => {
				info!(
					reference = ref_name,
					sha = %entry.target_sha,
					"repaired ref from its reflog"
				);
				true
			}
			Err(err) => {
				messages.push(format!("Could not write '{}': {}", ref_path.display(), err));
				false
			}
		}
	}

	/// On-disk path of a full symbolic ref.
	fn ref_path(&self, ref_name: &str) -> PathBuf {
		let mut path = self.git_dir.clone();
		for part in ref_name.split('/') {
			path.push(part);
		}
		path
	}

	/// Reflogs mirror the ref namespace under `logs/`.
	fn reflog_path(&self, ref_name: &str) -> PathBuf {
		let mut path = self.git_dir.join("logs");
		for part in ref_name.split('/') {
			path.push(part);
		}
		path
	}
}
