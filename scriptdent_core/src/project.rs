use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;
use tracing::debug;

use crate::FilesConfig;
use crate::HostKind;
use crate::ScriptdentConfig;
use crate::ScriptdentError;
use crate::ScriptdentResult;

/// A project root together with its configuration and the host documents it
/// covers.
#[derive(Debug, Clone)]
pub struct Project {
	pub root: PathBuf,
	pub config: ScriptdentConfig,
	/// Absolute paths of every host document to check, sorted.
	pub files: Vec<PathBuf>,
}

impl Project {
	/// Load the configuration at `root` (defaults when there is none) and
	/// collect the files it selects.
	pub fn scan(root: &Path) -> ScriptdentResult<Self> {
		let config = ScriptdentConfig::load(root)?.unwrap_or_default();
		Self::with_config(root, config)
	}

	pub fn with_config(root: &Path, config: ScriptdentConfig) -> ScriptdentResult<Self> {
		let files = collect_files(root, &config.files)?;
		debug!(root = %root.display(), files = files.len(), "scanned project");

		Ok(Self {
			root: root.to_path_buf(),
			config,
			files,
		})
	}
}

/// Build a `GlobSet` from a list of glob pattern strings.
fn build_glob_set(patterns: &[String]) -> ScriptdentResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| {
			ScriptdentError::ConfigParse(format!("invalid include pattern `{pattern}`: {e}"))
		})?;
		builder.add(glob);
	}
	builder
		.build()
		.map_err(|e| ScriptdentError::ConfigParse(format!("failed to build include rules: {e}")))
}

/// Build a `Gitignore` matcher from the `[files] exclude` patterns. These
/// follow `.gitignore` syntax and are applied on top of any `.gitignore`
/// rules.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> ScriptdentResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			ScriptdentError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| ScriptdentError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

/// Build a `Gitignore` matcher from the project's `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		let _ = builder.add(gitignore_path);
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

/// Collect every host document under `root`.
///
/// When `include` is empty every file with a known host extension is
/// collected; otherwise only files whose root-relative path matches one of
/// the globs. Files matched by the project's `.gitignore` (unless disabled)
/// or by `exclude` are skipped.
pub fn collect_files(root: &Path, files_config: &FilesConfig) -> ScriptdentResult<Vec<PathBuf>> {
	let mut files = Vec::new();
	let mut visited_dirs = HashSet::new();

	let gitignore = if files_config.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let custom_exclude = build_exclude_matcher(root, &files_config.exclude)?;
	let include = if files_config.include.is_empty() {
		None
	} else {
		Some(build_glob_set(&files_config.include)?)
	};

	let filters = Filters {
		root,
		gitignore: &gitignore,
		custom_exclude: &custom_exclude,
		include: include.as_ref(),
	};
	walk_dir(&filters, root, &mut files, &mut visited_dirs)?;
	// Sort for deterministic ordering.
	files.sort();

	Ok(files)
}

struct Filters<'a> {
	root: &'a Path,
	gitignore: &'a Gitignore,
	custom_exclude: &'a Gitignore,
	include: Option<&'a GlobSet>,
}

impl Filters<'_> {
	fn is_excluded(&self, path: &Path, is_dir: bool) -> bool {
		self.gitignore.matched(path, is_dir).is_ignore()
			|| self.custom_exclude.matched(path, is_dir).is_ignore()
	}

	fn is_included(&self, path: &Path) -> bool {
		if HostKind::from_path(path).is_none() {
			return false;
		}

		match self.include {
			None => true,
			Some(include) => {
				path.strip_prefix(self.root)
					.is_ok_and(|relative| include.is_match(relative))
			}
		}
	}
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}

fn walk_dir(
	filters: &Filters<'_>,
	dir: &Path,
	files: &mut Vec<PathBuf>,
	visited_dirs: &mut HashSet<PathBuf>,
) -> ScriptdentResult<()> {
	if !dir.is_dir() {
		return Ok(());
	}

	// Symlinked directories may lead back to an ancestor.
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !visited_dirs.insert(canonical) {
		debug!(dir = %dir.display(), "skipping directory visited through a symlink");
		return Ok(());
	}

	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();
		let is_dir = path.is_dir();

		if is_dir
			&& path
				.file_name()
				.and_then(|name| name.to_str())
				.is_some_and(is_ignored_directory_name)
		{
			continue;
		}

		if filters.is_excluded(&path, is_dir) {
			continue;
		}

		if is_dir {
			walk_dir(filters, &path, files, visited_dirs)?;
		} else if filters.is_included(&path) {
			files.push(path);
		}
	}

	Ok(())
}
