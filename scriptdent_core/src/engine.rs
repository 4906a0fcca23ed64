use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::instrument;
use tracing::warn;

use crate::Diagnostic;
use crate::EmbeddedRegion;
use crate::HostKind;
use crate::IndentConfig;
use crate::LineTable;
use crate::ScriptdentError;
use crate::ScriptdentResult;
use crate::apply_fixes;
use crate::compare::compare;
use crate::constraints;
use crate::find_regions;
use crate::lexer::classify;
use crate::parser::parse;
use crate::project::Project;
use crate::resolver::resolve;
use crate::selector::Selector;
use crate::suppression::suppress;

/// A region that could not be checked. The other regions of the document are
/// unaffected.
#[derive(Debug)]
pub struct RegionError {
	/// The host line that opens the region.
	pub root_line: usize,
	pub error: ScriptdentError,
}

/// Result of checking one host document.
#[derive(Debug, Default)]
pub struct DocumentReport {
	/// Number of embedded regions found.
	pub regions: usize,
	/// Diagnostics of every checked region, ordered by line then column.
	pub diagnostics: Vec<Diagnostic>,
	pub region_errors: Vec<RegionError>,
}

impl DocumentReport {
	/// Returns true when there is nothing to report.
	pub fn is_ok(&self) -> bool {
		self.diagnostics.is_empty() && self.region_errors.is_empty()
	}

	pub fn has_errors(&self) -> bool {
		!self.region_errors.is_empty()
	}

	/// Number of diagnostics carrying a fix.
	pub fn fixable(&self) -> usize {
		self.diagnostics
			.iter()
			.filter(|diagnostic| diagnostic.fix.is_some())
			.count()
	}
}

/// Checks embedded scripts against one indentation configuration.
#[derive(Debug, Clone)]
pub struct Checker {
	config: IndentConfig,
	selectors: Vec<Selector>,
}

impl Checker {
	/// Validate `config` and compile its `ignores` selectors.
	pub fn new(config: IndentConfig) -> ScriptdentResult<Self> {
		config.validate()?;
		let selectors = config.selectors()?;

		Ok(Self { config, selectors })
	}

	pub fn config(&self) -> &IndentConfig {
		&self.config
	}

	/// Run the whole pipeline over a single region. A malformed script fails
	/// the region without reporting anything for it.
	#[instrument(skip_all, fields(root_line = region.root_line, start = region.range.start))]
	pub fn check_region(
		&self,
		source: &str,
		table: &LineTable,
		region: &EmbeddedRegion,
	) -> ScriptdentResult<Vec<Diagnostic>> {
		let tokens = classify(source, region.range.clone(), table)?;
		debug!(tokens = tokens.len(), "classified region");

		let program = parse(&tokens)?;
		let constraints = constraints::build(&tokens, &program, &self.config);
		debug!(constraints = constraints.len(), "built constraints");

		let resolved = resolve(&tokens, &constraints)?;
		let suppressions = suppress(&tokens, &program, &self.selectors);
		debug!(
			lines = resolved.len(),
			suppressed = suppressions.len(),
			"resolved indentation"
		);

		let mut diagnostics = compare(
			source,
			table,
			region,
			&resolved,
			&suppressions,
			&self.config,
		);
		diagnostics.sort_by_key(|diagnostic| (diagnostic.line, diagnostic.column));
		debug!(diagnostics = diagnostics.len(), "compared region");

		Ok(diagnostics)
	}

	/// Check every embedded region of a host document.
	pub fn check_document(&self, source: &str, kind: HostKind) -> ScriptdentResult<DocumentReport> {
		let regions = find_regions(source, kind)?;
		Ok(self.check_regions(source, &regions))
	}

	/// Check a standalone script, treated as a single region with no host
	/// indentation.
	pub fn check_script(&self, source: &str) -> ScriptdentResult<Vec<Diagnostic>> {
		let table = LineTable::new(source);
		self.check_region(source, &table, &EmbeddedRegion::whole(source))
	}

	/// Check the given regions of `source`, collecting per-region failures.
	pub fn check_regions(&self, source: &str, regions: &[EmbeddedRegion]) -> DocumentReport {
		let table = LineTable::new(source);
		let mut report = DocumentReport {
			regions: regions.len(),
			..DocumentReport::default()
		};

		for region in regions {
			match self.check_region(source, &table, region) {
				Ok(diagnostics) => report.diagnostics.extend(diagnostics),
				Err(error) => {
					warn!(root_line = region.root_line, %error, "skipping region");
					report.region_errors.push(RegionError {
						root_line: region.root_line,
						error,
					});
				}
			}
		}

		report
			.diagnostics
			.sort_by_key(|diagnostic| (diagnostic.line, diagnostic.column));
		report
	}

	/// Check a host document and apply every fix. Returns the rewritten
	/// source together with the report it was computed from.
	pub fn fix_document(
		&self,
		source: &str,
		kind: HostKind,
	) -> ScriptdentResult<(String, DocumentReport)> {
		let report = self.check_document(source, kind)?;
		let fixed = apply_fixes(source, &report.diagnostics);

		Ok((fixed, report))
	}

	/// Read and check one file. Files without a known host extension yield an
	/// empty report.
	pub fn check_file(&self, path: &Path) -> ScriptdentResult<DocumentReport> {
		let Some(kind) = HostKind::from_path(path) else {
			debug!(path = %path.display(), "not a host document");
			return Ok(DocumentReport::default());
		};

		let source = std::fs::read_to_string(path)?;
		self.check_document(&source, kind)
	}
}

/// Reports for every file of a project, keyed by path.
#[derive(Debug, Default)]
pub struct CheckResult {
	pub files: BTreeMap<PathBuf, DocumentReport>,
	/// Files that could not be read or whose host structure is broken.
	pub file_errors: Vec<(PathBuf, ScriptdentError)>,
}

impl CheckResult {
	/// Returns true if no file has diagnostics or errors.
	pub fn is_ok(&self) -> bool {
		self.file_errors.is_empty() && self.files.values().all(DocumentReport::is_ok)
	}

	pub fn has_errors(&self) -> bool {
		!self.file_errors.is_empty() || self.files.values().any(DocumentReport::has_errors)
	}

	pub fn diagnostic_count(&self) -> usize {
		self.files.values().map(|report| report.diagnostics.len()).sum()
	}
}

/// Result of fixing a project.
#[derive(Debug, Default)]
pub struct FixResult {
	/// Files whose content changed, with their original and new content.
	pub updated_files: BTreeMap<PathBuf, (String, String)>,
	/// Number of fixes applied.
	pub fixed_count: usize,
	pub check: CheckResult,
}

/// Check every file selected by `project`.
pub fn check_project(project: &Project, checker: &Checker) -> CheckResult {
	check_files(&project.files, checker)
}

/// Check an explicit list of files.
pub fn check_files(files: &[PathBuf], checker: &Checker) -> CheckResult {
	let mut result = CheckResult::default();

	for file in files {
		match checker.check_file(file) {
			Ok(report) => {
				result.files.insert(file.clone(), report);
			}
			Err(error) => result.file_errors.push((file.clone(), error)),
		}
	}

	result
}

/// Compute the fixed content of every file without writing anything.
pub fn compute_fixes(files: &[PathBuf], checker: &Checker) -> FixResult {
	let mut result = FixResult::default();

	for file in files {
		let Some(kind) = HostKind::from_path(file) else {
			continue;
		};

		let outcome = std::fs::read_to_string(file)
			.map_err(ScriptdentError::from)
			.and_then(|source| {
				checker
					.fix_document(&source, kind)
					.map(|(fixed, report)| (source, fixed, report))
			});

		match outcome {
			Ok((source, fixed, report)) => {
				result.fixed_count += report.fixable();
				if fixed != source {
					result.updated_files.insert(file.clone(), (source, fixed));
				}
				result.check.files.insert(file.clone(), report);
			}
			Err(error) => result.check.file_errors.push((file.clone(), error)),
		}
	}

	result
}

/// Write the fixed content of each updated file to disk.
pub fn write_fixes(fixes: &FixResult) -> ScriptdentResult<()> {
	for (path, (_, content)) in &fixes.updated_files {
		std::fs::write(path, content)?;
	}

	Ok(())
}
