use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use scriptdent_cli::Commands;
use scriptdent_cli::OutputFormat;
use scriptdent_cli::ScriptdentCli;
use scriptdent_core::AnyEmptyResult;
use scriptdent_core::AnyResult;
use scriptdent_core::CheckResult;
use scriptdent_core::Checker;
use scriptdent_core::DEFAULT_CONFIG;
use scriptdent_core::Project;
use scriptdent_core::ScriptdentConfig;
use scriptdent_core::UnitCharacter;
use scriptdent_core::check_files;
use scriptdent_core::compute_fixes;
use scriptdent_core::write_fixes;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = ScriptdentCli::parse();

	// Respect NO_COLOR env var, --no-color flag and non-terminal output.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stderr).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose);

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Check { files, format }) => run_check(&args, files, *format),
		Some(Commands::Fix { files, dry_run }) => run_fix(&args, files, *dry_run),
		None => {
			eprintln!("No subcommand specified. Run `scriptdent --help` for usage.");
			process::exit(2);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<scriptdent_core::ScriptdentError>() {
			Ok(scriptdent_err) => {
				let report: miette::Report = (*scriptdent_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Logs go to stderr. `--verbose` shows the per-region debug logs; otherwise
/// `RUST_LOG` decides.
fn init_tracing(verbose: bool) {
	let filter = if verbose {
		EnvFilter::new("scriptdent_core=debug")
	} else {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"))
	};

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.without_time()
		.try_init();
}

fn resolve_root(args: &ScriptdentCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Load `scriptdent.toml` and apply the command line overrides.
fn load_config(args: &ScriptdentCli, root: &Path) -> AnyResult<ScriptdentConfig> {
	let mut config = ScriptdentConfig::load(root)?.unwrap_or_default();

	if let Some(unit_size) = args.unit_size {
		config.indent.unit_size = unit_size;
	}
	if args.tabs {
		config.indent.unit_character = UnitCharacter::Tab;
	}
	config.indent.ignores.extend(args.ignores.iter().cloned());

	Ok(config)
}

/// The files named on the command line, or every host document of the
/// project when none are.
fn select_files(root: &Path, config: &ScriptdentConfig, files: &[PathBuf]) -> AnyResult<Vec<PathBuf>> {
	if files.is_empty() {
		return Ok(Project::with_config(root, config.clone())?.files);
	}

	Ok(files.to_vec())
}

fn run_init(args: &ScriptdentCli) -> AnyEmptyResult {
	let root = resolve_root(args);

	if let Some(existing) = ScriptdentConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let config_path = root.join("scriptdent.toml");
	std::fs::write(&config_path, DEFAULT_CONFIG)?;
	println!("Created {}", config_path.display());

	println!();
	println!("Next steps:");
	println!("  1. Adjust `unit_size` and `unit_character` in scriptdent.toml");
	println!("  2. Run `scriptdent check` to report indentation problems");
	println!("  3. Run `scriptdent fix` to rewrite them");

	Ok(())
}

fn run_check(args: &ScriptdentCli, files: &[PathBuf], format: OutputFormat) -> AnyEmptyResult {
	let root = resolve_root(args);
	let config = load_config(args, &root)?;
	let checker = Checker::new(config.indent.clone())?;
	let files = select_files(&root, &config, files)?;
	let result = check_files(&files, &checker);

	match format {
		OutputFormat::Json => print_json(&result, &root)?,
		OutputFormat::Github => print_github(&result, &root),
		OutputFormat::Text => print_text(&result, &root),
	}

	if result.has_errors() {
		process::exit(2);
	}
	if !result.is_ok() {
		process::exit(1);
	}

	Ok(())
}

fn print_json(result: &CheckResult, root: &Path) -> AnyEmptyResult {
	let mut diagnostics = vec![];
	let mut errors = vec![];

	for (file, report) in &result.files {
		let rel = make_relative(file, root);
		for diagnostic in &report.diagnostics {
			let mut value = serde_json::to_value(diagnostic)?;
			if let Some(object) = value.as_object_mut() {
				object.insert("file".to_string(), serde_json::Value::String(rel.clone()));
			}
			diagnostics.push(value);
		}
		for region_error in &report.region_errors {
			errors.push(serde_json::json!({
				"file": rel,
				"line": region_error.root_line,
				"message": region_error.error.to_string(),
			}));
		}
	}
	for (file, error) in &result.file_errors {
		errors.push(serde_json::json!({
			"file": make_relative(file, root),
			"message": error.to_string(),
		}));
	}

	let output = serde_json::json!({
		"ok": result.is_ok(),
		"diagnostics": diagnostics,
		"errors": errors,
	});
	println!("{output}");

	Ok(())
}

fn print_github(result: &CheckResult, root: &Path) {
	for (file, error) in &result.file_errors {
		let rel = make_relative(file, root);
		println!("::error file={rel}::{error}");
	}

	for (file, report) in &result.files {
		let rel = make_relative(file, root);
		for region_error in &report.region_errors {
			println!(
				"::error file={rel},line={}::Skipped script: {}",
				region_error.root_line, region_error.error
			);
		}
		for diagnostic in &report.diagnostics {
			println!(
				"::warning file={rel},line={},col={}::{}",
				diagnostic.line, diagnostic.column, diagnostic.message
			);
		}
	}

	eprintln!("{}", check_summary(result));
}

fn print_text(result: &CheckResult, root: &Path) {
	if result.is_ok() {
		println!(
			"{} all embedded scripts are correctly indented ({} file(s) checked).",
			colored!("Check passed:", green),
			result.files.len()
		);
		return;
	}

	for (file, error) in &result.file_errors {
		let rel = make_relative(file, root);
		eprintln!("{} {rel}: {error}", colored!("error:", red));
	}

	for (file, report) in &result.files {
		if report.is_ok() {
			continue;
		}

		let rel = make_relative(file, root);
		eprintln!("{}", colored!(rel, bold));
		for region_error in &report.region_errors {
			eprintln!(
				"  {} script opened on line {} was skipped: {}",
				colored!("error:", red),
				region_error.root_line,
				region_error.error
			);
		}
		for diagnostic in &report.diagnostics {
			let location = format!("{}:{}", diagnostic.line, diagnostic.column);
			eprintln!("  {} {}", colored!(location, yellow), diagnostic.message);
		}
		eprintln!();
	}

	eprintln!("{}", check_summary(result));
}

fn check_summary(result: &CheckResult) -> String {
	let mut parts = Vec::new();
	let error_count = result.file_errors.len()
		+ result
			.files
			.values()
			.map(|report| report.region_errors.len())
			.sum::<usize>();
	if error_count > 0 {
		parts.push(format!("{error_count} error(s)"));
	}
	let diagnostic_count = result.diagnostic_count();
	if diagnostic_count > 0 {
		parts.push(format!("{diagnostic_count} indentation problem(s)"));
	}

	if parts.is_empty() {
		return "No problems found.".to_string();
	}

	format!("Found {}. Run `scriptdent fix` to fix.", parts.join(" and "))
}

fn run_fix(args: &ScriptdentCli, files: &[PathBuf], dry_run: bool) -> AnyEmptyResult {
	let root = resolve_root(args);
	let config = load_config(args, &root)?;
	let checker = Checker::new(config.indent.clone())?;
	let files = select_files(&root, &config, files)?;
	let fixes = compute_fixes(&files, &checker);

	for (file, error) in &fixes.check.file_errors {
		let rel = make_relative(file, root.as_path());
		eprintln!("{} {rel}: {error}", colored!("error:", red));
	}
	for (file, report) in &fixes.check.files {
		let rel = make_relative(file, &root);
		for region_error in &report.region_errors {
			eprintln!(
				"{} {rel}: script opened on line {} was skipped: {}",
				colored!("warning:", yellow),
				region_error.root_line,
				region_error.error
			);
		}
	}

	if fixes.updated_files.is_empty() {
		println!("All embedded scripts are already correctly indented.");
	} else if dry_run {
		println!(
			"Dry run: would fix {} line(s) in {} file(s):",
			fixes.fixed_count,
			fixes.updated_files.len()
		);
		for (path, (original, fixed)) in &fixes.updated_files {
			let rel = make_relative(path, &root);
			println!("  {rel}");
			print_diff(original, fixed);
		}
	} else {
		write_fixes(&fixes)?;
		println!(
			"Fixed {} line(s) in {} file(s).",
			fixes.fixed_count,
			fixes.updated_files.len()
		);

		if args.verbose {
			for path in fixes.updated_files.keys() {
				let rel = make_relative(path, &root);
				println!("  {rel}");
			}
		}
	}

	if fixes.check.has_errors() {
		process::exit(2);
	}

	Ok(())
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				print!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				print!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
