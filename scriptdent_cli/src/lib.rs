use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Check and fix the indentation of JavaScript embedded in HTML, Vue, Svelte and \
	         Markdown files.",
	long_about = "scriptdent checks the indentation of every line inside `<script>` elements and \
	              fenced `js` code blocks against the structure of the script, and rewrites the \
	              leading whitespace of lines that are off.\n\nQuick start:\n  scriptdent init   \
	              Create a scriptdent.toml\n  scriptdent check  Report indentation problems\n  \
	              scriptdent fix    Rewrite leading whitespace in place"
)]
pub struct ScriptdentCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output, including debug logs of each region.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,

	/// Spaces per indent unit, overriding `scriptdent.toml`.
	#[arg(long, global = true)]
	pub unit_size: Option<usize>,

	/// Indent with tabs instead of spaces.
	#[arg(long, global = true, default_value_t = false)]
	pub tabs: bool,

	/// Skip lines inside structures matching this selector, e.g.
	/// `ConditionalExpression` or `*`. Repeatable; added to the configured
	/// `ignores`.
	#[arg(long = "ignore", global = true)]
	pub ignores: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create a `scriptdent.toml` with the default settings.
	///
	/// If a configuration file already exists, this command is a no-op and
	/// exits successfully.
	Init,
	/// Report lines whose indentation does not match the script structure.
	///
	/// Exits with status 1 when any diagnostic is found and 2 when a file or
	/// script region cannot be checked.
	Check {
		/// Files to check. Defaults to every host document in the project.
		files: Vec<PathBuf>,

		/// Output format for check results. Use `text` for human-readable
		/// output, `json` for programmatic consumption, or `github` for
		/// GitHub Actions annotations that appear inline on PRs.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Rewrite the leading whitespace of every misindented line.
	///
	/// Use `--dry-run` to print a diff of the changes without writing to
	/// disk.
	Fix {
		/// Files to fix. Defaults to every host document in the project.
		files: Vec<PathBuf>,

		/// Preview changes without writing files.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Each diagnostic includes
	/// the file path, line, column, kind, message and fix.
	Json,
	/// GitHub Actions annotation format. Emits `::warning` or `::error`
	/// annotations that appear inline on pull request diffs.
	Github,
}
