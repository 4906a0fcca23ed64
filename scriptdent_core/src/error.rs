use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ScriptdentError {
	#[error(transparent)]
	#[diagnostic(code(scriptdent::io_error))]
	Io(#[from] std::io::Error),

	#[error("failure to load markdown: {0}")]
	#[diagnostic(code(scriptdent::markdown))]
	Markdown(String),

	#[error("malformed script at {line}:{column}: {message}")]
	#[diagnostic(
		code(scriptdent::malformed_input),
		help("the region is skipped until the script parses; no indentation is reported for it")
	)]
	MalformedInput {
		message: String,
		line: usize,
		column: usize,
	},

	#[error("indentation constraints form a cycle at line {line}")]
	#[diagnostic(
		code(scriptdent::constraint_cycle),
		help("this is a bug in the constraint builder, please report it with the input")
	)]
	ConstraintCycle { line: usize },

	#[error("no indentation constraint reaches line {line}")]
	#[diagnostic(
		code(scriptdent::unanchored_line),
		help("this is a bug in the constraint builder, please report it with the input")
	)]
	UnanchoredLine { line: usize },

	#[error("missing closing `</script>` for the element opened on line {line}")]
	#[diagnostic(code(scriptdent::unclosed_region))]
	UnclosedRegion { line: usize },

	#[error("invalid ignore selector `{selector}`: {reason}")]
	#[diagnostic(
		code(scriptdent::invalid_selector),
		help("selectors are node names such as `ObjectExpression`, `*`, `A > B`, `A B` or `A, B`")
	)]
	InvalidSelector { selector: String, reason: String },

	#[error("invalid configuration: {0}")]
	#[diagnostic(code(scriptdent::invalid_config))]
	InvalidConfig(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(scriptdent::config_parse),
		help("check that scriptdent.toml is valid TOML with [indent] and/or [files] sections")
	)]
	ConfigParse(String),
}

impl ScriptdentError {
	pub(crate) fn malformed(message: impl Into<String>, line: usize, column: usize) -> Self {
		Self::MalformedInput {
			message: message.into(),
			line,
			column,
		}
	}
}

pub type ScriptdentResult<T> = Result<T, ScriptdentError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
