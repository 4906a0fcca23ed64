use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::ScriptdentError;
use crate::ScriptdentResult;
use crate::selector::Selector;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["scriptdent.toml", ".scriptdent.toml", ".config/scriptdent.toml"];

/// The file written by `scriptdent init`.
pub const DEFAULT_CONFIG: &str = r#"[indent]
unit_size = 2
unit_character = "space"
base_indent = 0
switch_case = 0
ignores = []

[files]
include = ["**/*.html", "**/*.htm", "**/*.vue", "**/*.svelte", "**/*.md", "**/*.markdown"]
exclude = []
"#;

/// Configuration loaded from a `scriptdent.toml` file.
///
/// ```toml
/// [indent]
/// unit_size = 2
/// unit_character = "space"
/// base_indent = 0
/// switch_case = 0
/// ignores = ["ConditionalExpression"]
///
/// [files]
/// include = ["**/*.vue", "**/*.md"]
/// exclude = ["dist/"]
/// disable_gitignore = false
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ScriptdentConfig {
	#[serde(default)]
	pub indent: IndentConfig,
	#[serde(default)]
	pub files: FilesConfig,
}

/// The character one indent unit is made of.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UnitCharacter {
	#[default]
	Space,
	Tab,
}

impl UnitCharacter {
	pub fn as_char(self) -> char {
		match self {
			Self::Space => ' ',
			Self::Tab => '\t',
		}
	}
}

/// Spaces per indent unit when none is configured.
pub const DEFAULT_UNIT_SIZE: usize = 2;

/// How embedded scripts must be indented.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct IndentConfig {
	/// Spaces per indent unit. Ignored when indenting with tabs.
	#[serde(alias = "unitSize")]
	pub unit_size: usize,
	#[serde(alias = "unitCharacter")]
	pub unit_character: UnitCharacter,
	/// Units added to every top-level statement of a region, measured from the
	/// host line that opens it.
	#[serde(alias = "baseIndent")]
	pub base_indent: u32,
	/// Units between a `switch` and its `case` clauses.
	#[serde(alias = "switchCase")]
	pub switch_case: u32,
	/// Selectors for structures whose lines are never checked. `*` disables
	/// checking entirely.
	pub ignores: Vec<String>,
}

impl Default for IndentConfig {
	fn default() -> Self {
		Self {
			unit_size: DEFAULT_UNIT_SIZE,
			unit_character: UnitCharacter::Space,
			base_indent: 0,
			switch_case: 0,
			ignores: vec![],
		}
	}
}

impl IndentConfig {
	pub fn tabs() -> Self {
		Self {
			unit_character: UnitCharacter::Tab,
			..Self::default()
		}
	}

	/// Columns a tab spans when comparing indentation widths.
	pub fn tab_width(&self) -> usize {
		match self.unit_character {
			UnitCharacter::Space => self.unit_size,
			UnitCharacter::Tab => DEFAULT_UNIT_SIZE,
		}
	}

	pub fn validate(&self) -> ScriptdentResult<()> {
		if self.unit_size == 0 {
			return Err(ScriptdentError::InvalidConfig(
				"`unit_size` must be greater than zero".to_string(),
			));
		}

		Ok(())
	}

	/// Parse every `ignores` entry.
	pub fn selectors(&self) -> ScriptdentResult<Vec<Selector>> {
		self.ignores
			.iter()
			.map(|source| Selector::parse(source))
			.collect()
	}
}

/// Which host documents a project check covers.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilesConfig {
	/// Glob patterns, relative to the project root, of files to check. When
	/// empty every HTML-like and Markdown file is checked.
	pub include: Vec<String>,
	/// Gitignore-style patterns for files and directories to skip. Supports
	/// negation (`!pattern`) and directory markers (trailing `/`).
	pub exclude: Vec<String>,
	/// When true, `.gitignore` files are not used for filtering.
	pub disable_gitignore: bool,
}

impl ScriptdentConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if the file does not exist.
	pub fn load(root: &Path) -> ScriptdentResult<Option<ScriptdentConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;

		Ok(Some(config))
	}

	pub fn parse(content: &str) -> ScriptdentResult<ScriptdentConfig> {
		let config: ScriptdentConfig =
			toml::from_str(content).map_err(|e| ScriptdentError::ConfigParse(e.to_string()))?;
		config.indent.validate()?;

		Ok(config)
	}
}
