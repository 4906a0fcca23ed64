use std::ops::Range;

use serde::Serialize;
use tracing::warn;

use crate::EmbeddedRegion;
use crate::IndentConfig;
use crate::LineTable;
use crate::UnitCharacter;
use crate::leading_whitespace;
use crate::resolver::ResolvedIndent;
use crate::suppression::Suppressions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
	/// The amount of indentation is wrong.
	Indentation,
	/// The amount is right but a whitespace character is of the wrong kind.
	Character,
}

/// Replace the byte range `range` of the host document with `text`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Fix {
	pub range: Range<usize>,
	pub text: String,
}

/// An indentation mismatch on one line of the host document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
	pub line: usize,
	pub column: usize,
	pub kind: DiagnosticKind,
	pub message: String,
	pub fix: Option<Fix>,
}

/// Compare the resolved indentation of every unsuppressed line with the
/// whitespace actually present.
///
/// Only lines that begin inside the region are compared: a script that starts
/// on the same line as its `<script>` tag has no indentation of its own on
/// that line.
pub fn compare(
	source: &str,
	table: &LineTable,
	region: &EmbeddedRegion,
	resolved: &[ResolvedIndent],
	suppressions: &Suppressions,
	config: &IndentConfig,
) -> Vec<Diagnostic> {
	let mut diagnostics = vec![];

	for indent in resolved {
		if suppressions.is_suppressed(indent.line) {
			continue;
		}

		let (Some(start), Some(end)) = (table.line_start(indent.line), table.line_end(indent.line))
		else {
			continue;
		};
		if start < region.range.start {
			continue;
		}

		let actual = leading_whitespace(&source[start..end]);
		let accepts_alternative = indent
			.alternative_units
			.is_some_and(|units| actual == expected_indent(&region.base_indent, units, config));
		if accepts_alternative {
			continue;
		}

		let expected = expected_indent(&region.base_indent, indent.expected_units, config);
		diagnostics.extend(compare_line(indent.line, start, actual, &expected, config));
	}

	diagnostics
}

/// The whitespace a line `units` deep must start with.
pub fn expected_indent(base_indent: &str, units: u32, config: &IndentConfig) -> String {
	let unit = match config.unit_character {
		UnitCharacter::Space => " ".repeat(config.unit_size),
		UnitCharacter::Tab => "\t".to_string(),
	};

	format!("{base_indent}{}", unit.repeat(units as usize))
}

/// Width in columns.
fn columns(whitespace: &str, config: &IndentConfig) -> usize {
	let tab_width = config.tab_width();
	whitespace
		.chars()
		.map(|ch| if ch == '\t' { tab_width } else { 1 })
		.sum()
}

fn unit_name(ch: char) -> &'static str {
	if ch == '\t' { "tab" } else { "space" }
}

fn plural(count: usize) -> &'static str {
	if count == 1 { "" } else { "s" }
}

/// Render a whitespace character the way a JSON string would.
fn quoted(ch: char) -> String {
	serde_json::to_string(&ch.to_string()).unwrap_or_else(|_| format!("\"{ch}\""))
}

fn compare_line(
	line: usize,
	line_start: usize,
	actual: &str,
	expected: &str,
	config: &IndentConfig,
) -> Vec<Diagnostic> {
	let mut diagnostics = vec![];
	let configured = config.unit_character.as_char();

	if columns(actual, config) != columns(expected, config) {
		let expected_count = expected.chars().count();
		let actual_count = actual.chars().count();
		let actual_unit = actual.chars().next().unwrap_or(configured);

		diagnostics.push(Diagnostic {
			line,
			column: 1,
			kind: DiagnosticKind::Indentation,
			message: format!(
				"Expected indentation of {expected_count} {}{} but found {actual_count} {}{}.",
				unit_name(configured),
				plural(expected_count),
				unit_name(actual_unit),
				plural(actual_count),
			),
			fix: None,
		});
	}

	let mut expected_chars = expected.chars();
	for (position, ch) in actual.chars().enumerate() {
		let wanted = expected_chars.next().unwrap_or(configured);
		if ch != wanted {
			diagnostics.push(Diagnostic {
				line,
				column: position + 1,
				kind: DiagnosticKind::Character,
				message: format!(
					"Expected {} character, but found {} character.",
					quoted(wanted),
					quoted(ch),
				),
				fix: None,
			});
		}
	}

	if let Some(first) = diagnostics.first_mut() {
		first.fix = Some(Fix {
			range: line_start..line_start + actual.len(),
			text: expected.to_string(),
		});
	}

	diagnostics
}

/// Apply every fix in `diagnostics` to `source` in one pass.
pub fn apply_fixes(source: &str, diagnostics: &[Diagnostic]) -> String {
	let mut fixes: Vec<&Fix> = diagnostics
		.iter()
		.filter_map(|diagnostic| diagnostic.fix.as_ref())
		.collect();
	fixes.sort_by_key(|fix| (fix.range.start, fix.range.end));

	let mut output = String::with_capacity(source.len());
	let mut cursor = 0;
	for fix in fixes {
		if fix.range.start < cursor {
			warn!(range = ?fix.range, "skipping overlapping fix");
			continue;
		}
		output.push_str(&source[cursor..fix.range.start]);
		output.push_str(&fix.text);
		cursor = fix.range.end;
	}
	output.push_str(&source[cursor..]);

	output
}
