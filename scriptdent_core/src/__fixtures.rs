use std::collections::BTreeSet;

use similar_asserts::assert_eq;

use crate::Checker;
use crate::Diagnostic;
use crate::IndentConfig;
use crate::LineTable;
use crate::UnitCharacter;
use crate::apply_fixes;
use crate::leading_whitespace;
use crate::lexer::classify;

pub(crate) const OBJECT_LITERALS: &str = r#"const config = {
  name: "app",
  items: [
    1,
    2
  ],
  nested: {
    deep: true
  }
}
"#;

pub(crate) const FUNCTIONS: &str = r"function greet(name, options) {
  if (options.loud) {
    console.log(
      name.toUpperCase()
    )
  } else {
    console.log(name)
  }
  return items
    .filter(Boolean)
    .map((item) => item * 2)
}
";

pub(crate) const CONTROL_FLOW: &str = r#"switch (kind) {
case "a":
  run()
  break
default:
  stop()
}
try {
  risky()
} catch (error) {
  report(error)
} finally {
  done()
}
const value = ready
  ? fast()
  : slow()
if (a)
  b()
else
  c()
"#;

pub(crate) const COMMENTS: &str = r"// leading comment
const list = [
  // inside
  1,
  /* block
     comment */
  2
  // before close
]
// trailing
";

pub(crate) const CLASSES: &str = r"class Counter extends Base {
  #count = 0
  static {
    setup()
  }
  increment(step) {
    this.#count += step
    return this.#count
  }
  get value() {
    return this.#count
  }
}
";

pub(crate) const MODULES: &str = r#"import {
  alpha,
  beta as gamma
} from "./module.js"
export {
  alpha
}
export default function main() {
  return gamma
}
"#;

pub(crate) const TAB_FIXTURE: &str = "function run() {\n\tif (ready) {\n\t\tgo(\n\t\t\tfast\n\t\t)\n\t}\n}\n";

/// Render diagnostics one per line for comparisons.
pub(crate) fn render(diagnostics: &[Diagnostic]) -> String {
	diagnostics
		.iter()
		.map(|diagnostic| {
			format!(
				"{}:{} {:?} {}",
				diagnostic.line, diagnostic.column, diagnostic.kind, diagnostic.message
			)
		})
		.collect::<Vec<_>>()
		.join("\n")
}

/// Lines a multi-line literal or comment spills into. Their whitespace is
/// content and is never stripped.
fn literal_lines(source: &str) -> BTreeSet<usize> {
	let table = LineTable::new(source);
	let tokens = classify(source, 0..source.len(), &table)
		.unwrap_or_else(|e| panic!("fixture must classify: {e}"));
	tokens.continued_lines().map(|(line, _)| line).collect()
}

/// Remove the leading whitespace of every line outside literal spans.
pub(crate) fn strip_indentation(source: &str) -> String {
	let literal = literal_lines(source);
	source
		.split('\n')
		.enumerate()
		.map(|(index, line)| {
			if literal.contains(&(index + 1)) {
				line
			} else {
				line.trim_start_matches([' ', '\t'])
			}
		})
		.collect::<Vec<_>>()
		.join("\n")
}

/// Check the strip-and-restore law for a correctly indented script: the
/// fixture is clean, the stripped copy reports exactly one count diagnostic
/// per indented line, and its fixes restore the fixture byte for byte.
pub(crate) fn assert_strip_restore(fixture: &str, config: IndentConfig) {
	let checker = Checker::new(config.clone()).unwrap_or_else(|e| panic!("checker: {e}"));
	let clean = checker
		.check_script(fixture)
		.unwrap_or_else(|e| panic!("fixture must check: {e}"));
	assert_eq!(render(&clean), "", "fixture is not correctly indented");

	let literal = literal_lines(fixture);
	let unit = match config.unit_character {
		UnitCharacter::Space => "space",
		UnitCharacter::Tab => "tab",
	};
	let expected = fixture
		.split('\n')
		.enumerate()
		.filter(|(index, _)| !literal.contains(&(index + 1)))
		.filter_map(|(index, line)| {
			let count = leading_whitespace(line).chars().count();
			(count > 0).then(|| {
				let plural = if count == 1 { "" } else { "s" };
				format!(
					"{}:1 Indentation Expected indentation of {count} {unit}{plural} but found 0 {unit}s.",
					index + 1
				)
			})
		})
		.collect::<Vec<_>>()
		.join("\n");

	let stripped = strip_indentation(fixture);
	let diagnostics = checker
		.check_script(&stripped)
		.unwrap_or_else(|e| panic!("stripped fixture must check: {e}"));
	assert_eq!(render(&diagnostics), expected);
	assert_eq!(apply_fixes(&stripped, &diagnostics), fixture);
}
