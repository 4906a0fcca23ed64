use rstest::rstest;
use similar_asserts::assert_eq;

use super::__fixtures::*;
use super::*;
use crate::constraints::ConstraintSet;
use crate::constraints::OffsetConstraint;
use crate::constraints::node_constraints;
use crate::lexer::classify;
use crate::parser::parse;
use crate::resolver::resolve;
use crate::resolver::winning_constraints;
use crate::selector::Selector;
use crate::suppression::SuppressionMark;
use crate::suppression::SuppressionReason;
use crate::suppression::suppress;
use crate::syntax::Node;
use crate::tokens::TokenKind;

fn checker(config: IndentConfig) -> Checker {
	Checker::new(config).unwrap_or_else(|e| panic!("checker: {e}"))
}

fn check_script(source: &str, config: IndentConfig) -> Vec<Diagnostic> {
	checker(config)
		.check_script(source)
		.unwrap_or_else(|e| panic!("check: {e}"))
}

// --- Strip and restore ---

#[rstest]
#[case::object_literals(OBJECT_LITERALS)]
#[case::functions(FUNCTIONS)]
#[case::control_flow(CONTROL_FLOW)]
#[case::comments(COMMENTS)]
#[case::classes(CLASSES)]
#[case::modules(MODULES)]
fn strip_and_restore_with_spaces(#[case] fixture: &str) {
	assert_strip_restore(fixture, IndentConfig::default());
}

#[test]
fn strip_and_restore_with_tabs() {
	assert_strip_restore(TAB_FIXTURE, IndentConfig::tabs());
}

#[test]
fn strip_and_restore_with_four_spaces() {
	let fixture = "if (ready) {\n    go({\n        fast: true\n    })\n}\n";
	assert_strip_restore(
		fixture,
		IndentConfig {
			unit_size: 4,
			..IndentConfig::default()
		},
	);
}

// --- Comparator ---

#[test]
fn spaces_in_tab_configuration_report_each_character() -> ScriptdentResult<()> {
	let source = "<script>\nvar obj = {\n  a: 1,\n  b: 2\n}\n</script>";
	let checker = checker(IndentConfig::tabs());
	let report = checker.check_document(source, HostKind::Html)?;

	insta::assert_snapshot!(render(&report.diagnostics), @r#"
	3:1 Character Expected "\t" character, but found " " character.
	3:2 Character Expected "\t" character, but found " " character.
	4:1 Character Expected "\t" character, but found " " character.
	4:2 Character Expected "\t" character, but found " " character.
	"#);
	assert_eq!(report.fixable(), 2);

	let (fixed, _) = checker.fix_document(source, HostKind::Html)?;
	assert_eq!(fixed, "<script>\nvar obj = {\n\ta: 1,\n\tb: 2\n}\n</script>");
	assert!(checker.check_document(&fixed, HostKind::Html)?.is_ok());

	Ok(())
}

#[test]
fn tab_in_space_configuration_reports_character() {
	let source = "var a =\n\t1";
	let diagnostics = check_script(source, IndentConfig::default());

	assert_eq!(diagnostics.len(), 1);
	assert_eq!(diagnostics[0].line, 2);
	assert_eq!(diagnostics[0].column, 1);
	assert_eq!(diagnostics[0].kind, DiagnosticKind::Character);
	insta::assert_snapshot!(diagnostics[0].message, @r#"Expected " " character, but found "\t" character."#);
	assert_eq!(apply_fixes(source, &diagnostics), "var a =\n  1");
}

#[test]
fn unit_size_does_not_change_tab_width() {
	let source = "var obj = {\n  a: 1\n}\n";
	let tabs = |unit_size| {
		IndentConfig {
			unit_size,
			..IndentConfig::tabs()
		}
	};

	let wide = check_script(source, tabs(4));
	assert_eq!(render(&wide), render(&check_script(source, tabs(2))));
	assert_eq!(wide.len(), 2);
	assert!(
		wide.iter()
			.all(|diagnostic| diagnostic.kind == DiagnosticKind::Character)
	);
}

#[test]
fn count_mismatch_is_reported_before_characters() {
	let source = "if (a) {\n\t b()\n}";
	let diagnostics = check_script(source, IndentConfig::default());

	insta::assert_snapshot!(render(&diagnostics), @r#"
	2:1 Indentation Expected indentation of 2 spaces but found 2 tabs.
	2:1 Character Expected " " character, but found "\t" character.
	"#);
	assert!(diagnostics[0].fix.is_some());
	assert!(diagnostics[1].fix.is_none());
	assert_eq!(apply_fixes(source, &diagnostics), "if (a) {\n  b()\n}");
}

#[test]
fn singular_unit_names() {
	let diagnostics = check_script(
		"if (a) {\n b()\n}",
		IndentConfig {
			unit_size: 1,
			..IndentConfig::default()
		},
	);
	assert_eq!(diagnostics.len(), 0);

	let diagnostics = check_script("if (a) {\n  b()\n}", IndentConfig::tabs());
	insta::assert_snapshot!(render(&diagnostics), @r#"
	2:1 Character Expected "\t" character, but found " " character.
	2:2 Character Expected "\t" character, but found " " character.
	"#);

	let diagnostics = check_script("if (a) {\nb()\n}", IndentConfig::tabs());
	insta::assert_snapshot!(render(&diagnostics), @"2:1 Indentation Expected indentation of 1 tab but found 0 tabs.");
}

#[test]
fn fixing_is_idempotent() -> ScriptdentResult<()> {
	let source = "<script>\nfunction a() {\n      return [\n1,\n        2\n]\n}\n</script>\n";
	let checker = checker(IndentConfig::default());

	let (fixed, report) = checker.fix_document(source, HostKind::Html)?;
	assert!(!report.is_ok());
	assert_eq!(
		fixed,
		"<script>\nfunction a() {\n  return [\n    1,\n    2\n  ]\n}\n</script>\n"
	);

	let (refixed, second) = checker.fix_document(&fixed, HostKind::Html)?;
	assert!(second.is_ok());
	assert_eq!(refixed, fixed);

	Ok(())
}

#[test]
fn checking_is_deterministic() {
	let stripped = strip_indentation(FUNCTIONS);
	let first = check_script(&stripped, IndentConfig::default());
	let second = check_script(&stripped, IndentConfig::default());

	assert_eq!(first, second);
}

#[test]
fn base_indent_shifts_top_level_statements() {
	let config = IndentConfig {
		base_indent: 1,
		..IndentConfig::default()
	};

	assert_eq!(check_script("  a()\n  b()\n", config.clone()).len(), 0);
	insta::assert_snapshot!(render(&check_script("a()\n  b()\n", config)), @"1:1 Indentation Expected indentation of 2 spaces but found 0 spaces.");
}

#[test]
fn switch_case_offset_is_configurable() {
	let source = "switch (a) {\n  case 1:\n    b()\n}\n";

	let config = IndentConfig {
		switch_case: 1,
		..IndentConfig::default()
	};
	assert_eq!(check_script(source, config).len(), 0);

	insta::assert_snapshot!(render(&check_script(source, IndentConfig::default())), @"
	2:1 Indentation Expected indentation of 0 spaces but found 2 spaces.
	3:1 Indentation Expected indentation of 2 spaces but found 4 spaces.
	");
}

// --- Suppression ---

#[test]
fn literal_spans_are_never_compared() -> ScriptdentResult<()> {
	let source = "const text = `\n      keep\n   this`\nconst s = \"a\\\n      b\"\n/* one\n        two */\nconst after = 1\n";
	assert_eq!(check_script(source, IndentConfig::default()).len(), 0);

	let table = LineTable::new(source);
	let tokens = classify(source, 0..source.len(), &table)?;
	let program = parse(&tokens)?;
	let suppressions = suppress(&tokens, &program, &[]);

	assert_eq!(suppressions.reason(1), None);
	assert_eq!(suppressions.reason(2), Some(SuppressionReason::LiteralSpan));
	assert_eq!(suppressions.reason(3), Some(SuppressionReason::LiteralSpan));
	assert_eq!(suppressions.reason(5), Some(SuppressionReason::Continuation));
	assert_eq!(suppressions.reason(7), Some(SuppressionReason::LiteralSpan));
	assert_eq!(suppressions.len(), 4);

	Ok(())
}

#[test]
fn user_ignores_mark_lines_inside_matched_nodes() -> ScriptdentResult<()> {
	let source = "const a = {\n      b: 1\n}\nconst c = 2\n";
	let table = LineTable::new(source);
	let tokens = classify(source, 0..source.len(), &table)?;
	let program = parse(&tokens)?;
	let selectors = vec![Selector::parse("ObjectExpression")?];
	let suppressions = suppress(&tokens, &program, &selectors);

	assert_eq!(
		suppressions.marks(),
		vec![
			SuppressionMark {
				line: 2,
				reason: SuppressionReason::UserIgnore,
			},
			SuppressionMark {
				line: 3,
				reason: SuppressionReason::UserIgnore,
			},
		]
	);

	Ok(())
}

#[test]
fn comments_may_continue_the_code_above() {
	let source = "switch (kind) {\ncase 1:\n  // falls through\ncase 2:\n  run()\n  // done\n}\nfunction walk() {\n  step()\n  // then\n\n  next()\n}\n";
	assert_eq!(render(&check_script(source, IndentConfig::default())), "");
}

#[test]
fn comments_off_both_levels_are_fixed_to_the_next_line() -> ScriptdentResult<()> {
	let source = "switch (kind) {\ncase 1:\n      // falls through\ncase 2:\n}\n";
	let checker = checker(IndentConfig::default());
	let diagnostics = checker.check_script(source)?;

	insta::assert_snapshot!(render(&diagnostics), @"3:1 Indentation Expected indentation of 0 spaces but found 6 spaces.");
	assert_eq!(
		apply_fixes(source, &diagnostics),
		"switch (kind) {\ncase 1:\n// falls through\ncase 2:\n}\n"
	);

	Ok(())
}

#[test]
fn code_after_a_multiline_template_follows_its_first_line() {
	let source = "const a = foo(`\n  x\n`, 1)\nconst b = 2\n";
	assert_eq!(check_script(source, IndentConfig::default()).len(), 0);
}

#[rstest]
#[case::conditional("ConditionalExpression", "const value = ready\n      ? fast()\n  : slow()\n")]
#[case::child("VariableDeclarator > ObjectExpression", "const a = {\n      b: 1\n}\n")]
#[case::descendant("Program ObjectExpression", "const a = {\n      b: 1\n}\n")]
#[case::alternatives("ArrayExpression, ObjectExpression", "const a = {\n      b: 1\n}\n")]
#[case::catch_all("*", "if (a) {\n        b()\n   }\n")]
fn ignores_suppress_matched_structures(#[case] selector: &str, #[case] source: &str) {
	assert!(!check_script(source, IndentConfig::default()).is_empty());

	let config = IndentConfig {
		ignores: vec![selector.to_string()],
		..IndentConfig::default()
	};
	assert_eq!(render(&check_script(source, config)), "");
}

#[test]
fn child_selector_requires_a_direct_parent() {
	let config = IndentConfig {
		ignores: vec!["Program > ObjectExpression".to_string()],
		..IndentConfig::default()
	};
	let diagnostics = check_script("const a = {\n      b: 1\n}\n", config);

	assert_eq!(diagnostics.len(), 1);
}

#[rstest]
#[case::unknown_kind("Banana")]
#[case::dangling_child("ObjectExpression >")]
#[case::leading_child("> ObjectExpression")]
#[case::empty_alternative("ObjectExpression,,Property")]
#[case::missing_combinator("*ObjectExpression")]
#[case::punctuation("Object.Expression")]
fn invalid_selectors_are_rejected(#[case] source: &str) {
	let result = Selector::parse(source);
	assert!(matches!(result, Err(ScriptdentError::InvalidSelector { .. })));
}

#[test]
fn selectors_round_trip_their_source() -> ScriptdentResult<()> {
	let selector = Selector::parse("IfStatement > BlockStatement, *")?;
	assert_eq!(selector.to_string(), "IfStatement > BlockStatement, *");
	assert!(selector.is_catch_all());

	Ok(())
}

// --- Constraints and resolution ---

/// The first node named `kind` in pre-order.
fn find_node<'n>(node: &'n Node, kind: &str) -> Option<&'n Node> {
	if node.kind_name() == kind {
		return Some(node);
	}

	node.children()
		.into_iter()
		.find_map(|child| find_node(child, kind))
}

#[rstest]
#[case::if_else(
	"if (a) {\n} else\n  b()\n",
	"IfStatement",
	0,
	vec![
		OffsetConstraint::relative(1, 0, 1),
		OffsetConstraint::relative(2, 1, 1),
		OffsetConstraint::relative(3, 1, 0).overriding(),
		OffsetConstraint::relative(4, 0, 0),
		OffsetConstraint::relative(6, 0, 0),
		OffsetConstraint::relative(7, 6, 1),
	]
)]
#[case::switch_with_case_offset(
	"switch (k) {\n  case 1:\n}\n",
	"SwitchStatement",
	1,
	vec![
		OffsetConstraint::relative(1, 0, 1),
		OffsetConstraint::relative(2, 1, 1),
		OffsetConstraint::relative(3, 1, 0).overriding(),
		OffsetConstraint::relative(4, 0, 0),
		OffsetConstraint::relative(5, 4, 1),
		OffsetConstraint::relative(8, 4, 0).overriding(),
	]
)]
#[case::call_arguments(
	"go(\n  a\n)\n",
	"CallExpression",
	0,
	vec![
		OffsetConstraint::relative(1, 0, 1),
		OffsetConstraint::relative(2, 1, 1),
		OffsetConstraint::relative(3, 1, 0).overriding(),
	]
)]
fn node_shapes_map_to_constraints(
	#[case] source: &str,
	#[case] kind: &str,
	#[case] switch_case: u32,
	#[case] expected: Vec<OffsetConstraint>,
) -> ScriptdentResult<()> {
	let table = LineTable::new(source);
	let tokens = classify(source, 0..source.len(), &table)?;
	let program = parse(&tokens)?;
	let node = find_node(&program, kind).unwrap_or_else(|| panic!("no {kind} node"));
	let config = IndentConfig {
		switch_case,
		..IndentConfig::default()
	};

	assert_eq!(node_constraints(node, &config), expected);

	Ok(())
}

#[test]
fn overrides_replace_the_first_normal_constraint() {
	let mut set = ConstraintSet::new();
	set.push(OffsetConstraint::relative(1, 0, 1));
	set.push(OffsetConstraint::relative(1, 0, 2).overriding());
	set.push(OffsetConstraint::relative(1, 0, 3).overriding());
	set.push(OffsetConstraint::relative(2, 0, 5));
	set.push(OffsetConstraint::relative(2, 0, 6));
	set.push(OffsetConstraint::relative(3, 3, 1));

	let winners = winning_constraints(&set);
	assert_eq!(winners[&1].units, 2);
	assert_eq!(winners[&2].units, 5);
	assert!(!winners.contains_key(&3));
}

#[test]
fn resolution_fails_on_cycles() -> ScriptdentResult<()> {
	let source = "a\nb\nc\n";
	let table = LineTable::new(source);
	let tokens = classify(source, 0..source.len(), &table)?;

	let mut set = ConstraintSet::new();
	set.push(OffsetConstraint::absolute(0, 0));
	set.push(OffsetConstraint::relative(1, 2, 1));
	set.push(OffsetConstraint::relative(2, 1, 1));

	let result = resolve(&tokens, &set);
	assert!(matches!(result, Err(ScriptdentError::ConstraintCycle { line: 3 })));

	Ok(())
}

#[test]
fn resolution_fails_on_unanchored_lines() -> ScriptdentResult<()> {
	let source = "a\nb\n";
	let table = LineTable::new(source);
	let tokens = classify(source, 0..source.len(), &table)?;

	let mut set = ConstraintSet::new();
	set.push(OffsetConstraint::absolute(0, 0));

	let result = resolve(&tokens, &set);
	assert!(matches!(result, Err(ScriptdentError::UnanchoredLine { line: 2 })));

	Ok(())
}

#[test]
fn resolution_follows_anchor_chains() -> ScriptdentResult<()> {
	let source = "a\nb\nc\n";
	let table = LineTable::new(source);
	let tokens = classify(source, 0..source.len(), &table)?;

	let mut set = ConstraintSet::new();
	set.push(OffsetConstraint::absolute(0, 1));
	set.push(OffsetConstraint::relative(2, 1, 2));
	set.push(OffsetConstraint::relative(1, 0, 1));

	let resolved = resolve(&tokens, &set)?;
	let units: Vec<(usize, u32)> = resolved
		.iter()
		.map(|indent| (indent.line, indent.expected_units))
		.collect();
	assert_eq!(units, vec![(1, 1), (2, 2), (3, 4)]);

	Ok(())
}

// --- Classifier ---

#[test]
fn classifier_tags_token_kinds() -> ScriptdentResult<()> {
	let source = "let re = /a+b/g // note\nlet t = `x${ `y` }z` /* c */ + 'q' + 0x1f + #p";
	let table = LineTable::new(source);
	let tokens = classify(source, 0..source.len(), &table)?;
	let kinds: Vec<TokenKind> = tokens.iter().map(|token| token.kind).collect();

	assert_eq!(
		kinds,
		vec![
			TokenKind::Identifier,
			TokenKind::Identifier,
			TokenKind::Punctuator,
			TokenKind::Regex,
			TokenKind::LineComment,
			TokenKind::Identifier,
			TokenKind::Identifier,
			TokenKind::Punctuator,
			TokenKind::Template,
			TokenKind::BlockComment,
			TokenKind::Punctuator,
			TokenKind::String,
			TokenKind::Punctuator,
			TokenKind::Number,
			TokenKind::Punctuator,
			TokenKind::PrivateName,
		]
	);

	Ok(())
}

#[test]
fn division_is_not_a_regex() -> ScriptdentResult<()> {
	let source = "a = (b) / c / d";
	let table = LineTable::new(source);
	let tokens = classify(source, 0..source.len(), &table)?;

	assert!(tokens.iter().all(|token| token.kind != TokenKind::Regex));

	Ok(())
}

#[test]
fn optional_chain_before_a_digit_is_a_conditional() -> ScriptdentResult<()> {
	let source = "var a = b?.5:1\nvar c = d?.e\n";
	let table = LineTable::new(source);
	let tokens = classify(source, 0..source.len(), &table)?;
	let texts: Vec<&str> = tokens.iter().map(|token| token.text.as_str()).collect();

	assert_eq!(
		texts,
		vec!["var", "a", "=", "b", "?", ".5", ":", "1", "var", "c", "=", "d", "?.", "e"]
	);
	assert_eq!(render(&check_script(source, IndentConfig::default())), "");

	Ok(())
}

#[rstest]
#[case::unterminated_string("let a = 'abc\nlet b")]
#[case::unterminated_template("let a = `abc")]
#[case::unterminated_comment("let a /* abc")]
#[case::unbalanced_close("let a = b)")]
#[case::mismatched("let a = [b)")]
#[case::unclosed("if (a) {")]
#[case::unexpected_character("let a = @b")]
#[case::unparseable("let = = 1")]
fn malformed_scripts_fail_the_region(#[case] source: &str) {
	let result = checker(IndentConfig::default()).check_script(source);
	assert!(
		matches!(result, Err(ScriptdentError::MalformedInput { .. })),
		"{result:?}"
	);
}

#[rstest]
#[case::parentheses("x = ", "(\n", ")")]
#[case::arrays("x = ", "[\n", "]")]
#[case::blocks("", "{\n", "}")]
#[case::unary("x = ", "!", "")]
#[case::templates("x = ", "`${", "}`")]
fn deeply_nested_scripts_fail_the_region(
	#[case] prefix: &str,
	#[case] open: &str,
	#[case] close: &str,
) {
	let nested = |depth: usize| format!("{prefix}{}1{}\n", open.repeat(depth), close.repeat(depth));
	let checker = checker(IndentConfig::default());

	let result = checker.check_script(&nested(10_000));
	assert!(
		matches!(result, Err(ScriptdentError::MalformedInput { .. })),
		"deep nesting must fail the region"
	);
	assert!(checker.check_script(&nested(20)).is_ok());
}

// --- Host documents ---

#[test]
fn html_regions_skip_foreign_scripts() -> ScriptdentResult<()> {
	let source = "<div>\n  <script type=\"module\">\n  const a = 1\n  </script>\n  <script \
	              src=\"x.js\"></script>\n  <SCRIPT lang=\"ts\">\nlet b\n</SCRIPT>\n<!-- \
	              <script>\nbad(\n</script> -->\n  <script />\n  <scripts></scripts>\n</div>\n";
	let regions = find_regions(source, HostKind::Html)?;

	assert_eq!(regions.len(), 1);
	assert_eq!(regions[0].root_line, 2);
	assert_eq!(regions[0].base_indent, "  ");
	assert_eq!(regions[0].language, "js");
	assert_eq!(&source[regions[0].range.clone()], "\n  const a = 1\n  ");

	let report = checker(IndentConfig::default()).check_document(source, HostKind::Html)?;
	assert!(report.is_ok());
	assert_eq!(report.regions, 1);

	Ok(())
}

#[test]
fn html_region_without_end_tag_is_an_error() {
	let result = find_regions("<p>\n<script>\nlet a\n", HostKind::Html);
	assert!(matches!(result, Err(ScriptdentError::UnclosedRegion { line: 2 })));
}

#[test]
fn vue_script_is_indented_from_its_tag() -> ScriptdentResult<()> {
	let source = "<template>\n  <div/>\n</template>\n  <script>\n  export default {\n    data() \
	              {\n      return {}\n    }\n  }\n  </script>\n";
	let report = checker(IndentConfig::default()).check_document(source, HostKind::Html)?;
	assert!(report.is_ok(), "{:?}", report.diagnostics);

	let shifted = source.replace("      return", "    return");
	let report = checker(IndentConfig::default()).check_document(&shifted, HostKind::Html)?;
	insta::assert_snapshot!(render(&report.diagnostics), @"7:1 Indentation Expected indentation of 6 spaces but found 4 spaces.");

	Ok(())
}

#[test]
fn markdown_regions_are_fenced_js_blocks() -> ScriptdentResult<()> {
	let source = "# Title\n\n```js\nif (a) {\nb()\n}\n```\n\n> ```js\n> bad(\n> ```\n\n```ts\nnope(\n```\n";
	let regions = find_regions(source, HostKind::Markdown)?;

	assert_eq!(regions.len(), 1);
	assert_eq!(regions[0].root_line, 3);
	assert_eq!(&source[regions[0].range.clone()], "if (a) {\nb()\n}\n");

	let (fixed, report) = checker(IndentConfig::default()).fix_document(source, HostKind::Markdown)?;
	insta::assert_snapshot!(render(&report.diagnostics), @"5:1 Indentation Expected indentation of 2 spaces but found 0 spaces.");
	assert_eq!(fixed, source.replace("\nb()\n", "\n  b()\n"));

	Ok(())
}

#[rstest]
#[case("page.html", Some(HostKind::Html))]
#[case("page.HTM", Some(HostKind::Html))]
#[case("App.vue", Some(HostKind::Html))]
#[case("Button.svelte", Some(HostKind::Html))]
#[case("readme.md", Some(HostKind::Markdown))]
#[case("guide.markdown", Some(HostKind::Markdown))]
#[case("main.js", None)]
#[case("Makefile", None)]
fn host_kind_from_extension(#[case] path: &str, #[case] expected: Option<HostKind>) {
	assert_eq!(HostKind::from_path(std::path::Path::new(path)), expected);
}

#[test]
#[tracing_test::traced_test]
fn malformed_region_does_not_hide_other_regions() -> ScriptdentResult<()> {
	let source = "<script>\nfoo(\n</script>\n<script>\nif (a) {\nb()\n}\n</script>\n";
	let report = checker(IndentConfig::default()).check_document(source, HostKind::Html)?;

	assert_eq!(report.regions, 2);
	assert_eq!(report.region_errors.len(), 1);
	assert_eq!(report.region_errors[0].root_line, 1);
	assert!(matches!(
		report.region_errors[0].error,
		ScriptdentError::MalformedInput { .. }
	));
	insta::assert_snapshot!(render(&report.diagnostics), @"6:1 Indentation Expected indentation of 2 spaces but found 0 spaces.");
	assert!(logs_contain("skipping region"));

	Ok(())
}

// --- Configuration ---

#[test]
fn config_accepts_camel_case_aliases() -> ScriptdentResult<()> {
	let config = ScriptdentConfig::parse(
		"[indent]\nunitSize = 4\nunitCharacter = \"tab\"\nswitchCase = 1\nignores = [\"*\"]\n",
	)?;

	assert_eq!(config.indent.unit_size, 4);
	assert_eq!(config.indent.unit_character, UnitCharacter::Tab);
	assert_eq!(config.indent.switch_case, 1);
	assert_eq!(config.indent.base_indent, 0);
	assert_eq!(config.indent.ignores, vec!["*".to_string()]);
	assert_eq!(config.files, FilesConfig::default());

	Ok(())
}

#[test]
fn default_config_template_parses() -> ScriptdentResult<()> {
	let config = ScriptdentConfig::parse(DEFAULT_CONFIG)?;
	assert_eq!(config.indent, IndentConfig::default());
	assert_eq!(config.files.include.len(), 6);

	Ok(())
}

#[test]
fn zero_unit_size_is_invalid() {
	let result = ScriptdentConfig::parse("[indent]\nunit_size = 0\n");
	assert!(matches!(result, Err(ScriptdentError::InvalidConfig(_))));

	let result = Checker::new(IndentConfig {
		unit_size: 0,
		..IndentConfig::default()
	});
	assert!(matches!(result, Err(ScriptdentError::InvalidConfig(_))));
}

#[test]
fn invalid_toml_is_a_parse_error() {
	let result = ScriptdentConfig::parse("[indent\nunit_size = 2");
	assert!(matches!(result, Err(ScriptdentError::ConfigParse(_))));

	let result = ScriptdentConfig::parse("[indent]\nunit_character = \"dots\"\n");
	assert!(matches!(result, Err(ScriptdentError::ConfigParse(_))));
}

#[test]
fn invalid_ignores_fail_checker_construction() {
	let result = Checker::new(IndentConfig {
		ignores: vec!["Nope".to_string()],
		..IndentConfig::default()
	});
	assert!(matches!(result, Err(ScriptdentError::InvalidSelector { .. })));
}

#[test]
fn config_discovery_prefers_the_first_candidate() -> ScriptdentResult<()> {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	assert!(ScriptdentConfig::load(tmp.path())?.is_none());

	std::fs::create_dir_all(tmp.path().join(".config"))?;
	std::fs::write(
		tmp.path().join(".config/scriptdent.toml"),
		"[indent]\nunit_size = 8\n",
	)?;
	let config = ScriptdentConfig::load(tmp.path())?.unwrap_or_default();
	assert_eq!(config.indent.unit_size, 8);

	std::fs::write(tmp.path().join("scriptdent.toml"), "[indent]\nunit_size = 3\n")?;
	std::fs::write(tmp.path().join(".scriptdent.toml"), "[indent]\nunit_size = 5\n")?;
	let config = ScriptdentConfig::load(tmp.path())?.unwrap_or_default();
	assert_eq!(config.indent.unit_size, 3);

	Ok(())
}

// --- Project ---

fn write_project_file(root: &std::path::Path, relative: &str, content: &str) {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("mkdir: {e}"));
	}
	std::fs::write(path, content).unwrap_or_else(|e| panic!("write: {e}"));
}

#[test]
fn project_collects_host_documents() -> ScriptdentResult<()> {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	let root = tmp.path();
	write_project_file(root, "a.vue", "<script>\nlet a\n</script>\n");
	write_project_file(root, "docs/b.md", "```js\nlet b\n```\n");
	write_project_file(root, "c.txt", "<script>\n</script>\n");
	write_project_file(root, "node_modules/pkg/x.vue", "<script>\n</script>\n");
	write_project_file(root, "dist/y.html", "<script>\n</script>\n");
	write_project_file(root, "ignored.html", "<script>\n</script>\n");
	write_project_file(root, ".gitignore", "ignored.html\n");
	write_project_file(root, "scriptdent.toml", "[files]\nexclude = [\"dist/\"]\n");

	let project = Project::scan(root)?;
	let relative: Vec<String> = project
		.files
		.iter()
		.filter_map(|path| path.strip_prefix(root).ok())
		.map(|path| path.display().to_string())
		.collect();
	assert_eq!(relative, vec!["a.vue".to_string(), "docs/b.md".to_string()]);

	let result = check_project(&project, &checker(project.config.indent.clone()));
	assert!(result.is_ok());
	assert_eq!(result.files.len(), 2);

	Ok(())
}

#[test]
fn project_include_globs_narrow_the_selection() -> ScriptdentResult<()> {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	let root = tmp.path();
	write_project_file(root, "a.vue", "<script>\n</script>\n");
	write_project_file(root, "docs/b.md", "text\n");
	write_project_file(root, "ignored.html", "<script>\n</script>\n");
	write_project_file(root, ".gitignore", "ignored.html\n");

	let files = collect_files(
		root,
		&FilesConfig {
			include: vec!["**/*.md".to_string(), "*.html".to_string()],
			exclude: vec![],
			disable_gitignore: true,
		},
	)?;
	let names: Vec<_> = files
		.iter()
		.filter_map(|path| path.file_name())
		.map(|name| name.to_string_lossy().to_string())
		.collect();
	assert_eq!(names, vec!["b.md".to_string(), "ignored.html".to_string()]);

	Ok(())
}

#[test]
fn project_fixes_are_written_in_one_pass() -> ScriptdentResult<()> {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	let root = tmp.path();
	write_project_file(root, "a.html", "<script>\nif (a) {\nb()\nc()\n}\n</script>\n");
	write_project_file(root, "b.md", "```js\nok()\n```\n");

	let project = Project::scan(root)?;
	let fixes = compute_fixes(&project.files, &checker(IndentConfig::default()));
	assert_eq!(fixes.fixed_count, 2);
	assert_eq!(fixes.updated_files.len(), 1);

	write_fixes(&fixes)?;
	let content = std::fs::read_to_string(root.join("a.html"))?;
	assert_eq!(content, "<script>\nif (a) {\n  b()\n  c()\n}\n</script>\n");
	assert!(check_project(&project, &checker(IndentConfig::default())).is_ok());

	Ok(())
}
