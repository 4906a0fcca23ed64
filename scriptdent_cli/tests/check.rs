mod common;

use clap::Parser;
use rstest::rstest;
use scriptdent_cli::Commands;
use scriptdent_cli::OutputFormat;
use scriptdent_cli::ScriptdentCli;
use scriptdent_core::AnyEmptyResult;
use serde_json::Value;
use similar_asserts::assert_eq;

const MISINDENTED: &str = "<script>\nif (ready) {\ngo()\n}\n</script>\n";
const INDENTED: &str = "<script>\nif (ready) {\n  go()\n}\n</script>\n";

#[test]
fn check_passes_when_indented() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("index.html"), INDENTED)?;
	std::fs::write(tmp.path().join("readme.md"), "# Readme\n\n```js\nok()\n```\n")?;

	let mut cmd = common::scriptdent_cmd();
	cmd.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Check passed"))
		.stdout(predicates::str::contains("2 file(s) checked"));

	Ok(())
}

#[test]
fn check_fails_when_misindented() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("App.vue"), MISINDENTED)?;

	let mut cmd = common::scriptdent_cmd();
	let output = cmd
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.get_output()
		.clone();
	let stderr = String::from_utf8(output.stderr)?;

	insta::assert_snapshot!(stderr, @r"
	App.vue
	  3:1 Expected indentation of 2 spaces but found 0 spaces.

	Found 1 indentation problem(s). Run `scriptdent fix` to fix.
	");

	Ok(())
}

#[test]
fn check_json_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("App.vue"), MISINDENTED)?;

	let mut cmd = common::scriptdent_cmd();
	let output = cmd
		.arg("check")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.get_output()
		.clone();
	let json: Value = serde_json::from_slice(&output.stdout)?;

	assert_eq!(json["ok"], Value::Bool(false));
	assert_eq!(json["errors"].as_array().map(Vec::len), Some(0));
	let diagnostic = &json["diagnostics"][0];
	assert_eq!(diagnostic["file"], "App.vue");
	assert_eq!(diagnostic["line"], 3);
	assert_eq!(diagnostic["column"], 1);
	assert_eq!(diagnostic["kind"], "indentation");
	assert_eq!(diagnostic["fix"]["text"], "  ");

	Ok(())
}

#[test]
fn check_github_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("App.vue"), MISINDENTED)?;

	let mut cmd = common::scriptdent_cmd();
	cmd.arg("check")
		.arg("--format")
		.arg("github")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::contains(
			"::warning file=App.vue,line=3,col=1::Expected indentation of 2 spaces but found 0 \
			 spaces.",
		));

	Ok(())
}

#[test]
fn check_reports_malformed_scripts() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("index.html"),
		"<script>\nfoo(\n</script>\n<script>\nok()\n</script>\n",
	)?;

	let mut cmd = common::scriptdent_cmd();
	cmd.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("script opened on line 1 was skipped"))
		.stderr(predicates::str::contains("1 error(s)"));

	Ok(())
}

#[test]
fn deeply_nested_script_does_not_stop_other_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let nested = format!("<script>\nx = {}1{}\n</script>\n", "[".repeat(3000), "]".repeat(3000));
	std::fs::write(tmp.path().join("deep.html"), nested)?;
	std::fs::write(tmp.path().join("App.vue"), MISINDENTED)?;

	let mut cmd = common::scriptdent_cmd();
	cmd.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("nesting too deep"))
		.stderr(predicates::str::contains("3:1 Expected indentation of 2 spaces"));

	Ok(())
}

#[test]
fn check_reports_unclosed_script_elements() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("index.html"), "<p>\n<script>\nok()\n")?;

	let mut cmd = common::scriptdent_cmd();
	cmd.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("missing closing `</script>`"));

	Ok(())
}

#[rstest]
#[case::tabs(&["--tabs"], 2)]
#[case::unit_size(&["--unit-size", "4"], 1)]
#[case::ignore_all(&["--tabs", "--ignore", "*"], 0)]
fn check_flags_override_config(#[case] flags: &[&str], #[case] count: usize) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("index.html"), INDENTED)?;

	let mut cmd = common::scriptdent_cmd();
	cmd.arg("check")
		.args(flags)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(if count == 0 { 0 } else { 1 });

	let mut cmd = common::scriptdent_cmd();
	let output = cmd
		.arg("check")
		.arg("--format")
		.arg("json")
		.args(flags)
		.arg("--path")
		.arg(tmp.path())
		.output()?;
	let json: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(json["diagnostics"].as_array().map(Vec::len), Some(count));

	Ok(())
}

#[test]
fn check_uses_config_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("index.html"),
		"<script>\nif (ready) {\n\tgo()\n}\n</script>\n",
	)?;
	std::fs::write(
		tmp.path().join("scriptdent.toml"),
		"[indent]\nunit_character = \"tab\"\n",
	)?;

	let mut cmd = common::scriptdent_cmd();
	cmd.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	Ok(())
}

#[test]
fn check_rejects_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("scriptdent.toml"), "[indent]\nunit_size = 0\n")?;

	let mut cmd = common::scriptdent_cmd();
	cmd.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("unit_size"));

	Ok(())
}

#[test]
fn check_only_named_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("bad.html"), MISINDENTED)?;
	std::fs::write(tmp.path().join("good.html"), INDENTED)?;

	let mut cmd = common::scriptdent_cmd();
	cmd.arg("check")
		.arg(tmp.path().join("good.html"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("1 file(s) checked"));

	Ok(())
}

#[test]
fn check_command_parses_format_and_files() {
	let cli = ScriptdentCli::parse_from(["scriptdent", "check", "--format", "json", "a.vue"]);
	match cli.command {
		Some(Commands::Check { files, format }) => {
			assert_eq!(format, OutputFormat::Json);
			assert_eq!(files, vec![std::path::PathBuf::from("a.vue")]);
		}
		_ => panic!("expected check command"),
	}
}

#[test]
fn global_flags_follow_the_subcommand() {
	let cli = ScriptdentCli::parse_from([
		"scriptdent",
		"fix",
		"--dry-run",
		"--tabs",
		"--ignore",
		"*",
		"--ignore",
		"ObjectExpression",
	]);
	assert!(cli.tabs);
	assert_eq!(cli.ignores, vec!["*".to_string(), "ObjectExpression".to_string()]);
	assert!(matches!(cli.command, Some(Commands::Fix { dry_run: true, .. })));
}
