use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn scriptdent_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("scriptdent"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}
