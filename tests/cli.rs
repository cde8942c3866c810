use std::process::Command;

#[test]
fn prints_version() {
  let exe = env!("CARGO_BIN_EXE_vibetube");
  let output = Command::new(exe).arg("--version").output().expect("run vibetube --version");
  assert!(output.status.success());
  let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
  assert!(stdout.contains(env!("CARGO_PKG_VERSION")), "stdout was: {}", stdout.trim());
}

#[test]
fn prints_help() {
  let exe = env!("CARGO_BIN_EXE_vibetube");
  let output = Command::new(exe).arg("--help").output().expect("run vibetube --help");
  assert!(output.status.success());
  let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
  assert!(stdout.contains("--base-url"));
  assert!(stdout.contains("--breakpoint"));
  assert!(stdout.contains("--completions"));
}

#[test]
fn prints_completions_without_touching_the_terminal() {
  let exe = env!("CARGO_BIN_EXE_vibetube");
  let output = Command::new(exe).args(["--completions", "bash"]).output().expect("run vibetube --completions");
  assert!(output.status.success());
  let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
  assert!(stdout.contains("vibetube"));
}
