use std::fs;
use std::path::Path;
use std::process::Command;

fn demos_root() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
}

#[test]
fn suite_mode_runs_all_demo_suites() {
    let bin = env!("CARGO_BIN_EXE_straw");

    let mut directories = fs::read_dir(demos_root())
        .expect("demos root must exist")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.join("suite.json").is_file())
        .collect::<Vec<_>>();
    directories.sort();

    assert!(!directories.is_empty(), "expected demo suites");

    for directory in directories {
        let output = Command::new(bin)
            .arg("suite")
            .arg("--dir")
            .arg(&directory)
            .output()
            .expect("cli should execute");

        if !output.status.success() {
            panic!(
                "suite {} failed\nstdout:\n{}\nstderr:\n{}",
                directory.display(),
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            stdout.contains("RESULT:OK"),
            "stdout missing RESULT:OK for {}",
            directory.display()
        );
        assert!(
            stdout.contains("RUN_JSON:"),
            "stdout missing RUN_JSON for {}",
            directory.display()
        );
    }
}

#[test]
fn run_mode_prints_run_lines_and_summary() {
    let bin = env!("CARGO_BIN_EXE_straw");
    let demo = demos_root().join("automation");

    let output = Command::new(bin)
        .arg("run")
        .arg("--scene")
        .arg(demo.join("scene.json"))
        .arg("--scripts-dir")
        .arg(&demo)
        .arg("click_component.rhai")
        .arg("raise.rhai")
        .output()
        .expect("cli should execute");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("RESULT:FAILED"));
    assert!(stdout.contains(r#""name":"click_component.rhai","outcome":"pass""#));
    assert!(stdout.contains("Invalid result of the processing"));
    assert!(stdout.contains("SUMMARY:total=2 failed=1 skipped=0 quit=false"));
}

#[test]
fn run_mode_honours_quit_request() {
    let bin = env!("CARGO_BIN_EXE_straw");
    let demo = demos_root().join("automation");

    let output = Command::new(bin)
        .arg("run")
        .arg("--scene")
        .arg(demo.join("scene.json"))
        .arg("--scripts-dir")
        .arg(&demo)
        .arg("quit.rhai")
        .arg("raise.rhai")
        .output()
        .expect("cli should execute");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("RESULT:OK"));
    assert!(stdout.contains(r#""name":"quit.rhai""#));
    assert!(stdout.contains(r#""quitRequested":true"#));
    assert!(!stdout.contains(r#""name":"raise.rhai""#));
    assert!(stdout.contains("SUMMARY:total=1 failed=0 skipped=1 quit=true"));
}

#[test]
fn info_mode_prints_component_json() {
    let bin = env!("CARGO_BIN_EXE_straw");
    let demo = demos_root().join("automation");

    let output = Command::new(bin)
        .arg("info")
        .arg("--scene")
        .arg(demo.join("scene.json"))
        .arg("--id")
        .arg("slider")
        .output()
        .expect("cli should execute");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("RESULT:OK"));
    assert!(stdout.contains("INFO_JSON:"));
    assert!(stdout.contains("CustomSlider"));
}
