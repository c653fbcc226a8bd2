use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn favload(config_dir: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_favload"));
    command.env("FAVLOAD_CONFIG_DIR", config_dir);
    command.env_remove("RUST_LOG");
    command
}

#[test]
fn render_writes_a_32px_png() {
    let root = TempDir::new().unwrap();
    let output = root.path().join("icon.png");

    let status = favload(root.path())
        .args(["render", "--progress", "30", "--output"])
        .arg(&output)
        .status()
        .expect("failed to run favload render");
    assert!(status.success());

    let bytes = fs::read(&output).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    let image = image::load_from_memory(&bytes).unwrap();
    assert_eq!((image.width(), image.height()), (32, 32));
}

#[test]
fn render_json_reports_title_and_data_url() {
    let root = TempDir::new().unwrap();
    let output = favload(root.path())
        .args(["render", "--progress", "50", "--json"])
        .output()
        .expect("failed to run favload render --json");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["title"], "Loading 50%");
    assert_eq!(report["shape"], "pie");
    assert_eq!(report["percent"], 50.0);
    assert!(report["href"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
}

#[test]
fn render_reads_config_from_config_dir() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("favload.toml"),
        r##"
version = 1
[loader]
shape = "donut"
message = "{{progress}} of {{max}}"
max = 8
"##,
    )
    .unwrap();

    let output = favload(root.path())
        .args(["render", "--progress", "2", "--json"])
        .output()
        .expect("failed to run favload render");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["title"], "2 of 8");
    assert_eq!(report["shape"], "donut");
}

#[test]
fn render_rejects_invalid_max() {
    let root = TempDir::new().unwrap();
    let status = favload(root.path())
        .args(["render", "--max", "0"])
        .status()
        .expect("failed to run favload render");
    assert!(!status.success());
}

#[test]
fn simulate_writes_one_frame_per_step() {
    let root = TempDir::new().unwrap();
    let frames = root.path().join("frames");

    let output = favload(root.path())
        .args(["simulate", "--step", "25", "--title", "Inbox", "--frames"])
        .arg(&frames)
        .output()
        .expect("failed to run favload simulate");
    assert!(output.status.success());

    let mut names: Vec<_> = fs::read_dir(&frames)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "frame-0000.png",
            "frame-0001.png",
            "frame-0002.png",
            "frame-0003.png",
            "frame-0004.png",
        ]
    );

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Loading 100%"));
    assert!(stdout.contains("restored icons: /favicon.ico"));
}

#[test]
fn simulate_refuses_unbounded_runs() {
    let root = TempDir::new().unwrap();
    let output = favload(root.path())
        .args(["simulate", "--max", "1e20", "--step", "1"])
        .output()
        .expect("failed to run favload simulate");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
