use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const REGIONS: &str = r#"[
    [[[20, 20], [120, 20], [120, 40], [20, 40]], "hello", 0.9],
    [[[20, 60], [80, 60], [80, 70], [20, 70]], "noise", 0.3]
]"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        image::RgbImage::from_pixel(200, 100, image::Rgb([240, 240, 240]))
            .save(dir.path().join("page.png"))
            .unwrap();
        fs::write(dir.path().join("regions.json"), REGIONS).unwrap();
        fs::write(dir.path().join("config.json"), "{}").unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn scanlayer(&self) -> Command {
        let mut cmd = Command::cargo_bin("scanlayer").unwrap();
        cmd.current_dir(self.dir.path())
            .arg("--config")
            .arg(self.path("config.json"));
        cmd
    }

    fn convert(&self) -> Command {
        let mut cmd = self.scanlayer();
        cmd.arg("convert")
            .arg(self.path("page.png"))
            .arg("--regions")
            .arg(self.path("regions.json"))
            .arg("--no-spellcheck");
        cmd
    }
}

fn pdf_files(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".pdf"))
        .collect()
}

#[test]
fn convert_with_regions_writes_pdf() {
    let ws = Workspace::new();

    ws.convert()
        .arg("-o")
        .arg(ws.path("out.pdf"))
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 2 regions drawn"))
        .stdout(predicate::str::contains("200x100"));

    let data = fs::read(ws.path("out.pdf")).unwrap();
    assert!(data.starts_with(b"%PDF"));
}

#[test]
fn convert_defaults_to_timestamped_output() {
    let ws = Workspace::new();

    ws.convert().assert().success();

    let pdfs = pdf_files(ws.dir.path());
    assert_eq!(pdfs.len(), 1);
    assert!(pdfs[0].starts_with("output_"));
}

#[test]
fn convert_prints_json_report() {
    let ws = Workspace::new();

    let assert = ws
        .convert()
        .arg("-o")
        .arg(ws.path("out.pdf"))
        .arg("--json")
        .arg("--invisible")
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 200x100 page"));

    let report: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["regions_seen"], 2);
    assert_eq!(report["drawn"], 1);
    assert!(report["malformed"].is_number());
}

#[test]
fn convert_missing_input_fails() {
    let ws = Workspace::new();

    ws.scanlayer()
        .arg("convert")
        .arg(ws.path("absent.png"))
        .arg("--regions")
        .arg(ws.path("regions.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn convert_unknown_font_leaves_no_output() {
    let ws = Workspace::new();

    ws.convert()
        .arg("-o")
        .arg(ws.path("out.pdf"))
        .arg("--font")
        .arg("Arial")
        .assert()
        .failure()
        .stderr(predicate::str::contains("font not registered: Arial"));

    assert!(pdf_files(ws.dir.path()).is_empty());
    assert_eq!(fs::read_dir(ws.dir.path()).unwrap().count(), 3);
}

#[test]
fn convert_without_models_or_regions_fails() {
    let ws = Workspace::new();

    ws.scanlayer()
        .arg("convert")
        .arg(ws.path("page.png"))
        .arg("--model-dir")
        .arg(ws.path("no-models"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("OCR models not found"));
}

#[test]
fn convert_rejects_out_of_range_alpha() {
    let ws = Workspace::new();

    ws.convert()
        .arg("--alpha")
        .arg("1.5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("fill_alpha"));
}

#[test]
fn config_init_get_set() {
    let ws = Workspace::new();
    fs::remove_file(ws.path("config.json")).unwrap();

    ws.scanlayer()
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    ws.scanlayer()
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    ws.scanlayer()
        .args(["config", "init", "--force"])
        .assert()
        .success();

    ws.scanlayer()
        .args(["config", "get", "overlay.min_confidence"])
        .assert()
        .success()
        .stdout(predicate::str::diff("0.5\n"));

    ws.scanlayer()
        .args(["config", "set", "overlay.fill_alpha", "0.25"])
        .assert()
        .success();

    ws.scanlayer()
        .args(["config", "get", "overlay.fill_alpha"])
        .assert()
        .success()
        .stdout(predicate::str::diff("0.25\n"));

    ws.scanlayer()
        .args(["config", "set", "overlay.colour", "red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn config_show_and_path() {
    let ws = Workspace::new();

    ws.scanlayer()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"min_confidence\": 0.5"))
        .stdout(predicate::str::contains("\"render_mode\": \"fill\""));

    ws.scanlayer()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"))
        .stdout(predicate::str::contains("exists"));
}
