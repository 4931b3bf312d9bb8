use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn pagemark_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pagemark").expect("binary exists");
    cmd.env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"));
    cmd
}

fn write_document(dir: &Path, overlays: &str) -> std::path::PathBuf {
    let path = dir.join("doc.json");
    let body = format!(
        r#"{{"fileId": "f-42", "pageCount": 2, "overlays": [{overlays}]}}"#
    );
    std::fs::write(&path, body).unwrap();
    path
}

const TEXT_T1: &str = r##"{"id": "t1", "page": 1, "x": 80, "y": 120, "width": 200, "height": 40,
    "type": "text", "text": "New text", "fontSize": 20, "color": "#1c2230"}"##;

#[test]
fn pagemark_help_prints_usage() {
    let temp = TempDir::new().unwrap();
    pagemark_cmd(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Reconcile document overlays into a page scene",
        ));
}

#[test]
fn empty_session_prints_no_nodes() {
    let temp = TempDir::new().unwrap();
    pagemark_cmd(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn document_is_projected_at_requested_scale() {
    let temp = TempDir::new().unwrap();
    let doc = write_document(temp.path(), TEXT_T1);

    pagemark_cmd(temp.path())
        .arg("--document")
        .arg(&doc)
        .args(["--scale", "1.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("text t1 at (120, 180)"))
        .stdout(predicate::str::contains("text=\"New text\""));
}

#[test]
fn other_pages_are_not_shown() {
    let temp = TempDir::new().unwrap();
    let doc = write_document(temp.path(), TEXT_T1);

    pagemark_cmd(temp.path())
        .arg("--document")
        .arg(&doc)
        .args(["--page", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("t1").not());
}

#[test]
fn export_prints_snapshot_json() {
    let temp = TempDir::new().unwrap();
    let doc = write_document(temp.path(), TEXT_T1);

    pagemark_cmd(temp.path())
        .arg("--document")
        .arg(&doc)
        .args(["--export", "--page-size", "595x842", "--scale", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"fileId\": \"f-42\""))
        .stdout(predicate::str::contains("\"pageWidth\": 595.0"))
        .stdout(predicate::str::contains("\"pageHeight\": 842.0"));
}

#[test]
fn image_loads_before_printing() {
    let temp = TempDir::new().unwrap();
    let png = temp.path().join("stamp.png");
    image::RgbaImage::new(8, 4).save(&png).unwrap();

    let overlay = format!(
        r#"{{"id": "img", "page": 1, "x": 10, "y": 10, "width": 80, "height": 40,
            "type": "image", "src": {}}}"#,
        serde_json::to_string(&png.to_string_lossy()).unwrap()
    );
    let doc = write_document(temp.path(), &overlay);

    pagemark_cmd(temp.path())
        .arg("--document")
        .arg(&doc)
        .args(["--scale", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("image img at (10, 10)"))
        .stdout(predicate::str::contains("natural=8x4"));
}

#[test]
fn missing_image_is_left_out() {
    let temp = TempDir::new().unwrap();
    let overlay = r#"{"id": "img", "page": 1, "x": 10, "y": 10, "width": 80, "height": 40,
        "type": "image", "src": "/nonexistent/stamp.png"}"#;
    let doc = write_document(temp.path(), overlay);

    pagemark_cmd(temp.path())
        .arg("--document")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("img").not());
}

#[test]
fn page_out_of_range_fails() {
    let temp = TempDir::new().unwrap();
    pagemark_cmd(temp.path())
        .args(["--page", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot show page 5"));
}

#[test]
fn malformed_page_size_is_rejected() {
    let temp = TempDir::new().unwrap();
    pagemark_cmd(temp.path())
        .args(["--page-size", "wide"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected <W>x<H>"));
}

#[test]
fn restore_without_autosave_fails() {
    let temp = TempDir::new().unwrap();
    pagemark_cmd(temp.path())
        .arg("--restore")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no autosaved document found"));
}

#[test]
fn saved_document_can_be_restored() {
    let temp = TempDir::new().unwrap();
    let doc = write_document(temp.path(), TEXT_T1);

    pagemark_cmd(temp.path())
        .arg("--document")
        .arg(&doc)
        .arg("--save")
        .assert()
        .success();
    assert!(temp.path().join("data/pagemark/autosave.json").exists());

    pagemark_cmd(temp.path())
        .args(["--restore", "--scale", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("text t1 at (160, 240)"));
}

#[test]
fn explicit_config_file_is_used() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("custom.toml");
    std::fs::write(
        &config,
        "[view]\ninitial_scale = 2.0\n\n[autosave]\nfile_name = \"draft.json\"\n",
    )
    .unwrap();
    let doc = write_document(temp.path(), TEXT_T1);

    pagemark_cmd(temp.path())
        .arg("--config")
        .arg(&config)
        .arg("--document")
        .arg(&doc)
        .arg("--save")
        .assert()
        .success()
        .stdout(predicate::str::contains("text t1 at (160, 240)"));
    assert!(temp.path().join("data/pagemark/draft.json").exists());
}

#[test]
fn enabled_autosave_keeps_opened_document() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("custom.toml");
    std::fs::write(&config, "[autosave]\nenabled = true\n").unwrap();
    let doc = write_document(temp.path(), TEXT_T1);

    pagemark_cmd(temp.path())
        .arg("--config")
        .arg(&config)
        .arg("--document")
        .arg(&doc)
        .assert()
        .success();
    assert!(temp.path().join("data/pagemark/autosave.json").exists());

    pagemark_cmd(temp.path())
        .arg("--restore")
        .args(["--scale", "1.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("text t1 at (120, 180)"));
}

#[test]
fn unreadable_document_reports_path() {
    let temp = TempDir::new().unwrap();
    pagemark_cmd(temp.path())
        .args(["--document", "/nonexistent/doc.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read document"));
}
