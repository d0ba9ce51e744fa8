//! End-to-end tests for the hf binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const STARTER: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <title>@@title | Admin</title>
    <link href="assets/css/app.min.css" rel="stylesheet" type="text/css">
</head>
<body>
    <div class="wrapper">
        <!-- start page title -->
        <h4 class="page-title">Starter</h4>
        <!-- end page title -->
    </div> <!-- container -->
    <script src="assets/js/app.js"></script>
</body>
</html>
"#;

const PAGE: &str = r#"@@include('./partials/pages-starter.html', {"title": "Dashboard"})

<!-- start page title -->
<h4 class="page-title">Dashboard</h4>
<!-- end page title -->
@@include('./partials/widget.html', {"label": "Revenue", "value": 42})
"#;

/// A minimal Admin/src tree with a starter layout and one page
struct Project {
    temp: TempDir,
}

impl Project {
    fn new() -> Self {
        let project = Self {
            temp: TempDir::new().expect("Failed to create temp dir"),
        };
        project.write("Admin/src/partials/pages-starter.html", STARTER);
        project.write(
            "Admin/src/partials/widget.html",
            "<div class=\"widget\"><span>@@label</span><b>@@value</b><i>@@missing</i></div>",
        );
        project.write("Admin/src/index.html", PAGE);
        project.write("Admin/src/assets/css/app.min.css", "body{margin:0}");
        project.write("Admin/src/assets/js/app.js", "console.log(1)");
        project
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.temp.path().join(rel)
    }

    fn hf(&self) -> Command {
        let mut cmd = Command::cargo_bin("hf").unwrap();
        cmd.current_dir(self.temp.path()).env_remove("RUST_LOG");
        cmd
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_flatten_merges_page_into_starter() {
    let project = Project::new();
    let output = project.path("Admin/dist/index.html");

    project
        .hf()
        .args(["-i", "Admin/src/index.html", "-o", "Admin/dist/index.html"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote flattened HTML to"))
        .stderr(predicate::str::contains("@@missing"));

    let html = read(&output);
    assert_eq!(html.matches("<html").count(), 1);
    assert_eq!(html.matches("<body>").count(), 1);
    assert_eq!(html.matches("<!-- start page title -->").count(), 1);
    assert!(html.contains("<title>Dashboard | Admin</title>"));
    assert!(html.contains("<span>Revenue</span><b>42</b><i></i>"));
    assert!(html.find("class=\"widget\"").unwrap() < html.find("</div> <!-- container -->").unwrap());
    assert!(html.contains("href=\"../src/assets/css/app.min.css\""));
    assert!(!html.contains("@@"));
}

#[test]
fn test_validate_passes_for_complete_tree() {
    let project = Project::new();

    project
        .hf()
        .args(["-i", "Admin/src/index.html", "-o", "Admin/dist/index.html", "--validate"])
        .assert()
        .success();

    assert!(project.path("Admin/dist/index.html").exists());
}

#[test]
fn test_validate_rejects_missing_asset() {
    let project = Project::new();
    project.write(
        "Admin/src/index.html",
        &format!("{}<img src=\"assets/images/missing-logo.png\">\n", PAGE),
    );

    project
        .hf()
        .args(["-i", "Admin/src/index.html", "-o", "Admin/dist/index.html", "--validate"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Validation errors"))
        .stderr(predicate::str::contains("missing-logo.png"));

    assert!(!project.path("Admin/dist/index.html").exists());
}

#[test]
fn test_missing_asset_written_without_validate() {
    let project = Project::new();
    project.write(
        "Admin/src/index.html",
        &format!("{}<img src=\"assets/images/missing-logo.png\">\n", PAGE),
    );

    project
        .hf()
        .args(["-i", "Admin/src/index.html", "-o", "Admin/dist/index.html"])
        .assert()
        .success();

    assert!(read(&project.path("Admin/dist/index.html")).contains("missing-logo.png"));
}

#[test]
fn test_missing_include_marker_and_validation() {
    let project = Project::new();
    project.write(
        "Admin/src/index.html",
        &format!("{}@@include('./partials/gone.html')\n", PAGE),
    );

    project
        .hf()
        .args(["-i", "Admin/src/index.html", "-o", "Admin/dist/a.html"])
        .assert()
        .success()
        .stderr(predicate::str::contains("included file not found"));
    assert!(read(&project.path("Admin/dist/a.html")).contains("<!-- include not found: ./partials/gone.html -->"));

    project
        .hf()
        .args(["-i", "Admin/src/index.html", "-o", "Admin/dist/b.html", "--validate"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("include(s) were not found"));
}

#[test]
fn test_diagnostics_shown_at_error_log_level() {
    let project = Project::new();
    project.write(
        "Admin/src/index.html",
        &format!("{}@@include('./partials/gone.html')\n", PAGE),
    );

    project
        .hf()
        .args(["-l", "ERROR", "-i", "Admin/src/index.html", "-o", "out/index.html"])
        .assert()
        .success()
        .stderr(predicate::str::contains("included file not found"))
        .stderr(predicate::str::contains("@@missing"));
}

#[test]
fn test_copy_assets_duplicates_tree() {
    let project = Project::new();

    project
        .hf()
        .args([
            "-i",
            "Admin/src/index.html",
            "-o",
            "out/index.html",
            "--copy-assets",
            "--validate",
            "--list-assets",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("assets/css/app.min.css"))
        .stdout(predicate::str::contains("assets/js/app.js"));

    assert_eq!(
        fs::read(project.path("out/assets/css/app.min.css")).unwrap(),
        fs::read(project.path("Admin/src/assets/css/app.min.css")).unwrap()
    );
    let html = read(&project.path("out/index.html"));
    assert!(html.contains("href=\"assets/css/app.min.css\""));
    assert!(html.contains("src=\"assets/js/app.js\""));
}

#[test]
fn test_circular_include_fails() {
    let project = Project::new();
    project.write("Admin/src/loop-a.html", "@@include('./loop-b.html')");
    project.write("Admin/src/loop-b.html", "@@include('./loop-a.html')");

    project
        .hf()
        .args(["-i", "Admin/src/loop-a.html", "-o", "out/loop.html"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Circular include detected"));

    assert!(!project.path("out/loop.html").exists());
}

#[test]
fn test_missing_input_fails() {
    let project = Project::new();

    project
        .hf()
        .args(["-i", "Admin/src/nope.html", "-o", "out/nope.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_config_supplies_insertion_marker() {
    let project = Project::new();
    project.write(
        "Admin/src/partials/pages-starter.html",
        "<html><head></head><body><main>\n</main><footer></footer></body></html>",
    );
    project.write(
        "htmlflat.yml",
        "starter:\n  insertion-markers:\n    - \"</main>\"\n",
    );

    project
        .hf()
        .args([
            "-c",
            "htmlflat.yml",
            "-i",
            "Admin/src/index.html",
            "-o",
            "out/index.html",
        ])
        .assert()
        .success();

    let html = read(&project.path("out/index.html"));
    assert!(html.find("class=\"widget\"").unwrap() < html.find("</main>").unwrap());
}
