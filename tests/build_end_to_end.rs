// tests/build_end_to_end.rs

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetdag::config::BuildPaths;
use assetdag::errors::BuildError;
use assetdag::fs::{FileSystem, RealFileSystem};
use assetdag::run_task;
use assetdag_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

const SITE_LESS: &str = "\
@brand: #337ab7;
// navigation
.nav {
  color: @brand;
  a { user-select: none; }
}
";

fn write(root: &Path, rel: &str, contents: &[u8]) -> std::io::Result<()> {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap_or(root))?;
    fs::write(path, contents)
}

fn project() -> std::io::Result<tempfile::TempDir> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write(root, "less/site.less", SITE_LESS.as_bytes())?;
    write(root, "node_modules/jquery/dist/jquery.min.js", b"/*! jQuery */")?;
    write(root, "node_modules/bootstrap/dist/fonts/glyphicons.woff", &[0, 1, 2, 255])?;
    Ok(dir)
}

fn paths(root: &Path) -> Result<BuildPaths, BuildError> {
    BuildPaths::resolve_with(root, None, |key| {
        (key == "GOPATH").then(|| "/go".to_string())
    })
}

fn fs() -> Arc<dyn FileSystem> {
    Arc::new(RealFileSystem)
}

/// Every file below `dir`, keyed by path relative to `dir`.
fn snapshot(dir: &Path) -> std::io::Result<BTreeMap<PathBuf, Vec<u8>>> {
    let mut out = BTreeMap::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        if !current.exists() {
            continue;
        }
        for entry in fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let rel = path.strip_prefix(dir).unwrap_or(&path).to_path_buf();
                out.insert(rel, fs::read(&path)?);
            }
        }
    }
    Ok(out)
}

#[test]
fn default_builds_css_and_copies_libs() -> TestResult {
    init_tracing();
    let dir = project()?;
    let root = dir.path();

    let report = run_task(&paths(root)?, fs(), "default")?;
    assert_eq!(report.executed, ["css", "libs", "default"]);

    let css = fs::read_to_string(root.join("www/css/site.css"))?;
    assert!(css.starts_with(".nav{color:#337ab7}"), "got {css}");
    assert!(css.contains(".nav a{-webkit-user-select:none;"), "got {css}");
    assert!(css.contains("user-select:none}"), "got {css}");
    assert!(!css.contains('\n'));

    assert_eq!(fs::read(root.join("www/js/jquery.min.js"))?, b"/*! jQuery */");
    assert_eq!(
        fs::read(root.join("www/fonts/glyphicons.woff"))?,
        vec![0, 1, 2, 255]
    );
    Ok(())
}

#[test]
fn rebuilding_unchanged_sources_is_byte_identical() -> TestResult {
    let dir = project()?;
    let root = dir.path();
    let paths = paths(root)?;

    run_task(&paths, fs(), "default")?;
    let first = snapshot(&root.join("www"))?;
    run_task(&paths, fs(), "default")?;
    let second = snapshot(&root.join("www"))?;

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn empty_css_match_still_succeeds() -> TestResult {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write(root, "node_modules/jquery/dist/jquery.js", b"x")?;

    let report = run_task(&paths(root)?, fs(), "default")?;
    assert_eq!(report.executed, ["css", "libs", "default"]);
    assert!(!root.join("www/css").exists());
    assert!(root.join("www/js/jquery.js").exists());
    // Destinations are created even when nothing matches.
    assert!(root.join("www/fonts").is_dir());
    Ok(())
}

#[test]
fn invalid_css_aborts_and_names_the_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write(root, "less/a.less", b"a { color: red; }")?;
    write(root, "less/b.less", b"b {\n  color: red;\n")?;
    write(root, "less/c.less", b"c { color: blue; }")?;
    write(root, "node_modules/jquery/dist/jquery.js", b"x")?;

    let err = run_task(&paths(root)?, fs(), "default").unwrap_err();
    assert_eq!(err.failed_task(), Some("css"));
    let message = err.to_string();
    assert!(message.contains("b.less"), "got {message}");
    assert!(message.contains("less failed"), "got {message}");

    // Earlier output kept, failing and later files untouched, later tasks skipped.
    assert!(root.join("www/css/a.css").exists());
    assert!(!root.join("www/css/b.css").exists());
    assert!(!root.join("www/css/c.css").exists());
    assert!(!root.join("www/js").exists());
    Ok(())
}

#[test]
fn missing_gopath_fails_before_any_write() -> TestResult {
    let dir = project()?;
    let root = dir.path();
    let before = snapshot(root)?;

    let err = BuildPaths::resolve_with(root, None, |_| None).unwrap_err();
    assert!(err.is_startup_error());
    assert!(err.to_string().contains("GOPATH"));

    assert_eq!(snapshot(root)?, before);
    assert!(!root.join("www").exists());
    Ok(())
}

#[test]
fn layout_file_overrides_defaults() -> TestResult {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write(root, "styles/main.less", b".x { top: 0; }")?;
    write(root, "vendor/lib.js", b"lib")?;
    write(
        root,
        "Assetdag.toml",
        br#"
[layout]
css_sources = "styles/*.less"
css_output_dir = "public/css"

[[libs]]
pattern = "vendor/*.js"
dest = ["public/js", "public/legacy"]
"#,
    )?;

    let paths = paths(root)?;
    run_task(&paths, fs(), "default")?;

    assert_eq!(fs::read_to_string(root.join("public/css/main.css"))?, ".x{top:0}");
    assert_eq!(fs::read(root.join("public/js/lib.js"))?, b"lib");
    assert_eq!(fs::read(root.join("public/legacy/lib.js"))?, b"lib");
    Ok(())
}

#[test]
fn explicit_missing_layout_file_is_an_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("nope.toml");
    let err = BuildPaths::resolve_with(dir.path(), Some(missing.as_path()), |_| Some("/go".into()))
        .unwrap_err();
    assert!(matches!(err, BuildError::IoError { .. }));
    Ok(())
}
