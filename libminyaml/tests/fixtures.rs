//! Test harness for the minyaml parser against fixture files.
//!
//! This test harness reads all .yml files from the test/yml/ directory,
//! parses them, and compares the emitted text against test/out/. Emitted
//! text must parse back to the same tree. It also reads .nay files from
//! test/nay/ (expected to fail) and verifies they produce the expected error
//! messages from corresponding .error files.

use std::fs;
use std::path::{Path, PathBuf};

use libminyaml::{parse, parse_with_filename, to_yaml_string};

/// Root test directory.
fn test_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
}

/// Files matching `test/<subdir>/*.<ext>`, sorted.
fn get_files_in_subdir(subdir: &str, ext: &str) -> Vec<PathBuf> {
    let pattern = test_root().join(subdir).join(format!("*.{}", ext));
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .expect("valid glob pattern")
        .flatten()
        .collect();
    files.sort();
    files
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

fn read_sibling(path: &Path, subdir: &str, ext: &str) -> Option<String> {
    let basename = path.file_stem().unwrap().to_string_lossy();
    let sibling = test_root().join(subdir).join(format!("{}.{}", basename, ext));
    fs::read_to_string(sibling).ok()
}

/// Run a single .yml test file.
fn run_yml_test(path: &Path) -> Result<(), String> {
    let filename = file_name(path);
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let doc = parse_with_filename(&content, Some(&filename))
        .map_err(|e| format!("{}: Unexpected parse error: {}", filename, e))?;
    let emitted = to_yaml_string(doc.root());

    if let Some(expected) = read_sibling(path, "out", "yml") {
        if emitted != expected {
            return Err(format!(
                "{}: Output mismatch\n--- expected\n{}--- actual\n{}",
                filename, expected, emitted
            ));
        }
    } else {
        println!("  {} => (no expected output)\n{}", filename, emitted);
    }

    let reparsed =
        parse(&emitted).map_err(|e| format!("{}: Emitted text does not parse: {}", filename, e))?;
    if reparsed != doc {
        return Err(format!(
            "{}: Round-trip mismatch\n    original: {:?}\n    reparsed: {:?}",
            filename,
            doc.root(),
            reparsed.root()
        ));
    }

    println!("  {} => ok", filename);
    Ok(())
}

/// Run a single .nay test file (expected to fail with specific error).
fn run_nay_test(path: &Path) -> Result<(), String> {
    let filename = file_name(path);
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    // Parse with filename for error location reporting
    match parse_with_filename(&content, Some(&filename)) {
        Ok(doc) => Err(format!(
            "{}: Expected parse error, but got success: {:?}",
            filename,
            doc.root()
        )),
        Err(e) => {
            let actual_error = e.to_string();
            match read_sibling(path, "nay", "error") {
                Some(expected) if expected.trim() == actual_error => {
                    println!("  {} => error (as expected)", filename);
                    Ok(())
                }
                Some(expected) => Err(format!(
                    "{}: Error mismatch\n    expected: {}\n    actual:   {}",
                    filename,
                    expected.trim(),
                    actual_error
                )),
                None => {
                    println!(
                        "  {} => error: {} (no .error file to compare)",
                        filename, actual_error
                    );
                    Ok(())
                }
            }
        }
    }
}

fn run_all(kind: &str, files: &[PathBuf], run: fn(&Path) -> Result<(), String>) {
    assert!(!files.is_empty(), "No .{} test files found!", kind);

    println!("\nRunning {} .{} test files:", files.len(), kind);

    let mut passed = 0;
    let mut failed = 0;
    let mut errors: Vec<String> = Vec::new();

    for file in files {
        match run(file) {
            Ok(()) => passed += 1,
            Err(e) => {
                failed += 1;
                errors.push(e);
            }
        }
    }

    println!("\nResults: {} passed, {} failed", passed, failed);

    if !errors.is_empty() {
        println!("\nErrors:");
        for error in &errors {
            println!("  - {}", error);
        }
    }

    assert!(failed == 0, "{} .{} tests failed", failed, kind);
}

#[test]
fn test_all_yml_fixtures() {
    run_all("yml", &get_files_in_subdir("yml", "yml"), run_yml_test);
}

#[test]
fn test_all_nay_fixtures() {
    run_all("nay", &get_files_in_subdir("nay", "nay"), run_nay_test);
}

#[test]
fn test_fixture_queries() {
    let path = test_root().join("yml").join("sequence-of-mappings.yml");
    let doc = libminyaml::load_file(&path).unwrap();
    let view = doc.view();
    assert_eq!(view.at_path("servers[1].tags[0]").as_str(), Some("primary"));
    assert_eq!(view.value("servers[0].port", 0u16), 80);
    assert_eq!(view.value("servers[2].port", 0u16), 0);

    let path = test_root().join("yml").join("basic-mapping.yml");
    let doc = libminyaml::load_file(&path).unwrap();
    let view = doc.view();
    assert!(view.value("debug", false));
    assert_eq!(view.value("version", 0.0f64), 1.2);
    assert_eq!(view.value("name", String::new()), "Test App");
}
