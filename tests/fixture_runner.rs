use std::fs;
use std::path::Path;

mod common;

use common::run_capturing;

/// Each directory under tests/fixtures holds a `program.aks` and the exact
/// `expected.txt` it should print.
#[test]
fn run_fixtures() {
    let fixtures_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures");
    let mut entries: Vec<_> = fs::read_dir(&fixtures_dir)
        .expect("Failed to read fixtures directory")
        .map(|entry| entry.expect("Failed to read entry").path())
        .filter(|path| path.is_dir())
        .collect();
    entries.sort();

    let mut failures = Vec::new();
    for dir in &entries {
        if let Err(message) = run_case(dir) {
            failures.push(message);
        }
    }

    eprintln!("Ran {} fixtures", entries.len());
    assert!(!entries.is_empty(), "no fixtures found in {:?}", fixtures_dir);
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

fn run_case(dir: &Path) -> Result<(), String> {
    let name = dir.file_name().unwrap().to_string_lossy().into_owned();
    let program = fs::read_to_string(dir.join("program.aks"))
        .map_err(|e| format!("{}: cannot read program.aks: {}", name, e))?;
    let expected = fs::read_to_string(dir.join("expected.txt"))
        .map_err(|e| format!("{}: cannot read expected.txt: {}", name, e))?;

    let (result, output) = run_capturing(&program, "");
    if let Err(e) = result {
        return Err(format!("{}: interpreter error: {}", name, e));
    }
    if output != expected {
        return Err(format!(
            "{}: output mismatch\n--- expected\n{}--- actual\n{}",
            name, expected, output
        ));
    }
    Ok(())
}
