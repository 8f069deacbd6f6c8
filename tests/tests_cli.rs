//! Command-Line Tests
//!
//! Runs the built binary and checks exit status, stdout and stderr for
//! every outcome of a run.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use rstest::rstest;
use tempfile::TempDir;
use walkdir::WalkDir;

const HELP: &str = "\
Usage: silverchain [options]

options:
  -h, --help                Show this message and exit
  -v, --version             Show version and exit
  -i, --input <path>        Input grammar file
  -o, --output <path>       Output directory
  -l, --language <lang>     Output language
  -m, --max-file-count <n>  Maximum number of generated files
";

/// Run the binary in `dir`, feeding `stdin`
fn silverchain(dir: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_silverchain"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("binary should start");
    if let Some(mut input) = child.stdin.take() {
        // The process may exit before reading anything.
        let _ = input.write_all(stdin.as_bytes());
    }
    child.wait_with_output().expect("binary should finish")
}

fn assert_outcome(output: &Output, status: i32, stdout: &str, stderr: &str) {
    assert_eq!(output.status.code(), Some(status), "{output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout), stdout);
    assert_eq!(String::from_utf8_lossy(&output.stderr), stderr);
}

/// Relative paths of every file below `dir`, sorted
fn written(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.path().strip_prefix(dir).ok().map(Path::to_path_buf))
        .collect();
    files.sort();
    files
}

// ============================================================================
// Help and Version
// ============================================================================

#[rstest]
#[case("-h")]
#[case("--help")]
fn test_help(#[case] flag: &str) {
    let dir = TempDir::new().unwrap();
    let output = silverchain(dir.path(), &[flag], "");
    assert_outcome(&output, 0, HELP, "");
}

#[rstest]
#[case("-v")]
#[case("--version")]
fn test_version(#[case] flag: &str) {
    let dir = TempDir::new().unwrap();
    let output = silverchain(dir.path(), &[flag], "");
    let version = format!("{}\n", env!("CARGO_PKG_VERSION"));
    assert_outcome(&output, 0, &version, "");
}

// ============================================================================
// Option Errors
// ============================================================================

#[test]
fn test_unknown_option_reports_whole_word() {
    let dir = TempDir::new().unwrap();
    let output = silverchain(dir.path(), &["-foo"], "");
    assert_outcome(&output, 101, "", "Unknown option: -foo\n");
}

#[test]
fn test_unsupported_language() {
    let dir = TempDir::new().unwrap();
    let output = silverchain(dir.path(), &["-l", "foo"], "Foo: foo();");
    assert_outcome(&output, 102, "", "Unsupported language: foo\n");
}

#[rstest]
#[case("-i")]
#[case("--input")]
fn test_missing_input_file(#[case] flag: &str) {
    let dir = TempDir::new().unwrap();
    let output = silverchain(dir.path(), &[flag, "foo.ag"], "");
    assert_outcome(&output, 103, "", "File not found: foo.ag\n");
    assert!(written(dir.path()).is_empty());
}

// ============================================================================
// Grammar Errors
// ============================================================================

#[rstest]
#[case("=", 104, "Unexpected character '=' (L1C1)\n")]
#[case(":", 105, "Unexpected ':', expected identifier (L1C1)\n")]
#[case("Foo[T,T]:", 106, "T is already defined (L1C7)\n")]
#[case("Foo: a() | a();", 109, "Conflict: a()#L1C6, a()#L1C12\n")]
#[case("Foo: Baz a();", 110, "Undefined rule: Baz (L1C6)\n")]
fn test_grammar_errors(#[case] input: &str, #[case] status: i32, #[case] stderr: &str) {
    let dir = TempDir::new().unwrap();
    let output = silverchain(dir.path(), &["-o", "out"], input);
    assert_outcome(&output, status, "", stderr);
    assert!(written(dir.path()).is_empty(), "nothing is written on failure");
}

// ============================================================================
// Output Errors
// ============================================================================

#[test]
fn test_file_limit_exceeded() {
    let dir = TempDir::new().unwrap();
    let output = silverchain(dir.path(), &["-m", "1", "-o", "out"], "Foo: foo() Bar;");
    assert_eq!(output.status.code(), Some(107));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("File limit (1) exceeded"), "{stderr}");
    assert!(stderr.contains("2 generated files"), "{stderr}");
    assert!(written(dir.path()).is_empty());
}

#[test]
fn test_save_into_a_file_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("build.gradle"), "").unwrap();
    let output = silverchain(dir.path(), &["-o", "build.gradle"], "Foo: foo();");
    assert_outcome(
        &output,
        108,
        "",
        "Failed to save generated file: build.gradle/foo/Foo.java\n",
    );
}

// ============================================================================
// Success
// ============================================================================

#[rstest]
#[case("-o")]
#[case("--output")]
fn test_success_from_stdin(#[case] flag: &str) {
    let dir = TempDir::new().unwrap();
    let output = silverchain(dir.path(), &[flag, "out"], "Foo: foo() Bar;");
    assert_outcome(&output, 0, "", "");
    assert_eq!(
        written(&dir.path().join("out")),
        [PathBuf::from("foo/Foo.java"), PathBuf::from("foo/FooState0.java")]
    );
}

#[test]
fn test_success_from_file_into_current_directory() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("mapbuilder.ag"),
        "MapBuilder[K, V]:\n  put(K key, V value)*\n  build() java.util.Map<K, V>;\n",
    )
    .unwrap();
    let output = silverchain(dir.path(), &["-i", "mapbuilder.ag", "-l", "java"], "");
    assert_outcome(&output, 0, "", "");
    assert_eq!(
        written(dir.path()),
        [
            PathBuf::from("mapbuilder.ag"),
            PathBuf::from("mapbuilder/MapBuilder.java"),
            PathBuf::from("mapbuilder/MapBuilderState0.java"),
            PathBuf::from("mapbuilder/MapBuilderState1.java"),
        ]
    );
}

#[test]
fn test_larger_file_limit_allows_output() {
    let dir = TempDir::new().unwrap();
    let output = silverchain(
        dir.path(),
        &["--max-file-count", "2", "-o", "out"],
        "Foo: foo() Bar;",
    );
    assert_outcome(&output, 0, "", "");
    assert_eq!(written(&dir.path().join("out")).len(), 2);
}
