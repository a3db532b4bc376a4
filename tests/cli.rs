use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn ctxgrep(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ctxgrep").unwrap();
    cmd.current_dir(dir);
    cmd
}

fn write(dir: &Path, relative: &str, contents: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn twenty_lines_with_match_at_ten() -> String {
    (1..=20)
        .map(|i| {
            if i == 10 {
                "LegacyAllocator alloc;\n".to_string()
            } else {
                format!("// line {}\n", i)
            }
        })
        .collect()
}

#[test]
fn writes_match_with_surrounding_context() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "src/a.h", &twenty_lines_with_match_at_ten());

    ctxgrep(temp_dir.path())
        .args(["LegacyAllocator", "src", "-q"])
        .assert()
        .success();

    let report = fs::read_to_string(temp_dir.path().join("results.txt")).unwrap();

    let block: Vec<String> = (5..=15)
        .map(|i| {
            if i == 10 {
                "LegacyAllocator alloc;".to_string()
            } else {
                format!("// line {}", i)
            }
        })
        .collect();
    let expected = format!(
        "FILE: {}\nMATCH LINE: 10\n{}\n\n----\n\n",
        Path::new("src").join("a.h").display(),
        block.join("\n")
    );
    assert_eq!(report, expected);
}

#[test]
fn context_is_clipped_to_short_files() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "short.cpp", "first\nneedle\nlast\n");

    ctxgrep(temp_dir.path())
        .args(["needle", "--relative-paths", "-q"])
        .assert()
        .success();

    let report = fs::read_to_string(temp_dir.path().join("results.txt")).unwrap();
    assert_eq!(
        report,
        "FILE: short.cpp\nMATCH LINE: 2\nfirst\nneedle\nlast\n\n----\n\n"
    );
}

#[test]
fn only_allowlisted_extensions_are_searched() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "foo.txt", "needle\n");
    write(temp_dir.path(), "foo.cpp", "needle\n");

    ctxgrep(temp_dir.path())
        .args(["needle", "--relative-paths", "-q"])
        .assert()
        .success();

    let report = fs::read_to_string(temp_dir.path().join("results.txt")).unwrap();
    assert!(report.contains("FILE: foo.cpp"));
    assert!(!report.contains("foo.txt"));
    assert_eq!(report.matches("MATCH LINE").count(), 1);
}

#[test]
fn custom_extensions_replace_the_default_list() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "foo.txt", "needle\n");
    write(temp_dir.path(), "foo.cpp", "needle\n");

    ctxgrep(temp_dir.path())
        .args(["needle", "-e", "txt", "-o", "out/report.log", "--relative-paths", "-q"])
        .assert()
        .success();

    let report = fs::read_to_string(temp_dir.path().join("out/report.log")).unwrap();
    assert!(report.contains("FILE: foo.txt"));
    assert!(!report.contains("foo.cpp"));
}

#[test]
fn no_matches_produces_empty_report() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "main.cc", "int main() { return 0; }\n");

    ctxgrep(temp_dir.path())
        .args(["LegacyAllocator", "-q"])
        .assert()
        .code(0);

    let report = fs::read(temp_dir.path().join("results.txt")).unwrap();
    assert!(report.is_empty());
}

#[test]
fn repeated_runs_are_byte_identical() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "b/z.hpp", "needle one\n");
    write(temp_dir.path(), "a/y.cxx", "x\nneedle two\n");
    write(temp_dir.path(), "a/x.inl", "needle three\nneedle four\n");

    let report_path = temp_dir.path().join("results.txt");

    ctxgrep(temp_dir.path()).args(["needle", "-q"]).assert().success();
    let first = fs::read(&report_path).unwrap();

    ctxgrep(temp_dir.path()).args(["needle", "-q"]).assert().success();
    let second = fs::read(&report_path).unwrap();

    assert_eq!(first, second);

    let text = String::from_utf8(first).unwrap();
    let x = text.find("x.inl").unwrap();
    let y = text.find("y.cxx").unwrap();
    let z = text.find("z.hpp").unwrap();
    assert!(x < y && y < z);
}

#[test]
fn regex_and_ignore_case() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "a.h", "// todo: one\n// FIXME two\nplain\n");

    ctxgrep(temp_dir.path())
        .args(["todo|fixme", "--regex", "-i", "-n", "0", "--relative-paths", "-q"])
        .assert()
        .success();

    let report = fs::read_to_string(temp_dir.path().join("results.txt")).unwrap();
    assert_eq!(
        report,
        "FILE: a.h\nMATCH LINE: 1\n// todo: one\n\n----\n\n\
         FILE: a.h\nMATCH LINE: 2\n// FIXME two\n\n----\n\n"
    );
}

#[test]
fn missing_root_exits_with_invalid_path_code() {
    let temp_dir = TempDir::new().unwrap();

    ctxgrep(temp_dir.path())
        .args(["needle", "does-not-exist"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("does-not-exist"));

    assert!(!temp_dir.path().join("results.txt").exists());
}

#[test]
fn invalid_regex_is_a_configuration_error() {
    let temp_dir = TempDir::new().unwrap();

    ctxgrep(temp_dir.path())
        .args(["(unclosed", "--regex"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not a valid regular expression"));
}

#[test]
fn missing_pattern_is_rejected() {
    let temp_dir = TempDir::new().unwrap();

    ctxgrep(temp_dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("pattern"));
}

#[test]
fn undecodable_files_are_skipped_and_run_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("blob.h"), [0xc3u8, 0x28, b'\n']).unwrap();
    fs::write(temp_dir.path().join("legacy.h"), b"caf\xe9 needle\n").unwrap();
    write(temp_dir.path(), "ok.cpp", "needle\n");

    ctxgrep(temp_dir.path())
        .arg("needle")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Skipped"));

    let report = fs::read_to_string(temp_dir.path().join("results.txt")).unwrap();
    assert_eq!(report.matches("MATCH LINE").count(), 1);
}

#[test]
fn json_summary_is_machine_readable() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "a.cpp", "needle\nneedle\n");

    let output = ctxgrep(temp_dir.path())
        .args(["needle", "--output-format", "json", "-q"])
        .output()
        .unwrap();

    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["records_written"], 2);
    assert_eq!(summary["files_searched"], 1);
    assert_eq!(summary["limit_reached"], false);
}

#[test]
fn config_file_supplies_pattern_and_cli_overrides_it() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "a.h", "alpha\nbeta\n");
    write(
        temp_dir.path(),
        "ctxgrep.toml",
        "[search]\npattern = \"alpha\"\ncontext = 0\n\n[output]\nrelative_paths = true\n",
    );

    ctxgrep(temp_dir.path()).arg("-q").assert().success();
    let report = fs::read_to_string(temp_dir.path().join("results.txt")).unwrap();
    assert_eq!(report, "FILE: a.h\nMATCH LINE: 1\nalpha\n\n----\n\n");

    ctxgrep(temp_dir.path()).args(["beta", "-q"]).assert().success();
    let report = fs::read_to_string(temp_dir.path().join("results.txt")).unwrap();
    assert_eq!(report, "FILE: a.h\nMATCH LINE: 2\nbeta\n\n----\n\n");
}

#[test]
fn generate_config_writes_loadable_file() {
    let temp_dir = TempDir::new().unwrap();

    ctxgrep(temp_dir.path())
        .arg("--generate-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("ctxgrep.toml"));

    let content = fs::read_to_string(temp_dir.path().join("ctxgrep.toml")).unwrap();
    assert!(content.contains("[search]"));
    assert!(content.contains("[filters]"));
}

#[test]
fn dry_run_lists_files_without_writing_report() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "src/a.cpp", "needle\n");
    write(temp_dir.path(), "notes.md", "needle\n");

    ctxgrep(temp_dir.path())
        .args(["needle", "--dry-run", "--relative-paths", "--output-format", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a.cpp"))
        .stdout(predicate::str::contains("notes.md").not());

    assert!(!temp_dir.path().join("results.txt").exists());
}

#[test]
fn json_mode_emits_one_object_per_line() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "a.cpp", "needle\n");

    let output = ctxgrep(temp_dir.path())
        .args(["needle", "--output-format", "json", "-v"])
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let values: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert!(values.len() > 1);
    let summary = values.last().unwrap();
    assert_eq!(summary["records_written"], 1);
}

#[test]
fn dry_run_with_skipped_files_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "big.cpp", "needle needle needle\n");
    write(temp_dir.path(), "ctxgrep.toml", "[filters]\nmax_file_size = 4\n");

    ctxgrep(temp_dir.path())
        .args(["needle", "--dry-run", "--output-format", "plain"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("big.cpp"));
}
