/// CLI binary integration tests using assert_cmd
///
/// These tests invoke the actual binary and verify exit codes, output files
/// and the warnings written to stderr.
mod common;

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;

use common::{read_rows, ChunkDirBuilder};

fn diagmerge() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_diagmerge"));
    cmd.arg("--no-config").env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_cli_merge_success_exit_zero() {
    let dir = ChunkDirBuilder::new()
        .with_chunk("a.json", &json!([{"source": "clangd", "message": "m1"}]))
        .with_chunk("b.json", &json!({"diagnostics": [{"source": "clangd", "message": "m2"}]}))
        .build();
    let out = dir.path().join("merged.json");

    diagmerge()
        .current_dir(dir.path())
        .args(["merge", "--inputs", "a.json,b.json", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged 2 diagnostics"));

    let merged: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(merged, json!([{"source": "clangd", "message": "m1"}, {"source": "clangd", "message": "m2"}]));
}

#[test]
fn test_cli_merge_inputs_dir_with_glob() {
    let dir = ChunkDirBuilder::new()
        .with_chunk("project-problems-2.json", &json!([{"message": "second"}]))
        .with_chunk("project-problems-1.json", &json!([{"message": "first"}]))
        .with_chunk("unrelated.json", &json!([{"message": "ignored"}]))
        .build();
    let out = dir.path().join("out/merged.json");

    diagmerge()
        .args(["merge", "--glob", "project-problems-*.json", "--inputs-dir"])
        .arg(dir.path())
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let merged: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(merged, json!([{"message": "first"}, {"message": "second"}]));
}

#[test]
fn test_cli_merge_oversized_chunk_warns_exit_one() {
    let dir = ChunkDirBuilder::new()
        .with_chunk("big.json", &json!([{"message": "x".repeat(4096)}]))
        .with_chunk("small.json", &json!([{"message": "ok"}]))
        .build();

    diagmerge()
        .current_dir(dir.path())
        .args(["merge", "--inputs", "big.json,small.json", "--output", "merged.json"])
        .args(["--max-input-bytes", "1024"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("big.json"))
        .stderr(predicate::str::contains("exceeds limit of 1024 bytes"));

    let merged = fs::read_to_string(dir.path().join("merged.json")).unwrap();
    assert_eq!(merged, r#"[{"message":"ok"}]"#);
}

#[test]
fn test_cli_merge_missing_input_warns_exit_one() {
    let dir = ChunkDirBuilder::new()
        .with_chunk("a.json", &json!([{"source": "clangd", "message": "m1"}]))
        .build();

    diagmerge()
        .current_dir(dir.path())
        .args(["merge", "--inputs", "a.json,missing.json", "--output", "merged.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing.json"))
        .stderr(predicate::str::contains("not found or not a regular file"));

    let merged = fs::read_to_string(dir.path().join("merged.json")).unwrap();
    assert_eq!(merged, r#"[{"source":"clangd","message":"m1"}]"#);
}

#[test]
fn test_cli_merge_truncation_warning() {
    let dir = ChunkDirBuilder::new()
        .with_chunk("a.json", &json!([{"message": "1"}, {"message": "2"}, {"message": "3"}]))
        .build();

    diagmerge()
        .current_dir(dir.path())
        .args(["merge", "--inputs", "a.json", "--output", "merged.json", "--max-items", "2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("item limit 2 reached"));
}

#[test]
fn test_cli_merge_no_inputs_is_fatal() {
    let dir = ChunkDirBuilder::new().build();

    diagmerge()
        .current_dir(dir.path())
        .args(["merge", "--inputs", "missing.json", "--output", "merged.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no input files found"));

    assert!(!dir.path().join("merged.json").exists());
}

#[test]
fn test_cli_merge_requires_exactly_one_input_source() {
    diagmerge().args(["merge", "--output", "x.json"]).assert().failure();
    diagmerge()
        .args(["merge", "--inputs", "a.json", "--inputs-dir", ".", "--output", "x.json"])
        .assert()
        .failure();
}

#[test]
fn test_cli_report_sanitizes_and_filters() {
    let dir = ChunkDirBuilder::new()
        .with_chunk(
            "merged.json",
            &json!({"diagnostics": [
                {"source": "clangd", "message": "=2+2", "file": "@danger.c", "code": "+SUM(A1)"},
                {"source": "clang-tidy", "message": "other tool", "file": "b.c"},
            ]}),
        )
        .build();

    diagmerge()
        .current_dir(dir.path())
        .args(["report", "--input", "merged.json", "--out-simple", "simple.csv", "--out-detailed", "detailed.csv"])
        .assert()
        .success();

    let simple = read_rows(&dir.path().join("simple.csv"));
    let detailed = read_rows(&dir.path().join("detailed.csv"));
    assert_eq!(simple, vec![vec!["file", "count"], vec!["'@danger.c", "1"]]);
    assert_eq!(detailed.len(), 2);
    assert_eq!(detailed[1], ["'@danger.c", "", "", "'+SUM(A1)", "clangd", "'=2+2"]);
}

#[test]
fn test_cli_report_invalid_items_and_cap_warn() {
    let dir = ChunkDirBuilder::new()
        .with_chunk(
            "merged.json",
            &json!([
                {"source": "clangd", "message": "m1", "file": "a.c"},
                {"source": 123, "message": "bad-source", "file": "b.c"},
                {"source": "clangd", "message": "m2", "file": "c.c"},
                {"source": "clangd", "message": "m3", "file": "d.c"},
            ]),
        )
        .build();

    diagmerge()
        .current_dir(dir.path())
        .args(["report", "--input", "merged.json", "--out-simple", "s.csv", "--out-detailed", "d.csv"])
        .args(["--max-items", "2", "--day", "2026-01-01", "--build-version", "release-42"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("1 diagnostic(s) skipped"))
        .stderr(predicate::str::contains("dropped by report limit of 2"));

    let detailed = read_rows(&dir.path().join("d.csv"));
    assert_eq!(detailed.len(), 3);
    assert_eq!(detailed[0][..2], ["day", "version"]);
    assert_eq!(detailed[1][..3], ["2026-01-01", "release-42", "a.c"]);
}

#[test]
fn test_cli_report_oversized_document_is_fatal() {
    let dir = ChunkDirBuilder::new()
        .with_chunk("merged.json", &json!([{"source": "clangd", "message": "x".repeat(256)}]))
        .build();

    diagmerge()
        .current_dir(dir.path())
        .args(["report", "--input", "merged.json", "--out-simple", "s.csv", "--out-detailed", "d.csv"])
        .args(["--max-document-bytes", "64"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("too large"));

    assert!(!dir.path().join("s.csv").exists());
    assert!(!dir.path().join("d.csv").exists());
}

#[test]
fn test_cli_report_zero_document_ceiling_is_fatal() {
    let dir = ChunkDirBuilder::new()
        .with_chunk("merged.json", &json!([{"source": "clangd", "message": "m"}]))
        .build();

    diagmerge()
        .current_dir(dir.path())
        .args(["report", "--input", "merged.json", "--out-simple", "s.csv", "--out-detailed", "d.csv"])
        .args(["--max-document-bytes", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("must be greater than 0"));

    assert!(!dir.path().join("s.csv").exists());
}

#[test]
fn test_cli_report_invalid_json_is_fatal() {
    let dir = ChunkDirBuilder::new().with_raw_chunk("merged.json", "[{oops").build();

    diagmerge()
        .current_dir(dir.path())
        .args(["report", "--input", "merged.json", "--out-simple", "s.csv", "--out-detailed", "d.csv"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn test_cli_run_end_to_end() {
    let dir = ChunkDirBuilder::new()
        .with_chunk(
            "A.json",
            &json!([{"file":"x.c","line":1,"column":2,"code":"W1","source":"clangd","message":"unused include"}]),
        )
        .with_chunk(
            "B.json",
            &json!([{"file":"x.c","line":5,"column":1,"code":"W1","source":"clangd","message":"unused include"}]),
        )
        .build();

    diagmerge()
        .current_dir(dir.path())
        .args(["run", "--inputs", "A.json,B.json", "--merged", "merged.json"])
        .args(["--out-simple", "reports/simple.csv", "--out-detailed", "reports/detailed.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("x.c"));

    assert!(dir.path().join("merged.json").is_file());
    assert_eq!(
        read_rows(&dir.path().join("reports/simple.csv")),
        vec![vec!["file", "count"], vec!["x.c", "2"]]
    );
    assert_eq!(read_rows(&dir.path().join("reports/detailed.csv")).len(), 3);
}

#[test]
fn test_cli_config_file_sets_source_filter() {
    let dir = ChunkDirBuilder::new()
        .with_chunk(
            "merged.json",
            &json!([
                {"source": "clangd", "message": "a", "file": "a.c"},
                {"source": "clang-tidy", "message": "b", "file": "b.c"},
            ]),
        )
        .with_raw_chunk(".diagmerge.toml", "[report]\nsource = \"*\"\n")
        .build();

    Command::new(env!("CARGO_BIN_EXE_diagmerge"))
        .current_dir(dir.path())
        .args(["report", "--input", "merged.json", "--out-simple", "s.csv", "--out-detailed", "d.csv"])
        .assert()
        .success();

    assert_eq!(read_rows(&dir.path().join("d.csv")).len(), 3);
}

#[test]
fn test_cli_init_writes_config() {
    let dir = ChunkDirBuilder::new().build();

    diagmerge()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created .diagmerge.toml"));

    assert!(dir.path().join(".diagmerge.toml").is_file());
}

#[test]
fn test_cli_summary_from_two_collections() {
    let dir = ChunkDirBuilder::new()
        .with_chunk(
            "day1.json",
            &json!([
                {"source": "clangd", "message": "m1", "file": "a.c", "code": "unused-includes"},
                {"source": "clangd", "message": "m2", "file": "a.c", "code": "unused-includes"},
            ]),
        )
        .with_chunk(
            "day2.json",
            &json!([{"source": "clangd", "message": "m3", "file": "b.c", "code": "W|1"}]),
        )
        .build();

    for (input, day, detailed) in [("day1.json", "2026-03-01", "d1.csv"), ("day2.json", "2026-03-02", "d2.csv")] {
        diagmerge()
            .current_dir(dir.path())
            .args(["report", "--input", input, "--out-simple", "s.csv", "--out-detailed", detailed])
            .args(["--day", day, "--build-version", "r7"])
            .assert()
            .success();
    }

    diagmerge()
        .current_dir(dir.path())
        .args(["summary", "--input", "d1.csv", "--input", "d2.csv", "--out-dir", "charts", "--top-n", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summarized 3 diagnostics"));

    let md = fs::read_to_string(dir.path().join("charts/summary.md")).unwrap();
    assert!(md.contains("- Total diagnostics: **3**"));
    assert!(md.contains("| 2026-03-01 / r7 | 2 | 66.67% |"));
    assert!(md.contains("| 2026-03-02 / r7 | 1 | 33.33% |"));
    assert!(md.contains("| unused-includes | 2 | 66.67% |"));
    assert!(md.contains("| W/1 | 1 | 33.33% |"));
    for chart in ["01_collect_overview.svg", "02_top_files.svg", "03_top_codes.svg", "04_sources.svg"] {
        let svg = fs::read_to_string(dir.path().join("charts").join(chart)).unwrap();
        assert!(svg.starts_with("<svg"), "{chart}");
    }
}

#[test]
fn test_cli_summary_rejects_zero_top_n() {
    let dir = ChunkDirBuilder::new()
        .with_raw_chunk("d.csv", "file;line;column;code;source;message\r\na.c;1;1;W;clangd;m\r\n")
        .build();

    diagmerge()
        .current_dir(dir.path())
        .args(["summary", "--input", "d.csv", "--top-n", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--top-n must be greater than 0"));

    assert!(!dir.path().join("charts").exists());
}

#[test]
fn test_cli_summary_simple_report_is_fatal() {
    let dir = ChunkDirBuilder::new()
        .with_raw_chunk("s.csv", "file;count\r\na.c;2\r\n")
        .build();

    diagmerge()
        .current_dir(dir.path())
        .args(["summary", "--input", "s.csv"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing column(s)"));

    assert!(!dir.path().join("charts/summary.md").exists());
}

#[test]
fn test_cli_help_mentions_exit_codes() {
    diagmerge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("completed with warnings"));
}
