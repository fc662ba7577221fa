use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const HANDBOOK: &str = "Employees accrue vacation days every month of service.\n\
Vacation requests go to your manager two weeks ahead.\n\n\
Remote work is allowed on Tuesdays and Thursdays for most teams.\n\
Expense reports are due within thirty days of purchase.";

#[allow(deprecated)]
fn docqa(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docqa").expect("binary");
    cmd.current_dir(workdir)
        .env("DOCQA_EMBEDDING_MODE", "stub")
        .env("DOCQA_COMPLETION_MODE", "stub")
        .env_remove("DOCQA_EMBEDDING_DIMENSION")
        .arg("--quiet");
    cmd
}

fn run_json(cmd: &mut Command) -> (bool, Value) {
    let output = cmd.output().expect("command run");
    let body: Value = serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "stdout is not JSON ({err}): {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    });
    (output.status.success(), body)
}

fn write_doc(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).unwrap();
}

#[test]
fn chunk_prints_windows_as_json() {
    let temp = tempdir().unwrap();
    let words: Vec<String> = (1..=12).map(|i| format!("w{i}")).collect();
    write_doc(temp.path(), "doc.txt", &words.join("\n"));

    let (ok, body) = run_json(docqa(temp.path()).args([
        "chunk",
        "doc.txt",
        "--chunk-size",
        "5",
        "--overlap",
        "1",
        "--min-words",
        "1",
    ]));
    assert!(ok, "{body}");
    assert_eq!(body["status"], "ok");

    let chunks = body["data"]["chunks"].as_array().unwrap();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0]["text"], "w1 w2 w3 w4 w5");
    assert_eq!(chunks[1]["text"], "w5 w6 w7 w8 w9");
    assert_eq!(chunks[2]["text"], "w9 w10 w11 w12");
    assert_eq!(chunks[2]["sequence_index"], 2);
    assert_eq!(chunks[2]["id"], "doc.txt#2");
    assert_eq!(body["data"]["config"]["overlap_words"], 1);
}

#[test]
fn search_ranks_with_stub_embeddings() {
    let temp = tempdir().unwrap();
    write_doc(temp.path(), "handbook.txt", HANDBOOK);

    let (ok, body) = run_json(docqa(temp.path()).args([
        "search",
        "handbook.txt",
        "vacation days",
        "--chunk-size",
        "8",
        "--overlap",
        "2",
        "--top-k",
        "2",
    ]));
    assert!(ok, "{body}");

    let results = body["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["rank"], 1);
    assert_eq!(results[1]["rank"], 2);
    let first = results[0]["score"].as_f64().unwrap();
    let second = results[1]["score"].as_f64().unwrap();
    assert!(first >= second);
    assert!(body["data"]["index"]["chunks"].as_u64().unwrap() >= 2);
}

#[test]
fn ask_returns_answer_and_sources() {
    let temp = tempdir().unwrap();
    write_doc(temp.path(), "handbook.txt", HANDBOOK);

    let (ok, body) = run_json(docqa(temp.path()).args([
        "ask",
        "handbook.txt",
        "When is remote work allowed?",
        "--chunk-size",
        "10",
        "--overlap",
        "0",
        "-k",
        "2",
    ]));
    assert!(ok, "{body}");

    let answer = body["data"]["answer"].as_str().unwrap();
    assert!(answer.starts_with("[stub] 2 context block(s)"), "{answer}");
    assert!(answer.ends_with("When is remote work allowed?"), "{answer}");

    let sources = body["data"]["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0]["label"], "Source 1");
    assert_eq!(sources[1]["label"], "Source 2");
    assert_eq!(sources[0]["source_label"], "handbook.txt");
}

#[test]
fn ask_on_blank_document_uses_placeholder() {
    let temp = tempdir().unwrap();
    write_doc(temp.path(), "blank.txt", "   \n\n  ");

    let (ok, body) = run_json(docqa(temp.path()).args(["ask", "blank.txt", "anything?"]));
    assert!(ok, "{body}");
    assert_eq!(body["data"]["index"]["chunks"], 0);
    assert_eq!(body["data"]["sources"].as_array().unwrap().len(), 0);
    assert!(body["data"]["answer"]
        .as_str()
        .unwrap()
        .starts_with("[stub] 0 context block(s)"));
}

#[test]
fn require_results_on_blank_document_is_empty_index() {
    let temp = tempdir().unwrap();
    write_doc(temp.path(), "blank.txt", "\n");

    let (ok, body) = run_json(docqa(temp.path()).args(["search", "blank.txt", "q"]));
    assert!(ok, "{body}");
    assert_eq!(body["data"]["results"].as_array().unwrap().len(), 0);

    let (ok, body) =
        run_json(docqa(temp.path()).args(["search", "blank.txt", "q", "--require-results"]));
    assert!(!ok);
    assert_eq!(body["error"]["kind"], "empty_index");
}

#[test]
fn missing_document_reports_document_error() {
    let temp = tempdir().unwrap();

    let (ok, body) = run_json(docqa(temp.path()).args(["ask", "absent.txt", "hello?"]));
    assert!(!ok);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["kind"], "document");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("absent.txt"));
}

#[test]
fn invalid_settings_report_configuration_error() {
    let temp = tempdir().unwrap();
    write_doc(temp.path(), "doc.txt", HANDBOOK);

    let (ok, body) = run_json(docqa(temp.path()).args([
        "chunk",
        "doc.txt",
        "--chunk-size",
        "5",
        "--overlap",
        "5",
    ]));
    assert!(!ok);
    assert_eq!(body["error"]["kind"], "configuration");

    let (ok, body) = run_json(docqa(temp.path()).args(["search", "doc.txt", "q", "--top-k", "0"]));
    assert!(!ok);
    assert_eq!(body["error"]["kind"], "configuration");
}

#[test]
fn config_file_sets_chunking() {
    let temp = tempdir().unwrap();
    write_doc(temp.path(), "doc.txt", HANDBOOK);
    write_doc(
        temp.path(),
        "docqa.toml",
        "[chunking]\nchunk_size_words = 6\noverlap_words = 0\nmin_words = 0\n",
    );

    let (ok, body) = run_json(docqa(temp.path()).args(["--config", "docqa.toml", "chunk", "doc.txt"]));
    assert!(ok, "{body}");
    assert_eq!(body["data"]["config"]["chunk_size_words"], 6);
    for chunk in body["data"]["chunks"].as_array().unwrap() {
        assert!(chunk["words"].as_u64().unwrap() <= 6);
    }
}

#[test]
fn unknown_mode_is_rejected_by_parser() {
    let temp = tempdir().unwrap();
    docqa(temp.path())
        .args(["--embed-mode", "onnx", "chunk", "doc.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("onnx"));
}
