//! End-to-end tests for the genreshelf binary.
//!
//! These exercise the consumer-side subcommands; the enrichment pipeline
//! itself is covered by `enrichment_integration.rs` against a mock
//! catalog.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn seed_library(markers: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    for (base, content) in markers {
        std::fs::write(dir.path().join(format!("{base}.epub")), b"book").expect("write book");
        std::fs::write(dir.path().join(format!("{base}.txt")), content).expect("write marker");
    }
    dir
}

fn genreshelf() -> Command {
    Command::cargo_bin("genreshelf").expect("binary should build")
}

#[test]
fn test_help_lists_subcommands() {
    genreshelf()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("genres"))
        .stdout(predicate::str::contains("move"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn test_genres_prints_frequency_ranked_list() {
    let dir = seed_library(&[("a", "scifi, horror"), ("b", "scifi")]);

    genreshelf()
        .args(["genres", dir.path().to_str().expect("utf-8 path")])
        .assert()
        .success()
        .stdout(predicate::str::contains("scifi (2)"))
        .stdout(predicate::str::contains("horror (1)"));
}

#[test]
fn test_genres_filter_narrows_output() {
    let dir = seed_library(&[("a", "science fiction, horror")]);

    genreshelf()
        .args([
            "genres",
            dir.path().to_str().expect("utf-8 path"),
            "--filter",
            "fic",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("science fiction (1)"))
        .stdout(predicate::str::contains("horror").not());
}

#[test]
fn test_move_relocates_genre_pairs() {
    let dir = seed_library(&[("a", "scifi"), ("b", "horror")]);

    genreshelf()
        .args(["move", dir.path().to_str().expect("utf-8 path"), "scifi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved 2 files"));

    assert!(dir.path().join("scifi/a.epub").exists());
    assert!(dir.path().join("scifi/a.txt").exists());
    assert!(dir.path().join("b.epub").exists());
}

#[test]
fn test_delete_refuses_without_confirmation_when_not_interactive() {
    let dir = seed_library(&[("a", "scifi")]);

    genreshelf()
        .args(["delete", dir.path().to_str().expect("utf-8 path"), "scifi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    assert!(dir.path().join("a.epub").exists());
}

#[test]
fn test_delete_with_yes_removes_pairs() {
    let dir = seed_library(&[("a", "scifi"), ("b", "horror")]);

    genreshelf()
        .args([
            "delete",
            dir.path().to_str().expect("utf-8 path"),
            "scifi",
            "--yes",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 files"));

    assert!(!dir.path().join("a.epub").exists());
    assert!(!dir.path().join("a.txt").exists());
    assert!(dir.path().join("b.epub").exists());
}

#[test]
fn test_process_on_missing_directory_fails() {
    genreshelf()
        .args(["process", "/nonexistent/genreshelf-e2e"])
        .assert()
        .failure();
}
