//! Integration tests for the birdtag CLI.

use assert_cmd::cargo::cargo_bin;
use assert_cmd::prelude::*;
use birdtag::media::MediaType;
use birdtag::store::{DetectionRecord, JsonStore, RecordStore, SpeciesCount};
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;

fn birdtag() -> Command {
    Command::new(cargo_bin("birdtag"))
}

fn seed_store(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("records.json");
    let mut store = JsonStore::open(&path).expect("open store");
    store
        .put(DetectionRecord::new(
            MediaType::Image,
            "garden.jpg",
            vec![
                SpeciesCount {
                    label: "Crow".to_string(),
                    count: 3,
                },
                SpeciesCount {
                    label: "Pigeon".to_string(),
                    count: 1,
                },
            ],
        ))
        .expect("put");
    store
        .put(DetectionRecord::new(
            MediaType::Audio,
            "dawn.wav",
            vec![SpeciesCount {
                label: "Owl".to_string(),
                count: 1,
            }],
        ))
        .expect("put");
    path
}

#[test]
fn test_search_without_criteria_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = seed_store(dir.path());

    birdtag()
        .arg("search")
        .arg("--store")
        .arg(&store)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no valid filter criteria"));
}

#[test]
fn test_search_by_exact_tag_count() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = seed_store(dir.path());

    birdtag()
        .arg("search")
        .arg("--store")
        .arg(&store)
        .arg("--tag")
        .arg("crow")
        .arg("--count")
        .arg("3")
        .assert()
        .success()
        .stdout(predicate::str::contains("garden.jpg"))
        .stdout(predicate::str::contains("\"count\": 1"));
}

#[test]
fn test_search_with_json_body() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = seed_store(dir.path());

    birdtag()
        .arg("search")
        .arg("--store")
        .arg(&store)
        .arg("--json")
        .arg(r#"[{"crow": 1}, ["owl"]]"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("garden.jpg"))
        .stdout(predicate::str::contains("dawn.wav"))
        .stdout(predicate::str::contains("\"count\": 2"));
}

#[test]
fn test_search_rejects_malformed_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = seed_store(dir.path());

    birdtag()
        .arg("search")
        .arg("--store")
        .arg(&store)
        .arg("--json")
        .arg("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse query body"));
}

#[test]
fn test_unsupported_media_type_fails_fast() {
    let dir = tempfile::tempdir().expect("tempdir");
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "not media").expect("write file");
    let store = dir.path().join("records.json");

    birdtag()
        .arg("--fail-fast")
        .arg("--quiet")
        .arg("--store")
        .arg(&store)
        .arg(&notes)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported media type"));
}

#[test]
fn test_video_container_needs_extracted_frames() {
    let dir = tempfile::tempdir().expect("tempdir");
    let clip = dir.path().join("clip.mp4");
    std::fs::write(&clip, "fake container").expect("write file");
    let store = dir.path().join("records.json");

    birdtag()
        .arg("--fail-fast")
        .arg("--quiet")
        .arg("--store")
        .arg(&store)
        .arg(&clip)
        .assert()
        .failure()
        .stderr(predicate::str::contains("extract frames"));
}

#[test]
fn test_search_by_example_rejects_unsupported_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = seed_store(dir.path());
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "not media").expect("write file");

    birdtag()
        .arg("search")
        .arg("--store")
        .arg(&store)
        .arg("--file")
        .arg(&notes)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported media type"));
}

#[test]
fn test_config_path_prints_toml_location() {
    birdtag()
        .arg("config")
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_no_inputs_prints_help() {
    birdtag()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}
