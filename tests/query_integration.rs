//! Integration tests for the record store and query engine together.

use birdtag::media::MediaType;
use birdtag::query::{FilterGroup, parse_get_filters, parse_post_filters, search};
use birdtag::store::{DetectionRecord, JsonStore, RecordStore, SpeciesCount};

fn record(url: &str, species: &[(&str, u32)]) -> DetectionRecord {
    DetectionRecord::new(
        MediaType::Image,
        url,
        species
            .iter()
            .map(|&(label, count)| SpeciesCount {
                label: label.to_string(),
                count,
            })
            .collect(),
    )
}

fn seeded_store(dir: &std::path::Path) -> JsonStore {
    let mut store = JsonStore::open(dir.join("records.json")).expect("open store");
    store
        .put(record("garden.jpg", &[("Crow", 3), ("Pigeon", 2)]))
        .expect("put");
    store
        .put(record("rooftop.jpg", &[("Pigeon", 5)]))
        .expect("put");
    store
        .put(record("dawn_chorus.wav", &[("Owl", 1), ("Myna", 1)]))
        .expect("put");
    store
}

#[test]
fn test_exact_count_query_over_persisted_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        seeded_store(dir.path());
    }

    // Reopen from disk, as the search subcommand would.
    let store = JsonStore::open(dir.path().join("records.json")).expect("reopen");
    let groups = parse_get_filters(&[("Pigeon".to_string(), Some("5".to_string()))]);

    let response = search(&store, &groups).expect("search");
    assert_eq!(response.matched_files, vec!["rooftop.jpg"]);
    assert_eq!(response.count, 1);
}

#[test]
fn test_min_count_and_membership_disjunction() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = seeded_store(dir.path());

    let groups = parse_post_filters(r#"[{"crow": 2, "pigeon": 1}, ["owl", "myna"]]"#)
        .expect("parse");
    assert_eq!(groups.len(), 2);

    let response = search(&store, &groups).expect("search");
    assert_eq!(
        response.matched_files,
        vec!["garden.jpg", "dawn_chorus.wav"]
    );
}

#[test]
fn test_records_survive_json_round_trip_with_metadata() {
    let dir = tempfile::tempdir().expect("tempdir");
    let id = {
        let mut store = JsonStore::open(dir.path().join("records.json")).expect("open");
        let rec = record("garden.jpg", &[("Sparrow", 4)]);
        let id = rec.file_id;
        store.put(rec).expect("put");
        id
    };

    let store = JsonStore::open(dir.path().join("records.json")).expect("reopen");
    let rec = store.get(id).expect("get").expect("record exists");
    assert_eq!(rec.file_type, MediaType::Image);
    assert_eq!(rec.detected_birds[0].label, "Sparrow");
    assert!(rec.annotated_url.is_none());
}

#[test]
fn test_membership_requires_every_species_in_group() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = seeded_store(dir.path());

    let groups = vec![FilterGroup::Membership(vec![
        "owl".to_string(),
        "crow".to_string(),
    ])];
    let response = search(&store, &groups).expect("search");
    assert!(response.matched_files.is_empty());
}
