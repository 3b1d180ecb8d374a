//! Integration tests for the CSV loader and the query engine.

use calidad_agua::query::{Lookup, QueryEngine};
use calidad_agua::store::{MeasurementRecord, RecordStore, load_csv};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

fn fixture_engine() -> QueryEngine {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/mediciones.csv");
    let (store, report) = load_csv(path, b';').unwrap();
    assert_eq!(report.loaded, 7);
    assert_eq!(report.dropped, 4);
    QueryEngine::new(Arc::new(store))
}

fn ids<'a>(records: &[&'a MeasurementRecord]) -> Vec<&'a str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn fixture_names_lose_vowel_accents_only() {
    let e = fixture_engine();
    let r = e.get_by_id("103").record().unwrap();
    assert_eq!(r.departamento, "NARIÑO");
    assert_eq!(r.municipio, "Tuquerres");
    assert_eq!(e.get_by_id("106").record().unwrap().departamento, "Bogota D.C.");
}

#[test]
fn location_filter_ignores_case() {
    let e = fixture_engine();
    assert_eq!(
        e.filter_by_location("ANTIOQUIA", None),
        e.filter_by_location("antioquia", None)
    );
    assert_eq!(ids(&e.filter_by_location("antioquia", None)), ["101", "102"]);
}

#[test]
fn location_filter_ignores_accents_and_tilde() {
    let e = fixture_engine();
    assert_eq!(
        e.filter_by_location("narino", None),
        e.filter_by_location("Nariño", None)
    );
    assert_eq!(ids(&e.filter_by_location("narino", None)), ["103", "104"]);
    assert_eq!(ids(&e.filter_by_location("Nariño", Some("túquerres"))), ["103"]);
}

#[test]
fn location_filter_is_substring_based() {
    let e = fixture_engine();
    assert_eq!(ids(&e.filter_by_location("boya", Some("tun"))), ["110"]);
    assert!(e.filter_by_location("Amazonas", None).is_empty());
}

#[test]
fn period_filter_uses_any_token() {
    let e = fixture_engine();
    let tokens: BTreeSet<String> = ["2019", "2022"].into_iter().map(String::from).collect();
    assert_eq!(ids(&e.filter_by_period(&tokens)), ["101", "103", "106"]);
}

#[test]
fn get_by_id_finds_exactly_one() {
    let e = fixture_engine();
    for r in e.list_all(None) {
        match e.get_by_id(&r.id) {
            Lookup::Found(found) => assert_eq!(found, r),
            Lookup::NotFound => panic!("id {} should be found", r.id),
        }
    }
    assert_eq!(e.get_by_id("107"), Lookup::NotFound);
    assert_eq!(e.get_by_id(""), Lookup::NotFound);
}

#[test]
fn list_all_caps_in_store_order() {
    let records: Vec<MeasurementRecord> = (0..250)
        .map(|i| MeasurementRecord {
            id: i.to_string(),
            departamento: "Meta".into(),
            municipio: "Villavicencio".into(),
            periodo: "2020".into(),
            irca: i as f64,
            extra: BTreeMap::new(),
        })
        .collect();
    let e = QueryEngine::new(Arc::new(RecordStore::from_records(records)));
    let first = e.list_all(Some(100));
    assert_eq!(first.len(), 100);
    for (i, r) in first.iter().enumerate() {
        assert_eq!(r.id, i.to_string());
    }
    assert_eq!(e.list_all(None).len(), 250);
}
