use chrono::{TimeZone, Utc};
use flashlearn_core::{load_collection, save_collection, Card, CardCollection, CardStore};
use flashlearn_json::JsonStore;
use std::fs;

fn now() -> chrono::DateTime<Utc> {
    Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
}

#[tokio::test]
async fn missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open_in(dir.path()).unwrap();
    assert!(store.load().await.unwrap().is_empty());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open_in(dir.path()).unwrap();

    let mut coll = CardCollection::new();
    coll.create("hola", "hello", &["spanish".to_string()], now()).unwrap();
    coll.create("adios", "goodbye", &[], now()).unwrap();
    save_collection(&store, &coll).await.unwrap();

    let raw = fs::read_to_string(store.path()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 2);

    let reopened = JsonStore::open_in(dir.path()).unwrap();
    let loaded = load_collection(&reopened).await.unwrap();
    assert_eq!(loaded, coll);
}

#[tokio::test]
async fn corrupt_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open_in(dir.path()).unwrap();
    fs::write(store.path(), "[{ broken").unwrap();
    assert!(store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn backups_are_rotated() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open_with(dir.path().join("cards.json"), dir.path().join("bk"), 2).unwrap();

    let mut cards = Vec::new();
    for i in 0..4 {
        cards.push(Card::new(format!("q{i}"), "a", now()));
        store.save(&cards).await.unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    let backups = fs::read_dir(store.backups_dir()).unwrap().count();
    assert_eq!(backups, 2);
    assert_eq!(store.load().await.unwrap().len(), 4);
}
