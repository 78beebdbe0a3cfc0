use chrono::{Duration, TimeZone, Utc};
use flashlearn_core::{apply_outcome, load_collection, save_collection, CardCollection, CardStore, COLLECTION_KEY};
use flashlearn_sqlite::SqliteStore;

fn now() -> chrono::DateTime<Utc> {
    Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
}

#[tokio::test]
async fn empty_database_loads_empty() {
    let store = SqliteStore::open_memory().await.unwrap();
    assert!(store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn save_overwrites_single_entry() {
    let store = SqliteStore::open_memory().await.unwrap();

    let mut coll = CardCollection::new();
    let id = coll.create("hola", "hello", &[], now()).unwrap().id.clone();
    save_collection(&store, &coll).await.unwrap();

    let card = coll.get(&id).unwrap().clone();
    coll.replace(apply_outcome(card, true, now() + Duration::hours(2)).updated_card)
        .unwrap();
    coll.create("adios", "bye", &["spanish".to_string()], now()).unwrap();
    save_collection(&store, &coll).await.unwrap();

    let loaded = load_collection(&store).await.unwrap();
    assert_eq!(loaded, coll);
    assert_eq!(loaded.get(&id).unwrap().review_count, 1);
}

#[tokio::test]
async fn corrupt_entry_loads_empty() {
    let store = SqliteStore::open_memory().await.unwrap();
    store.put_raw(COLLECTION_KEY, "nope").await.unwrap();
    assert!(store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cards.sqlite3");

    let mut coll = CardCollection::new();
    coll.create("q", "a", &[], now()).unwrap();
    {
        let store = SqliteStore::open_file(&path).await.unwrap();
        save_collection(&store, &coll).await.unwrap();
    }

    let store = SqliteStore::open_file(&path).await.unwrap();
    assert_eq!(load_collection(&store).await.unwrap(), coll);
}
