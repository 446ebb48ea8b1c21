use catalog_core::{
    FavoritesNamespace, FavoritesStore, Genre, ItemRecord, SqliteFavoritesStore, StoreError,
};
use rusqlite::Connection;

fn sample_item(id: u64) -> ItemRecord {
    let mut item = ItemRecord::new(id, format!("Item {id}"), 7.5);
    item.overview = Some("overview".to_string());
    item.genres = vec![Genre {
        id: 18,
        name: "Drama".to_string(),
    }];
    item
}

fn namespace(value: &str) -> FavoritesNamespace {
    FavoritesNamespace::new(value).unwrap()
}

#[tokio::test]
async fn put_exists_delete_cycle() {
    let store = SqliteFavoritesStore::open_in_memory().unwrap();
    let ns = FavoritesNamespace::default();
    let item = sample_item(42);

    assert!(!store.exists(&ns, 42).await.unwrap());
    store.put(&ns, &item).await.unwrap();
    assert!(store.exists(&ns, 42).await.unwrap());
    assert_eq!(store.get(&ns, 42).unwrap(), Some(item));

    store.delete(&ns, 42).await.unwrap();
    assert!(!store.exists(&ns, 42).await.unwrap());
    assert_eq!(store.get(&ns, 42).unwrap(), None);
}

#[tokio::test]
async fn put_twice_upserts_latest_payload() {
    let store = SqliteFavoritesStore::open_in_memory().unwrap();
    let ns = FavoritesNamespace::default();
    let mut item = sample_item(7);
    store.put(&ns, &item).await.unwrap();

    item.title = "Renamed".to_string();
    store.put(&ns, &item).await.unwrap();

    let saved = store.get(&ns, 7).unwrap().unwrap();
    assert_eq!(saved.title, "Renamed");
}

#[tokio::test]
async fn delete_missing_entry_is_ok() {
    let store = SqliteFavoritesStore::open_in_memory().unwrap();
    store
        .delete(&FavoritesNamespace::default(), 999)
        .await
        .unwrap();
}

#[tokio::test]
async fn namespaces_are_isolated() {
    let store = SqliteFavoritesStore::open_in_memory().unwrap();
    let first = namespace("@first");
    let second = namespace("@second");
    store.put(&first, &sample_item(1)).await.unwrap();

    assert!(store.exists(&first, 1).await.unwrap());
    assert!(!store.exists(&second, 1).await.unwrap());

    store.delete(&second, 1).await.unwrap();
    assert!(store.exists(&first, 1).await.unwrap());
}

#[tokio::test]
async fn favorites_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("favorites.db");
    let ns = FavoritesNamespace::default();

    {
        let store = SqliteFavoritesStore::open(&path).unwrap();
        store.put(&ns, &sample_item(5)).await.unwrap();
    }

    let reopened = SqliteFavoritesStore::open(&path).unwrap();
    assert!(reopened.exists(&ns, 5).await.unwrap());
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteFavoritesStore::try_new(conn).err().unwrap();
    assert!(matches!(err, StoreError::MissingRequiredTable("favorites")));
}

#[test]
fn blank_namespace_is_rejected() {
    assert!(FavoritesNamespace::new("  ").is_none());
    assert_eq!(namespace(" @x ").as_str(), "@x");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_operations_share_one_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = std::sync::Arc::new(
        SqliteFavoritesStore::open(dir.path().join("favorites.sqlite3")).unwrap(),
    );
    let ns = FavoritesNamespace::default();

    let mut tasks = Vec::new();
    for id in 1..=16u64 {
        let store = std::sync::Arc::clone(&store);
        let ns = ns.clone();
        tasks.push(tokio::spawn(async move {
            store.put(&ns, &sample_item(id)).await.unwrap();
            store.exists(&ns, id).await.unwrap()
        }));
    }
    for task in tasks {
        assert!(task.await.unwrap());
    }

    for id in (1..=16u64).filter(|id| id % 2 == 0) {
        store.delete(&ns, id).await.unwrap();
    }
    for id in 1..=16u64 {
        assert_eq!(store.exists(&ns, id).await.unwrap(), id % 2 == 1);
    }
}
