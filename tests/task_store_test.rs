use ace_exam::error::StorageError;
use ace_exam::models::initial_tasks;
use ace_exam::services::task_store::STORAGE_KEY;
use ace_exam::services::TaskStore;

fn store_in(dir: &tempfile::TempDir) -> TaskStore {
    TaskStore::new(dir.path().join("tasks.json"))
}

#[tokio::test]
async fn test_missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    assert!(store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let mut tasks = initial_tasks();
    tasks[3].toggle();
    store.save(&tasks).await.unwrap();

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded, tasks);
    assert!(loaded[3].is_completed);

    let raw = std::fs::read_to_string(store.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[STORAGE_KEY][0]["id"], "w1-t0");
    assert_eq!(value[STORAGE_KEY][3]["isCompleted"], true);
}

#[tokio::test]
async fn test_load_or_seed_initialises_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let mut seeded = store.load_or_seed().await.unwrap();
    assert_eq!(seeded.len(), 20);

    seeded[0].toggle();
    store.save(&seeded).await.unwrap();

    let reloaded = store.load_or_seed().await.unwrap();
    assert!(reloaded[0].is_completed);
}

#[tokio::test]
async fn test_clear_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.save(&initial_tasks()).await.unwrap();
    store.clear().await.unwrap();
    assert!(!store.path().exists());
    store.clear().await.unwrap();
    assert!(store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupt_file_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(store.path(), "{ not json").unwrap();

    let err = store.load().await.unwrap_err();
    assert!(matches!(err, StorageError::ParseFailed { .. }));
}

#[test]
fn test_save_from_sync_context() {
    let dir = tempfile::tempdir().unwrap();
    let store = TaskStore::new(dir.path().join("nested").join("tasks.json"));

    tokio_test::block_on(store.save(&initial_tasks())).unwrap();
    assert_eq!(tokio_test::block_on(store.load()).unwrap().len(), 20);
}
