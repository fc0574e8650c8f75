use std::sync::Arc;

use camino_tempfile::tempdir;
use pretty_assertions::assert_eq;
use sahaay_conversation::Session;
use sahaay_wire::{Language, Turn};

use super::*;

#[test_log::test(tokio::test)]
async fn appends_and_lists_in_order() {
    let tmp = tempdir().unwrap();
    let store = FileStore::new(tmp.path().join("store")).await.unwrap();
    let session = Session::new(SessionId::new(), Language::Hindi);

    let first = TurnRecord::new(&session, Turn::user("सीने में दर्द"));
    let second = TurnRecord::new(&session, Turn::assistant("🚨 Call 112.\nPlease hurry."));
    store.insert(first.clone()).await.unwrap();
    store.insert(second.clone()).await.unwrap();

    assert_eq!(store.list(session.id).await.unwrap(), vec![first, second]);

    let path = tmp
        .path()
        .join("store")
        .join(SESSIONS_DIR)
        .join(format!("{}.jsonl", session.id));
    let contents = std::fs::read_to_string(path).unwrap();
    assert_eq!(contents.lines().count(), 2);
}

#[test_log::test(tokio::test)]
async fn unknown_session_is_empty() {
    let tmp = tempdir().unwrap();
    let store = FileStore::new(tmp.path()).await.unwrap();

    assert!(store.list(SessionId::new()).await.unwrap().is_empty());
    assert!(store.sessions().await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn sessions_are_kept_apart() {
    let tmp = tempdir().unwrap();
    let store = FileStore::new(tmp.path()).await.unwrap();
    let a = Session::new(SessionId::new(), Language::English);
    let b = Session::new(SessionId::new(), Language::Tamil);

    store.insert(TurnRecord::new(&a, Turn::user("a"))).await.unwrap();
    store.insert(TurnRecord::new(&b, Turn::user("b"))).await.unwrap();

    let turns: Vec<_> = store
        .list(b.id)
        .await
        .unwrap()
        .into_iter()
        .map(|record| record.turn)
        .collect();
    assert_eq!(turns, vec![Turn::user("b")]);

    let mut expected = vec![a.id, b.id];
    expected.sort();
    assert_eq!(store.sessions().await.unwrap(), expected);
}

#[test_log::test(tokio::test)]
async fn corrupt_lines_are_skipped() {
    let tmp = tempdir().unwrap();
    let store = FileStore::new(tmp.path()).await.unwrap();
    let session = Session::new(SessionId::new(), Language::English);
    let record = TurnRecord::new(&session, Turn::user("ok"));
    store.insert(record.clone()).await.unwrap();

    let path = store.session_path(session.id);
    let mut contents = std::fs::read_to_string(&path).unwrap();
    contents.push_str("{not json\n\n");
    std::fs::write(&path, contents).unwrap();

    assert_eq!(store.list(session.id).await.unwrap(), vec![record]);
}

#[test_log::test(tokio::test)]
async fn concurrent_inserts_do_not_interleave() {
    let tmp = tempdir().unwrap();
    let store = Arc::new(FileStore::new(tmp.path()).await.unwrap());
    let session = Session::new(SessionId::new(), Language::English);

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..50 {
        let store = Arc::clone(&store);
        let record = TurnRecord::new(&session, Turn::user("x".repeat(i * 100)));
        tasks.spawn(async move { store.insert(record).await });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }

    assert_eq!(store.list(session.id).await.unwrap().len(), 50);
}

#[test_log::test(tokio::test)]
async fn root_must_be_a_directory() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("file");
    std::fs::write(&file, "").unwrap();

    assert_eq!(
        FileStore::new(file.clone()).await.unwrap_err(),
        Error::NotDir(file)
    );
}
