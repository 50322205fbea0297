use quiz_core::model::{Leaderboard, QuizId, UserStats};
use storage::Storage;
use storage::repository::{KeyValueStore, StorageKey};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_roundtrip_persists_documents() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // running twice is harmless
    repo.migrate().await.expect("migrate again");

    assert_eq!(repo.get(StorageKey::Leaderboard).await.unwrap(), None);

    repo.set(StorageKey::Leaderboard, "[]").await.unwrap();
    repo.set(StorageKey::Leaderboard, r#"[{"name":"ada","score":40}]"#)
        .await
        .unwrap();
    assert_eq!(
        repo.get(StorageKey::Leaderboard).await.unwrap().as_deref(),
        Some(r#"[{"name":"ada","score":40}]"#)
    );

    repo.remove(StorageKey::Leaderboard).await.unwrap();
    assert_eq!(repo.get(StorageKey::Leaderboard).await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_storage_backs_typed_repositories() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_storage?mode=memory&cache=shared")
        .await
        .expect("open storage");

    let stats = UserStats {
        total_quizzes: 2,
        coins: 140,
        ..UserStats::default()
    };
    storage.stats.save_stats(&stats).await.unwrap();
    assert_eq!(storage.stats.load_stats().await.unwrap(), stats);

    let mut board = Leaderboard::new();
    board.record("ada", 30);
    storage.leaderboard.save_leaderboard(&board).await.unwrap();
    assert_eq!(
        storage.leaderboard.load_leaderboard().await.unwrap().best_for("ada"),
        Some(30)
    );

    let id = QuizId::generate();
    storage.created_quizzes.mark_completed(id).await.unwrap();
    assert_eq!(storage.created_quizzes.completed_ids().await.unwrap(), [id]);

    storage.accounts.set_current_user("ada").await.unwrap();
    assert_eq!(
        storage.accounts.current_user().await.unwrap().as_deref(),
        Some("ada")
    );
}
