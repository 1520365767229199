use brain_core::model::{EndReason, GameResult, GameType, ReminderSchedule, UserId};
use brain_core::time::fixed_now;
use chrono::{Duration, Weekday};
use storage::repository::{
    InMemoryRepository, PublicResultRepository, ReminderRepository, ResultRecord, Storage,
    StoredResult, UserResultRepository,
};
use storage::sqlite::SqliteRepository;

fn build_record(score: u32, total: u32, minutes_ago: i64, game_type: GameType) -> ResultRecord {
    let result = GameResult::new(
        score,
        total,
        45,
        EndReason::TimeExpired,
        game_type,
    )
    .unwrap();
    ResultRecord::from_result(
        &result,
        fixed_now() - Duration::minutes(minutes_ago),
        "cli",
        Some(UserId::new("user-1")),
        Some("one@example.com".into()),
    )
}

#[tokio::test]
async fn sqlite_and_memory_agree_on_tie_order() {
    let sqlite = SqliteRepository::connect("sqlite:file:memdb_ties?mode=memory&cache=shared")
        .await
        .expect("connect");
    sqlite.migrate().await.expect("migrate");
    let memory = InMemoryRepository::new();

    for score in 0..4 {
        let record = build_record(score, 10, 5, GameType::Addition);
        sqlite.append_public_result(&record).await.unwrap();
        memory.append_public_result(&record).await.unwrap();
    }

    let ids_descending = |rows: Vec<StoredResult>| {
        let ids: Vec<_> = rows.iter().map(|row| row.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(ids, sorted);
        rows.len()
    };
    assert_eq!(ids_descending(sqlite.list_public_results(10).await.unwrap()), 4);
    assert_eq!(ids_descending(memory.list_public_results(10).await.unwrap()), 4);
}

#[tokio::test]
async fn sqlite_keeps_user_and_public_results_apart() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_results?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let user = UserId::new("user-1");
    repo.append_user_result(&user, &build_record(2, 10, 20, GameType::Addition))
        .await
        .unwrap();
    let latest = repo
        .append_user_result(&user, &build_record(9, 10, 1, GameType::MemoryMatch))
        .await
        .unwrap();
    repo.append_public_result(&build_record(5, 8, 3, GameType::Division))
        .await
        .unwrap();

    let mine = repo.list_user_results(&user, 10).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].id, latest);
    assert_eq!(mine[0].record.game_type, GameType::MemoryMatch);
    assert_eq!(mine[0].record.percentage, 90);
    assert_eq!(mine[0].record.user_email, "one@example.com");
    assert_eq!(mine[1].record.created_at, fixed_now() - Duration::minutes(20));

    let public = repo.list_public_results(10).await.unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].record.user_id, None);
    assert_eq!(public[0].record.ended_by, EndReason::TimeExpired);
    assert_eq!(public[0].record.percentage, 63);

    let other = repo
        .list_user_results(&UserId::new("someone-else"), 10)
        .await
        .unwrap();
    assert!(other.is_empty());
}

#[tokio::test]
async fn sqlite_reminder_schedule_upserts_single_row() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_reminder?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    assert_eq!(repo.get_schedule().await.unwrap(), None);

    let first = ReminderSchedule::default();
    repo.save_schedule(&first).await.unwrap();
    assert_eq!(repo.get_schedule().await.unwrap(), Some(first));

    let second = first
        .with_enabled(false)
        .with_time(ReminderSchedule::parse_time("18:45").unwrap())
        .with_days([Weekday::Sat, Weekday::Sun].into_iter().collect());
    repo.save_schedule(&second).await.unwrap();
    assert_eq!(repo.get_schedule().await.unwrap(), Some(second));
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn storage_sqlite_wires_every_repository() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    let user = UserId::new("user-1");
    storage
        .user_results
        .append_user_result(&user, &build_record(1, 1, 0, GameType::Mixed))
        .await
        .unwrap();
    let rows = storage.user_results.list_user_results(&user, 5).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(storage.public_results.list_public_results(5).await.unwrap().is_empty());
    assert_eq!(storage.reminders.get_schedule().await.unwrap(), None);
}
