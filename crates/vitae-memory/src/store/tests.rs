use super::{parse_string_list, Store};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use vitae_core::{
    config::MemoryConfig,
    context::{build_context, Connection, PersonaSettings, Project},
    traits::{ProfileSource, TranscriptStore},
};

/// Create an in-memory store for testing.
async fn test_store() -> Store {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .unwrap();
    Store::run_migrations(&pool).await.unwrap();
    Store { pool }
}

fn project(title: &str) -> Project {
    Project {
        title: title.to_string(),
        description: format!("{title} description"),
        technologies: "Rust".to_string(),
    }
}

#[test]
fn test_parse_string_list() {
    assert_eq!(parse_string_list(Some(r#"["Go","Rust"]"#)), ["Go", "Rust"]);
    assert_eq!(parse_string_list(Some(r#"[" Go ", "", 3, null]"#)), ["Go"]);
    assert!(parse_string_list(None).is_empty());
    assert!(parse_string_list(Some("")).is_empty());
    assert!(parse_string_list(Some("Go, Rust")).is_empty());
    assert!(parse_string_list(Some(r#"{"skills":["Go"]}"#)).is_empty());
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let store = test_store().await;
    Store::run_migrations(store.pool()).await.unwrap();

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _migrations")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_new_creates_db_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("vitae.db");
    let config = MemoryConfig {
        db_path: db_path.to_string_lossy().into_owned(),
    };
    let store = Store::new(&config).await.unwrap();
    store.ping().await.unwrap();
    assert!(db_path.exists());
}

#[tokio::test]
async fn test_new_reports_data_dir_failure_as_io() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"x").unwrap();
    let config = MemoryConfig {
        db_path: blocker.join("vitae.db").to_string_lossy().into_owned(),
    };
    let err = Store::new(&config).await.err().unwrap();
    assert!(matches!(err, vitae_core::error::VitaeError::Io(_)));
}

#[tokio::test]
async fn test_open_existing_has_no_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("vitae.db");
    let config = MemoryConfig {
        db_path: db_path.to_string_lossy().into_owned(),
    };

    assert!(Store::open_existing(&config).await.is_err());
    assert!(!db_path.exists());
    assert!(!dir.path().join("nested").exists());

    Store::new(&config).await.unwrap();
    let store = Store::open_existing(&config).await.unwrap();
    store.ping().await.unwrap();
}

#[tokio::test]
async fn test_missing_rows_read_as_absent() {
    let store = test_store().await;
    assert!(store.read_user_profile(7).await.unwrap().is_none());
    assert!(store.read_persona_settings(7).await.unwrap().is_none());
    assert!(store.read_projects(7, 10).await.unwrap().is_empty());
    assert!(store.read_connections(7).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_round_trip() {
    let store = test_store().await;
    store
        .upsert_user(42, "Ada", Some("ada@example.com"))
        .await
        .unwrap();
    store
        .upsert_persona_settings(
            42,
            &PersonaSettings {
                agent_name: Some("Ada's Agent".into()),
                skills: vec!["Go".into(), "Rust".into()],
                years_experience: Some(6),
                role_title: Some("Staff Engineer".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let profile = store.read_user_profile(42).await.unwrap().unwrap();
    assert_eq!(profile.name.as_deref(), Some("Ada"));
    assert_eq!(profile.email.as_deref(), Some("ada@example.com"));

    let settings = store.read_persona_settings(42).await.unwrap().unwrap();
    assert_eq!(settings.agent_name.as_deref(), Some("Ada's Agent"));
    assert_eq!(settings.persona_type.as_deref(), Some("professional"));
    assert_eq!(settings.skills, ["Go", "Rust"]);
    assert!(settings.specialties.is_empty());
    assert_eq!(settings.years_experience, Some(6));
    assert_eq!(settings.role_title.as_deref(), Some("Staff Engineer"));
}

#[tokio::test]
async fn test_settings_upsert_replaces() {
    let store = test_store().await;
    store.upsert_user(1, "Ada", None).await.unwrap();
    let mut settings = PersonaSettings {
        skills: vec!["Go".into()],
        ..Default::default()
    };
    store.upsert_persona_settings(1, &settings).await.unwrap();
    settings.skills = vec!["Rust".into()];
    store.upsert_persona_settings(1, &settings).await.unwrap();

    let read = store.read_persona_settings(1).await.unwrap().unwrap();
    assert_eq!(read.skills, ["Rust"]);
}

#[tokio::test]
async fn test_malformed_skills_column_reads_empty() {
    let store = test_store().await;
    store.upsert_user(3, "Ada", None).await.unwrap();
    sqlx::query("INSERT INTO user_settings (user_id, skills, specialties) VALUES (3, 'not json', '[1,2]')")
        .execute(store.pool())
        .await
        .unwrap();

    let settings = store.read_persona_settings(3).await.unwrap().unwrap();
    assert!(settings.skills.is_empty());
    assert!(settings.specialties.is_empty());
}

#[tokio::test]
async fn test_projects_featured_first_then_newest_with_limit() {
    let store = test_store().await;
    store.upsert_user(5, "Ada", None).await.unwrap();
    for (i, title) in ["Old", "Pinned", "Newer", "Newest"].iter().enumerate() {
        let id = store
            .add_project(5, &project(title), *title == "Pinned")
            .await
            .unwrap();
        sqlx::query("UPDATE projects SET created_at = ? WHERE id = ?")
            .bind(format!("2026-01-0{}T00:00:00.000Z", i + 1))
            .bind(id)
            .execute(store.pool())
            .await
            .unwrap();
    }

    let titles: Vec<String> = store
        .read_projects(5, 3)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, ["Pinned", "Newest", "Newer"]);

    assert_eq!(store.clear_projects(5).await.unwrap(), 4);
    assert!(store.read_projects(5, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_connections_upsert_per_platform() {
    let store = test_store().await;
    store.upsert_user(9, "Ada", None).await.unwrap();
    let github = Connection {
        platform: "github".into(),
        username: "ada".into(),
        profile_url: "https://github.com/ada".into(),
    };
    store.upsert_connection(9, &github).await.unwrap();
    store
        .upsert_connection(
            9,
            &Connection {
                username: "ada-l".into(),
                ..github.clone()
            },
        )
        .await
        .unwrap();
    store
        .upsert_connection(
            9,
            &Connection {
                platform: "linkedin".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let conns = store.read_connections(9).await.unwrap();
    assert_eq!(conns.len(), 2);
    assert_eq!(conns[0].platform, "github");
    assert_eq!(conns[0].username, "ada-l");
    assert_eq!(conns[1].platform, "linkedin");
}

#[tokio::test]
async fn test_build_context_from_store() {
    let store = test_store().await;
    store.upsert_user(42, "Ada", None).await.unwrap();
    store
        .upsert_persona_settings(
            42,
            &PersonaSettings {
                skills: vec!["Go".into(), "Rust".into()],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    for title in ["A", "B", "C"] {
        store.add_project(42, &project(title), false).await.unwrap();
    }

    let ctx = build_context(&store, 42).await;
    assert_eq!(ctx.name, "Ada");
    assert_eq!(ctx.agent_name, "Ada");
    assert_eq!(ctx.skills, ["Go", "Rust"]);
    assert_eq!(ctx.projects.len(), 3);
}

#[tokio::test]
async fn test_transcript_append_and_list_in_order() {
    let store = test_store().await;
    let first = store.append_transcript(42, "hello", "Hi!").await.unwrap();
    let second = store
        .append_transcript(42, "skills?", "Go, Rust")
        .await
        .unwrap();
    store.append_transcript(7, "other", "user").await.unwrap();

    assert!(second.id > first.id);
    assert!(second.created_at >= first.created_at);

    let transcript = store.list_transcript(42).await.unwrap();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].id, first.id);
    assert_eq!(transcript[0].message, "hello");
    assert_eq!(transcript[0].response, "Hi!");
    assert_eq!(transcript[0].created_at, first.created_at);
    assert_eq!(transcript[1].message, "skills?");
    assert!(transcript
        .windows(2)
        .all(|w| w[0].created_at <= w[1].created_at));
}

#[tokio::test]
async fn test_transcript_orders_by_created_at_not_insertion() {
    let store = test_store().await;
    for (message, ts) in [
        ("late", "2026-05-01T10:00:00.500Z"),
        ("early", "2026-05-01T10:00:00.100Z"),
    ] {
        sqlx::query(
            "INSERT INTO chat_messages (user_id, message, response, created_at) VALUES (1, ?, 'r', ?)",
        )
        .bind(message)
        .bind(ts)
        .execute(store.pool())
        .await
        .unwrap();
    }

    let transcript = store.list_transcript(1).await.unwrap();
    let messages: Vec<&str> = transcript.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(messages, ["early", "late"]);
}

#[tokio::test]
async fn test_closed_pool_surfaces_persistence_error() {
    let store = test_store().await;
    store.pool().close().await;
    let err = store.append_transcript(1, "hello", "Hi!").await.unwrap_err();
    assert!(matches!(err, vitae_core::error::VitaeError::Persistence(_)));
}
