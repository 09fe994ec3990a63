// tests/pg_store_tests.rs

use quiz_backend::{
    config::MEMORY_DATABASE_URL,
    models::{level::Level, question::NewQuestion, quiz_attempt::NewAnswer},
    store::{PgStore, QuizStore, UserStore},
};
use sqlx::postgres::PgPoolOptions;

/// Connects to the database named by `DATABASE_URL` and applies migrations.
/// Returns `None` when no Postgres database is configured, so the suite
/// still runs against the in-memory store alone.
async fn pg_store() -> Option<PgStore> {
    dotenvy::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) if url != MEMORY_DATABASE_URL => url,
        _ => {
            eprintln!("DATABASE_URL not set to a Postgres database, skipping");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    Some(PgStore::new(pool))
}

fn unique_username() -> String {
    format!("pg_{}", &uuid::Uuid::new_v4().to_string()[..8])
}

#[tokio::test]
async fn failed_answer_insert_leaves_no_attempt() {
    let Some(store) = pg_store().await else {
        return;
    };
    let user = store.create_user(&unique_username(), "hash").await.unwrap();
    let question = store
        .insert_question(NewQuestion {
            question_text: "Rollback?".to_string(),
            option_a: "yes".to_string(),
            option_b: "no".to_string(),
            option_c: "maybe".to_string(),
            option_d: "later".to_string(),
            correct_option: "A".to_string(),
            level: Level::One,
        })
        .await
        .unwrap();

    // The second answer violates the question foreign key.
    let result = store
        .insert_attempt(
            user.id,
            1,
            &[
                NewAnswer {
                    question_id: question.id,
                    selected_option: "yes".to_string(),
                },
                NewAnswer {
                    question_id: i64::MAX,
                    selected_option: "no".to_string(),
                },
            ],
        )
        .await;
    assert!(result.is_err());

    assert!(store.attempts_for_user(user.id).await.unwrap().is_empty());
    assert!(store.latest_attempt(user.id).await.unwrap().is_none());
    assert!(store.answer_details_for_user(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn attempt_and_answers_are_stored_together() {
    let Some(store) = pg_store().await else {
        return;
    };
    let user = store.create_user(&unique_username(), "hash").await.unwrap();
    let question = store
        .insert_question(NewQuestion {
            question_text: "Committed?".to_string(),
            option_a: "yes".to_string(),
            option_b: "no".to_string(),
            option_c: "maybe".to_string(),
            option_d: "later".to_string(),
            correct_option: "a".to_string(),
            level: Level::Two,
        })
        .await
        .unwrap();
    assert_eq!(question.correct_option, "A");

    let attempt = store
        .insert_attempt(
            user.id,
            1,
            &[NewAnswer {
                question_id: question.id,
                selected_option: "yes".to_string(),
            }],
        )
        .await
        .unwrap();

    let latest = store.latest_attempt(user.id).await.unwrap().unwrap();
    assert_eq!(latest.attempt_id, attempt.id);
    assert_eq!(latest.level, Level::Two);

    let details = store.answer_details_for_user(user.id).await.unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].attempt_id, attempt.id);
    assert_eq!(details[0].question.id, question.id);
}
