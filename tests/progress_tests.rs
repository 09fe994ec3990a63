// tests/progress_tests.rs

use std::sync::Arc;

use quiz_backend::{
    config::Config,
    models::{level::Level, question::NewQuestion},
    routes,
    state::AppState,
    store::{MemoryStore, QuizStore},
};
use serde_json::Value;

async fn spawn_app() -> (String, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let config = Config {
        database_url: "memory".to_string(),
        jwt_secret: "progress_test_secret".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        server_port: 0,
        cors_origin: "http://localhost:3000".to_string(),
        questions_seed_file: None,
    };

    let app = routes::create_router(AppState::new(store.clone(), config));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, store)
}

/// Seeds `count` questions at `level`, all with option B ("B") correct.
async fn seed_level(store: &MemoryStore, level: Level, count: usize) -> Vec<i64> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let q = store
            .insert_question(NewQuestion {
                question_text: format!("L{} Q{}", level, i),
                option_a: "A".to_string(),
                option_b: "B".to_string(),
                option_c: "C".to_string(),
                option_d: "D".to_string(),
                correct_option: "B".to_string(),
                level,
            })
            .await
            .unwrap();
        ids.push(q.id);
    }
    ids
}

struct TestUser {
    client: reqwest::Client,
    address: String,
    token: String,
}

impl TestUser {
    async fn register(address: &str) -> Self {
        let client = reqwest::Client::new();
        let username = format!("p_{}", &uuid::Uuid::new_v4().to_string()[..8]);

        client
            .post(format!("{}/register", address))
            .json(&serde_json::json!({ "username": username, "password": "password123" }))
            .send()
            .await
            .unwrap();

        let login: Value = client
            .post(format!("{}/login", address))
            .json(&serde_json::json!({ "username": username, "password": "password123" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        Self {
            client,
            address: address.to_string(),
            token: login["access_token"].as_str().unwrap().to_string(),
        }
    }

    async fn get(&self, path: &str) -> Value {
        self.client
            .get(format!("{}{}", self.address, path))
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    /// Answers the first `correct` ids right and the rest wrong.
    async fn submit(&self, ids: &[i64], correct: usize) -> Value {
        let answers: serde_json::Map<String, Value> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let pick = if i < correct { "B" } else { "A" };
                (id.to_string(), Value::from(pick))
            })
            .collect();

        self.client
            .post(format!("{}/api/submit", self.address))
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&serde_json::json!({ "answers": answers }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn new_user_plays_level_one() {
    let (address, store) = spawn_app().await;
    let level_one = seed_level(&store, Level::One, 3).await;
    seed_level(&store, Level::Two, 2).await;
    let user = TestUser::register(&address).await;

    let served = user.get("/api/questions").await;
    assert_eq!(served["current_level"], 1);
    assert_eq!(served["total_levels"], 3);
    assert_eq!(served["questions"].as_array().unwrap().len(), level_one.len());
    assert_eq!(served["questions"][0]["options"].as_array().unwrap().len(), 4);
    assert_eq!(served["level_info"]["attempts"], 0);
    assert_eq!(served["level_info"]["passed"], false);

    let progress = user.get("/api/user-progress").await;
    assert_eq!(progress["current_level"], 1);
    assert_eq!(progress["progress"]["level_1"]["unlocked"], true);
    assert_eq!(progress["progress"]["level_2"]["unlocked"], false);
    assert_eq!(progress["progress"]["level_3"]["total_questions"], 0);
}

#[tokio::test]
async fn seventy_five_percent_stays_on_level_one() {
    let (address, store) = spawn_app().await;
    let ids = seed_level(&store, Level::One, 4).await;
    seed_level(&store, Level::Two, 4).await;
    let user = TestUser::register(&address).await;

    let result = user.submit(&ids, 3).await;
    assert_eq!(result["percentage"], 75.0);
    assert_eq!(result["level_passed"], false);
    assert_eq!(result["next_level_unlocked"], false);

    let served = user.get("/api/questions").await;
    assert_eq!(served["current_level"], 1);
    assert_eq!(served["level_info"]["percentage"], 75.0);
    assert_eq!(served["level_info"]["passed"], false);

    // The summary judges levels against 70%: level 1 shows as passed and level 2 unlocked,
    // while the current level stays 1 because mastery needs 80%.
    let progress = user.get("/api/user-progress").await;
    assert_eq!(progress["current_level"], 1);
    assert_eq!(progress["progress"]["level_1"]["passed"], true);
    assert_eq!(progress["progress"]["level_2"]["unlocked"], true);
}

#[tokio::test]
async fn perfect_level_one_moves_to_level_two() {
    let (address, store) = spawn_app().await;
    let ids = seed_level(&store, Level::One, 4).await;
    let level_two = seed_level(&store, Level::Two, 2).await;
    let user = TestUser::register(&address).await;

    let result = user.submit(&ids, 4).await;
    assert_eq!(result["score"], 4);
    assert_eq!(result["percentage"], 100.0);
    assert_eq!(result["level_passed"], true);
    assert_eq!(result["is_perfect"], true);
    assert_eq!(result["next_level_unlocked"], true);

    let served = user.get("/api/questions").await;
    assert_eq!(served["current_level"], 2);
    let served_ids: Vec<i64> = served["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_i64().unwrap())
        .collect();
    assert_eq!(served_ids, level_two);
}

#[tokio::test]
async fn only_level_one_questions_advances_to_empty_level_two() {
    let (address, store) = spawn_app().await;
    let ids = seed_level(&store, Level::One, 4).await;
    let user = TestUser::register(&address).await;

    user.submit(&ids, 4).await;

    let served = user.get("/api/questions").await;
    assert_eq!(served["current_level"], 2);
    assert!(served["questions"].as_array().unwrap().is_empty());
    assert_eq!(served["message"], "No questions available for level 2");
}

#[tokio::test]
async fn mastered_all_levels_wraps_after_level_three() {
    let (address, store) = spawn_app().await;
    let l1 = seed_level(&store, Level::One, 2).await;
    let l2 = seed_level(&store, Level::Two, 2).await;
    let l3 = seed_level(&store, Level::Three, 2).await;
    let user = TestUser::register(&address).await;

    user.submit(&l1, 2).await;
    assert_eq!(user.get("/api/user-progress").await["current_level"], 2);
    user.submit(&l2, 2).await;
    assert_eq!(user.get("/api/user-progress").await["current_level"], 3);
    user.submit(&l3, 2).await;

    // Every level mastered and the latest attempt (level 3) is 100%: wrap to level 1
    let progress = user.get("/api/user-progress").await;
    assert_eq!(progress["current_level"], 1);
    assert_eq!(progress["progress"]["level_3"]["unlocked"], true);

    // A weak retry of level 2 keeps the user on level 2
    user.submit(&l2, 1).await;
    assert_eq!(user.get("/api/user-progress").await["current_level"], 2);
}

#[tokio::test]
async fn users_do_not_share_progress() {
    let (address, store) = spawn_app().await;
    let ids = seed_level(&store, Level::One, 2).await;
    seed_level(&store, Level::Two, 2).await;

    let strong = TestUser::register(&address).await;
    let fresh = TestUser::register(&address).await;

    strong.submit(&ids, 2).await;

    assert_eq!(strong.get("/api/user-progress").await["current_level"], 2);
    assert_eq!(fresh.get("/api/user-progress").await["current_level"], 1);
    assert!(fresh.get("/api/quiz-history").await.as_array().unwrap().is_empty());
}
