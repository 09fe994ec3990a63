// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    store::{QuizStore, UserStore},
};

pub type SharedQuizStore = Arc<dyn QuizStore>;
pub type SharedUserStore = Arc<dyn UserStore>;

#[derive(Clone)]
pub struct AppState {
    pub quizzes: SharedQuizStore,
    pub users: SharedUserStore,
    pub config: Config,
}

impl AppState {
    /// Builds the state from one value implementing both store traits.
    pub fn new<S>(store: Arc<S>, config: Config) -> Self
    where
        S: QuizStore + UserStore + 'static,
    {
        Self {
            quizzes: store.clone(),
            users: store,
            config,
        }
    }
}

impl FromRef<AppState> for SharedQuizStore {
    fn from_ref(state: &AppState) -> Self {
        state.quizzes.clone()
    }
}

impl FromRef<AppState> for SharedUserStore {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
