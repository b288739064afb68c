//! Persisted trivia records and the storage seam the services are built on.
//!
//! [`QuestionStore`] is implemented by [`SqliteStore`] for the running service and by
//! [`MemoryStore`] for tests and throwaway sessions.

mod memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{TriviaError, TriviaResult};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub const MIN_DIFFICULTY: i64 = 1;
pub const MAX_DIFFICULTY: i64 = 5;

/// Categories seeded by the initial migration, in id order starting at 1.
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "Science",
    "Art",
    "Geography",
    "History",
    "Entertainment",
    "Sports",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    #[sqlx(rename = "category_id")]
    pub category: i64,
    pub difficulty: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

impl NewQuestion {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        category: i64,
        difficulty: i64,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            category,
            difficulty,
        }
    }

    /// Checks everything that can be checked without touching storage.
    pub fn validate(&self) -> TriviaResult<()> {
        if self.question.trim().is_empty() {
            return Err(TriviaError::validation("Question is a mandatory field"));
        }
        if self.answer.trim().is_empty() {
            return Err(TriviaError::validation("Answer is a mandatory field"));
        }
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.difficulty) {
            return Err(TriviaError::validation(format!(
                "Difficulty must be between {MIN_DIFFICULTY} and {MAX_DIFFICULTY}, got {}",
                self.difficulty
            )));
        }
        Ok(())
    }
}

pub(crate) fn unknown_category(id: i64) -> TriviaError {
    TriviaError::validation(format!("Category {id} does not exist"))
}

#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Persists a new question under a fresh id. Nothing is written when validation fails.
    async fn create(&self, new_question: NewQuestion) -> TriviaResult<Question>;

    async fn delete(&self, id: i64) -> TriviaResult<()>;

    async fn get(&self, id: i64) -> TriviaResult<Question>;

    /// Every question, ordered by id.
    async fn all(&self) -> TriviaResult<Vec<Question>>;

    /// Questions of one category, ordered by id.
    async fn by_category(&self, category: i64) -> TriviaResult<Vec<Question>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|q| q.category == category)
            .collect())
    }

    async fn categories(&self) -> TriviaResult<Vec<Category>>;

    async fn category(&self, id: i64) -> TriviaResult<Category>;
}

#[async_trait]
impl<T: QuestionStore + ?Sized> QuestionStore for Arc<T> {
    async fn create(&self, new_question: NewQuestion) -> TriviaResult<Question> {
        (**self).create(new_question).await
    }

    async fn delete(&self, id: i64) -> TriviaResult<()> {
        (**self).delete(id).await
    }

    async fn get(&self, id: i64) -> TriviaResult<Question> {
        (**self).get(id).await
    }

    async fn all(&self) -> TriviaResult<Vec<Question>> {
        (**self).all().await
    }

    async fn by_category(&self, category: i64) -> TriviaResult<Vec<Question>> {
        (**self).by_category(category).await
    }

    async fn categories(&self) -> TriviaResult<Vec<Category>> {
        (**self).categories().await
    }

    async fn category(&self, id: i64) -> TriviaResult<Category> {
        (**self).category(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        let err = NewQuestion::new("   ", "Paris", 3, 1).validate().unwrap_err();
        assert_eq!(err.to_string(), "Question is a mandatory field");

        let err = NewQuestion::new("Capital of France?", "", 3, 1)
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "Answer is a mandatory field");
    }

    #[test]
    fn difficulty_bounds_are_inclusive() {
        assert!(NewQuestion::new("q", "a", 1, MIN_DIFFICULTY).validate().is_ok());
        assert!(NewQuestion::new("q", "a", 1, MAX_DIFFICULTY).validate().is_ok());
        assert!(matches!(
            NewQuestion::new("q", "a", 1, 0).validate(),
            Err(TriviaError::Validation(_))
        ));
        assert!(matches!(
            NewQuestion::new("q", "a", 1, 6).validate(),
            Err(TriviaError::Validation(_))
        ));
    }
}
