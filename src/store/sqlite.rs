use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{unknown_category, Category, NewQuestion, Question, QuestionStore};
use crate::db::queries::{categories, questions};
use crate::error::{TriviaError, TriviaResult};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl QuestionStore for SqliteStore {
    #[tracing::instrument(skip(self, new_question), fields(category = new_question.category))]
    async fn create(&self, new_question: NewQuestion) -> TriviaResult<Question> {
        new_question.validate()?;
        // A missing category surfaces as a foreign key violation.
        let id = questions::create_question(&self.pool, &new_question)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    unknown_category(new_question.category)
                }
                err => err.into(),
            })?;
        tracing::debug!(id, "Question created");
        Ok(Question {
            id,
            question: new_question.question,
            answer: new_question.answer,
            category: new_question.category,
            difficulty: new_question.difficulty,
        })
    }

    async fn delete(&self, id: i64) -> TriviaResult<()> {
        match questions::delete_question(&self.pool, id).await? {
            0 => Err(TriviaError::question_not_found(id)),
            _ => {
                tracing::debug!(id, "Question deleted");
                Ok(())
            }
        }
    }

    async fn get(&self, id: i64) -> TriviaResult<Question> {
        questions::get_question_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| TriviaError::question_not_found(id))
    }

    async fn all(&self) -> TriviaResult<Vec<Question>> {
        Ok(questions::get_all_questions(&self.pool).await?)
    }

    async fn by_category(&self, category: i64) -> TriviaResult<Vec<Question>> {
        Ok(questions::get_questions_for_category(&self.pool, category).await?)
    }

    async fn categories(&self) -> TriviaResult<Vec<Category>> {
        Ok(categories::get_all_categories(&self.pool).await?)
    }

    async fn category(&self, id: i64) -> TriviaResult<Category> {
        categories::get_category(&self.pool, id)
            .await?
            .ok_or_else(|| TriviaError::category_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    async fn store() -> SqliteStore {
        SqliteStore::new(connect_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn migrations_seed_default_categories() {
        let store = store().await;
        let names: Vec<String> = store
            .categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, crate::store::DEFAULT_CATEGORIES);
        assert_eq!(store.category(4).await.unwrap().name, "History");
        assert!(matches!(
            store.category(99).await,
            Err(TriviaError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn create_get_delete_round_trip() {
        let store = store().await;
        let created = store
            .create(NewQuestion::new("What is H2O?", "Water", 1, 1))
            .await
            .unwrap();
        assert_eq!(store.get(created.id).await.unwrap(), created);

        store.delete(created.id).await.unwrap();
        assert!(matches!(
            store.get(created.id).await,
            Err(TriviaError::NotFound { .. })
        ));
        assert!(store.all().await.unwrap().is_empty());
        assert!(matches!(
            store.delete(created.id).await,
            Err(TriviaError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn invalid_create_persists_nothing() {
        let store = store().await;
        assert!(store.create(NewQuestion::new("", "a", 1, 1)).await.is_err());
        assert!(store.create(NewQuestion::new("q", "a", 1, 9)).await.is_err());
        assert!(matches!(
            store.create(NewQuestion::new("q", "a", 77, 1)).await,
            Err(TriviaError::Validation(_))
        ));
        assert!(store.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_under_removed_category_is_a_validation_error() {
        let store = store().await;
        sqlx::query("INSERT INTO categories (id, type) VALUES (7, 'Music')")
            .execute(store.pool())
            .await
            .unwrap();
        let created = store
            .create(NewQuestion::new("Who wrote Bolero?", "Ravel", 7, 2))
            .await
            .unwrap();
        store.delete(created.id).await.unwrap();
        sqlx::query("DELETE FROM categories WHERE id = 7")
            .execute(store.pool())
            .await
            .unwrap();

        match store.create(NewQuestion::new("Who wrote Bolero?", "Ravel", 7, 2)).await {
            Err(TriviaError::Validation(message)) => {
                assert_eq!(message, "Category 7 does not exist")
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
        assert!(store.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn all_and_by_category_follow_insertion_order() {
        let store = store().await;
        let mut ids = vec![];
        for (text, category) in [("a", 1), ("b", 2), ("c", 1), ("d", 1)] {
            ids.push(
                store
                    .create(NewQuestion::new(text, "x", category, 1))
                    .await
                    .unwrap()
                    .id,
            );
        }
        let all: Vec<i64> = store.all().await.unwrap().iter().map(|q| q.id).collect();
        assert_eq!(all, ids);

        let science: Vec<String> = store
            .by_category(1)
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.question)
            .collect();
        assert_eq!(science, ["a", "c", "d"]);
    }
}
