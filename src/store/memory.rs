use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::{unknown_category, Category, NewQuestion, Question, QuestionStore, DEFAULT_CATEGORIES};
use crate::error::{TriviaError, TriviaResult};

#[derive(Default)]
struct Tables {
    last_question_id: i64,
    questions: BTreeMap<i64, Question>,
    categories: BTreeMap<i64, Category>,
}

/// A store that lives and dies with the process. Ids are never reused.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with categories numbered from 1 in the given order.
    pub fn with_categories<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories = names
            .into_iter()
            .zip(1..)
            .map(|(name, id)| {
                (
                    id,
                    Category {
                        id,
                        name: name.into(),
                    },
                )
            })
            .collect();
        Self {
            tables: RwLock::new(Tables {
                categories,
                ..Tables::default()
            }),
        }
    }

    /// Store with the same categories the database migrations seed.
    pub fn seeded() -> Self {
        Self::with_categories(DEFAULT_CATEGORIES)
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn create(&self, new_question: NewQuestion) -> TriviaResult<Question> {
        new_question.validate()?;
        let mut tables = self.write();
        if !tables.categories.contains_key(&new_question.category) {
            return Err(unknown_category(new_question.category));
        }
        tables.last_question_id += 1;
        let question = Question {
            id: tables.last_question_id,
            question: new_question.question,
            answer: new_question.answer,
            category: new_question.category,
            difficulty: new_question.difficulty,
        };
        tables.questions.insert(question.id, question.clone());
        Ok(question)
    }

    async fn delete(&self, id: i64) -> TriviaResult<()> {
        self.write()
            .questions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| TriviaError::question_not_found(id))
    }

    async fn get(&self, id: i64) -> TriviaResult<Question> {
        self.read()
            .questions
            .get(&id)
            .cloned()
            .ok_or_else(|| TriviaError::question_not_found(id))
    }

    async fn all(&self) -> TriviaResult<Vec<Question>> {
        Ok(self.read().questions.values().cloned().collect())
    }

    async fn categories(&self) -> TriviaResult<Vec<Category>> {
        Ok(self.read().categories.values().cloned().collect())
    }

    async fn category(&self, id: i64) -> TriviaResult<Category> {
        self.read()
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| TriviaError::category_not_found(id))
    }
}
