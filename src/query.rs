//! Read-only views over a [`QuestionStore`]: pages, category filters and text search.

use crate::error::{TriviaError, TriviaResult};
use crate::store::{Question, QuestionStore};

/// One page of questions together with the size of the whole selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub questions: Vec<Question>,
    pub total: usize,
}

#[derive(Clone)]
pub struct QueryService<S> {
    store: S,
}

impl<S: QuestionStore> QueryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Questions in scope for `category`, or every question when it is `None`.
    pub async fn pool(&self, category: Option<i64>) -> TriviaResult<Vec<Question>> {
        match category {
            Some(category) => self.store.by_category(category).await,
            None => self.store.all().await,
        }
    }

    /// `page` starts at 1. A page past the end is empty but still reports the total.
    pub async fn list(
        &self,
        page: i64,
        page_size: i64,
        category: Option<i64>,
    ) -> TriviaResult<Page> {
        if page < 1 {
            return Err(TriviaError::validation(format!(
                "Page must be 1 or greater, got {page}"
            )));
        }
        if page_size <= 0 {
            return Err(TriviaError::validation(format!(
                "Page size must be positive, got {page_size}"
            )));
        }
        let selection = self.pool(category).await?;
        let total = selection.len();
        let questions = usize::try_from((page - 1).saturating_mul(page_size))
            .map(|start| {
                selection
                    .into_iter()
                    .skip(start)
                    .take(page_size as usize)
                    .collect()
            })
            .unwrap_or_default();
        Ok(Page { questions, total })
    }

    /// Case-insensitive substring match on the question text, in store order.
    pub async fn search(&self, term: &str) -> TriviaResult<Vec<Question>> {
        let needle = term.to_lowercase();
        let matches: Vec<Question> = self
            .store
            .all()
            .await?
            .into_iter()
            .filter(|q| q.question.to_lowercase().contains(&needle))
            .collect();
        tracing::debug!(term, found = matches.len(), "Searched questions");
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, NewQuestion};

    async fn service_with(questions: &[(&str, i64)]) -> QueryService<MemoryStore> {
        let service = QueryService::new(MemoryStore::seeded());
        for (text, category) in questions {
            service
                .store()
                .create(NewQuestion::new(*text, "answer", *category, 3))
                .await
                .unwrap();
        }
        service
    }

    fn texts(questions: &[Question]) -> Vec<&str> {
        questions.iter().map(|q| q.question.as_str()).collect()
    }

    #[tokio::test]
    async fn pages_are_sliced_in_store_order() {
        let service = service_with(&[("q1", 1), ("q2", 1), ("q3", 2), ("q4", 1), ("q5", 3)]).await;

        let first = service.list(1, 2, None).await.unwrap();
        assert_eq!(texts(&first.questions), ["q1", "q2"]);
        assert_eq!(first.total, 5);

        let last = service.list(3, 2, None).await.unwrap();
        assert_eq!(texts(&last.questions), ["q5"]);
        assert_eq!(last.total, 5);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty_not_an_error() {
        let service = service_with(&[("q1", 1), ("q2", 2), ("q3", 1)]).await;

        let page = service.list(7, 10, None).await.unwrap();
        assert!(page.questions.is_empty());
        assert_eq!(page.total, 3);

        let page = service.list(2, 10, Some(1)).await.unwrap();
        assert!(page.questions.is_empty());
        assert_eq!(page.total, 2);

        let page = service.list(i64::MAX, i64::MAX, None).await.unwrap();
        assert!(page.questions.is_empty());
    }

    #[tokio::test]
    async fn category_filter_counts_only_matches() {
        let service = service_with(&[("q1", 1), ("q2", 2), ("q3", 1)]).await;
        let page = service.list(1, 10, Some(1)).await.unwrap();
        assert_eq!(texts(&page.questions), ["q1", "q3"]);
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn invalid_pagination_is_rejected() {
        let service = service_with(&[("q1", 1)]).await;
        for (page, size) in [(0, 10), (-1, 10), (1, 0), (1, -5)] {
            assert!(
                matches!(
                    service.list(page, size, None).await,
                    Err(TriviaError::Validation(_))
                ),
                "page={page} size={size}"
            );
        }
    }

    #[tokio::test]
    async fn search_ignores_case_and_empty_term_matches_all() {
        let service = service_with(&[
            ("Which Category is this?", 1),
            ("What is the largest lake in Africa?", 3),
            ("Who discovered penicillin?", 1),
        ])
        .await;

        assert_eq!(
            texts(&service.search("cat").await.unwrap()),
            ["Which Category is this?"]
        );
        assert_eq!(
            texts(&service.search("WHAT").await.unwrap()),
            ["What is the largest lake in Africa?"]
        );
        assert_eq!(service.search("").await.unwrap().len(), 3);
        assert!(service.search("zebra").await.unwrap().is_empty());
    }
}
