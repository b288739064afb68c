//! Quiz play: serve questions one at a time, at random, never repeating within a session.

use std::collections::HashSet;

use rand::Rng;

use crate::error::TriviaResult;
use crate::query::QueryService;
use crate::store::{Question, QuestionStore};
use crate::telemetry::{ALL_CATEGORIES_LABEL, QUESTIONS_SERVED, QUIZ_SESSIONS_EXHAUSTED};

/// Outcome of asking a session for its next question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draw {
    Question(Question),
    /// No unseen question is left in the pool. The session is over.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    category: Option<i64>,
    seen: HashSet<i64>,
    state: SessionState,
}

impl QuizSession {
    /// Opens a session over `category` (or every category). It starts exhausted when
    /// the pool is empty.
    pub async fn start<S: QuestionStore>(
        query: &QueryService<S>,
        category: Option<i64>,
    ) -> TriviaResult<Self> {
        let state = if query.pool(category).await?.is_empty() {
            SessionState::Exhausted
        } else {
            SessionState::Active
        };
        Ok(Self {
            category,
            seen: HashSet::new(),
            state,
        })
    }

    /// Rebuilds a session a client has been carrying, from the ids it was already shown.
    pub fn resume(category: Option<i64>, previous: impl IntoIterator<Item = i64>) -> Self {
        Self {
            category,
            seen: previous.into_iter().collect(),
            state: SessionState::Active,
        }
    }

    pub fn category(&self) -> Option<i64> {
        self.category
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn seen(&self) -> &HashSet<i64> {
        &self.seen
    }

    /// Picks uniformly among the questions of the pool that this session has not seen.
    ///
    /// The pool is read from the store on every call, so questions deleted mid-session
    /// are never served.
    pub async fn next<S, R>(&mut self, query: &QueryService<S>, rng: &mut R) -> TriviaResult<Draw>
    where
        S: QuestionStore,
        R: Rng,
    {
        if self.state == SessionState::Exhausted {
            return Ok(Draw::Exhausted);
        }

        let mut unseen: Vec<Question> = query
            .pool(self.category)
            .await?
            .into_iter()
            .filter(|q| !self.seen.contains(&q.id))
            .collect();

        if unseen.is_empty() {
            tracing::info!(
                category = ?self.category,
                seen = self.seen.len(),
                "Quiz pool exhausted"
            );
            self.state = SessionState::Exhausted;
            QUIZ_SESSIONS_EXHAUSTED.inc();
            return Ok(Draw::Exhausted);
        }

        let question = unseen.swap_remove(rng.gen_range(0..unseen.len()));
        self.seen.insert(question.id);

        let label = self
            .category
            .map(|c| c.to_string())
            .unwrap_or_else(|| ALL_CATEGORIES_LABEL.to_owned());
        QUESTIONS_SERVED.with_label_values(&[label.as_str()]).inc();
        tracing::debug!(id = question.id, remaining = unseen.len(), "Serving quiz question");

        Ok(Draw::Question(question))
    }
}
