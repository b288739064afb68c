use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriviaError {
    /// Malformed input: empty text, difficulty out of range, bad pagination.
    #[error("{0}")]
    Validation(String),
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

impl TriviaError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn question_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "question",
            id,
        }
    }

    pub fn category_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "category",
            id,
        }
    }
}

pub type TriviaResult<T> = Result<T, TriviaError>;
