//! Shared error types for the services crate.

use thiserror::Error;

use trivia_core::model::QuestionError;
use trivia_core::session::TransitionError;

/// Errors emitted while acquiring a session token.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TokenError {
    #[error("token endpoint answered with response code {0}")]
    ResponseCode(u8),
    #[error("token request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("token cache unavailable: {0}")]
    Cache(String),
}

/// Errors emitted while fetching a question batch.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    #[error("question endpoint answered with response code {0}")]
    ResponseCode(u8),
    #[error("question request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid question record: {0}")]
    InvalidRecord(#[from] QuestionError),
}

/// Errors emitted by the quiz controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("could not load questions: {0}")]
    NoQuestions(#[source] FetchError),
    #[error("quiz start superseded by a newer start")]
    Superseded,
    #[error("no questions available for this quiz")]
    Empty,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("session state unavailable: {0}")]
    State(String),
}
