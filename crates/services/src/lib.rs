#![forbid(unsafe_code)]

pub mod error;
pub mod quiz;
pub mod source;
pub mod trivia_api;

pub use error::{FetchError, QuizError, TokenError};
pub use quiz::{DEFAULT_BATCH_SIZE, QuizController, QuizView, TokenPolicy};
pub use source::QuestionSource;
pub use trivia_api::{TriviaApi, TriviaApiConfig};
