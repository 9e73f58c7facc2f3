mod question;
mod token;

pub use question::{Question, QuestionDraft, QuestionError};
pub use token::SessionToken;
