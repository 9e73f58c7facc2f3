use serde::Serialize;
use thiserror::Error;

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Raw question record as delivered by a question bank: the correct answer is
/// still separate from the incorrect ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub text: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
}

impl QuestionDraft {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        correct_answer: impl Into<String>,
        incorrect_answers: Vec<String>,
    ) -> Self {
        Self {
            text: text.into(),
            correct_answer: correct_answer.into(),
            incorrect_answers,
        }
    }

    /// Validate the draft and assemble the final answer list, inserting the
    /// correct answer at `position` among the incorrect ones.
    ///
    /// `position` should come from the services layer RNG so this stays
    /// deterministic; `0 ..= incorrect_answers.len()` is the valid range.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if any text is blank, fewer than two answers
    /// would result, an answer appears twice, or `position` is out of range.
    pub fn validate(self, position: usize) -> Result<Question, QuestionError> {
        if self.text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.incorrect_answers.is_empty() {
            return Err(QuestionError::NotEnoughAnswers);
        }
        if position > self.incorrect_answers.len() {
            return Err(QuestionError::PositionOutOfRange {
                position,
                len: self.incorrect_answers.len() + 1,
            });
        }

        let mut answers = self.incorrect_answers;
        answers.insert(position, self.correct_answer.clone());

        for (i, answer) in answers.iter().enumerate() {
            if answer.trim().is_empty() {
                return Err(QuestionError::EmptyAnswer);
            }
            if answers[..i].contains(answer) {
                return Err(QuestionError::DuplicateAnswer(answer.clone()));
            }
        }

        Ok(Question {
            text: self.text,
            answers,
            correct_answer: self.correct_answer,
        })
    }
}

/// A playable question: prompt text plus an ordered answer list that contains
/// the correct answer exactly once.
///
/// Immutable once constructed; the answer order is fixed for the lifetime of
/// the quiz session that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    text: String,
    answers: Vec<String>,
    correct_answer: String,
}

impl Question {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// Whether `candidate` matches the correct answer exactly.
    #[must_use]
    pub fn is_correct(&self, candidate: &str) -> bool {
        self.correct_answer == candidate
    }
}

//
// ─── QUESTION VALIDATION ERRORS ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text is blank")]
    EmptyText,

    #[error("answer text is blank")]
    EmptyAnswer,

    #[error("a question needs at least one incorrect answer")]
    NotEnoughAnswers,

    #[error("duplicate answer: {0}")]
    DuplicateAnswer(String),

    #[error("insert position {position} out of range for {len} answers")]
    PositionOutOfRange { position: usize, len: usize },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
