use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::model::Question;

/// Feedback shown when the selected answer was right.
pub const CORRECT_FEEDBACK: &str = "You got it!";

//
// ─── PAGES ─────────────────────────────────────────────────────────────────────
//

/// The state-machine states a quiz session moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Page {
    /// Initial state; no batch loaded yet.
    Intro,
    /// A question is on display, waiting for an answer.
    Question,
    /// Feedback for the last answer is on display.
    Answer,
    /// Terminal state; only a new start leaves it.
    Outro,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Page::Intro => "intro",
            Page::Question => "question",
            Page::Answer => "answer",
            Page::Outro => "outro",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionError {
    #[error("no questions to start a session with")]
    Empty,

    #[error("transition not allowed from the {from} page")]
    InvalidTransition { from: Page },
}

/// Display progress through the batch; `current` is 1-based, or 0 when no
/// question is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Mutable state of one quiz: the fixed question batch, the player's answers
/// so far, and the current page.
///
/// Replaced wholesale at every start. Queries never mutate; transitions
/// enforce their own preconditions and keep the answer list in lockstep with
/// the question index (one recorded answer per question left behind).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    questions: Vec<Question>,
    page: Page,
    current_index: Option<usize>,
    user_answers: Vec<String>,
    feedback: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh session on the intro page with no questions loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            questions: Vec::new(),
            page: Page::Intro,
            current_index: None,
            user_answers: Vec::new(),
            feedback: None,
        }
    }

    /// Start playing `questions`, landing on the first question.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::Empty` if the batch is empty.
    pub fn begin(questions: Vec<Question>) -> Result<Self, TransitionError> {
        if questions.is_empty() {
            return Err(TransitionError::Empty);
        }
        Ok(Self {
            questions,
            page: Page::Question,
            current_index: Some(0),
            user_answers: Vec::new(),
            feedback: None,
        })
    }

    #[must_use]
    pub fn page(&self) -> Page {
        self.page
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    #[must_use]
    pub fn user_answers(&self) -> &[String] {
        &self.user_answers
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current_index.and_then(|index| self.questions.get(index))
    }

    /// 1-based progress through the batch.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            current: self.current_index.map_or(0, |index| index + 1),
            total: self.questions.len(),
        }
    }

    /// Count of answers that matched their question, recomputed on every
    /// call so it can never go stale.
    #[must_use]
    pub fn score(&self) -> usize {
        self.user_answers
            .iter()
            .enumerate()
            .filter(|(index, answer)| {
                self.question(*index)
                    .is_some_and(|question| question.is_correct(answer))
            })
            .count()
    }

    /// Record `selected` for the current question and move to the feedback
    /// page.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::InvalidTransition` unless a question is on
    /// display.
    pub fn submit_answer(&mut self, selected: &str) -> Result<(), TransitionError> {
        if self.page != Page::Question {
            return Err(TransitionError::InvalidTransition { from: self.page });
        }
        let (correct, answer) = {
            let question = self
                .current_question()
                .ok_or(TransitionError::InvalidTransition { from: self.page })?;
            (question.is_correct(selected), question.correct_answer().to_owned())
        };

        self.feedback = Some(if correct {
            CORRECT_FEEDBACK.to_string()
        } else {
            format!("Too bad! The correct answer was: {answer}")
        });
        self.user_answers.push(selected.to_string());
        self.page = Page::Answer;
        Ok(())
    }

    /// Leave the feedback page: on to the next question, or to the outro
    /// after the last one. The index stays on the last question at the
    /// outro.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::InvalidTransition` unless feedback is on
    /// display.
    pub fn advance(&mut self) -> Result<(), TransitionError> {
        if self.page != Page::Answer {
            return Err(TransitionError::InvalidTransition { from: self.page });
        }
        let index = self
            .current_index
            .ok_or(TransitionError::InvalidTransition { from: self.page })?;

        self.feedback = None;
        if index + 1 >= self.questions.len() {
            self.page = Page::Outro;
        } else {
            self.current_index = Some(index + 1);
            self.page = Page::Question;
        }
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
