use serde::Serialize;

use trivia_core::model::Question;
use trivia_core::session::{Page, Progress, Session};

/// Read-only snapshot of the quiz session, rebuilt for every render.
///
/// Presentation-agnostic: no markup, no layout assumptions. The renderer
/// draws whatever page this names and wires its inputs back to the
/// controller transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizView {
    pub page: Page,
    pub question: Option<Question>,
    pub feedback: Option<String>,
    pub progress: Progress,
    pub score: usize,
}

impl QuizView {
    #[must_use]
    pub fn of(session: &Session) -> Self {
        Self {
            page: session.page(),
            question: session.current_question().cloned(),
            feedback: session.feedback().map(str::to_owned),
            progress: session.progress(),
            score: session.score(),
        }
    }
}
