use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use trivia_core::model::SessionToken;
use trivia_core::session::Session;

use crate::error::{QuizError, TokenError};
use crate::source::{QuestionSource, fetch_and_normalize};

use super::view::QuizView;

/// Number of questions requested when the renderer does not pick one.
pub const DEFAULT_BATCH_SIZE: u32 = 10;

/// How `start` treats session-token acquisition.
///
/// Both observed frontends exist: one starts regardless of token state, one
/// disables its start control until a token arrives. The policy makes that
/// choice explicit instead of burying it in the start path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenPolicy {
    /// Start the quiz even when no token could be acquired.
    #[default]
    BestEffort,
    /// Refuse to start until a token is available.
    Required,
}

struct QuizState {
    session: Session,
    generation: u64,
}

/// Orchestrates quiz starts and play against an injected question source.
///
/// Lifetimes are split deliberately: the token cache lives as long as the
/// controller (one per process, never reset), while the session is replaced
/// wholesale on every start. Neither lock is held across an await, so
/// transitions stay atomic with respect to the renderer.
pub struct QuizController {
    source: Arc<dyn QuestionSource>,
    token_policy: TokenPolicy,
    token: Mutex<Option<SessionToken>>,
    state: Mutex<QuizState>,
}

impl QuizController {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>) -> Self {
        Self {
            source,
            token_policy: TokenPolicy::default(),
            token: Mutex::new(None),
            state: Mutex::new(QuizState {
                session: Session::new(),
                generation: 0,
            }),
        }
    }

    #[must_use]
    pub fn with_token_policy(mut self, policy: TokenPolicy) -> Self {
        self.token_policy = policy;
        self
    }

    /// The cached session token, if one was acquired.
    #[must_use]
    pub fn token(&self) -> Option<SessionToken> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }

    /// Whether a session token is available. Renderers that gate their start
    /// control on the token check this after `acquire_token` resolves.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    /// Acquire the process-wide session token, reusing a cached one without
    /// touching the network. A single attempt, never retried here; a failed
    /// attempt leaves the cache empty so a later call can try again.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` when the token endpoint fails.
    pub async fn acquire_token(&self) -> Result<SessionToken, TokenError> {
        {
            let guard = self.lock_token()?;
            if let Some(token) = guard.as_ref() {
                debug!("reusing cached session token");
                return Ok(token.clone());
            }
        }

        let token = self.source.request_token().await?;
        *self.lock_token()? = Some(token.clone());
        Ok(token)
    }

    /// Start a new quiz with `amount` questions.
    ///
    /// The session drops back to the intro shape immediately; the question
    /// page only appears once the batch has arrived and normalized, so the
    /// renderer never sees a half-reset session. A start issued while an
    /// earlier one is still in flight supersedes it: the stale batch is
    /// discarded and the stale caller gets `QuizError::Superseded`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Empty` for a zero request or an empty batch,
    /// `QuizError::Token` under `TokenPolicy::Required` when no token can be
    /// acquired, `QuizError::NoQuestions` when the fetch or normalization
    /// fails (the session stays on intro), or `QuizError::Superseded` when a
    /// newer start wins.
    pub async fn start(&self, amount: u32) -> Result<QuizView, QuizError> {
        if amount == 0 {
            return Err(QuizError::Empty);
        }

        let generation = {
            let mut state = self.lock_state()?;
            state.generation += 1;
            state.session = Session::new();
            state.generation
        };

        let token = match self.token_policy {
            TokenPolicy::Required => Some(self.acquire_token().await?),
            TokenPolicy::BestEffort => match self.acquire_token().await {
                Ok(token) => Some(token),
                Err(err) => {
                    warn!(error = %err, "starting without a session token");
                    None
                }
            },
        };

        let filters = [("type".to_string(), "multiple".to_string())];
        let fetched =
            fetch_and_normalize(self.source.as_ref(), amount, &filters, token.as_ref()).await;

        let mut state = self.lock_state()?;
        if state.generation != generation {
            debug!(generation, "discarding superseded start");
            return Err(QuizError::Superseded);
        }

        let questions = fetched.map_err(QuizError::NoQuestions)?;
        if questions.is_empty() {
            return Err(QuizError::Empty);
        }

        state.session = Session::begin(questions)?;
        Ok(QuizView::of(&state.session))
    }

    /// Record the selected answer for the current question and move to the
    /// feedback page.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Transition` when no question is on display. A
    /// correctly wired renderer never triggers this.
    pub fn submit_answer(&self, selected: &str) -> Result<QuizView, QuizError> {
        let mut state = self.lock_state()?;
        if let Err(err) = state.session.submit_answer(selected) {
            warn!(error = %err, "rejected answer submission");
            return Err(err.into());
        }
        Ok(QuizView::of(&state.session))
    }

    /// Leave the feedback page for the next question, or for the outro after
    /// the last one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Transition` when no feedback is on display.
    pub fn advance(&self) -> Result<QuizView, QuizError> {
        let mut state = self.lock_state()?;
        if let Err(err) = state.session.advance() {
            warn!(error = %err, "rejected advance");
            return Err(err.into());
        }
        Ok(QuizView::of(&state.session))
    }

    /// Snapshot of the current session for rendering.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::State` only when the state lock is poisoned.
    pub fn view(&self) -> Result<QuizView, QuizError> {
        let state = self.lock_state()?;
        Ok(QuizView::of(&state.session))
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, QuizState>, QuizError> {
        self.state
            .lock()
            .map_err(|err| QuizError::State(err.to_string()))
    }

    fn lock_token(&self) -> Result<MutexGuard<'_, Option<SessionToken>>, TokenError> {
        self.token
            .lock()
            .map_err(|err| TokenError::Cache(err.to_string()))
    }
}
