//! Seam between the quiz controller and a question bank.

use async_trait::async_trait;
use rand::Rng;

use trivia_core::model::{Question, QuestionDraft, QuestionError, SessionToken};

use crate::error::{FetchError, TokenError};

/// Contract for a remote question bank.
///
/// Implementations perform exactly one network attempt per call; retry
/// policy, if any, belongs to the caller.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Request a fresh session token.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` when the bank is unreachable or reports a
    /// failure code.
    async fn request_token(&self) -> Result<SessionToken, TokenError>;

    /// Fetch a batch of raw question records.
    ///
    /// The token, when present, lets the bank avoid handing out questions
    /// it already delivered. Records come back unnormalized.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` when the bank is unreachable or reports a
    /// failure code.
    async fn fetch_batch(
        &self,
        amount: u32,
        filters: &[(String, String)],
        token: Option<&SessionToken>,
    ) -> Result<Vec<QuestionDraft>, FetchError>;
}

/// Normalize one raw record into a playable `Question`, slotting the correct
/// answer in at a uniformly random position.
///
/// # Errors
///
/// Returns `QuestionError` when the record fails validation.
pub fn normalize<R: Rng + ?Sized>(
    draft: QuestionDraft,
    rng: &mut R,
) -> Result<Question, QuestionError> {
    let position = rng.random_range(0..=draft.incorrect_answers.len());
    draft.validate(position)
}

/// Normalize a whole batch, all or nothing: one bad record fails the batch
/// so a previously held question set is never half-replaced.
///
/// # Errors
///
/// Returns the first `QuestionError` encountered.
pub fn normalize_batch<R: Rng + ?Sized>(
    drafts: Vec<QuestionDraft>,
    rng: &mut R,
) -> Result<Vec<Question>, QuestionError> {
    drafts.into_iter().map(|draft| normalize(draft, rng)).collect()
}

/// Fetch a batch and normalize every record into playable questions.
///
/// Nothing is returned until the whole batch is valid, so the caller can
/// keep its previous question set on any failure.
///
/// # Errors
///
/// Returns `FetchError` from the network call or from an invalid record.
pub async fn fetch_and_normalize(
    source: &dyn QuestionSource,
    amount: u32,
    filters: &[(String, String)],
    token: Option<&SessionToken>,
) -> Result<Vec<Question>, FetchError> {
    let drafts = source.fetch_batch(amount, filters, token).await?;
    let questions = normalize_batch(drafts, &mut rand::rng())?;
    Ok(questions)
}
