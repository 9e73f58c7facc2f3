use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use services::{
    DEFAULT_BATCH_SIZE, FetchError, QuestionSource, QuizController, QuizError, TokenError,
    TokenPolicy,
};
use trivia_core::model::{QuestionDraft, SessionToken};
use trivia_core::session::{CORRECT_FEEDBACK, Page, Progress};

fn batch(amount: u32) -> Vec<QuestionDraft> {
    (0..amount)
        .map(|i| {
            QuestionDraft::new(
                format!("Q{i}"),
                format!("A{i}"),
                vec![format!("B{i}"), format!("C{i}")],
            )
        })
        .collect()
}

/// Scripted question bank: answers immediately, records what it was asked.
#[derive(Default)]
struct FixedSource {
    fail_token: bool,
    fail_fetch: AtomicBool,
    token_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    seen_tokens: Mutex<Vec<Option<String>>>,
}

impl FixedSource {
    fn new() -> Self {
        Self::default()
    }

    fn failing_token() -> Self {
        Self {
            fail_token: true,
            ..Self::default()
        }
    }

    fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl QuestionSource for FixedSource {
    async fn request_token(&self) -> Result<SessionToken, TokenError> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_token {
            return Err(TokenError::ResponseCode(3));
        }
        Ok(SessionToken::new("tok"))
    }

    async fn fetch_batch(
        &self,
        amount: u32,
        _filters: &[(String, String)],
        token: Option<&SessionToken>,
    ) -> Result<Vec<QuestionDraft>, FetchError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_tokens
            .lock()
            .unwrap()
            .push(token.map(|token| token.value().to_string()));
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(FetchError::ResponseCode(2));
        }
        Ok(batch(amount))
    }
}

/// Question bank whose first fetch blocks until the test releases it, so a
/// second start can overtake it deterministically.
struct GatedSource {
    calls: AtomicUsize,
    first_entered: Semaphore,
    release_first: Semaphore,
}

impl GatedSource {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            first_entered: Semaphore::new(0),
            release_first: Semaphore::new(0),
        }
    }
}

#[async_trait]
impl QuestionSource for GatedSource {
    async fn request_token(&self) -> Result<SessionToken, TokenError> {
        Ok(SessionToken::new("tok"))
    }

    async fn fetch_batch(
        &self,
        amount: u32,
        _filters: &[(String, String)],
        _token: Option<&SessionToken>,
    ) -> Result<Vec<QuestionDraft>, FetchError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.first_entered.add_permits(1);
            let permit = self.release_first.acquire().await.expect("gate closed");
            permit.forget();
        }
        Ok(batch(amount))
    }
}

#[tokio::test]
async fn full_quiz_flow_scores_and_finishes() {
    let controller = QuizController::new(Arc::new(FixedSource::new()));

    let view = controller.start(2).await.unwrap();
    assert_eq!(view.page, Page::Question);
    assert_eq!(view.progress, Progress { current: 1, total: 2 });
    assert_eq!(view.score, 0);

    let first = view.question.expect("question on display");
    let view = controller
        .submit_answer(first.correct_answer())
        .unwrap();
    assert_eq!(view.page, Page::Answer);
    assert_eq!(view.score, 1);
    assert_eq!(view.feedback.as_deref(), Some(CORRECT_FEEDBACK));

    let view = controller.advance().unwrap();
    assert_eq!(view.page, Page::Question);
    assert_eq!(view.progress, Progress { current: 2, total: 2 });

    let view = controller.submit_answer("definitely wrong").unwrap();
    assert_eq!(view.score, 1);
    assert_eq!(
        view.feedback.as_deref(),
        Some("Too bad! The correct answer was: A1")
    );

    let view = controller.advance().unwrap();
    assert_eq!(view.page, Page::Outro);
    assert_eq!(view.score, 1);
    assert_eq!(view.progress, Progress { current: 2, total: 2 });
}

#[tokio::test]
async fn transitions_are_rejected_off_their_pages() {
    let controller = QuizController::new(Arc::new(FixedSource::new()));

    assert!(matches!(
        controller.submit_answer("A0").unwrap_err(),
        QuizError::Transition(_)
    ));
    assert!(matches!(
        controller.advance().unwrap_err(),
        QuizError::Transition(_)
    ));

    controller.start(1).await.unwrap();
    assert!(matches!(
        controller.advance().unwrap_err(),
        QuizError::Transition(_)
    ));

    controller.submit_answer("A0").unwrap();
    assert!(matches!(
        controller.submit_answer("A0").unwrap_err(),
        QuizError::Transition(_)
    ));
}

#[tokio::test]
async fn failed_start_leaves_the_session_on_intro() {
    let source = Arc::new(FixedSource::new());
    let controller = QuizController::new(source.clone());

    // Play a session to the outro first, so the failure path has a previous
    // state to wipe.
    let view = controller.start(1).await.unwrap();
    let question = view.question.unwrap();
    controller.submit_answer(question.correct_answer()).unwrap();
    let view = controller.advance().unwrap();
    assert_eq!(view.page, Page::Outro);

    source.set_fail_fetch(true);
    let err = controller.start(5).await.unwrap_err();
    assert!(matches!(err, QuizError::NoQuestions(_)));

    let view = controller.view().unwrap();
    assert_eq!(view.page, Page::Intro);
    assert_eq!(view.question, None);
    assert_eq!(view.progress, Progress { current: 0, total: 0 });
}

#[tokio::test]
async fn zero_question_request_is_rejected_without_a_fetch() {
    let source = Arc::new(FixedSource::new());
    let controller = QuizController::new(source.clone());

    let err = controller.start(0).await.unwrap_err();
    assert!(matches!(err, QuizError::Empty));
    assert_eq!(source.fetch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn best_effort_start_survives_a_failing_token_endpoint() {
    let source = Arc::new(FixedSource::failing_token());
    let controller = QuizController::new(source.clone());

    let view = controller.start(3).await.unwrap();
    assert_eq!(view.page, Page::Question);
    assert!(!controller.has_token());

    let seen = source.seen_tokens.lock().unwrap();
    assert_eq!(seen.as_slice(), [None]);
}

#[tokio::test]
async fn required_policy_blocks_start_without_a_token() {
    let source = Arc::new(FixedSource::failing_token());
    let controller =
        QuizController::new(source.clone()).with_token_policy(TokenPolicy::Required);

    let err = controller.start(3).await.unwrap_err();
    assert!(matches!(err, QuizError::Token(_)));
    assert_eq!(source.fetch_calls.load(Ordering::SeqCst), 0);
    assert_eq!(controller.view().unwrap().page, Page::Intro);
}

#[tokio::test]
async fn required_policy_sends_the_token_with_the_fetch() {
    let source = Arc::new(FixedSource::new());
    let controller =
        QuizController::new(source.clone()).with_token_policy(TokenPolicy::Required);

    controller.start(2).await.unwrap();

    let seen = source.seen_tokens.lock().unwrap();
    assert_eq!(seen.as_slice(), [Some("tok".to_string())]);
}

#[tokio::test]
async fn acquire_token_reuses_the_cached_token() {
    let source = Arc::new(FixedSource::new());
    let controller = QuizController::new(source.clone());

    let first = controller.acquire_token().await.unwrap();
    let second = controller.acquire_token().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(source.token_calls.load(Ordering::SeqCst), 1);
    assert!(controller.has_token());

    // Starts reuse the cache instead of asking again.
    controller.start(2).await.unwrap();
    assert_eq!(source.token_calls.load(Ordering::SeqCst), 1);

    let seen = source.seen_tokens.lock().unwrap();
    assert_eq!(seen.as_slice(), [Some("tok".to_string())]);
}

#[tokio::test]
async fn a_newer_start_supersedes_an_in_flight_one() {
    let source = Arc::new(GatedSource::new());
    let controller = Arc::new(QuizController::new(
        source.clone() as Arc<dyn QuestionSource>
    ));

    let stale = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.start(3).await })
    };

    // Wait until the first fetch is in flight, then overtake it.
    let permit = source
        .first_entered
        .acquire()
        .await
        .expect("first fetch never started");
    permit.forget();

    let view = controller.start(2).await.unwrap();
    assert_eq!(view.progress, Progress { current: 1, total: 2 });

    source.release_first.add_permits(1);
    let stale_result = stale.await.expect("stale start panicked");
    assert!(matches!(stale_result, Err(QuizError::Superseded)));

    // The stale batch of 3 never became visible.
    let view = controller.view().unwrap();
    assert_eq!(view.progress, Progress { current: 1, total: 2 });
}

#[tokio::test]
async fn restart_replaces_the_batch_wholesale() {
    let controller = QuizController::new(Arc::new(FixedSource::new()));

    let view = controller.start(3).await.unwrap();
    let question = view.question.unwrap();
    let view = controller.submit_answer(question.correct_answer()).unwrap();
    assert_eq!(view.score, 1);

    let view = controller.start(DEFAULT_BATCH_SIZE).await.unwrap();
    assert_eq!(view.page, Page::Question);
    assert_eq!(view.progress, Progress { current: 1, total: 10 });
    assert_eq!(view.score, 0);
    assert_eq!(view.feedback, None);
}
