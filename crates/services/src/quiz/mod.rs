mod controller;
mod view;

// Public API of the quiz subsystem.
pub use crate::error::QuizError;
pub use controller::{DEFAULT_BATCH_SIZE, QuizController, TokenPolicy};
pub use view::QuizView;
