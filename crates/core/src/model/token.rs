use std::fmt;

/// Opaque credential issued by the question bank.
///
/// The bank uses it to avoid handing out duplicate questions within one
/// process lifetime. Once acquired it is never reset; quizzes can always be
/// played without one.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw credential for use as a request parameter.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

// Keep the credential out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(..)")
    }
}
