use std::cell::Cell;
use std::time::Duration;

use futures::future::LocalBoxFuture;
use log::{error, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const MAX_RETRIES: u32 = 3;
pub const DEFAULT_COLLECTION: &str = "newsletter_subscribers";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn validate_email(value: &str) -> bool {
    let value = normalize_email(value);
    !value.is_empty() && EMAIL_RE.is_match(&value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    Empty,
    Format,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid { exists: bool },
    Invalid(InvalidReason),
    /// The remote side never answered; treat as "let it through".
    Unknown { after_retries: u32 },
}

impl ValidationResult {
    pub fn allows_submission(&self) -> bool {
        matches!(self, ValidationResult::Valid { exists: false } | ValidationResult::Unknown { .. })
    }

    /// Inline message for the form, if this result should show one. `Unknown`
    /// gets a notice even though it lets the submission through.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ValidationResult::Invalid(InvalidReason::Empty) => Some("Please enter your email address"),
            ValidationResult::Invalid(InvalidReason::Format) => Some("Please enter a valid email address"),
            ValidationResult::Valid { exists: true } => Some("You're already subscribed. Thanks for sticking around!"),
            ValidationResult::Unknown { .. } => {
                Some("We couldn't confirm your subscription status, continuing anyway.")
            }
            ValidationResult::Valid { exists: false } => None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("could not read response: {0}")]
    Decode(String),
}

/// Document store query: how many documents in `collection` have `email == email`.
pub trait ExistenceLookup {
    fn count_matches<'a>(&'a self, collection: &'a str, email: &'a str) -> LocalBoxFuture<'a, Result<usize, RemoteError>>;
}

/// Non-blocking wait between attempts.
pub trait Backoff {
    fn wait(&self, delay: Duration) -> LocalBoxFuture<'static, ()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorState {
    Idle,
    Validating,
    Exists,
    NotExists,
    Failed,
}

pub struct RemoteValidator<L, B> {
    lookup: L,
    backoff: B,
    max_retries: u32,
    base_delay: Duration,
    state: Cell<ValidatorState>,
}

impl<L: ExistenceLookup, B: Backoff> RemoteValidator<L, B> {
    pub fn new(lookup: L, backoff: B) -> Self {
        Self {
            lookup,
            backoff,
            max_retries: MAX_RETRIES,
            base_delay: Duration::from_secs(1),
            state: Cell::new(ValidatorState::Idle),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> ValidatorState {
        self.state.get()
    }

    /// `base_delay * 2^attempt`, attempts counted from 1.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }

    /// Format check locally, then ask the remote store with bounded retries.
    /// Never errors: an unreachable store comes back as `Unknown`.
    pub async fn check_remote_exists(&self, value: &str, collection: &str) -> ValidationResult {
        let email = normalize_email(value);
        if email.is_empty() {
            return ValidationResult::Invalid(InvalidReason::Empty);
        }
        if !validate_email(&email) {
            return ValidationResult::Invalid(InvalidReason::Format);
        }

        self.state.set(ValidatorState::Validating);
        for attempt in 1..=self.max_retries {
            match self.lookup.count_matches(collection, &email).await {
                Ok(matches) => {
                    let exists = matches > 0;
                    self.state.set(if exists { ValidatorState::Exists } else { ValidatorState::NotExists });
                    return ValidationResult::Valid { exists };
                }
                Err(e) => {
                    warn!("Existence lookup attempt {}/{} failed: {}", attempt, self.max_retries, e);
                    if attempt < self.max_retries {
                        self.backoff.wait(self.delay_after(attempt)).await;
                    }
                }
            }
        }

        error!("Max retries reached for existence lookup in {}", collection);
        self.state.set(ValidatorState::Failed);
        ValidationResult::Unknown { after_retries: self.max_retries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::future::{self, abortable, Aborted};
    use futures::task::noop_waker;
    use futures::FutureExt;
    use std::cell::RefCell;
    use std::future::Future;
    use std::rc::Rc;
    use std::task::{Context, Poll};

    struct ScriptedLookup {
        answers: RefCell<Vec<Result<usize, RemoteError>>>,
        calls: Rc<Cell<u32>>,
    }

    impl ScriptedLookup {
        fn new(answers: Vec<Result<usize, RemoteError>>) -> (Self, Rc<Cell<u32>>) {
            let calls = Rc::new(Cell::new(0));
            (Self { answers: RefCell::new(answers), calls: calls.clone() }, calls)
        }
    }

    impl ExistenceLookup for ScriptedLookup {
        fn count_matches<'a>(&'a self, _collection: &'a str, _email: &'a str) -> LocalBoxFuture<'a, Result<usize, RemoteError>> {
            self.calls.set(self.calls.get() + 1);
            let mut answers = self.answers.borrow_mut();
            let answer = if answers.is_empty() {
                Err(RemoteError::Transport("offline".to_string()))
            } else {
                answers.remove(0)
            };
            async move { answer }.boxed_local()
        }
    }

    #[derive(Clone, Default)]
    struct RecordingBackoff(Rc<RefCell<Vec<Duration>>>);

    impl Backoff for RecordingBackoff {
        fn wait(&self, delay: Duration) -> LocalBoxFuture<'static, ()> {
            self.0.borrow_mut().push(delay);
            async {}.boxed_local()
        }
    }

    /// Never finishes waiting; the caller has to give up on the check.
    struct StalledBackoff;

    impl Backoff for StalledBackoff {
        fn wait(&self, _delay: Duration) -> LocalBoxFuture<'static, ()> {
            future::pending().boxed_local()
        }
    }

    #[test]
    fn email_format() {
        assert!(validate_email("a@b.com"));
        assert!(validate_email("  Someone@Example.ORG "));
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("a@b"));
        assert!(!validate_email("a b@c.com"));
        assert!(!validate_email(""));
    }

    #[test]
    fn bad_format_never_hits_the_network() {
        let (lookup, calls) = ScriptedLookup::new(vec![Ok(1)]);
        let validator = RemoteValidator::new(lookup, RecordingBackoff::default());
        let result = block_on(validator.check_remote_exists("not-an-email", DEFAULT_COLLECTION));
        assert_eq!(result, ValidationResult::Invalid(InvalidReason::Format));
        assert_eq!(calls.get(), 0);
        assert_eq!(validator.state(), ValidatorState::Idle);
    }

    #[test]
    fn empty_value_is_its_own_reason() {
        let (lookup, calls) = ScriptedLookup::new(vec![]);
        let validator = RemoteValidator::new(lookup, RecordingBackoff::default());
        let result = block_on(validator.check_remote_exists("   ", DEFAULT_COLLECTION));
        assert_eq!(result, ValidationResult::Invalid(InvalidReason::Empty));
        assert_eq!(result.message(), Some("Please enter your email address"));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn exhausted_retries_are_unknown_and_allowed() {
        let (lookup, calls) = ScriptedLookup::new(vec![]);
        let backoff = RecordingBackoff::default();
        let validator = RemoteValidator::new(lookup, backoff.clone());
        let result = block_on(validator.check_remote_exists("a@b.com", DEFAULT_COLLECTION));

        assert_eq!(result, ValidationResult::Unknown { after_retries: 3 });
        assert!(result.allows_submission());
        assert_eq!(result.message(), Some("We couldn't confirm your subscription status, continuing anyway."));
        assert_eq!(calls.get(), 3);
        assert_eq!(*backoff.0.borrow(), vec![Duration::from_secs(2), Duration::from_secs(4)]);
        assert_eq!(validator.state(), ValidatorState::Failed);
    }

    #[test]
    fn transient_failure_then_answer() {
        let (lookup, calls) = ScriptedLookup::new(vec![Err(RemoteError::Status(503)), Ok(1)]);
        let backoff = RecordingBackoff::default();
        let validator = RemoteValidator::new(lookup, backoff.clone());
        let result = block_on(validator.check_remote_exists("A@B.com", DEFAULT_COLLECTION));

        assert_eq!(result, ValidationResult::Valid { exists: true });
        assert!(!result.allows_submission());
        assert_eq!(calls.get(), 2);
        assert_eq!(backoff.0.borrow().len(), 1);
        assert_eq!(validator.state(), ValidatorState::Exists);
    }

    #[test]
    fn new_address_passes() {
        let (lookup, _) = ScriptedLookup::new(vec![Ok(0)]);
        let validator = RemoteValidator::new(lookup, RecordingBackoff::default());
        let result = block_on(validator.check_remote_exists("new@brand.io", DEFAULT_COLLECTION));
        assert_eq!(result, ValidationResult::Valid { exists: false });
        assert!(result.allows_submission());
        assert_eq!(result.message(), None);
        assert_eq!(validator.state(), ValidatorState::NotExists);
    }

    #[test]
    fn aborted_check_makes_no_further_lookups() {
        let (lookup, calls) = ScriptedLookup::new(vec![]);
        let validator = RemoteValidator::new(lookup, StalledBackoff);
        let (check, handle) = abortable(validator.check_remote_exists("a@b.com", DEFAULT_COLLECTION));
        let mut check = Box::pin(check);
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);

        // first lookup fails, then the check parks in its backoff
        assert!(check.as_mut().poll(&mut cx).is_pending());
        assert_eq!(calls.get(), 1);

        handle.abort();
        assert!(matches!(check.as_mut().poll(&mut cx), Poll::Ready(Err(Aborted))));
        drop(check);
        assert_eq!(calls.get(), 1);
        assert_eq!(validator.state(), ValidatorState::Validating);
    }
}
