//! Submission lifecycle: `idle -> pending -> {succeeded | failed} -> idle`.
//!
//! One controller per screen. A second submit while a request is in flight is
//! ignored, an unchanged record never reaches the backend, and every failure
//! leaves the screen ready for another attempt. There is no retry and no way to
//! abort a request once sent.
use super::{
    backend::Backend,
    cache::UserCache,
    dirty::{changed_paths, is_dirty},
    error::BackendError,
    messages::MessageBus,
    navigate::{DEFAULT_REDIRECT_DELAY, DelayedNavigation, Navigator},
    path::Path,
    record::Record,
    validate::FieldError,
};
use serde_json::Value;
use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tracing::{debug, info, warn};

pub const NO_CHANGES: &str = "No changes made";
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Changes saved successfully";

/// Where the last submission stands. A finished state holds until the next
/// edit, revert or submit.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending,
    Succeeded(Record),
    Failed(String),
}

impl SubmissionState {
    pub fn name(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Pending => "pending",
            SubmissionState::Succeeded(_) => "succeeded",
            SubmissionState::Failed(_) => "failed",
        }
    }
}

/// What a single submit call ended with.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// The server accepted the update and returned this record.
    Succeeded(Record),
    /// No-op, rejection or transport failure; the message was shown.
    Failed(String),
    /// Local validation failed; nothing was sent.
    Invalid(Vec<FieldError>),
    /// Another submission is still pending; this call did nothing.
    Busy,
}

pub struct SubmissionController {
    backend: Arc<dyn Backend>,
    cache: UserCache,
    messages: MessageBus,
    state: Mutex<SubmissionState>,
    submit_paths: Vec<Path>,
    success_message: String,
    redirect: Option<(String, Arc<dyn Navigator>)>,
    redirect_delay: Duration,
    navigation: Mutex<Option<DelayedNavigation>>,
}

impl SubmissionController {
    pub fn new(backend: Arc<dyn Backend>, cache: UserCache, messages: MessageBus) -> Self {
        Self {
            backend,
            cache,
            messages,
            state: Mutex::new(SubmissionState::Idle),
            submit_paths: Vec::new(),
            success_message: DEFAULT_SUCCESS_MESSAGE.into(),
            redirect: None,
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            navigation: Mutex::new(None),
        }
    }

    /// After a success, navigate to `destination` once `delay` has passed.
    pub fn redirect_to(
        mut self,
        destination: impl Into<String>,
        navigator: Arc<dyn Navigator>,
        delay: Duration,
    ) -> Self {
        self.redirect = Some((destination.into(), navigator));
        self.redirect_delay = delay;
        self
    }

    /// Send only these subtrees instead of the whole record.
    pub fn with_submit_paths(mut self, paths: Vec<Path>) -> Self {
        self.submit_paths = paths;
        self
    }

    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = message.into();
        self
    }

    pub fn state(&self) -> SubmissionState {
        lock(&self.state).clone()
    }

    pub fn is_pending(&self) -> bool {
        *lock(&self.state) == SubmissionState::Pending
    }

    pub fn messages(&self) -> &MessageBus {
        &self.messages
    }

    pub fn navigation_pending(&self) -> bool {
        lock(&self.navigation)
            .as_ref()
            .is_some_and(DelayedNavigation::is_pending)
    }

    /// Return to `idle` from a finished submission. Ignored while pending.
    pub fn reset(&self) {
        let mut state = lock(&self.state);
        if *state != SubmissionState::Pending {
            *state = SubmissionState::Idle;
        }
    }

    /// Cancel the pending navigation and any visible message.
    pub fn teardown(&self) {
        if let Some(mut navigation) = lock(&self.navigation).take() {
            navigation.cancel();
        }
        self.messages.clear();
    }

    /// Send `record` as an update of `subject_id` if it differs from `snapshot`.
    pub async fn submit(&self, subject_id: &str, record: &Record, snapshot: &Record) -> SubmitOutcome {
        if self.is_pending() {
            debug!(%subject_id, "submission already pending, ignoring");
            return SubmitOutcome::Busy;
        }
        if !is_dirty(record, snapshot) {
            info!(%subject_id, "nothing changed, not submitting");
            return self.fail_locally(NO_CHANGES);
        }
        debug!(
            %subject_id,
            changed = ?changed_paths(record, snapshot).iter().map(ToString::to_string).collect::<Vec<_>>(),
            "submitting update"
        );

        let body = self.payload(record);
        self.run(self.backend.update_user(subject_id, &body)).await
    }

    /// Mark the attempt failed without contacting the backend.
    pub(crate) fn fail_locally(&self, message: &str) -> SubmitOutcome {
        let mut state = lock(&self.state);
        if *state == SubmissionState::Pending {
            return SubmitOutcome::Busy;
        }
        *state = SubmissionState::Failed(message.to_owned());
        drop(state);

        self.messages.show_error(message);
        SubmitOutcome::Failed(message.to_owned())
    }

    pub(crate) fn reject_invalid(&self, errors: Vec<FieldError>) -> SubmitOutcome {
        let mut state = lock(&self.state);
        if *state == SubmissionState::Pending {
            return SubmitOutcome::Busy;
        }
        if let Some(first) = errors.first() {
            *state = SubmissionState::Failed(first.message.clone());
        }
        SubmitOutcome::Invalid(errors)
    }

    /// Drive one request through `pending` and apply its outcome: the returned
    /// user replaces the cache, a failure message goes to the screen and the
    /// global error slot.
    pub(crate) async fn run<F>(&self, request: F) -> SubmitOutcome
    where
        F: Future<Output = Result<Value, BackendError>>,
    {
        {
            let mut state = lock(&self.state);
            if *state == SubmissionState::Pending {
                debug!("submission already pending, ignoring");
                return SubmitOutcome::Busy;
            }
            *state = SubmissionState::Pending;
        }

        // a success body that is not a user object is a parse failure
        let response = request.await.and_then(|user| {
            Record::from_object(user).map_err(|found| {
                BackendError::Transport(format!(
                    "Malformed response: expected a user object, got {}",
                    json_kind(&found)
                ))
            })
        });

        match response {
            Ok(user) => {
                self.cache.replace_user(user.clone());
                *lock(&self.state) = SubmissionState::Succeeded(user.clone());
                self.messages.show_success(self.success_message.clone());
                info!("submission succeeded");

                if let Some((destination, navigator)) = &self.redirect {
                    let navigation = DelayedNavigation::schedule(
                        Arc::clone(navigator),
                        destination.clone(),
                        self.redirect_delay,
                    );
                    // replacing an earlier navigation cancels it
                    *lock(&self.navigation) = Some(navigation);
                }
                SubmitOutcome::Succeeded(user)
            }
            Err(err) => {
                let message = err.message().to_owned();
                warn!(error = %err, "submission failed");
                self.cache.fail(message.clone());
                *lock(&self.state) = SubmissionState::Failed(message.clone());
                self.messages.show_error(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    fn payload(&self, record: &Record) -> Value {
        if self.submit_paths.is_empty() {
            record.to_value()
        } else {
            record.pick(&self.submit_paths).to_value()
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
