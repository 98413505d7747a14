//! One edit session of a profile screen.
//!
//! A [`FormSession`] loads the signed-in user from the [`UserCache`], keeps
//! a frozen snapshot next to the editable record, validates on every edit and
//! again in full on submit, and hands dirty records to its
//! [`SubmissionController`]. Screens differ only in their [`FormSpec`].
use super::{
    backend::Backend,
    cache::UserCache,
    config::EngineConfig,
    dirty::is_dirty,
    error::WorkflowError,
    messages::{FieldErrors, MessageBus},
    navigate::Navigator,
    path::Path,
    record::{Node, Record},
    submit::{SubmissionController, SubmissionState, SubmitOutcome},
    validate::FormRules,
};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::debug;

/// What distinguishes one screen's form from another.
#[derive(Clone, Default)]
pub struct FormSpec {
    pub rules: FormRules,
    /// Subtrees sent on submit; empty sends the whole record.
    pub submit_paths: Vec<Path>,
    /// Screen to open once a submission succeeds.
    pub destination: Option<String>,
    pub success_message: Option<String>,
}

impl FormSpec {
    pub fn new(rules: FormRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }
    pub fn submit_only(mut self, paths: Vec<Path>) -> Self {
        self.submit_paths = paths;
        self
    }
    pub fn then_navigate_to(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }
    pub fn success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }
}

pub struct FormSession {
    subject_id: String,
    record: Record,
    snapshot: Record,
    rules: FormRules,
    field_errors: FieldErrors,
    controller: SubmissionController,
    today: Option<NaiveDate>,
}

impl FormSession {
    /// Start editing the signed-in user.
    pub fn load(
        cache: &UserCache,
        backend: Arc<dyn Backend>,
        spec: FormSpec,
        config: &EngineConfig,
        navigator: Option<Arc<dyn Navigator>>,
    ) -> Result<Self, WorkflowError> {
        let user = cache.user().ok_or(WorkflowError::NotSignedIn)?;
        let subject_id = cache.user_id().ok_or(WorkflowError::NotSignedIn)?;

        let messages = MessageBus::new(config.message_ttl);
        let mut controller = SubmissionController::new(backend, cache.clone(), messages)
            .with_submit_paths(spec.submit_paths);
        if let Some(message) = spec.success_message {
            controller = controller.with_success_message(message);
        }
        if let (Some(destination), Some(navigator)) = (spec.destination, navigator) {
            controller = controller.redirect_to(destination, navigator, config.redirect_delay);
        }
        debug!(%subject_id, "form session loaded");

        Ok(Self {
            subject_id,
            snapshot: user.deep_copy(),
            record: user,
            rules: spec.rules,
            field_errors: FieldErrors::new(config.message_ttl),
            controller,
            today: None,
        })
    }

    /// Pin the date used by calendar-dependent validators.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }
    pub fn record(&self) -> &Record {
        &self.record
    }
    pub fn snapshot(&self) -> &Record {
        &self.snapshot
    }
    pub fn is_dirty(&self) -> bool {
        is_dirty(&self.record, &self.snapshot)
    }
    pub fn state(&self) -> SubmissionState {
        self.controller.state()
    }
    pub fn can_submit(&self) -> bool {
        !self.controller.is_pending()
    }
    pub fn messages(&self) -> &MessageBus {
        self.controller.messages()
    }
    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }
    pub fn navigation_pending(&self) -> bool {
        self.controller.navigation_pending()
    }

    /// Write `value` at `path` and check that field. Returns the field's
    /// error, which is also flashed.
    pub fn edit(&mut self, path: &Path, value: impl Into<Node>) -> Option<String> {
        self.record = self.record.set(path, value);
        self.controller.reset();

        let error = self.rules.check_field(&self.record, path, self.today());
        match &error {
            Some(message) => self.field_errors.flash(path.to_string(), message.clone()),
            None => self.field_errors.clear(&path.to_string()),
        }
        error
    }

    /// Validate every field, dirty-check, then submit.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.controller.is_pending() {
            return SubmitOutcome::Busy;
        }

        let errors = self.rules.validate(&self.record, self.today());
        if !errors.is_empty() {
            debug!(count = errors.len(), "submission blocked by validation");
            for error in &errors {
                self.field_errors.flash(error.field.as_str(), error.message.clone());
            }
            return self.controller.reject_invalid(errors);
        }

        let outcome = self
            .controller
            .submit(&self.subject_id, &self.record, &self.snapshot)
            .await;
        if let SubmitOutcome::Succeeded(user) = &outcome {
            self.snapshot = user.deep_copy();
            self.record = user.clone();
        }
        outcome
    }

    /// Discard edits and go back to the loaded snapshot.
    pub fn revert(&mut self) {
        self.record = self.snapshot.deep_copy();
        self.field_errors.clear_all();
        self.controller.reset();
    }

    /// Cancel every timer this screen owns.
    pub fn teardown(&mut self) {
        self.field_errors.clear_all();
        self.controller.teardown();
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }
}
