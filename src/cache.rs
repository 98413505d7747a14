//! Session-wide user profile shared by every screen.
//!
//! Screens read from the cache freely. Writes go through the submission
//! controller, the checkout flow and the cancellation workflow only; each write
//! replaces the stored value wholesale, so the last successful writer wins.
use super::{
    backend::Booking,
    path::FieldPath,
    record::{Node, Record},
};
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

#[derive(Debug, Default)]
struct CacheState {
    user: Option<Record>,
    error: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct UserCache {
    inner: Arc<RwLock<CacheState>>,
}

impl UserCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user: Record) {
        let mut state = self.write();
        info!(user_id = ?user.str_at(&FieldPath::UserId.path()), "user signed in");
        state.user = Some(user);
        state.error = None;
    }

    /// Forget the profile and any error. Called on sign-out.
    pub fn sign_out(&self) {
        let mut state = self.write();
        state.user = None;
        state.error = None;
        info!("user signed out");
    }

    pub fn user(&self) -> Option<Record> {
        self.read().user.clone()
    }

    pub fn user_id(&self) -> Option<String> {
        self.read()
            .user
            .as_ref()
            .and_then(|user| user.str_at(&FieldPath::UserId.path()).map(str::to_owned))
    }

    /// Bookings in the cached profile. Entries that do not parse are skipped.
    pub fn bookings(&self) -> Vec<Booking> {
        let state = self.read();
        let Some(Value::Array(entries)) = state
            .user
            .as_ref()
            .and_then(|user| user.value_at(&FieldPath::Bookings.path()))
        else {
            return Vec::new();
        };

        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Booking>(entry) {
                Ok(booking) => Some(booking),
                Err(e) => {
                    warn!(error = %e, "skipping malformed booking entry");
                    None
                }
            })
            .collect()
    }

    /// The last failure reported by a write path, if any.
    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub(crate) fn replace_user(&self, user: Record) {
        let mut state = self.write();
        state.user = Some(user);
        state.error = None;
    }

    pub(crate) fn replace_bookings(&self, bookings: Value) {
        let mut state = self.write();
        match state.user.take() {
            Some(user) => {
                let user = user.set(&FieldPath::Bookings.path(), Node::from(bookings));
                state.user = Some(user);
                state.error = None;
            }
            None => warn!("bookings received with no signed-in user, ignoring"),
        }
    }

    pub(crate) fn fail(&self, message: impl Into<String>) {
        self.write().error = Some(message.into());
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
