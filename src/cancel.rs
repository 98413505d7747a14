//! Two-step booking cancellation.
//!
//! `idle -> confirming -> committing -> cancelled | idle`. The cached bookings
//! list is only ever replaced by the list the server returns after deleting;
//! nothing is removed locally ahead of that.
use super::{
    backend::{Backend, Booking},
    cache::UserCache,
    error::{BackendError, WorkflowError},
    messages::MessageBus,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

pub const CANCELLED_MESSAGE: &str = "Booking cancelled successfully";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CancellationState {
    #[default]
    Idle,
    /// Confirmation modal open.
    Confirming { booking_id: String },
    /// Delete request in flight.
    Committing { booking_id: String },
    /// Success modal open.
    Cancelled { booking_id: String },
}

impl CancellationState {
    pub fn name(&self) -> &'static str {
        match self {
            CancellationState::Idle => "idle",
            CancellationState::Confirming { .. } => "confirming",
            CancellationState::Committing { .. } => "committing",
            CancellationState::Cancelled { .. } => "cancelled",
        }
    }
}

pub struct CancellationWorkflow {
    backend: Arc<dyn Backend>,
    cache: UserCache,
    messages: MessageBus,
    state: Mutex<CancellationState>,
}

impl CancellationWorkflow {
    pub fn new(backend: Arc<dyn Backend>, cache: UserCache, messages: MessageBus) -> Self {
        Self {
            backend,
            cache,
            messages,
            state: Mutex::new(CancellationState::Idle),
        }
    }

    pub fn state(&self) -> CancellationState {
        self.lock().clone()
    }

    pub fn messages(&self) -> &MessageBus {
        &self.messages
    }

    /// Open the confirmation step for `booking_id`. No request is made.
    pub fn request_cancel(&self, booking_id: impl Into<String>) -> Result<(), WorkflowError> {
        let mut state = self.lock();
        match &*state {
            CancellationState::Idle | CancellationState::Cancelled { .. } => {
                let booking_id = booking_id.into();
                debug!(%booking_id, "confirming cancellation");
                *state = CancellationState::Confirming { booking_id };
                Ok(())
            }
            other => Err(WorkflowError::InvalidTransition {
                action: "request a cancellation",
                state: other.name(),
            }),
        }
    }

    /// Close the confirmation step without side effects.
    pub fn reject(&self) {
        let mut state = self.lock();
        if matches!(*state, CancellationState::Confirming { .. }) {
            *state = CancellationState::Idle;
        }
    }

    /// Close the success step.
    pub fn dismiss(&self) {
        let mut state = self.lock();
        if matches!(*state, CancellationState::Cancelled { .. }) {
            *state = CancellationState::Idle;
        }
    }

    /// Delete the booking being confirmed and adopt the server's list.
    pub async fn confirm(&self) -> Result<Vec<Booking>, WorkflowError> {
        let booking_id = {
            let mut state = self.lock();
            let CancellationState::Confirming { booking_id } = &*state else {
                return Err(WorkflowError::InvalidTransition {
                    action: "confirm",
                    state: state.name(),
                });
            };
            let booking_id = booking_id.clone();
            *state = CancellationState::Committing {
                booking_id: booking_id.clone(),
            };
            booking_id
        };

        let Some(user_id) = self.cache.user_id() else {
            *self.lock() = CancellationState::Idle;
            self.messages.show_error(WorkflowError::NotSignedIn.to_string());
            return Err(WorkflowError::NotSignedIn);
        };

        match self.backend.delete_booking(&user_id, &booking_id).await {
            Ok(bookings) => {
                let list = serde_json::to_value(&bookings).map_err(|e| {
                    *self.lock() = CancellationState::Idle;
                    WorkflowError::Backend(BackendError::Transport(e.to_string()))
                })?;
                self.cache.replace_bookings(list);
                *self.lock() = CancellationState::Cancelled {
                    booking_id: booking_id.clone(),
                };
                self.messages.show_success(CANCELLED_MESSAGE);
                info!(%user_id, %booking_id, remaining = bookings.len(), "booking cancelled");
                Ok(bookings)
            }
            Err(err) => {
                warn!(%user_id, %booking_id, error = %err, "cancellation failed");
                *self.lock() = CancellationState::Idle;
                self.messages.show_error(err.message());
                Err(err.into())
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, CancellationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
