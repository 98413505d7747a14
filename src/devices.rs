//! Connected-device sessions of the signed-in user.
use super::{
    backend::{Backend, Device},
    error::BackendError,
    messages::MessageBus,
};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

pub const LOGGED_OUT_MESSAGE: &str = "Device logged out successfully";

pub struct DeviceSessions {
    backend: Arc<dyn Backend>,
    token: String,
    messages: MessageBus,
    devices: Mutex<Vec<Device>>,
}

impl DeviceSessions {
    pub fn new(backend: Arc<dyn Backend>, token: impl Into<String>, messages: MessageBus) -> Self {
        Self {
            backend,
            token: token.into(),
            messages,
            devices: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> &MessageBus {
        &self.messages
    }

    /// Last fetched list.
    pub fn devices(&self) -> Vec<Device> {
        self.devices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fetch the device list. On failure the previous list is kept.
    pub async fn refresh(&self) -> Result<Vec<Device>, BackendError> {
        match self.backend.connected_devices(&self.token).await {
            Ok(devices) => {
                *self.devices.lock().unwrap_or_else(PoisonError::into_inner) = devices.clone();
                Ok(devices)
            }
            Err(err) => {
                warn!(error = %err, "listing devices failed");
                self.messages.show_error(err.message());
                Err(err)
            }
        }
    }

    /// End the session on `device_id`, then re-list.
    pub async fn logout(&self, device_id: &str) -> Result<Vec<Device>, BackendError> {
        if let Err(err) = self.backend.logout_device(&self.token, device_id).await {
            warn!(%device_id, error = %err, "device logout failed");
            self.messages.show_error(err.message());
            return Err(err);
        }
        info!(%device_id, "device logged out");
        self.messages.show_success(LOGGED_OUT_MESSAGE);
        self.refresh().await
    }
}
