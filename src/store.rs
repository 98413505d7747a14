//! Local document store implementing [`Backend`] on sled.
//!
//! Users are stored as JSON documents keyed by their `_id`; device sessions as
//! a JSON list keyed by bearer token. Used for offline demos and integration
//! tests; it answers exactly like the remote API does.
use super::{
    backend::{Backend, Booking, BookingRequest, Device},
    error::BackendError,
    path::FieldPath,
    utils,
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, info};

const USERS: &str = "users";
const DEVICES: &str = "devices";

pub struct SledBackend {
    instance: Arc<sled::Db>,
}

impl SledBackend {
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self { instance }
    }

    /// Store a user document, minting an `_id` if it has none. Returns the id.
    pub fn insert_user(&self, user: Value) -> anyhow::Result<String> {
        let Value::Object(mut user) = user else {
            anyhow::bail!("user document must be a JSON object");
        };
        let id_key = FieldPath::UserId.as_str();
        let user_id = match user.get(id_key).and_then(Value::as_str) {
            Some(id) => id.to_owned(),
            None => utils::new_user_id()?,
        };
        user.insert(id_key.to_owned(), Value::String(user_id.clone()));

        self.save_user(&user_id, &user)?;
        info!(%user_id, "user stored");
        Ok(user_id)
    }

    pub fn load_user(&self, user_id: &str) -> anyhow::Result<Option<Map<String, Value>>> {
        let users = self.instance.open_tree(USERS)?;
        let Some(raw) = users.get(user_id.as_bytes())? else {
            return Ok(None);
        };
        let user = serde_json::from_slice(&raw)
            .with_context(|| format!("stored user {user_id} is not valid JSON"))?;
        Ok(Some(user))
    }

    fn save_user(&self, user_id: &str, user: &Map<String, Value>) -> anyhow::Result<()> {
        let users = self.instance.open_tree(USERS)?;
        users.insert(user_id.as_bytes(), serde_json::to_vec(user)?)?;
        users.flush()?;
        Ok(())
    }

    /// Record a signed-in device for `token`.
    pub fn register_device(&self, token: &str, device: Device) -> anyhow::Result<()> {
        let mut devices = self.load_devices(token)?.unwrap_or_default();
        devices.retain(|known| known.id != device.id);
        devices.push(device);
        self.save_devices(token, &devices)
    }

    fn load_devices(&self, token: &str) -> anyhow::Result<Option<Vec<Device>>> {
        let tree = self.instance.open_tree(DEVICES)?;
        let Some(raw) = tree.get(token.as_bytes())? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    fn save_devices(&self, token: &str, devices: &[Device]) -> anyhow::Result<()> {
        let tree = self.instance.open_tree(DEVICES)?;
        tree.insert(token.as_bytes(), serde_json::to_vec(devices)?)?;
        Ok(())
    }

    fn require_user(&self, user_id: &str) -> Result<Map<String, Value>, BackendError> {
        self.load_user(user_id)?
            .ok_or_else(|| BackendError::rejected(404, "User not found"))
    }
}

fn take_bookings(user: &mut Map<String, Value>) -> Vec<Value> {
    match user.remove(FieldPath::Bookings.as_str()) {
        Some(Value::Array(list)) => list,
        _ => Vec::new(),
    }
}

#[async_trait]
impl Backend for SledBackend {
    async fn update_user(&self, user_id: &str, body: &Value) -> Result<Value, BackendError> {
        let Value::Object(changes) = body else {
            return Err(BackendError::rejected(400, "Malformed payload"));
        };
        let mut user = self.require_user(user_id)?;

        // top-level keys replace; the id is never rewritten
        for (key, value) in changes {
            if key != FieldPath::UserId.as_str() {
                user.insert(key.clone(), value.clone());
            }
        }
        self.save_user(user_id, &user)?;
        debug!(%user_id, keys = changes.len(), "user updated");

        Ok(Value::Object(user))
    }

    async fn delete_booking(
        &self,
        user_id: &str,
        booking_id: &str,
    ) -> Result<Vec<Booking>, BackendError> {
        let mut user = self.require_user(user_id)?;
        let mut bookings = take_bookings(&mut user);

        let Some(position) = bookings
            .iter()
            .position(|entry| entry.get("_id").and_then(Value::as_str) == Some(booking_id))
        else {
            return Err(BackendError::rejected(404, "Booking not found"));
        };
        bookings.remove(position);
        let remaining = Value::Array(bookings);
        user.insert(FieldPath::Bookings.as_str().to_owned(), remaining.clone());

        self.save_user(user_id, &user)?;
        debug!(%user_id, %booking_id, "booking deleted");

        let remaining: Vec<Booking> =
            serde_json::from_value(remaining).context("stored bookings are malformed")?;
        Ok(remaining)
    }

    async fn book(&self, user_id: &str, request: &BookingRequest) -> Result<Value, BackendError> {
        let mut user = self.require_user(user_id)?;
        let booking_id = utils::new_booking_id()?;

        let mut bookings = take_bookings(&mut user);
        bookings.push(json!({
            "_id": booking_id,
            "type": request.reservation.kind(),
            "formData": request.form_data,
            (request.reservation.details_key()): request.details,
            "total": request.total,
            "bookedAt": Utc::now().to_rfc3339(),
        }));
        user.insert(FieldPath::Bookings.as_str().to_owned(), Value::Array(bookings));
        self.save_user(user_id, &user)?;
        info!(%user_id, %booking_id, "booking stored");

        Ok(Value::Object(user))
    }

    async fn connected_devices(&self, token: &str) -> Result<Vec<Device>, BackendError> {
        self.load_devices(token)?
            .ok_or_else(|| BackendError::rejected(401, "Unauthorized"))
    }

    async fn logout_device(&self, token: &str, device_id: &str) -> Result<(), BackendError> {
        let mut devices = self
            .load_devices(token)?
            .ok_or_else(|| BackendError::rejected(401, "Unauthorized"))?;
        let before = devices.len();
        devices.retain(|device| device.id != device_id);
        if devices.len() == before {
            return Err(BackendError::rejected(404, "Device not found"));
        }
        self.save_devices(token, &devices)?;
        Ok(())
    }
}
