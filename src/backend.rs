//! Request/response contract between the engine and the document-store API.
use super::error::BackendError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingKind {
    Flight,
    Hotel,
    Car,
}

/// An entry of the user's `bookings` list. Fields other than the id and kind
/// are carried untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: BookingKind,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBookingResponse {
    pub updated_user: UpdatedBookings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdatedBookings {
    pub bookings: Vec<Booking>,
}

/// Body of every non-success response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// What a checkout reserves. Flights are booked through the search provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reservation {
    Hotel,
    Car,
}

impl Reservation {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Reservation::Hotel => "book-hotel",
            Reservation::Car => "book-car",
        }
    }
    pub fn details_key(&self) -> &'static str {
        match self {
            Reservation::Hotel => "hotelDetails",
            Reservation::Car => "carDetails",
        }
    }
    pub fn kind(&self) -> BookingKind {
        match self {
            Reservation::Hotel => BookingKind::Hotel,
            Reservation::Car => BookingKind::Car,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BookingRequest {
    pub reservation: Reservation,
    pub form_data: Value,
    pub details: Value,
    pub total: Decimal,
}

impl BookingRequest {
    /// `{ formData, hotelDetails | carDetails, total }`
    pub fn body(&self) -> Value {
        json!({
            "formData": self.form_data,
            (self.reservation.details_key()): self.details,
            "total": self.total,
        })
    }
}

/// A signed-in session on some device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(alias = "_id", alias = "deviceId")]
    pub id: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// The endpoints the engine writes through.
///
/// Every method has a default that rejects with status 501 so partial
/// backends only implement what they serve.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `PUT /api/user/update/{userId}`. Returns the full updated user.
    async fn update_user(&self, user_id: &str, body: &Value) -> Result<Value, BackendError> {
        let _ = (user_id, body);
        Err(unsupported("update_user"))
    }

    /// `DELETE /api/user/{userId}/bookings/{bookingId}`. Returns the
    /// authoritative bookings list.
    async fn delete_booking(
        &self,
        user_id: &str,
        booking_id: &str,
    ) -> Result<Vec<Booking>, BackendError> {
        let _ = (user_id, booking_id);
        Err(unsupported("delete_booking"))
    }

    /// `POST /api/user/book-hotel/{userId}` or `book-car`. Returns the full
    /// updated user.
    async fn book(&self, user_id: &str, request: &BookingRequest) -> Result<Value, BackendError> {
        let _ = (user_id, request);
        Err(unsupported("book"))
    }

    /// `GET /api/auth/connected-devices`
    async fn connected_devices(&self, token: &str) -> Result<Vec<Device>, BackendError> {
        let _ = token;
        Err(unsupported("connected_devices"))
    }

    /// `POST /api/auth/logout-device`
    async fn logout_device(&self, token: &str, device_id: &str) -> Result<(), BackendError> {
        let _ = (token, device_id);
        Err(unsupported("logout_device"))
    }
}

fn unsupported(operation: &str) -> BackendError {
    BackendError::rejected(501, format!("{operation} is not supported by this backend"))
}
