//! [`Backend`] over HTTP.
use super::{
    backend::{Backend, Booking, BookingRequest, DeleteBookingResponse, Device, ErrorBody},
    error::BackendError,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::debug;

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Decode a success body, or turn the `{ message }` of a failure into
/// [`BackendError::Rejected`].
async fn read<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let text = response.text().await?;
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_owned()
        });
    debug!(status = status.as_u16(), %message, "request rejected");

    Err(BackendError::rejected(status.as_u16(), message))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DeviceList {
    Wrapped { devices: Vec<Device> },
    Bare(Vec<Device>),
}

#[async_trait]
impl Backend for HttpBackend {
    async fn update_user(&self, user_id: &str, body: &Value) -> Result<Value, BackendError> {
        let url = self.url(&format!("/api/user/update/{user_id}"));
        debug!(%url, "updating user");
        let response = self.client.put(url).json(body).send().await?;
        read(response).await
    }

    async fn delete_booking(
        &self,
        user_id: &str,
        booking_id: &str,
    ) -> Result<Vec<Booking>, BackendError> {
        let url = self.url(&format!("/api/user/{user_id}/bookings/{booking_id}"));
        debug!(%url, "deleting booking");
        let response = self.client.delete(url).send().await?;
        let body: DeleteBookingResponse = read(response).await?;
        Ok(body.updated_user.bookings)
    }

    async fn book(&self, user_id: &str, request: &BookingRequest) -> Result<Value, BackendError> {
        let endpoint = request.reservation.endpoint();
        let url = self.url(&format!("/api/user/{endpoint}/{user_id}"));
        debug!(%url, "placing booking");
        let response = self.client.post(url).json(&request.body()).send().await?;
        read(response).await
    }

    async fn connected_devices(&self, token: &str) -> Result<Vec<Device>, BackendError> {
        let response = self
            .client
            .get(self.url("/api/auth/connected-devices"))
            .bearer_auth(token)
            .send()
            .await?;
        match read(response).await? {
            DeviceList::Wrapped { devices } | DeviceList::Bare(devices) => Ok(devices),
        }
    }

    async fn logout_device(&self, token: &str, device_id: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url("/api/auth/logout-device"))
            .bearer_auth(token)
            .json(&json!({ "deviceId": device_id }))
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(());
        }
        read::<Value>(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let backend = HttpBackend::new("http://localhost:3000/");
        assert_eq!(
            backend.url("/api/user/update/u1"),
            "http://localhost:3000/api/user/update/u1"
        );
    }

    #[test]
    fn device_list_accepts_both_shapes() {
        let wrapped: DeviceList =
            serde_json::from_str(r#"{"devices":[{"_id":"d1","browser":"Firefox"}]}"#).unwrap();
        let bare: DeviceList = serde_json::from_str(r#"[{"deviceId":"d2"}]"#).unwrap();

        let DeviceList::Wrapped { devices } = wrapped else {
            panic!("expected wrapped list");
        };
        assert_eq!(devices[0].id, "d1");
        let DeviceList::Bare(devices) = bare else {
            panic!("expected bare list");
        };
        assert_eq!(devices[0].id, "d2");
    }
}
