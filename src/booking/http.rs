//! REST client for the booking backend

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::{
    error::GatewayError,
    gateway::{AvailabilitySource, BookingGateway, ProviderDirectory, ServiceCatalog},
};
use crate::{
    error::ErrorResponse,
    models::{Appointment, CreateBooking, Provider, Service, TimeSlot, WorkingDate},
};

/// Implements every collaborator contract over HTTP
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }
}

fn transport(e: reqwest::Error) -> GatewayError {
    GatewayError::Transport(e.to_string())
}

/// Map a response onto the gateway error taxonomy
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()));
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.message,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };

    Err(match status {
        StatusCode::CONFLICT => GatewayError::Conflict(message),
        s if s.is_client_error() => GatewayError::Rejected(message),
        s => GatewayError::Status {
            status: s.as_u16(),
            message,
        },
    })
}

#[async_trait]
impl ServiceCatalog for HttpBackend {
    async fn list_services(&self) -> Result<Vec<Service>, GatewayError> {
        self.get_json("/services", &[]).await
    }
}

#[async_trait]
impl ProviderDirectory for HttpBackend {
    async fn list_providers(
        &self,
        branch_id: i32,
        service_id: Option<i32>,
    ) -> Result<Vec<Provider>, GatewayError> {
        let mut query = vec![("branch", branch_id.to_string())];
        if let Some(service_id) = service_id {
            query.push(("service", service_id.to_string()));
        }
        self.get_json("/providers", &query).await
    }
}

#[async_trait]
impl AvailabilitySource for HttpBackend {
    async fn working_dates(&self, provider_id: i32) -> Result<Vec<WorkingDate>, GatewayError> {
        self.get_json(&format!("/providers/{}/working-dates", provider_id), &[])
            .await
    }

    async fn available_slots(
        &self,
        provider_id: i32,
        date: NaiveDate,
        service_duration: i32,
    ) -> Result<Vec<TimeSlot>, GatewayError> {
        let query = [
            ("provider", provider_id.to_string()),
            ("date", date.format("%Y-%m-%d").to_string()),
            ("serviceDuration", service_duration.to_string()),
        ];
        self.get_json("/available-slots", &query).await
    }
}

#[async_trait]
impl BookingGateway for HttpBackend {
    async fn create_booking(&self, request: &CreateBooking) -> Result<Appointment, GatewayError> {
        let response = self
            .client
            .post(self.url("/bookings"))
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }
}
