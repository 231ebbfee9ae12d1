use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::wire::{BusinessDto, ServiceDto, WorkerDto};
use super::ApiClient;
use crate::application::BusinessDirectory;
use crate::domain::{Business, DomainError, Service, Worker};

/// [`BusinessDirectory`] backed by `GET /businesses`, `/businesses/{id}/services`
/// and `/businesses/{id}/workers`.
pub struct HttpBusinessDirectory {
    client: Arc<ApiClient>,
}

impl HttpBusinessDirectory {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BusinessDirectory for HttpBusinessDirectory {
    async fn list_businesses(&self, category: &str) -> Result<Vec<Business>, DomainError> {
        let request = self
            .client
            .get("/businesses", None)
            .query(&[("category", category)]);
        let dtos: Vec<BusinessDto> = self.client.fetch(request, "list businesses").await?;
        debug!("Fetched {} businesses for category {}", dtos.len(), category);

        dtos.into_iter().map(BusinessDto::into_domain).collect()
    }

    async fn get_services(&self, business_id: &str) -> Result<Vec<Service>, DomainError> {
        let request = self
            .client
            .get(&format!("/businesses/{business_id}/services"), None);
        let dtos: Vec<ServiceDto> = self.client.fetch(request, "list services").await?;

        let currency = &self.client.config().currency;
        dtos.into_iter()
            .map(|dto| dto.into_domain(business_id, currency))
            .collect()
    }

    async fn get_workers(&self, business_id: &str) -> Result<Vec<Worker>, DomainError> {
        let request = self
            .client
            .get(&format!("/businesses/{business_id}/workers"), None);
        let dtos: Vec<WorkerDto> = self.client.fetch(request, "list workers").await?;

        Ok(dtos
            .into_iter()
            .map(|dto| dto.into_domain(business_id))
            .collect())
    }
}
