use async_trait::async_trait;

use crate::domain::{Business, DomainError, Service, Worker};

/// Read-only catalog of businesses and what they offer.
#[async_trait]
pub trait BusinessDirectory: Send + Sync {
    async fn list_businesses(&self, category: &str) -> Result<Vec<Business>, DomainError>;

    async fn get_services(&self, business_id: &str) -> Result<Vec<Service>, DomainError>;

    async fn get_workers(&self, business_id: &str) -> Result<Vec<Worker>, DomainError>;
}
