use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use super::wire::CatalogDto;
use crate::application::BusinessDirectory;
use crate::domain::{Business, DomainError, Service, Worker};

#[derive(Debug, Default)]
struct Catalog {
    businesses: Vec<Business>,
    services: Vec<Service>,
    workers: Vec<Worker>,
}

/// [`BusinessDirectory`] over a fixed catalog held in memory.
///
/// Category matching ignores ASCII case. Asking for the services or workers of
/// an unknown business is [`DomainError::NotFound`].
#[derive(Debug)]
pub struct InMemoryBusinessDirectory {
    catalog: Catalog,
}

impl InMemoryBusinessDirectory {
    pub fn new() -> Self {
        Self {
            catalog: Catalog::default(),
        }
    }

    pub fn with_business(mut self, business: Business) -> Self {
        self.catalog.businesses.push(business);
        self
    }

    pub fn with_service(mut self, service: Service) -> Self {
        self.catalog.services.push(service);
        self
    }

    pub fn with_worker(mut self, worker: Worker) -> Self {
        self.catalog.workers.push(worker);
        self
    }

    /// Parses a JSON catalog: `{"businesses": [{...business, "services": [...], "workers": [...]}]}`.
    pub fn from_json(json: &str, default_currency: &str) -> Result<Self, DomainError> {
        let dto: CatalogDto = serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("invalid catalog: {e}")))?;

        let mut catalog = Catalog::default();
        for entry in dto.businesses {
            let business = entry.business.into_domain()?;
            for service in entry.services {
                catalog
                    .services
                    .push(service.into_domain(business.id(), default_currency)?);
            }
            for worker in entry.workers {
                catalog.workers.push(worker.into_domain(business.id()));
            }
            catalog.businesses.push(business);
        }

        debug!(
            "Loaded catalog: {} businesses, {} services, {} workers",
            catalog.businesses.len(),
            catalog.services.len(),
            catalog.workers.len()
        );
        Ok(Self { catalog })
    }

    pub async fn from_file(path: impl AsRef<Path>, default_currency: &str) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::not_found(format!("catalog {}: {e}", path.display()))
        })?;
        Self::from_json(&json, default_currency)
    }

    fn require_business(&self, business_id: &str) -> Result<(), DomainError> {
        if self.catalog.businesses.iter().any(|b| b.id() == business_id) {
            Ok(())
        } else {
            Err(DomainError::not_found(format!("business {business_id}")))
        }
    }
}

impl Default for InMemoryBusinessDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BusinessDirectory for InMemoryBusinessDirectory {
    async fn list_businesses(&self, category: &str) -> Result<Vec<Business>, DomainError> {
        Ok(self
            .catalog
            .businesses
            .iter()
            .filter(|b| b.category().eq_ignore_ascii_case(category))
            .cloned()
            .collect())
    }

    async fn get_services(&self, business_id: &str) -> Result<Vec<Service>, DomainError> {
        self.require_business(business_id)?;
        Ok(self
            .catalog
            .services
            .iter()
            .filter(|s| s.business_id() == business_id)
            .cloned()
            .collect())
    }

    async fn get_workers(&self, business_id: &str) -> Result<Vec<Worker>, DomainError> {
        self.require_business(business_id)?;
        Ok(self
            .catalog
            .workers
            .iter()
            .filter(|w| w.business_id() == business_id)
            .cloned()
            .collect())
    }
}
