use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::application::{
    BookingCoordinator, BookingStore, BusinessDirectory, PaymentGateway, SelectionResolver,
};
use crate::connector::adapter::{
    ApiClient, ApiConfig, HttpBookingStore, HttpBusinessDirectory, HttpPaymentGateway,
    InMemoryBookingStore, InMemoryBusinessDirectory, InMemoryPaymentGateway,
};
use crate::domain::{SessionContext, DEFAULT_SLOT_STEP_MINUTES};

pub struct ContainerConfig {
    pub api: ApiConfig,
    /// Serve the catalog from this JSON file with in-memory bookings and
    /// payments instead of talking to the backend.
    pub catalog: Option<PathBuf>,
    pub step_minutes: u32,
    /// Upper bound for each collaborator call made on behalf of a session.
    pub deadline: Option<Duration>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            catalog: None,
            step_minutes: DEFAULT_SLOT_STEP_MINUTES,
            deadline: None,
        }
    }
}

pub struct Container {
    directory: Arc<dyn BusinessDirectory>,
    store: Arc<dyn BookingStore>,
    gateway: Arc<dyn PaymentGateway>,
    config: ContainerConfig,
}

impl Container {
    pub async fn new(config: ContainerConfig) -> Result<Self> {
        let (directory, store, gateway): (
            Arc<dyn BusinessDirectory>,
            Arc<dyn BookingStore>,
            Arc<dyn PaymentGateway>,
        ) = match config.catalog.as_deref() {
            Some(path) => {
                debug!("Using offline catalog at {}", path.display());
                let directory = InMemoryBusinessDirectory::from_file(path, &config.api.currency).await?;
                (
                    Arc::new(directory),
                    Arc::new(InMemoryBookingStore::new()),
                    Arc::new(InMemoryPaymentGateway::new()),
                )
            }
            None => {
                debug!("Using booking API at {}", config.api.base_url);
                let client = Arc::new(ApiClient::new(config.api.clone()));
                (
                    Arc::new(HttpBusinessDirectory::new(Arc::clone(&client))),
                    Arc::new(HttpBookingStore::new(Arc::clone(&client))),
                    Arc::new(HttpPaymentGateway::new(client)),
                )
            }
        };

        Ok(Self {
            directory,
            store,
            gateway,
            config,
        })
    }

    /// Wires caller-supplied collaborators, e.g. test doubles.
    pub fn with_collaborators(
        config: ContainerConfig,
        directory: Arc<dyn BusinessDirectory>,
        store: Arc<dyn BookingStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            directory,
            store,
            gateway,
            config,
        }
    }

    pub fn directory(&self) -> Arc<dyn BusinessDirectory> {
        Arc::clone(&self.directory)
    }

    pub fn store(&self) -> Arc<dyn BookingStore> {
        Arc::clone(&self.store)
    }

    pub fn resolver(&self) -> SelectionResolver {
        SelectionResolver::new(self.directory()).with_step(self.config.step_minutes)
    }

    pub fn coordinator(&self) -> BookingCoordinator {
        BookingCoordinator::new(self.store(), Arc::clone(&self.gateway))
    }

    pub fn session(&self, customer_id: &str, token: Option<&str>) -> SessionContext {
        let mut ctx = SessionContext::new(customer_id);
        if let Some(token) = token.or(self.config.api.token.as_deref()) {
            ctx = ctx.with_token(token);
        }
        if let Some(deadline) = self.config.deadline {
            ctx = ctx.with_deadline(deadline);
        }
        ctx
    }

    pub fn is_offline(&self) -> bool {
        self.config.catalog.is_some()
    }

    pub fn currency(&self) -> &str {
        &self.config.api.currency
    }
}
