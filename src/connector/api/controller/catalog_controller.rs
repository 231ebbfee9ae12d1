use anyhow::Result;

use crate::domain::{Business, Service, Worker};

use super::super::Container;

pub struct CatalogController<'a> {
    container: &'a Container,
}

impl<'a> CatalogController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn businesses(&self, category: String) -> Result<String> {
        let businesses = self.container.directory().list_businesses(&category).await?;
        Ok(format_businesses(&category, &businesses))
    }

    pub async fn services(&self, business_id: String) -> Result<String> {
        let directory = self.container.directory();
        let services = directory.get_services(&business_id).await?;
        let workers = directory.get_workers(&business_id).await?;
        Ok(format_offer(&business_id, &services, &workers))
    }
}

fn format_businesses(category: &str, businesses: &[Business]) -> String {
    if businesses.is_empty() {
        return format!("No businesses in category {}.", category);
    }

    let mut output = format!("Businesses in {}:\n\n", category);
    for business in businesses {
        output.push_str(&format!("  {} ({})\n", business.name(), business.id()));
        output.push_str(&format!("    Timezone: {}\n", business.timezone()));
        if business.hours().is_closed_all_week() {
            output.push_str("    Hours: closed\n");
        }
    }
    output
}

fn format_offer(business_id: &str, services: &[Service], workers: &[Worker]) -> String {
    let mut output = format!("Services of {}:\n\n", business_id);
    if services.is_empty() {
        output.push_str("  (none)\n");
    }
    for service in services {
        output.push_str(&format!(
            "  {} ({}) - {}, {} min",
            service.name(),
            service.id(),
            service.price_label(),
            service.duration_minutes()
        ));
        if let Some(worker_id) = service.worker_id() {
            output.push_str(&format!(", only with {}", worker_id));
        }
        output.push('\n');
    }

    output.push_str("\nWorkers:\n\n");
    if workers.is_empty() {
        output.push_str("  (none)\n");
    }
    for worker in workers {
        let services: Vec<&str> = worker.service_ids().iter().map(String::as_str).collect();
        output.push_str(&format!(
            "  {} ({}): {}\n",
            worker.name(),
            worker.id(),
            services.join(", ")
        ));
    }
    output
}
