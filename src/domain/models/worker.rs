use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    id: String,
    business_id: String,
    name: String,
    service_ids: BTreeSet<String>,
}

impl Worker {
    pub fn new(
        id: impl Into<String>,
        business_id: impl Into<String>,
        name: impl Into<String>,
        service_ids: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            id: id.into(),
            business_id: business_id.into(),
            name: name.into(),
            service_ids: service_ids.into_iter().collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn business_id(&self) -> &str {
        &self.business_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service_ids(&self) -> &BTreeSet<String> {
        &self.service_ids
    }

    pub fn is_assigned_to(&self, service_id: &str) -> bool {
        self.service_ids.contains(service_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_assignment() {
        let worker = Worker::new("w1", "b1", "Ana", vec!["s1".to_string(), "s2".to_string()]);

        assert!(worker.is_assigned_to("s1"));
        assert!(worker.is_assigned_to("s2"));
        assert!(!worker.is_assigned_to("s3"));
        assert_eq!(worker.service_ids().len(), 2);
    }
}
