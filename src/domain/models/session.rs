use std::time::Duration;

/// Explicit caller context for calls that act on behalf of a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    customer_id: String,
    token: Option<String>,
    deadline: Option<Duration>,
}

impl SessionContext {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            token: None,
            deadline: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Upper bound applied to each collaborator call made for this session.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}
