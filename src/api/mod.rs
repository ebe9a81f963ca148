pub mod auth;
pub mod error;
pub mod memory;
pub mod service;
pub mod types;

use async_trait::async_trait;

pub use auth::AuthClient;
pub use error::{AuthError, ServiceError};
pub use memory::MemoryBackend;
pub use service::ServiceClient;
pub use types::{ApprovalItem, Credentials, Decision, ItemField, SessionToken};

/// Everything the controller needs from the network.
/// Implementations: the real HTTP backend, or an in-memory one for tests.
#[async_trait]
pub trait ApprovalBackend: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<SessionToken, AuthError>;

    async fn list_items(
        &self,
        token: &SessionToken,
        username: &str,
    ) -> Result<Vec<ApprovalItem>, ServiceError>;

    async fn decide(
        &self,
        token: &SessionToken,
        item_id: &str,
        approve: bool,
    ) -> Result<(), ServiceError>;
}

/// Backend that talks to the token endpoint and the REST service.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    auth: AuthClient,
    service: ServiceClient,
}

impl HttpBackend {
    pub fn new(auth: AuthClient, service: ServiceClient) -> Self {
        Self { auth, service }
    }
}

#[async_trait]
impl ApprovalBackend for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<SessionToken, AuthError> {
        self.auth.login(credentials).await
    }

    async fn list_items(
        &self,
        token: &SessionToken,
        username: &str,
    ) -> Result<Vec<ApprovalItem>, ServiceError> {
        self.service.list_items(token, username).await
    }

    async fn decide(
        &self,
        token: &SessionToken,
        item_id: &str,
        approve: bool,
    ) -> Result<(), ServiceError> {
        self.service.decide(token, item_id, approve).await
    }
}
