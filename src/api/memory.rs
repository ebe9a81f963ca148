//! In-memory backend, used by the controller tests.
//!
//! Behaves like the real service: a fixed set of accepted credentials,
//! a list of pending items that shrinks as items are decided, and
//! per-item failures that can be switched on.

use crate::api::error::{AuthError, ServiceError};
use crate::api::types::{ApprovalItem, Credentials, SessionToken};
use crate::api::ApprovalBackend;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

const MEMORY_TOKEN: &str = "memory-session-token";

/// One call the backend received, recorded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Login { username: String },
    List { username: String },
    Decide { item_id: String, approve: bool },
}

#[derive(Debug, Default)]
struct MemoryState {
    items: Vec<ApprovalItem>,
    failing: HashSet<String>,
    list_error: Option<String>,
    calls: Vec<BackendCall>,
}

#[derive(Debug)]
pub struct MemoryBackend {
    accepted: Credentials,
    login_error: String,
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    /// Backend accepting exactly `accepted` and serving `items`.
    pub fn new(accepted: Credentials, items: Vec<ApprovalItem>) -> Self {
        Self {
            accepted,
            login_error: r#"{"error":"invalid_grant"}"#.to_string(),
            state: Mutex::new(MemoryState {
                items,
                ..Default::default()
            }),
        }
    }

    /// Detail returned when credentials do not match.
    pub fn with_login_error(mut self, detail: impl Into<String>) -> Self {
        self.login_error = detail.into();
        self
    }

    /// Make every decide call for `item_id` fail.
    pub fn fail_decide(&self, item_id: &str) {
        self.lock().failing.insert(item_id.to_string());
    }

    pub fn clear_failures(&self) {
        self.lock().failing.clear();
    }

    /// Make list calls fail with `detail` until cleared with `None`.
    pub fn set_list_error(&self, detail: Option<&str>) {
        self.lock().list_error = detail.map(str::to_string);
    }

    /// Items still pending on the "server".
    pub fn pending(&self) -> Vec<ApprovalItem> {
        self.lock().items.clone()
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A poisoned lock only means another test thread panicked mid-call.
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn check_token(token: &SessionToken) -> Result<(), ServiceError> {
        if token.as_str() == MEMORY_TOKEN {
            Ok(())
        } else {
            Err(ServiceError::new(
                r#"[{"errorCode":"INVALID_SESSION_ID","message":"Session expired or invalid"}]"#,
            ))
        }
    }
}

#[async_trait]
impl ApprovalBackend for MemoryBackend {
    async fn login(&self, credentials: &Credentials) -> Result<SessionToken, AuthError> {
        self.lock().calls.push(BackendCall::Login {
            username: credentials.username.clone(),
        });
        if *credentials == self.accepted {
            Ok(SessionToken::new(MEMORY_TOKEN))
        } else {
            Err(AuthError::new(self.login_error.clone()))
        }
    }

    async fn list_items(
        &self,
        token: &SessionToken,
        username: &str,
    ) -> Result<Vec<ApprovalItem>, ServiceError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::List {
            username: username.to_string(),
        });
        Self::check_token(token)?;
        if let Some(detail) = &state.list_error {
            return Err(ServiceError::new(detail.clone()));
        }
        Ok(state.items.clone())
    }

    async fn decide(
        &self,
        token: &SessionToken,
        item_id: &str,
        approve: bool,
    ) -> Result<(), ServiceError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::Decide {
            item_id: item_id.to_string(),
            approve,
        });
        Self::check_token(token)?;
        if state.failing.contains(item_id) {
            return Err(ServiceError::new(format!(
                r#"[{{"errorCode":"PROCESS_ERROR","message":"Work item {} could not be processed"}}]"#,
                item_id
            )));
        }
        match state.items.iter().position(|i| i.id == item_id) {
            Some(index) => {
                state.items.remove(index);
                Ok(())
            }
            None => Err(ServiceError::new(format!(
                r#"[{{"errorCode":"NOT_FOUND","message":"No work item {}"}}]"#,
                item_id
            ))),
        }
    }
}
