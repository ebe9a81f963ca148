//! Client for the approval REST service.
//!
//! Two authenticated JSON POSTs: `GetWorkItems/` and `ApproveWorkItem/`,
//! both relative to the configured service URL prefix.

use crate::api::error::{response_detail, transport_detail, ServiceError};
use crate::api::types::{ApprovalItem, DecideRequest, ListRequest, ListResponse, SessionToken};
use serde::Serialize;
use tracing::{debug, info, warn};

const LIST_PATH: &str = "GetWorkItems/";
const DECIDE_PATH: &str = "ApproveWorkItem/";

/// Client for the list and decide endpoints.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    url_prefix: String,
}

impl ServiceClient {
    /// `url_prefix` is used as-is apart from making sure it ends in `/`.
    pub fn new(http: reqwest::Client, url_prefix: impl Into<String>) -> Self {
        let mut url_prefix = url_prefix.into();
        if !url_prefix.ends_with('/') {
            url_prefix.push('/');
        }
        Self { http, url_prefix }
    }

    pub fn list_url(&self) -> String {
        format!("{}{}", self.url_prefix, LIST_PATH)
    }

    pub fn decide_url(&self) -> String {
        format!("{}{}", self.url_prefix, DECIDE_PATH)
    }

    /// Fetch the pending items for `username`. An empty list is not an error.
    pub async fn list_items(
        &self,
        token: &SessionToken,
        username: &str,
    ) -> Result<Vec<ApprovalItem>, ServiceError> {
        let body = self
            .post(&self.list_url(), token, &ListRequest { username })
            .await?;

        let parsed: ListResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "Work item list could not be parsed");
            ServiceError::new(transport_detail(&e))
        })?;

        info!(count = parsed.work_items.len(), "Work items loaded");
        Ok(parsed.work_items)
    }

    /// Approve (`approve = true`) or reject one item. Only the status is
    /// looked at; the response body is ignored.
    pub async fn decide(
        &self,
        token: &SessionToken,
        item_id: &str,
        approve: bool,
    ) -> Result<(), ServiceError> {
        let request = DecideRequest {
            work_item_id: item_id,
            approve,
        };
        self.post(&self.decide_url(), token, &request).await?;
        info!(item_id, approve, "Work item decided");
        Ok(())
    }

    /// POST a JSON body with the bearer token and return the response text
    /// of a successful call.
    async fn post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        token: &SessionToken,
        body: &T,
    ) -> Result<String, ServiceError> {
        debug!(url, token = %token.masked(), "Calling approval service");

        let response = self
            .http
            .post(url)
            .bearer_auth(token.as_str())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(url, error = %e, "Approval service request failed");
                ServiceError::from(e)
            })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let detail = response_detail(status.as_u16(), &text);
            warn!(url, status = %status, detail = %detail, "Approval service returned an error");
            return Err(ServiceError::new(detail));
        }

        Ok(text)
    }
}
