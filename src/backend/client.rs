//! HTTP client for the record-storage backend
//!
//! One request per operation, no internal retries. All network and 5xx
//! conditions normalize to `BackendErrorKind::Transport`; the engine keeps
//! the session alive and lets the user resend.

use super::error::BackendError;
use super::types::{
    AnalyticsReport, EntryDraft, EntryRecord, TaskItem, UserProfile, WorkerDetails, WorkerSummary,
};
use crate::runtime::traits::Backend;
use crate::state_machine::state::{ProjectId, UserId};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ExistsResponse {
    #[serde(default)]
    exists: bool,
}

/// Client over the backend's HTTP surface.
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn transport(err: reqwest::Error) -> BackendError {
    BackendError::transport(err.to_string())
}

/// Map non-2xx statuses onto the engine's error taxonomy.
async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(BackendError::auth(format!("{status}: {body}")))
    } else if status.is_client_error() {
        Err(BackendError::validation(format!("{status}: {body}")))
    } else {
        Err(BackendError::transport(format!("{status}: {body}")))
    }
}

fn photo_part(bytes: Vec<u8>, file_name: &'static str) -> Result<Part, BackendError> {
    Part::bytes(bytes)
        .file_name(file_name)
        .mime_str("image/jpeg")
        .map_err(transport)
}

#[async_trait]
impl Backend for BackendClient {
    async fn check_email(&self, email: &str) -> Result<bool, BackendError> {
        let response = self
            .client
            .post(self.url("/auth/check_email"))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .map_err(transport)?;
        // Malformed email is "does not exist", not an error.
        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            return Ok(false);
        }
        let body: ExistsResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(transport)?;
        Ok(body.exists)
    }

    async fn login(&self, email: &str, password: &str) -> Result<UserProfile, BackendError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(transport)?;
        check_status(response)
            .await?
            .json()
            .await
            .map_err(transport)
    }

    async fn tasks_for_project(&self, project: ProjectId) -> Result<Vec<TaskItem>, BackendError> {
        let response = self
            .client
            .get(self.url(&format!("/projects/{project}/tasks")))
            .send()
            .await
            .map_err(transport)?;
        check_status(response)
            .await?
            .json()
            .await
            .map_err(transport)
    }

    async fn today_entry_exists(&self, user: UserId) -> Result<bool, BackendError> {
        let response = self
            .client
            .get(self.url("/data/daily-entry/today"))
            .query(&[("user_id", user.0)])
            .send()
            .await
            .map_err(transport)?;
        let body: ExistsResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(transport)?;
        Ok(body.exists)
    }

    async fn submit_daily_entry(
        &self,
        draft: &EntryDraft,
        check_in: Option<Vec<u8>>,
        check_out: Option<Vec<u8>>,
    ) -> Result<EntryRecord, BackendError> {
        let mut form = Form::new()
            .text("user_id", draft.user_id.to_string())
            .text("task_id", draft.task_id.to_string())
            .text("hours_worked", format!("{:.2}", draft.hours_worked))
            .text("start_time", draft.started_at.to_rfc3339())
            .text("finish_time", draft.finished_at.to_rfc3339());
        if let Some(bytes) = check_in {
            form = form.part("check_in_photo", photo_part(bytes, "check_in.jpg")?);
        }
        if let Some(bytes) = check_out {
            form = form.part("check_out_photo", photo_part(bytes, "check_out.jpg")?);
        }

        let response = self
            .client
            .post(self.url("/data/daily-entry"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        check_status(response)
            .await?
            .json()
            .await
            .map_err(transport)
    }

    async fn workers(&self, project: ProjectId) -> Result<Vec<WorkerSummary>, BackendError> {
        let response = self
            .client
            .get(self.url("/admin/workers"))
            .query(&[("project_id", project.0)])
            .send()
            .await
            .map_err(transport)?;
        check_status(response)
            .await?
            .json()
            .await
            .map_err(transport)
    }

    async fn worker_details(&self, worker: UserId) -> Result<WorkerDetails, BackendError> {
        let response = self
            .client
            .get(self.url(&format!("/admin/worker/{worker}")))
            .send()
            .await
            .map_err(transport)?;
        check_status(response)
            .await?
            .json()
            .await
            .map_err(transport)
    }

    async fn analytics(&self, project: ProjectId) -> Result<AnalyticsReport, BackendError> {
        let response = self
            .client
            .get(self.url("/admin/analytics"))
            .query(&[("project_id", project.0)])
            .send()
            .await
            .map_err(transport)?;
        check_status(response)
            .await?
            .json()
            .await
            .map_err(transport)
    }
}
