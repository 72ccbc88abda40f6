use anyhow::{anyhow, Context, Result};
use std::future::Future;

use crate::config::ClientConfig;
use crate::models::{parse_payload, JobPayload};

// --- Source trait ---

pub trait JobSource {
    fn fetch_job(&self, id: &str) -> impl Future<Output = Result<JobPayload>> + Send;
}

// --- Jobs API client ---

#[derive(Debug, Clone)]
pub struct JobsClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl JobsClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;
        Ok(Self { config, client })
    }

    pub fn job_url(&self, id: &str) -> String {
        format!("{}/{}", self.config.base_url, id)
    }

    pub fn build_request(&self, id: &str) -> Result<reqwest::Request> {
        self.client
            .get(self.job_url(id))
            .bearer_auth(&self.config.token)
            .build()
            .with_context(|| format!("Failed to build request for job {}", id))
    }
}

impl JobSource for JobsClient {
    async fn fetch_job(&self, id: &str) -> Result<JobPayload> {
        let request = self.build_request(id)?;
        tracing::info!(job_id = id, url = %request.url(), "Requesting job details");

        let response = self
            .client
            .execute(request)
            .await
            .context("Failed to send request to jobs API")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read jobs API response")?;
        read_response(id, status, &body)
    }
}

fn read_response(id: &str, status: reqwest::StatusCode, body: &str) -> Result<JobPayload> {
    if !status.is_success() {
        return Err(anyhow!(
            "Jobs API request failed with status {}: {}",
            status,
            body
        ));
    }
    parse_payload(id, body)
}
