// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport for the secrets API, with bounded retries.

use crate::constants::transport::{
    DEFAULT_RETRIES, DEFAULT_TIMEOUT_SECS, RETRY_WAIT_MAX_MILLIS, RETRY_WAIT_MIN_MILLIS,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http::{header::RETRY_AFTER, request::Parts, Request, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Executes a fully built request and returns the full response.
///
/// Cancellation is drop-based: dropping the returned future must abort any
/// in-flight attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>>;
}

#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub wait_min: Duration,
    pub wait_max: Duration,
    /// Deadline for the whole call, retries included
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_RETRIES,
            wait_min: Duration::from_millis(RETRY_WAIT_MIN_MILLIS),
            wait_max: Duration::from_millis(RETRY_WAIT_MAX_MILLIS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff for the given retry number (0-based), capped at `wait_max`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.wait_min.saturating_mul(factor).min(self.wait_max)
    }
}

/// Whether a response status is worth another attempt.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || (status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout() || err.is_request()
}

/// Server-requested wait in whole seconds, honored on 429 and 503.
fn retry_after(status: StatusCode, headers: &http::HeaderMap) -> Option<Duration> {
    if status != StatusCode::TOO_MANY_REQUESTS && status != StatusCode::SERVICE_UNAVAILABLE {
        return None;
    }
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Default transport: reqwest with bounded retries and an overall deadline.
#[derive(Clone, Debug)]
pub struct RetryingTransport {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl Default for RetryingTransport {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl RetryingTransport {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_client(reqwest::Client::new(), policy)
    }

    pub fn with_client(client: reqwest::Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn build(&self, parts: &Parts, body: &Bytes) -> Result<reqwest::Request> {
        let url = reqwest::Url::parse(&parts.uri.to_string())?;
        let mut request = reqwest::Request::new(parts.method.clone(), url);
        *request.headers_mut() = parts.headers.clone();
        if !body.is_empty() {
            *request.body_mut() = Some(body.clone().into());
        }
        Ok(request)
    }

    async fn execute_with_retries(&self, parts: Parts, body: Bytes) -> Result<Response<Bytes>> {
        let mut retry = 0;

        loop {
            let request = self.build(&parts, &body)?;
            let wait = match self.client.execute(request).await {
                Ok(resp) => {
                    let status = resp.status();
                    if !is_retryable_status(status) || retry >= self.policy.max_retries {
                        return into_response(resp).await;
                    }
                    let wait = retry_after(status, resp.headers())
                        .unwrap_or_else(|| self.policy.backoff(retry));
                    warn!(
                        method = %parts.method,
                        uri = %parts.uri,
                        status = status.as_u16(),
                        attempt = retry + 1,
                        wait_ms = wait.as_millis() as u64,
                        "Retryable response status, retrying"
                    );
                    wait
                }
                Err(e) if is_retryable_error(&e) && retry < self.policy.max_retries => {
                    let wait = self.policy.backoff(retry);
                    warn!(
                        method = %parts.method,
                        uri = %parts.uri,
                        error = %e,
                        attempt = retry + 1,
                        wait_ms = wait.as_millis() as u64,
                        "Request failed, retrying"
                    );
                    wait
                }
                Err(e) => {
                    return Err(Error::transport(format!(
                        "{} {} giving up after {} attempt(s): {}",
                        parts.method,
                        parts.uri,
                        retry + 1,
                        e
                    )))
                }
            };

            tokio::time::sleep(wait).await;
            retry += 1;
        }
    }
}

async fn into_response(resp: reqwest::Response) -> Result<Response<Bytes>> {
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = resp
        .bytes()
        .await
        .map_err(|e| Error::transport(format!("failed to read response body: {}", e)))?;

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

#[async_trait]
impl Transport for RetryingTransport {
    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let (parts, body) = request.into_parts();
        debug!("{} {}", parts.method, parts.uri);

        let timeout = self.policy.timeout;
        tokio::time::timeout(timeout, self.execute_with_retries(parts, body))
            .await
            .map_err(|_| Error::transport(format!("request timed out after {:?}", timeout)))?
    }
}
