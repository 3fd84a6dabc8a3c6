//! HTTP adapter for the personnel-record service.
//!
//! Single-shot requests: no retries here. A caller that wants retry semantics
//! wraps the repository call, never this client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::debug;

use super::models::{Collection, NewResume, ResumeDetail, ResumeSummary};
use super::{ResumeApi, UpstreamError};

/// List endpoints answer either with a bare array or with `{ "items": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped { items: Vec<T> },
}

impl<T> ListEnvelope<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items) => items,
            ListEnvelope::Wrapped { items } => items,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct HttpResumeApi {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpResumeApi {
    pub fn new(
        base_url: impl Into<String>,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
            api_token,
        })
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, UpstreamError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response.text().await.unwrap_or_default()));
        }
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), UpstreamError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response.text().await.unwrap_or_default()));
        }
        Ok(())
    }
}

#[async_trait]
impl ResumeApi for HttpResumeApi {
    async fn list_resumes(&self) -> Result<Vec<ResumeSummary>, UpstreamError> {
        debug!("GET resumes");
        let envelope: ListEnvelope<ResumeSummary> =
            self.send(self.request(Method::GET, "resumes")).await?;
        Ok(envelope.into_items())
    }

    async fn get_resume_detail(&self, id: &str) -> Result<Option<ResumeDetail>, UpstreamError> {
        debug!("GET resume detail {id}");
        let response = self
            .request(Method::GET, &format!("resumes/{id}/detail"))
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(api_error(status, response.text().await.unwrap_or_default()));
        }
        Ok(Some(response.json::<ResumeDetail>().await?))
    }

    async fn create_resume(&self, resume: NewResume) -> Result<ResumeSummary, UpstreamError> {
        debug!("POST resume for user {}", resume.user_id);
        self.send(self.request(Method::POST, "resumes").json(&resume))
            .await
    }

    async fn delete_resume(&self, id: &str) -> Result<(), UpstreamError> {
        debug!("DELETE resume {id}");
        self.send_empty(self.request(Method::DELETE, &format!("resumes/{id}")))
            .await
    }

    async fn create_item(
        &self,
        collection: Collection,
        resume_id: &str,
        fields: Value,
    ) -> Result<Value, UpstreamError> {
        debug!("POST {} item for resume {resume_id}", collection.as_str());
        let body = with_resume_id(fields, resume_id);
        self.send(self.request(Method::POST, collection.as_str()).json(&body))
            .await
    }

    async fn delete_item(
        &self,
        collection: Collection,
        item_id: &str,
    ) -> Result<(), UpstreamError> {
        debug!("DELETE {} item {item_id}", collection.as_str());
        self.send_empty(self.request(
            Method::DELETE,
            &format!("{}/{item_id}", collection.as_str()),
        ))
        .await
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Attaches the owning record id to an item body.
fn with_resume_id(fields: Value, resume_id: &str) -> Value {
    match fields {
        Value::Object(mut map) => {
            map.insert("resume_id".to_string(), Value::String(resume_id.to_string()));
            Value::Object(map)
        }
        other => other,
    }
}

/// Builds an `Api` error, preferring the service's own message over the raw body.
fn api_error(status: StatusCode, body: String) -> UpstreamError {
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|e| e.error.map(|b| b.message).or(e.message))
        .unwrap_or(body);
    UpstreamError::Api {
        status: status.as_u16(),
        message,
    }
}
