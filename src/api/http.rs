//! reqwest implementation of the syllabus backend

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, IntoUrl, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ApiError, CourseInfo, CreatedSyllabus, SyllabusBackend};
use crate::config::BackendConfig;
use crate::review::{ReviewDecision, ReviewItem};
use crate::sections::SectionKind;

const BACKEND_NAME: &str = "http";

/// Backend reached over HTTP with an optional bearer token
pub struct HttpBackend {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl HttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::network(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            client,
        })
    }

    /// Build from configuration, reading the token from the configured env var
    pub fn from_config(config: &BackendConfig) -> Result<Self, ApiError> {
        let token = env::var(&config.token_env).ok();
        if token.is_none() {
            debug!(token_env = %config.token_env, "no API token set, requests are unauthenticated");
        }
        Self::new(
            config.base_url.clone(),
            token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request_to(method, format!("{}{}", self.base_url, path))
    }

    /// Base URL with `segments` appended, each one percent-encoded
    fn segment_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::network(format!("URL base inválida: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::network(format!("URL base inválida: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request_to(&self, method: Method, url: impl IntoUrl + std::fmt::Display) -> RequestBuilder {
        debug!("{} {}", method, url);
        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and return the body of a 2xx response
    async fn execute(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), &body);
            if status.as_u16() != 404 {
                warn!(status = status.as_u16(), error = %err, "backend request failed");
            }
            return Err(err);
        }
        Ok(body)
    }

    /// Like `execute`, mapping 404 to `None`
    async fn execute_optional(&self, builder: RequestBuilder) -> Result<Option<String>, ApiError> {
        match self.execute(builder).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::decode(e.to_string()))
}

/// Parse an optional JSON body; blank bodies carry no value
fn parse_optional(body: &str) -> Result<Option<Value>, ApiError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    parse::<Value>(body).map(|v| if v.is_null() { None } else { Some(v) })
}

#[async_trait]
impl SyllabusBackend for HttpBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn fetch_section(
        &self,
        syllabus_id: u64,
        kind: SectionKind,
    ) -> Result<Option<Value>, ApiError> {
        let path = format!("/syllabus/{}/{}", syllabus_id, kind.key());
        match self.execute_optional(self.request(Method::GET, &path)).await? {
            Some(body) => parse_optional(&body),
            None => Ok(None),
        }
    }

    async fn create_section(
        &self,
        kind: SectionKind,
        payload: &Value,
        course_code: Option<&str>,
    ) -> Result<CreatedSyllabus, ApiError> {
        let path = format!("/syllabus/{}", kind.key());
        let mut builder = self.request(Method::POST, &path).json(payload);
        if let Some(code) = course_code {
            builder = builder.query(&[("codigo", code)]);
        }
        let body = self.execute(builder).await?;
        parse(&body)
    }

    async fn update_section(
        &self,
        syllabus_id: u64,
        kind: SectionKind,
        payload: &Value,
    ) -> Result<Option<Value>, ApiError> {
        let path = format!("/syllabus/{}/{}", syllabus_id, kind.key());
        let body = self
            .execute(self.request(Method::PUT, &path).json(payload))
            .await?;
        parse_optional(&body)
    }

    async fn fetch_course(&self, course_code: &str) -> Result<Option<CourseInfo>, ApiError> {
        let url = self.segment_url(&["cursos", course_code])?;
        match self.execute_optional(self.request_to(Method::GET, url)).await? {
            Some(body) => parse(&body).map(Some),
            None => Ok(None),
        }
    }

    async fn submit_for_review(&self, syllabus_id: u64) -> Result<(), ApiError> {
        let path = format!("/syllabus/{}/enviar", syllabus_id);
        self.execute(self.request(Method::POST, &path)).await?;
        Ok(())
    }

    async fn list_for_review(&self) -> Result<Vec<ReviewItem>, ApiError> {
        let body = self
            .execute(self.request(Method::GET, "/syllabus/revision"))
            .await?;
        parse(&body)
    }

    async fn record_review(
        &self,
        syllabus_id: u64,
        decision: &ReviewDecision,
    ) -> Result<(), ApiError> {
        let path = format!("/syllabus/{}/revision", syllabus_id);
        self.execute(self.request(Method::PUT, &path).json(decision))
            .await?;
        Ok(())
    }
}
