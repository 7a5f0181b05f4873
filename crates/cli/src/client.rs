//! Evaluation backends: the remote sizing API or the engine in-process

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sizing_core::configurator::ValidationResult;
use sizing_core::estimator::EstimatorResult;
use sizing_core::recommender::ServerSku;
use sizing_core::{
    ConfiguratorState, RecommendationResponse, Recommender, RevenueLeakInput, RevenueLeakResult,
    SchemaError, Validate, WorkloadIntent, WorkloadIntentLite,
};
use tracing::debug;
use url::Url;

/// API client for the sizing service
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(default)]
    details: Vec<FieldDetail>,
}

#[derive(Debug, Deserialize)]
struct FieldDetail {
    field: String,
    message: String,
}

/// Render an error body, preferring the service's error envelope
fn describe_error(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let mut text = format!("{}: {}", envelope.error.code, envelope.error.message);
            for detail in envelope.error.details {
                text.push_str(&format!("\n  {}: {}", detail.field, detail.message));
            }
            text
        }
        Err(_) => body.to_string(),
    }
}

/// Turn a local schema failure into an error listing every bad field
pub fn schema_error(err: SchemaError) -> anyhow::Error {
    let mut text = err.to_string();
    for violation in err.violations() {
        text.push_str(&format!("\n  {}: {}", violation.field, violation.message));
    }
    anyhow::anyhow!(text)
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, describe_error(&body));
        }

        response.json().await.context("Failed to parse response")
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, describe_error(&body));
        }

        response.json().await.context("Failed to parse response")
    }
}

/// Where requests are evaluated
pub enum Backend {
    Remote(ApiClient),
    Local(Recommender),
}

impl Backend {
    /// Remote when an API URL is configured, otherwise in-process
    pub fn from_api_url(api_url: Option<&str>) -> Result<Self> {
        match api_url {
            Some(url) => Ok(Backend::Remote(ApiClient::new(url)?)),
            None => Ok(Backend::Local(Recommender::default())),
        }
    }

    pub async fn estimate(&self, intent: &WorkloadIntent) -> Result<EstimatorResult> {
        match self {
            Backend::Remote(client) => client.post("estimate", intent).await,
            Backend::Local(_) => {
                intent.validate().map_err(schema_error)?;
                Ok(sizing_core::estimate(intent))
            }
        }
    }

    pub async fn validate(&self, build: &ConfiguratorState) -> Result<ValidationResult> {
        match self {
            Backend::Remote(client) => client.post("configurator/validate", build).await,
            Backend::Local(_) => {
                build.validate().map_err(schema_error)?;
                Ok(sizing_core::validate(build))
            }
        }
    }

    pub async fn recommend(&self, intent: &WorkloadIntentLite) -> Result<RecommendationResponse> {
        match self {
            Backend::Remote(client) => client.post("recommend", intent).await,
            Backend::Local(recommender) => {
                intent.validate().map_err(schema_error)?;
                Ok(recommender.recommend(intent))
            }
        }
    }

    pub async fn score_leak(&self, input: &RevenueLeakInput) -> Result<RevenueLeakResult> {
        match self {
            Backend::Remote(client) => client.post("revenue-leak", input).await,
            Backend::Local(_) => {
                input.validate().map_err(schema_error)?;
                Ok(input.score())
            }
        }
    }

    pub async fn catalog(&self) -> Result<Vec<ServerSku>> {
        match self {
            Backend::Remote(client) => client.get("catalog").await,
            Backend::Local(recommender) => Ok(recommender.catalog().skus().to_vec()),
        }
    }
}
