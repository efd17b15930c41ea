#![forbid(unsafe_code)]

use crate::{
    Error,
    adapter::Interceptor,
    domain::{EndpointKey, HttpMethod},
    runtime::Interception,
};
use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::Mutex;
use reqwest::{Client, Method, Url, header::CONTENT_TYPE};
use serde_json::Value;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tracing::{debug, warn};

/// Raw reply of a request that reached the network.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Value,
}

/// Performs requests that the runtime lets pass through.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, key: &EndpointKey) -> Result<HttpReply, Error>;
}

/// [`Transport`] backed by `reqwest`, resolving paths against a base URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(config: &config::Dashboard) -> Result<Self, Error> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|err| Error::InvalidUrl(format!("{}: {err}", config.base_url)))?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, key: &EndpointKey) -> Result<HttpReply, Error> {
        let url = self
            .base_url
            .join(&key.path)
            .map_err(|err| Error::InvalidUrl(format!("{}: {err}", key.path)))?;
        let response = self
            .client
            .request(reqwest_method(key.method), url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.json::<Value>().await?;
        Ok(HttpReply { status, body })
    }
}

fn reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
    }
}

/// Outcome of one test request. Failures are data, never errors.
#[derive(Debug, Clone, PartialEq)]
pub enum TestResult {
    Success {
        status: u16,
        data: Value,
        /// Preset that answered, `None` when the request hit the network.
        preset: Option<String>,
    },
    Failed {
        error: String,
    },
}

impl TestResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Exercises registered endpoints through the interception layer.
pub struct Dashboard {
    interceptor: Arc<dyn Interceptor>,
    transport: Arc<dyn Transport>,
    endpoints: Vec<EndpointKey>,
    loading: Mutex<HashSet<EndpointKey>>,
    results: Mutex<HashMap<EndpointKey, TestResult>>,
}

impl Dashboard {
    pub fn new(
        interceptor: Arc<dyn Interceptor>,
        transport: Arc<dyn Transport>,
        endpoints: Vec<EndpointKey>,
    ) -> Self {
        Self {
            interceptor,
            transport,
            endpoints,
            loading: Mutex::default(),
            results: Mutex::default(),
        }
    }

    pub fn endpoints(&self) -> &[EndpointKey] {
        &self.endpoints
    }

    pub fn is_loading(&self, key: &EndpointKey) -> bool {
        self.loading.lock().contains(key)
    }

    pub fn result(&self, key: &EndpointKey) -> Option<TestResult> {
        self.results.lock().get(key).cloned()
    }

    /// Latest results in endpoint order; untested endpoints are skipped.
    pub fn results(&self) -> Vec<(EndpointKey, TestResult)> {
        let results = self.results.lock();
        self.endpoints
            .iter()
            .filter_map(|key| results.get(key).map(|r| (key.clone(), r.clone())))
            .collect()
    }

    pub async fn test_endpoint(&self, key: &EndpointKey) -> TestResult {
        self.loading.lock().insert(key.clone());

        let result = match self.interceptor.resolve(key) {
            Interception::Mocked(response) => {
                debug!(endpoint = %key, preset = %response.preset, "answered by preset");
                TestResult::Success {
                    status: response.status,
                    data: response.body,
                    preset: Some(response.preset),
                }
            }
            Interception::PassThrough => match self.transport.send(key).await {
                Ok(reply) => TestResult::Success {
                    status: reply.status,
                    data: reply.body,
                    preset: None,
                },
                Err(err) => {
                    warn!(endpoint = %key, %err, "test request failed");
                    TestResult::Failed {
                        error: err.to_string(),
                    }
                }
            },
        };

        self.results.lock().insert(key.clone(), result.clone());
        self.loading.lock().remove(key);
        result
    }

    /// Test every endpoint concurrently; results come back in endpoint order.
    pub async fn test_all(&self) -> Vec<(EndpointKey, TestResult)> {
        let runs = self.endpoints.iter().map(|key| async move {
            let result = self.test_endpoint(key).await;
            (key.clone(), result)
        });
        join_all(runs).await
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("endpoints", &self.endpoints)
            .field("loading", &*self.loading.lock())
            .finish_non_exhaustive()
    }
}
