use crate::error::ApiError;
use crate::model::{BulkResult, NamespaceList, PodDiagnosticResult, ServiceDiagnosticResult};
use anyhow::{Context, Result};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Read-only operations of the remote diagnostic service.
///
/// Futures are `'static` so the dashboard can spawn them without holding a
/// borrow of the gateway.
pub trait DiagnosticGateway: Send + Sync {
    fn list_namespaces(&self) -> BoxFuture<'static, ApiResult<NamespaceList>>;

    fn list_pods(&self, namespace: &str)
    -> BoxFuture<'static, ApiResult<BulkResult<PodDiagnosticResult>>>;

    fn list_services(
        &self,
        namespace: &str,
    ) -> BoxFuture<'static, ApiResult<BulkResult<ServiceDiagnosticResult>>>;

    fn pod_detail(
        &self,
        namespace: &str,
        name: &str,
    ) -> BoxFuture<'static, ApiResult<PodDiagnosticResult>>;

    fn service_detail(
        &self,
        namespace: &str,
        name: &str,
    ) -> BoxFuture<'static, ApiResult<ServiceDiagnosticResult>>;
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get<T>(&self, path: String) -> BoxFuture<'static, ApiResult<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.client.clone();
        let url = format!("{}{}", self.base_url, path);
        async move {
            debug!("GET {url}");
            let response = client
                .get(&url)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await?;
            let status = response.status();
            if status.is_success() {
                return response.json::<T>().await.map_err(ApiError::from);
            }

            let body = response.text().await.unwrap_or_default();
            debug!("GET {url} failed with {status}");
            Err(ApiError::from_response_body(
                status.as_u16(),
                status.canonical_reason(),
                &body,
            ))
        }
        .boxed()
    }
}

impl DiagnosticGateway for HttpGateway {
    fn list_namespaces(&self) -> BoxFuture<'static, ApiResult<NamespaceList>> {
        self.get("/namespaces".to_string())
    }

    fn list_pods(
        &self,
        namespace: &str,
    ) -> BoxFuture<'static, ApiResult<BulkResult<PodDiagnosticResult>>> {
        self.get(format!("/debug/pods/{}", urlencoding::encode(namespace)))
    }

    fn list_services(
        &self,
        namespace: &str,
    ) -> BoxFuture<'static, ApiResult<BulkResult<ServiceDiagnosticResult>>> {
        self.get(format!("/debug/services/{}", urlencoding::encode(namespace)))
    }

    fn pod_detail(
        &self,
        namespace: &str,
        name: &str,
    ) -> BoxFuture<'static, ApiResult<PodDiagnosticResult>> {
        self.get(resource_path("pod", namespace, name))
    }

    fn service_detail(
        &self,
        namespace: &str,
        name: &str,
    ) -> BoxFuture<'static, ApiResult<ServiceDiagnosticResult>> {
        self.get(resource_path("service", namespace, name))
    }
}

fn resource_path(kind: &str, namespace: &str, name: &str) -> String {
    format!(
        "/debug/{kind}/{}/{}",
        urlencoding::encode(namespace),
        urlencoding::encode(name)
    )
}

fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}
