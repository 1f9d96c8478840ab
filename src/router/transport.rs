//! HTTPS transport to the router admin interface

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::SET_COOKIE;
use reqwest::Client;
use url::Url;

use super::tls::{pinned_client_config, RejectionLog, TrustPolicy};
use crate::error::AppError;

/// What the client needs from a router response
#[derive(Debug, Clone, Default)]
pub struct RouterResponse {
    pub status: u16,
    pub set_cookies: Vec<String>,
    pub body: String,
}

/// Form-encoded POST to a router endpoint
#[async_trait]
pub trait RouterTransport: Send + Sync {
    async fn post_form(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<RouterResponse, AppError>;

    /// Host the transport talks to, for messages
    fn router_address(&self) -> &str;
}

/// reqwest client pinned to the router certificate thumbprint
pub struct HttpsTransport {
    address: String,
    base_url: Url,
    http_client: Client,
    rejections: RejectionLog,
}

impl HttpsTransport {
    pub fn new(router_address: &str, policy: Arc<dyn TrustPolicy>) -> Result<Self, AppError> {
        let base_url = Url::parse(&format!("https://{}/", router_address)).map_err(|e| {
            AppError::Config(format!("invalid router address '{}': {}", router_address, e))
        })?;

        let rejections = RejectionLog::default();
        let tls = pinned_client_config(policy, rejections.clone());

        let http_client = Client::builder()
            .use_preconfigured_tls(tls)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            address: router_address.to_string(),
            base_url,
            http_client,
            rejections,
        })
    }

    /// A failed send caused by the pinned-certificate check is a trust error
    fn classify(&self, err: reqwest::Error) -> AppError {
        match self.rejections.take() {
            Some(presented) => AppError::Trust { presented },
            None => AppError::Http(err),
        }
    }
}

#[async_trait]
impl RouterTransport for HttpsTransport {
    async fn post_form(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<RouterResponse, AppError> {
        let url = self
            .base_url
            .join(endpoint)
            .map_err(|e| AppError::Config(format!("invalid endpoint '{}': {}", endpoint, e)))?;

        tracing::debug!("[Router] POST {}", url);

        let response = self
            .http_client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(String::from)
            .collect();
        let body = response.text().await?;

        Ok(RouterResponse {
            status,
            set_cookies,
            body,
        })
    }

    fn router_address(&self) -> &str {
        &self.address
    }
}
