//! reqwest-backed probe client / 基于reqwest的探测客户端

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{redirect, Client, Response};

use super::{HttpProbe, ProbeResponse};

/// Two clients: one that follows redirects and one that does not
/// 两个客户端：跟随重定向 / 不跟随重定向
pub struct ReqwestProbe {
    client: Client,
    no_redirect_client: Client,
}

impl ReqwestProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let no_redirect_client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .context("Failed to create no-redirect HTTP client")?;

        Ok(Self { client, no_redirect_client })
    }

    async fn capture(response: Response) -> Result<ProbeResponse> {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.context("Failed to read response body")?;
        Ok(ProbeResponse { status, headers, body })
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn head(&self, url: &str) -> Result<ProbeResponse> {
        tracing::debug!("HEAD {}", url);
        let response = self.no_redirect_client.head(url).send().await?;
        Self::capture(response).await
    }

    async fn get(&self, url: &str) -> Result<ProbeResponse> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::capture(response).await
    }
}
