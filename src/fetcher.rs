use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION, HeaderMap, HeaderValue,
    UPGRADE_INSECURE_REQUESTS,
};
use reqwest::{Client, Proxy, Url};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::data_models::FetchResult;
use crate::logging::Logger;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid header {name}: {reason}")]
    Header { name: &'static str, reason: String },

    #[error("invalid proxy {0}")]
    Proxy(String),

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid url {url}: {reason}")]
    Url { url: String, reason: String },

    #[error("server returned {status} for {url}")]
    Status { url: String, status: u16 },
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    pub accept_language: String,
    pub proxy: Option<String>,
    pub timeout: Duration,
}

impl From<&Config> for FetchOptions {
    fn from(config: &Config) -> Self {
        FetchOptions {
            user_agent: config.user_agent().to_string(),
            accept_language: config.accept_language.clone(),
            proxy: config.proxy.clone(),
            timeout: config.timeout,
        }
    }
}

/// Issues one GET per call. Failures are logged and reported as an empty page.
pub struct Fetcher {
    client: Client,
    logger: Arc<dyn Logger>,
}

impl Fetcher {
    pub fn new(options: &FetchOptions, logger: Arc<dyn Logger>) -> Result<Fetcher, FetchError> {
        let mut builder = Client::builder()
            .default_headers(Self::headers(options)?)
            .timeout(options.timeout);

        if let Some(proxy) = &options.proxy {
            // same proxy for http and https
            let proxy = Proxy::all(proxy.as_str()).map_err(|e| FetchError::Proxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        Ok(Fetcher {
            client: builder.build()?,
            logger,
        })
    }

    fn headers(options: &FetchOptions) -> Result<HeaderMap, FetchError> {
        let value = |name: &'static str, raw: &str| {
            HeaderValue::from_str(raw).map_err(|e| FetchError::Header {
                name,
                reason: e.to_string(),
            })
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            value("User-Agent", &options.user_agent)?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(
            ACCEPT_LANGUAGE,
            value("Accept-Language", &options.accept_language)?,
        );
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        Ok(headers)
    }

    pub async fn fetch(&self, url: &str) -> FetchResult {
        self.logger.info(&format!("fetching {url}"));
        match self.fetch_page(url).await {
            Ok(html) => {
                self.logger
                    .info(&format!("fetched {url} ({} bytes)", html.len()));
                FetchResult::new(url.to_string(), html)
            }
            Err(e) => {
                self.logger.error(&format!("error fetching page {url}: {e:#}"));
                FetchResult::failed(url.to_string())
            }
        }
    }

    async fn fetch_page(&self, url: &str) -> anyhow::Result<String> {
        let parsed = Url::parse(url).map_err(|e| FetchError::Url {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::Url {
                url: url.to_string(),
                reason: "only http and https are supported".to_string(),
            }
            .into());
        }

        let res = self.client.get(parsed).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }
        let body = res.text().await?;
        Ok(body)
    }
}
