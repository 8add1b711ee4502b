//! Retry-over-alternatives fetch: an ordered list of endpoint transforms,
//! tried in sequence until one yields JSON.
//!
//! Independent of the collection pipeline; a [`crate::Collector`] only uses
//! it when built with [`crate::Collector::via_proxies`].

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::client::FeedClient;
use crate::error::FetchError;

/// Characters left unescaped when embedding a URL as a query component.
const URL_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// How to rewrite a target URL into the URL actually requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointTransform {
    /// Request the target URL as-is.
    Direct,
    /// Request `base` followed by the percent-encoded target URL.
    ///
    /// When `unwrap_contents` is set the proxy answers with an envelope
    /// `{"contents": "<body text>"}` and the body text is parsed as JSON.
    Prefix { base: String, unwrap_contents: bool },
}

impl EndpointTransform {
    #[must_use]
    pub fn prefix(base: impl Into<String>) -> Self {
        Self::Prefix {
            base: base.into(),
            unwrap_contents: false,
        }
    }

    #[must_use]
    pub fn apply(&self, url: &str) -> String {
        match self {
            Self::Direct => url.to_owned(),
            Self::Prefix { base, .. } => {
                format!("{base}{}", utf8_percent_encode(url, URL_COMPONENT))
            }
        }
    }

    fn unwrap_body(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, FetchError> {
        match self {
            Self::Prefix {
                unwrap_contents: true,
                ..
            } => {
                let contents = body
                    .get("contents")
                    .and_then(serde_json::Value::as_str)
                    .ok_or_else(|| FetchError::ProxyEnvelope {
                        url: url.to_owned(),
                        reason: "no string `contents` field".to_string(),
                    })?;
                serde_json::from_str(contents).map_err(|e| FetchError::Deserialize {
                    context: format!("proxied contents for {url}"),
                    source: e,
                })
            }
            _ => Ok(body),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProxyChain {
    transforms: Vec<EndpointTransform>,
}

impl ProxyChain {
    #[must_use]
    pub fn new(transforms: Vec<EndpointTransform>) -> Self {
        Self { transforms }
    }

    /// Public CORS proxies, in the order they are tried.
    #[must_use]
    pub fn public_cors_proxies() -> Self {
        Self::new(vec![
            EndpointTransform::Prefix {
                base: "https://api.allorigins.win/get?url=".to_string(),
                unwrap_contents: true,
            },
            EndpointTransform::prefix("https://thingproxy.freeboard.io/fetch/"),
            EndpointTransform::prefix("https://api.codetabs.com/v1/proxy?quest="),
        ])
    }

    #[must_use]
    pub fn transforms(&self) -> &[EndpointTransform] {
        &self.transforms
    }

    /// Fetch `url` through each transform in order, returning the first JSON
    /// body obtained. Each failed attempt is logged at warn level.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::AllProxiesFailed`] wrapping the last attempt's
    /// error when every transform fails, [`FetchError::EmptyProxyChain`] if
    /// there is nothing to try, or [`FetchError::InvalidUrl`] if `url` cannot
    /// be parsed.
    pub async fn fetch_json(
        &self,
        client: &FeedClient,
        url: &str,
    ) -> Result<serde_json::Value, FetchError> {
        let referer = reqwest::Url::parse(url)
            .map_err(|e| FetchError::InvalidUrl {
                url: url.to_owned(),
                reason: e.to_string(),
            })?
            .origin()
            .ascii_serialization();

        let mut last_error = None;

        for transform in &self.transforms {
            let target = transform.apply(url);
            let attempt = match client.get_json(&target, Some(&referer)).await {
                Ok(body) => transform.unwrap_body(url, body),
                Err(error) => Err(error),
            };

            match attempt {
                Ok(payload) => {
                    tracing::debug!(url, via = %target, "fetched through proxy chain");
                    return Ok(payload);
                }
                Err(error) => {
                    tracing::warn!(url, via = %target, error = %error, "proxy attempt failed");
                    last_error = Some(error);
                }
            }
        }

        match last_error {
            Some(last) => {
                tracing::error!(url, attempts = self.transforms.len(), "all proxies failed");
                Err(FetchError::AllProxiesFailed {
                    url: url.to_owned(),
                    attempts: self.transforms.len(),
                    last: Box::new(last),
                })
            }
            None => Err(FetchError::EmptyProxyChain),
        }
    }
}
