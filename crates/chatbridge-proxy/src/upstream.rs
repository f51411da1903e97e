//! Provider table and outbound calls

use http::HeaderMap;
use indexmap::IndexMap;
use reqwest::Client;
use url::Url;

use crate::error::ProxyError;
use crate::types::UpstreamBody;

/// Read-only provider table plus the HTTP client used to reach it
#[derive(Debug, Clone)]
pub struct Upstream {
    client: Client,
    providers: IndexMap<String, Url>,
}

impl Upstream {
    /// Build from the configured provider table
    ///
    /// The client's timeout bounds the whole call, including reading the
    /// response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is invalid or the client cannot be built
    pub fn new(config: &chatbridge_config::UpstreamConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout_duration()?)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build upstream HTTP client: {e}"))?;

        Ok(Self {
            client,
            providers: config.providers.clone(),
        })
    }

    /// Look up the endpoint for a provider key
    ///
    /// An absent, empty or unknown key fails with
    /// [`ProxyError::InvalidProvider`] listing every configured key.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::InvalidProvider`] when no entry matches
    pub fn resolve(&self, provider: Option<&str>) -> Result<(&str, &Url), ProxyError> {
        provider
            .and_then(|key| self.providers.get_key_value(key))
            .map(|(key, url)| (key.as_str(), url))
            .ok_or_else(|| ProxyError::InvalidProvider {
                provider: provider.unwrap_or_default().to_owned(),
                valid: self.providers.keys().cloned().collect(),
            })
    }

    /// Configured provider keys in declaration order
    pub fn provider_keys(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// POST `body` as JSON to `url`
    ///
    /// Any response that arrives, whatever its status, is returned for
    /// relaying; only transport failures become
    /// [`ProxyError::UpstreamUnreachable`].
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::UpstreamUnreachable`] on connection or timeout failures
    pub async fn send(&self, url: &Url, headers: HeaderMap, body: &UpstreamBody) -> Result<reqwest::Response, ProxyError> {
        self.client
            .post(url.clone())
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "upstream request failed");
                ProxyError::UpstreamUnreachable(e.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use chatbridge_config::UpstreamConfig;

    use super::*;

    fn upstream() -> Upstream {
        let mut config = UpstreamConfig::default();
        for key in ["provider-a", "provider-b"] {
            config.providers.insert(
                key.to_owned(),
                format!("https://api.{key}.example/v1/chat/completions").parse().unwrap(),
            );
        }
        Upstream::new(&config).unwrap()
    }

    #[test]
    fn known_provider_resolves_to_its_url() {
        let upstream = upstream();
        let (key, url) = upstream.resolve(Some("provider-b")).unwrap();

        assert_eq!(key, "provider-b");
        assert_eq!(url.as_str(), "https://api.provider-b.example/v1/chat/completions");
    }

    #[test]
    fn unknown_provider_lists_valid_keys() {
        let err = upstream().resolve(Some("provider-z")).unwrap_err();

        let ProxyError::InvalidProvider { provider, valid } = err else {
            panic!("expected InvalidProvider, got {err:?}");
        };
        assert_eq!(provider, "provider-z");
        assert_eq!(valid, ["provider-a", "provider-b"]);
    }

    #[test]
    fn missing_provider_is_invalid() {
        let err = upstream().resolve(None).unwrap_err();
        assert!(matches!(err, ProxyError::InvalidProvider { ref provider, .. } if provider.is_empty()));
    }

    #[test]
    fn provider_keys_keep_declaration_order() {
        assert_eq!(upstream().provider_keys().collect::<Vec<_>>(), ["provider-a", "provider-b"]);
    }
}
