//! Consul KV client over the agent's HTTP API

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use tracing::debug;
use url::Url;

use crate::config::SeedConfig;
use crate::error::{ConfigSeedError, Result};
use crate::store::client::StoreClient;
use crate::utils::network::{create_http_client, describe_network_error, NetworkConfig};

/// Path used to check the agent status.
pub const CONSUL_STATUS_PATH: &str = "/v1/agent/self";

const KV_PATH: &str = "v1/kv";
const TOKEN_HEADER: &str = "X-Consul-Token";

pub struct ConsulClient {
    http_client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ConsulClient {
    pub fn new(base_url: &str, token: Option<String>, network: &NetworkConfig) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ConfigSeedError::invalid_config(format!("Invalid Consul URL '{}': {}", base_url, e))
        })?;

        Ok(Self {
            http_client: create_http_client(network)?,
            base_url,
            token,
        })
    }

    pub fn from_config(config: &SeedConfig) -> Result<Self> {
        let network = NetworkConfig {
            request_timeout: config.request_timeout(),
            ..Default::default()
        };
        Self::new(&config.consul_url(), config.consul_token.clone(), &network)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of a KV entry; every key segment is percent-encoded on its own
    /// so that `/` keeps its hierarchical meaning.
    fn kv_url(&self, key: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ConfigSeedError::invalid_config(format!(
                    "Consul URL '{}' cannot be used as a base",
                    self.base_url
                ))
            })?;
            segments.pop_if_empty();
            segments.extend(KV_PATH.split('/'));
            segments.extend(key.split('/'));
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http_client.request(method, url);
        match &self.token {
            Some(token) => builder.header(TOKEN_HEADER, token),
            None => builder,
        }
    }
}

#[async_trait]
impl StoreClient for ConsulClient {
    async fn health_check(&self) -> Result<()> {
        let url = self.base_url.join(CONSUL_STATUS_PATH).map_err(|e| {
            ConfigSeedError::invalid_config(format!("Invalid Consul URL: {}", e))
        })?;

        let response = self
            .request(Method::GET, url.clone())
            .send()
            .await
            .map_err(|e| {
                ConfigSeedError::store_unavailable(describe_network_error(&e, url.as_str()))
            })?;

        if !response.status().is_success() {
            return Err(ConfigSeedError::store_unavailable(format!(
                "{} answered HTTP {}",
                url,
                response.status()
            )));
        }

        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut url = self.kv_url(prefix)?;
        url.set_query(Some("keys"));

        let response = self
            .request(Method::GET, url.clone())
            .send()
            .await
            .map_err(|e| ConfigSeedError::query(describe_network_error(&e, url.as_str())))?;

        // Consul answers 404 when nothing lives under the prefix
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        if !response.status().is_success() {
            return Err(ConfigSeedError::query(format!(
                "listing keys under '{}' returned HTTP {}",
                prefix,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ConfigSeedError::query(format!("reading key list failed: {}", e)))?;
        let keys: Vec<String> = serde_json::from_str(&body).map_err(|e| {
            ConfigSeedError::query(format!("unexpected key list from Consul: {}", e))
        })?;

        debug!("found {} key(s) under '{}'", keys.len(), prefix);
        Ok(keys)
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let url = self.kv_url(key)?;

        let response = self
            .request(Method::PUT, url.clone())
            .body(value.to_vec())
            .send()
            .await
            .map_err(|e| ConfigSeedError::write(key, describe_network_error(&e, url.as_str())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConfigSeedError::write(key, format!("Consul returned HTTP {}", status)));
        }

        // The body is a JSON boolean telling whether the write was applied
        let body = response
            .text()
            .await
            .map_err(|e| ConfigSeedError::write(key, e.to_string()))?;
        if body.trim() == "false" {
            return Err(ConfigSeedError::write(key, "Consul did not apply the write"));
        }

        Ok(())
    }

    async fn delete_tree(&self, prefix: &str) -> Result<()> {
        let mut url = self.kv_url(prefix)?;
        url.set_query(Some("recurse"));

        let response = self
            .request(Method::DELETE, url.clone())
            .send()
            .await
            .map_err(|e| ConfigSeedError::query(describe_network_error(&e, url.as_str())))?;

        if !response.status().is_success() {
            return Err(ConfigSeedError::query(format!(
                "deleting keys under '{}' returned HTTP {}",
                prefix,
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard, token: Option<&str>) -> ConsulClient {
        ConsulClient::new(
            &server.url(),
            token.map(str::to_string),
            &NetworkConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_kv_url_encodes_segments() {
        let client =
            ConsulClient::new("http://localhost:8500", None, &NetworkConfig::default()).unwrap();

        let url = client.kv_url("config/sub/foo").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8500/v1/kv/config/sub/foo");

        let url = client.kv_url("config/my app/a?b").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8500/v1/kv/config/my%20app/a%3Fb"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ConsulClient::new("not a url", None, &NetworkConfig::default());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_health_check_ok() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", CONSUL_STATUS_PATH)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        client_for(&server, None).health_check().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_health_check_non_2xx_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", CONSUL_STATUS_PATH)
            .with_status(500)
            .create_async()
            .await;

        let err = client_for(&server, None).health_check().await.unwrap_err();
        assert!(matches!(err, ConfigSeedError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_keys_lists_prefix() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/kv/config")
            .match_query(Matcher::Regex("keys".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"["config/a", "config/sub/b"]"#)
            .create_async()
            .await;

        let keys = client_for(&server, None).keys("config").await.unwrap();
        mock.assert_async().await;
        assert_eq!(keys, vec!["config/a", "config/sub/b"]);
    }

    #[tokio::test]
    async fn test_keys_not_found_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/kv/config")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let keys = client_for(&server, None).keys("config").await.unwrap();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_keys_server_error_is_query_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/kv/config")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let err = client_for(&server, None).keys("config").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Query);
    }

    #[tokio::test]
    async fn test_put_sends_raw_value_and_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/v1/kv/config/sub/foo")
            .match_header(TOKEN_HEADER, "acl-token")
            .match_body("bar")
            .with_status(200)
            .with_body("true")
            .create_async()
            .await;

        client_for(&server, Some("acl-token"))
            .put("config/sub/foo", b"bar")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_put_rejected_write() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/v1/kv/config/foo")
            .with_status(200)
            .with_body("false")
            .create_async()
            .await;

        let err = client_for(&server, None)
            .put("config/foo", b"bar")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Write);
    }

    #[tokio::test]
    async fn test_delete_tree_is_recursive() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/v1/kv/config")
            .match_query(Matcher::Regex("recurse".to_string()))
            .with_status(200)
            .with_body("true")
            .create_async()
            .await;

        client_for(&server, None).delete_tree("config").await.unwrap();
        mock.assert_async().await;
    }
}
