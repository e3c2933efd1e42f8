use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

use kosmo_utils::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LcdNetworkSettings {
    /// Base url of the REST gateway, e.g. `https://rest.cosmos.directory/cosmoshub`
    pub endpoint: String,
    /// Request timeout. Default: `10000`
    #[serde(with = "serde_duration_ms")]
    pub timeout: Duration,
}

impl Default for LcdNetworkSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

pub struct LcdClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl LcdClient {
    pub fn new(settings: LcdNetworkSettings) -> Result<Arc<Self>> {
        let endpoint = parse_endpoint(&settings.endpoint)?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::ClientBuilder::new()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .context("failed to build http client")?;

        Ok(Arc::new(Self { client, endpoint }))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl kosmo::external::LcdConnection for LcdClient {
    async fn send_get(&self, path: &str) -> Result<Option<String>> {
        let url = self
            .endpoint
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("invalid request path: {path}"))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status.is_server_error() {
            log::debug!("LCD server error for {path}: {status}");
            return Err(LcdClientError::ServerError(status.as_u16()).into());
        }

        // Client errors carry a json body with the error code
        Ok(Some(response.text().await?))
    }
}

/// Relative paths are joined to the last segment, so the base must end with a slash
fn parse_endpoint(endpoint: &str) -> Result<Url> {
    if endpoint.is_empty() {
        return Err(LcdClientError::NoEndpointSpecified.into());
    }

    let mut url =
        Url::parse(endpoint).with_context(|| format!("failed to parse endpoint: {endpoint}"))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[derive(thiserror::Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum LcdClientError {
    #[error("No endpoint specified")]
    NoEndpointSpecified,
    #[error("Server error: {0}")]
    ServerError(u16),
}

#[cfg(test)]
mod tests {
    use kosmo::external::LcdConnection;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    #[test]
    fn endpoint_keeps_base_path() {
        let url = parse_endpoint("https://rest.cosmos.directory/cosmoshub").unwrap();
        assert_eq!(
            url.join("cosmos/staking/v1beta1/params").unwrap().as_str(),
            "https://rest.cosmos.directory/cosmoshub/cosmos/staking/v1beta1/params"
        );

        let url = parse_endpoint("https://lcd.example.com").unwrap();
        assert_eq!(url.as_str(), "https://lcd.example.com/");

        assert!(parse_endpoint("").is_err());
        assert!(parse_endpoint("not a url").is_err());
    }

    #[test]
    fn settings_defaults() {
        let settings: LcdNetworkSettings =
            serde_json::from_str(r#"{"endpoint":"https://lcd.example.com"}"#).unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(10));

        let settings: LcdNetworkSettings =
            serde_json::from_str(r#"{"endpoint":"https://lcd.example.com","timeout":2500}"#)
                .unwrap();
        assert_eq!(settings.timeout, Duration::from_millis(2500));
    }

    /// Serves a fixed number of requests and answers based on the request path
    async fn serve(listener: TcpListener, requests: usize) {
        for _ in 0..requests {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut buffer = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buffer.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buffer.extend_from_slice(&chunk[..n]);
            }

            let request = String::from_utf8_lossy(&buffer);
            let path = request.split_whitespace().nth(1).unwrap_or_default();

            let (status, body) = match path {
                "/api/cosmos/staking/v1beta1/params" => ("200 OK", r#"{"params":{}}"#),
                "/api/broken" => ("502 Bad Gateway", "<html></html>"),
                _ => ("404 Not Found", r#"{"code":5,"message":"Not Implemented"}"#),
            };

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
    }

    #[tokio::test]
    async fn lcd_client_works() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(serve(listener, 3));

        let client = LcdClient::new(LcdNetworkSettings {
            endpoint: format!("http://127.0.0.1:{port}/api"),
            ..Default::default()
        })
        .unwrap();

        let response = client
            .send_get("cosmos/staking/v1beta1/params")
            .await
            .unwrap();
        assert_eq!(response.as_deref(), Some(r#"{"params":{}}"#));

        let response = client.send_get("/unknown").await.unwrap();
        assert!(response.is_none());

        let err = client.send_get("broken").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<LcdClientError>(),
            Some(&LcdClientError::ServerError(502))
        );

        server.await.unwrap();
    }
}
