use std::time::Duration;

use crate::utils::error::{MenuError, Result};

const USER_AGENT: &str = concat!("mensa-etl/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ATTEMPTS: u32 = 3;

/// Shared HTTP client. Upstream menu pages are flaky, so transport
/// errors and 5xx responses are retried with a short linear backoff;
/// 4xx responses fail immediately.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.get_with_retry(url).await?;
        Ok(response.text().await?)
    }

    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get_with_retry(url).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn get_with_retry(&self, url: &str) -> Result<reqwest::Response> {
        let mut last_error = None;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    let error = MenuError::HttpStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    };
                    if !status.is_server_error() {
                        return Err(error);
                    }
                    tracing::warn!(url, %status, attempt, "server error, retrying");
                    last_error = Some(error);
                }
                Err(e) => {
                    tracing::warn!(url, error = %e, attempt, "request failed, retrying");
                    last_error = Some(MenuError::Http(e));
                }
            }
            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(Duration::from_millis(500 * u64::from(attempt))).await;
            }
        }
        Err(last_error.expect("at least one attempt"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_get_text_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/menu.html");
            then.status(200).body("<html>Speiseplan</html>");
        });

        let client = HttpClient::new().unwrap();
        let body = client.get_text(&server.url("/menu.html")).await.unwrap();

        mock.assert();
        assert_eq!(body, "<html>Speiseplan</html>");
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/gone");
            then.status(404);
        });

        let client = HttpClient::new().unwrap();
        let result = client.get_text(&server.url("/gone")).await;

        mock.assert_hits(1);
        assert!(matches!(
            result,
            Err(MenuError::HttpStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/flaky");
            then.status(500);
        });

        let client = HttpClient::new().unwrap();
        let result = client.get_text(&server.url("/flaky")).await;

        mock.assert_hits(3);
        assert!(result.is_err());
    }
}
