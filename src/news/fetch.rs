// HTTP transport for feeds, behind a trait so aggregation runs against stubs in tests.

use crate::error::FetchError;
use std::future::Future;
use std::time::Duration;

pub trait FeedFetcher {
    /// Fetches `url` and returns the non-empty body.
    fn fetch(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self { client })
    }
}

impl FeedFetcher for HttpFetcher {
    fn fetch(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<String, FetchError>> + Send {
        let request = self.client.get(url).timeout(timeout);
        async move {
            let classify = |e: reqwest::Error| {
                if e.is_timeout() {
                    FetchError::Timeout(timeout)
                } else {
                    FetchError::Http(e)
                }
            };
            let response = request.send().await.map_err(classify)?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }
            let body = response.text().await.map_err(classify)?;
            if body.trim().is_empty() {
                return Err(FetchError::Empty);
            }
            Ok(body)
        }
    }
}
