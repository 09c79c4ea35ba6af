//! Mirror rotation client.
//!
//! Tries each mirror base URL in order and returns the first page that
//! answers with a success status, together with the mirror that served it.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{HttpConfig, Source};
use crate::utils::http::create_async_client;
use crate::utils::url::join;

/// Status and body of one HTTP response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Transport seam for mirror requests.
///
/// `Err` means the request never produced a response (timeout, DNS, TLS...).
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResponse>;
}

/// `PageFetcher` backed by a reqwest client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchResponse { status, body })
    }
}

/// A page fetched from a mirror.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Base URL of the mirror that answered, without trailing slash
    pub domain: String,
    pub body: String,
}

/// Client that rotates through mirrors.
pub struct MirrorClient {
    fetcher: Box<dyn PageFetcher>,
}

impl MirrorClient {
    pub fn new(fetcher: Box<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Create a client over HTTP with the given settings.
    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        Ok(Self::new(Box::new(HttpFetcher::new(config)?)))
    }

    /// Fetch `base_url + path` from the first mirror that answers.
    ///
    /// A 404 means the resource itself is missing and stops the rotation.
    /// Any other failure moves on to the next mirror.
    pub async fn fetch(
        &self,
        source: Source,
        handle: &str,
        base_urls: &[String],
        path: &str,
    ) -> Result<RawPage> {
        for base_url in base_urls {
            let domain = base_url.trim_end_matches('/');
            let url = join(domain, path);

            match self.fetcher.get(&url).await {
                Ok(response) if response.is_success() => {
                    log::debug!("{source}: resolved {url} ({})", response.status);
                    return Ok(RawPage {
                        domain: domain.to_string(),
                        body: response.body,
                    });
                }
                Ok(response) if response.is_not_found() => {
                    return Err(AppError::NotFound {
                        platform: source,
                        handle: handle.to_string(),
                    });
                }
                Ok(response) => {
                    log::warn!("{source}: mirror {url} answered {}", response.status);
                }
                Err(error) => {
                    log::warn!("{source}: mirror {url} failed: {error}");
                }
            }
        }

        Err(AppError::AllMirrorsDown { platform: source })
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;

    /// In-memory fetcher: unknown URLs fail at the transport level.
    #[derive(Clone, Default)]
    pub struct FakeFetcher {
        pages: Arc<Mutex<HashMap<String, (u16, String)>>>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl FakeFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn serve(&self, url: &str, status: u16, body: &str) -> &Self {
            self.pages
                .lock()
                .unwrap()
                .insert(url.to_string(), (status, body.to_string()));
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn get(&self, url: &str) -> Result<FetchResponse> {
            self.requests.lock().unwrap().push(url.to_string());
            let page = self.pages.lock().unwrap().get(url).cloned();
            match page {
                Some((status, body)) => Ok(FetchResponse { status, body }),
                None => Err(AppError::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("no route to {url}"),
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeFetcher;
    use super::*;

    fn mirrors() -> Vec<String> {
        vec![
            "https://a.example".to_string(),
            "https://b.example/".to_string(),
            "https://c.example".to_string(),
        ]
    }

    #[tokio::test]
    async fn test_falls_back_to_first_healthy_mirror() {
        let fetcher = FakeFetcher::new();
        fetcher
            .serve("https://a.example/jack", 503, "down")
            .serve("https://b.example/jack", 200, "<html>b</html>")
            .serve("https://c.example/jack", 200, "<html>c</html>");
        let client = MirrorClient::new(Box::new(fetcher.clone()));

        let page = client
            .fetch(Source::Twitter, "jack", &mirrors(), "/jack")
            .await
            .unwrap();

        assert_eq!(page.domain, "https://b.example");
        assert_eq!(page.body, "<html>b</html>");
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_error_moves_on() {
        let fetcher = FakeFetcher::new();
        fetcher.serve("https://c.example/u/jack", 200, "ok");
        let client = MirrorClient::new(Box::new(fetcher.clone()));

        let page = client
            .fetch(Source::Instagram, "jack", &mirrors(), "/u/jack")
            .await
            .unwrap();

        assert_eq!(page.domain, "https://c.example");
        assert_eq!(fetcher.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_all_mirrors_down() {
        let fetcher = FakeFetcher::new();
        fetcher
            .serve("https://a.example/jack", 500, "")
            .serve("https://b.example/jack", 502, "");
        let client = MirrorClient::new(Box::new(fetcher));

        let err = client
            .fetch(Source::Twitter, "jack", &mirrors(), "/jack")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::AllMirrorsDown {
                platform: Source::Twitter
            }
        ));
    }

    #[tokio::test]
    async fn test_not_found_stops_rotation() {
        let fetcher = FakeFetcher::new();
        fetcher
            .serve("https://a.example/ghost", 502, "")
            .serve("https://b.example/ghost", 404, "")
            .serve("https://c.example/ghost", 200, "never reached");
        let client = MirrorClient::new(Box::new(fetcher.clone()));

        let err = client
            .fetch(Source::Twitter, "ghost", &mirrors(), "/ghost")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { ref handle, .. } if handle == "ghost"));
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_no_mirrors_is_all_down() {
        let client = MirrorClient::new(Box::new(FakeFetcher::new()));
        let err = client
            .fetch(Source::Instagram, "jack", &[], "/u/jack")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AllMirrorsDown { .. }));
    }
}
