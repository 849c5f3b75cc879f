use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use interface::ScrapeError;

use super::BulletinSource;

pub const SITE_ROOT: &str = "https://spimex.com";
pub const LISTING_URL: &str = "https://spimex.com/markets/oil_products/trades/results/?page=page-";

/// reqwest 기반 SPIMEX 클라이언트.
/// 한 번의 실행 동안 하나의 커넥션 풀을 공유한다.
/// 목록 페이지는 상태 코드와 무관하게 본문을 돌려주고, 불리틴 파일은 2xx만 받는다.
#[derive(Debug, Clone)]
pub struct SpimexClient {
    pub(crate) http: reqwest::Client,
    listing_url: String,
}

impl SpimexClient {
    pub fn new() -> Result<Self, ScrapeError> {
        Self::with_timeout(None)
    }

    /// 요청별 타임아웃을 건 클라이언트 (None이면 무제한)
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, ScrapeError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            listing_url: LISTING_URL.to_string(),
        })
    }

    /// 목록 페이지 URL 접두사 교체 (페이지 번호가 뒤에 붙는다)
    pub fn with_listing_url(mut self, listing_url: impl Into<String>) -> Self {
        self.listing_url = listing_url.into();
        self
    }

    pub fn listing_page_url(&self, page: u32) -> String {
        format!("{}{}", self.listing_url, page)
    }
}

#[async_trait]
impl BulletinSource for SpimexClient {
    async fn fetch_listing(&self, page: u32) -> Result<String, ScrapeError> {
        let url = self.listing_page_url(page);
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        // 오류 페이지도 본문을 그대로 넘긴다. 링크가 없으니 기여분은 0건.
        if !status.is_success() {
            warn!(
                "Listing page {} answered {}, response: {}",
                page,
                status,
                response_text.chars().take(200).collect::<String>()
            );
        }

        Ok(response_text)
    }

    async fn fetch_bulletin(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        debug!("GET {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ScrapeError::Other(format!(
                "bulletin HTTP error: status {}, url: {}",
                status, url
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn listing_page_url_appends_page_number() {
        let client = SpimexClient::new().unwrap();
        assert_eq!(
            client.listing_page_url(7),
            "https://spimex.com/markets/oil_products/trades/results/?page=page-7"
        );
    }

    /// 모든 요청에 같은 응답을 주는 로컬 서버
    async fn serve_once_per_connection(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 2048];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn missing_listing_page_yields_its_body() {
        let base = serve_once_per_connection(
            "404 Not Found",
            "<html><body><h1>Страница не найдена</h1></body></html>",
        )
        .await;
        let client = SpimexClient::new()
            .unwrap()
            .with_listing_url(format!("{}/list?page=", base));

        let html = client.fetch_listing(44).await.unwrap();
        assert!(html.contains("Страница не найдена"));
    }

    #[tokio::test]
    async fn missing_bulletin_is_an_error() {
        let base = serve_once_per_connection("404 Not Found", "<html></html>").await;
        let client = SpimexClient::new().unwrap();

        let err = client
            .fetch_bulletin(&format!("{}/upload/reports/oil_xls/oil_xls_20230315162000.xls", base))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Other(_)));
    }

    #[test]
    fn listing_url_can_be_replaced() {
        let client = SpimexClient::new()
            .unwrap()
            .with_listing_url("http://localhost:8080/list?page=");
        assert_eq!(client.listing_page_url(1), "http://localhost:8080/list?page=1");
    }
}
