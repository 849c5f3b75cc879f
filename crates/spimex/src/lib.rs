pub mod bulletin;
pub mod client;
pub mod listing;

use async_trait::async_trait;

use interface::ScrapeError;

/// 불리틴 목록 페이지와 파일을 가져오는 원천.
/// 테스트에서는 메모리 구현으로 교체한다.
#[async_trait]
pub trait BulletinSource: Send + Sync {
    async fn fetch_listing(&self, page: u32) -> Result<String, ScrapeError>;

    async fn fetch_bulletin(&self, url: &str) -> Result<Vec<u8>, ScrapeError>;
}

// Convenience re-exports
pub use bulletin::{RowExtractor, SheetGrid, XlsExtractor};
pub use client::SpimexClient;
pub use listing::LinkDiscoverer;
