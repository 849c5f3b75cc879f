use futures::future::try_join_all;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;
use tracing::{debug, info};

use interface::{Bulletin, ScrapeError};
use spimex::bulletin::is_xls_link;
use spimex::{BulletinSource, LinkDiscoverer, RowExtractor, SpimexClient, XlsExtractor};

use crate::config::{IngestConfig, DEFAULT_LAST_PAGE};
use crate::mapper::{map_bulletins, BadRowPolicy};
use crate::record::{
    persist_batch, PersistOutcome, RecordError, SeaTradingRecordRepository,
    TradingRecordRepository,
};
use crate::timing::timed;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("record error: {0}")]
    Record(#[from] RecordError),
}

/// 실행 결과 요약
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub links: usize,
    pub bulletins: usize,
    pub records: usize,
    /// 스키마만 만든 실행이면 None
    pub persisted: Option<PersistOutcome>,
}

/// 목록 페이지 -> 링크 -> 불리틴 수집기.
/// 두 단계 모두 요청을 한꺼번에 띄우고 인덱스 순서로 모은다.
pub struct Pipeline<S, E> {
    source: S,
    extractor: E,
    discoverer: LinkDiscoverer,
    last_page: u32,
    max_concurrency: Option<usize>,
}

impl<S, E> Pipeline<S, E>
where
    S: BulletinSource,
    E: RowExtractor,
{
    pub fn new(source: S, extractor: E, discoverer: LinkDiscoverer) -> Self {
        Self {
            source,
            extractor,
            discoverer,
            last_page: DEFAULT_LAST_PAGE,
            max_concurrency: None,
        }
    }

    pub fn with_last_page(mut self, last_page: u32) -> Self {
        self.last_page = last_page;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: Option<usize>) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// 1단계: 1..=last_page 목록 페이지의 링크를 페이지 순서대로 이어 붙인다 (중복 제거 없음)
    pub async fn discover_links(&self) -> Result<Vec<String>, ScrapeError> {
        let per_page = fan_out(
            (1..=self.last_page).map(|page| self.links_on_page(page)),
            self.max_concurrency,
        )
        .await?;

        Ok(per_page.into_iter().flatten().collect())
    }

    async fn links_on_page(&self, page: u32) -> Result<Vec<String>, ScrapeError> {
        let html = self.source.fetch_listing(page).await?;
        let links = self.discoverer.discover(&html);
        debug!("Page {}: {} links", page, links.len());
        Ok(links)
    }

    /// 2단계: 링크마다 파일을 받아 추출한다. 결과는 링크 순서.
    pub async fn fetch_bulletins(&self, links: &[String]) -> Result<Vec<Bulletin>, ScrapeError> {
        fan_out(
            links.iter().map(|link| self.fetch_bulletin(link)),
            self.max_concurrency,
        )
        .await
    }

    async fn fetch_bulletin(&self, url: &str) -> Result<Bulletin, ScrapeError> {
        if !is_xls_link(url) {
            debug!("Not an xls link, skipping: {}", url);
            return Ok(Bulletin::empty());
        }

        let bytes = self.source.fetch_bulletin(url).await?;
        self.extractor.extract(&bytes)
    }
}

/// 모든 작업을 띄우고 전부 끝날 때까지 기다린다. 하나라도 실패하면 그 에러를 돌려준다.
/// limit이 있으면 동시에 그 수만큼만 진행한다. 결과 순서는 입력 순서.
async fn fan_out<I, F, T>(tasks: I, limit: Option<usize>) -> Result<Vec<T>, ScrapeError>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, ScrapeError>>,
{
    match limit {
        None => try_join_all(tasks).await,
        Some(limit) => stream::iter(tasks).buffered(limit.max(1)).try_collect().await,
    }
}

/// 수집 -> 변환 -> 저장.
/// 파싱/네트워크 에러는 올리고, 저장 실패는 보고서에 담아 정상 반환한다.
pub async fn scrape_and_persist<S, E>(
    pipeline: &Pipeline<S, E>,
    repo: &dyn TradingRecordRepository,
    policy: BadRowPolicy,
) -> Result<RunReport, IngestError>
where
    S: BulletinSource,
    E: RowExtractor,
{
    let links = timed("discover_links", pipeline.discover_links()).await?;
    info!("Discovered {} bulletin links", links.len());

    let bulletins = timed("fetch_bulletins", pipeline.fetch_bulletins(&links)).await?;
    let records = map_bulletins(&bulletins, policy)?;
    info!(
        "Mapped {} records from {} bulletins",
        records.len(),
        bulletins.len()
    );

    let persisted = timed("persist_batch", persist_batch(repo, &records)).await;

    Ok(RunReport {
        links: links.len(),
        bulletins: bulletins.len(),
        records: records.len(),
        persisted: Some(persisted),
    })
}

/// 진입점. scrape가 false면 스키마만 보장하고 끝낸다.
pub async fn run(config: &IngestConfig, scrape: bool) -> Result<RunReport, IngestError> {
    timed("create_database", run_stages(config, scrape)).await
}

async fn run_stages(config: &IngestConfig, scrape: bool) -> Result<RunReport, IngestError> {
    let repo = SeaTradingRecordRepository::connect(&config.database_url)
        .await?
        .with_chunk_size(config.insert_chunk_size);

    if !scrape {
        return Ok(RunReport::default());
    }

    let client = SpimexClient::with_timeout(config.request_timeout)?;
    let pipeline = Pipeline::new(client, XlsExtractor, LinkDiscoverer::new()?)
        .with_last_page(config.last_page)
        .with_max_concurrency(config.max_concurrency);

    scrape_and_persist(&pipeline, &repo, config.bad_row_policy).await
}
