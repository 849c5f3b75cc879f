use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::mapper::BadRowPolicy;
use crate::record::DEFAULT_INSERT_CHUNK;

/// 2023년 초까지 거슬러 올라가는 목록 페이지 수
pub const DEFAULT_LAST_PAGE: u32 = 43;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DB_PATH: &str = "spimex.db";

/// 수집 실행 설정
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    pub database_url: String,
    /// 1..=last_page 목록 페이지를 읽는다
    pub last_page: u32,
    /// 동시 요청 상한 (None이면 모든 요청을 한꺼번에)
    pub max_concurrency: Option<usize>,
    /// 요청별 타임아웃 (None이면 무제한)
    pub request_timeout: Option<Duration>,
    pub insert_chunk_size: usize,
    pub bad_row_policy: BadRowPolicy,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            database_url: sqlite_url(DEFAULT_DB_PATH),
            last_page: DEFAULT_LAST_PAGE,
            max_concurrency: None,
            request_timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            insert_chunk_size: DEFAULT_INSERT_CHUNK,
            bad_row_policy: BadRowPolicy::Abort,
        }
    }
}

impl IngestConfig {
    /// 환경 변수에서 설정을 읽는다 (.env는 라이브러리 로드 시 적용됨)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 잘못된 값은 기본값으로 대체
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let request_timeout = match parsed("SPIMEX_REQUEST_TIMEOUT_SECS") {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.request_timeout,
        };

        let skip_bad_rows = lookup("SPIMEX_SKIP_BAD_ROWS")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            database_url: database_url(&lookup),
            last_page: parsed("SPIMEX_LAST_PAGE")
                .and_then(|p| u32::try_from(p).ok())
                .filter(|p| *p > 0)
                .unwrap_or(defaults.last_page),
            max_concurrency: parsed("SPIMEX_MAX_CONCURRENCY")
                .map(|n| n as usize)
                .filter(|n| *n > 0),
            request_timeout,
            insert_chunk_size: parsed("SPIMEX_INSERT_CHUNK")
                .map(|n| n as usize)
                .filter(|n| *n > 0)
                .unwrap_or(defaults.insert_chunk_size),
            bad_row_policy: if skip_bad_rows {
                BadRowPolicy::Skip
            } else {
                BadRowPolicy::Abort
            },
        }
    }
}

/// DATABASE_URL > DB_HOST 기반 PostgreSQL > DB_PATH 기반 SQLite
fn database_url<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()) {
        return url;
    }

    if let Some(host) = lookup("DB_HOST") {
        let user = lookup("DB_USER").unwrap_or_else(|| "postgres".to_string());
        let pass = lookup("DB_PASS").unwrap_or_default();
        let port = lookup("DB_PORT").unwrap_or_else(|| "5432".to_string());
        let name = lookup("DB_NAME").unwrap_or_else(|| "spimex".to_string());
        return format!("postgres://{}:{}@{}:{}/{}", user, pass, host, port, name);
    }

    sqlite_url(&lookup("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()))
}

/// 상대 경로는 현재 디렉토리 기준, 파일이 없으면 생성 모드로 연다
pub fn sqlite_url(db_path: &str) -> String {
    let mut path = PathBuf::from(db_path);
    if !path.is_absolute() {
        if let Ok(current_dir) = env::current_dir() {
            path = current_dir.join(db_path);
        }
    }

    format!("sqlite://{}?mode=rwc", path.to_string_lossy())
}
