use std::env;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 콘솔 + 일별 로그 파일.
/// 반환된 가드는 main이 끝날 때까지 들고 있어야 버퍼가 비워진다.
pub fn init_tracing() -> Vec<WorkerGuard> {
    let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

    let file_appender = tracing_appender::rolling::daily(&log_dir, "ingest.log");
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(stdout_writer).with_target(false))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();

    vec![stdout_guard, file_guard]
}
